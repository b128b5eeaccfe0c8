//! API server and routes

mod mcp;
pub mod routes;
mod server;

pub use mcp::serve_stdio;
pub use server::ApiServer;
