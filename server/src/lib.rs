//! Model Context Protocol server exposing Grafana Tempo trace search

pub mod api;
pub mod app;
pub mod core;
pub mod domain;
pub mod utils;
