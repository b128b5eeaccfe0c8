//! Domain logic
//!
//! - `tempo` - Tempo HTTP API client, response decoding and text rendering

pub mod tempo;
