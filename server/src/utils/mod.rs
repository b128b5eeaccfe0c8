//! Utility modules

pub mod file;
pub mod string;
pub mod terminal;
pub mod time;
