//! API route handlers

pub mod health;
