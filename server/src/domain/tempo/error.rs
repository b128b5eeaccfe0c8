//! Error type for Tempo queries

use thiserror::Error;

use crate::core::constants::ERROR_BODY_SNIPPET_LEN;
use crate::utils::string::truncate_preview;

/// Failure of a single Tempo tool call
#[derive(Error, Debug)]
pub enum TempoError {
    /// Missing or mistyped tool argument
    #[error("{0}")]
    InvalidArgument(String),

    /// Time expression matched none of the supported forms
    #[error("unsupported time format: {0}")]
    InvalidTimeFormat(String),

    /// Base URL could not be parsed
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS, connect, timeout or body read failure
    #[error("request to Tempo failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Tempo answered with a non-200 status
    #[error("HTTP error: {status} - {}", truncate_preview(.body, ERROR_BODY_SNIPPET_LEN))]
    BackendHttp { status: u16, body: String },

    /// Tempo accepted the query but reported an error in the payload
    #[error("Tempo error: {message}")]
    BackendLogical { message: String },

    /// Response body did not match the expected shape
    #[error("malformed Tempo response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

impl TempoError {
    /// Whether the failure was caused by the caller's arguments
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::InvalidTimeFormat(_) | Self::InvalidUrl { .. }
        )
    }
}

/// A failed stage of a tool call, carrying the stage label for the message
#[derive(Error, Debug)]
#[error("{stage}: {source}")]
pub struct ToolCallError {
    pub stage: &'static str,
    #[source]
    pub source: TempoError,
}

impl ToolCallError {
    pub fn new(stage: &'static str, source: TempoError) -> Self {
        Self { stage, source }
    }
}
