//! Client error types

use std::time::Duration;

use thiserror::Error;

/// Failures surfaced to application code
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] fiap_transport::TransportError),

    #[error(transparent)]
    Envelope(#[from] fiap_core::Error),

    #[error("wait timed out after {waited:?}")]
    Timeout { waited: Duration },

    #[error("wait was cancelled before a result was produced")]
    Cancelled,

    #[error("page limit exceeded after {pages} pages")]
    PageLimitExceeded { pages: usize },

    #[error("invalid trap query: {0}")]
    InvalidTrapQuery(&'static str),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
