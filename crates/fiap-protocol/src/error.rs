//! Protocol error types

use thiserror::Error;

/// Framing and payload errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("invalid frame payload: {0}")]
    InvalidPayload(String),
}

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;
