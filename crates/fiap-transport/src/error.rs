//! Transport error types

use thiserror::Error;

/// Errors from the TCP channel and listener
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    #[error("connection closed before a response frame arrived")]
    ConnectionClosed,

    #[error(transparent)]
    Protocol(#[from] fiap_protocol::ProtocolError),

    #[error(transparent)]
    Envelope(#[from] fiap_core::Error),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;
