//! Error types for the FIAP envelope and merge rules

use thiserror::Error;

/// Envelope-shape and handler errors.
///
/// These are the protocol-level failure kinds: what a response envelope
/// can be missing, and what a remote side can report. Each variant has a
/// stable [`kind`](Error::kind) name used when a failure is re-shaped
/// into an error envelope by an inbound dispatcher.
#[derive(Error, Debug)]
pub enum Error {
    #[error("response has no header")]
    MissingHeader,

    #[error("response header has neither OK nor error")]
    MissingSuccessMarker,

    #[error("remote error [{kind}] {message}")]
    Remote { kind: String, message: String },

    #[error("response has no body")]
    NoBody,

    #[error("request has no transport")]
    MissingTransport,

    #[error("operation not implemented")]
    NotImplemented,
}

impl Error {
    /// Stable machine-readable name, used as the `type` of an error
    /// envelope produced from this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingHeader => "MissingHeader",
            Error::MissingSuccessMarker => "MissingSuccessMarker",
            Error::Remote { .. } => "RemoteError",
            Error::NoBody => "NoBody",
            Error::MissingTransport => "MissingTransport",
            Error::NotImplemented => "NotImplemented",
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
