//! Wire framing for FIAP envelopes.
//!
//! Real IEEE 1888 rides on SOAP/XML; that encoding is out of scope here
//! and the envelope is treated as opaque. On this wire a message is a
//! frame: a 4-byte big-endian length prefix followed by a JSON-encoded
//! operation kind plus optional [`fiap_core::Transport`].
//!
//! ```text
//! <len:u32> { "op": "query" | "data", "transport": { ... } }
//! ```

pub mod codec;
pub mod error;
pub mod frame;

pub use codec::FrameDecoder;
pub use error::{ProtocolError, ProtocolResult};
pub use frame::{Frame, Op};
