//! FIAP RPC boundary.
//!
//! Two operations, `query` and `data`, carried as frames over TCP:
//! - [`TcpChannel`]: outbound side, one connection per call.
//! - [`Dispatcher`]: turns inbound frames into handler calls and wraps
//!   every failure into an error-shaped envelope.
//! - [`FiapListener`]: a temporary inbound endpoint that can be stopped,
//!   used for the duration of one push-subscription window.

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod listener;

pub use channel::{Channel, TcpChannel};
pub use dispatcher::{not_implemented, Dispatcher, MethodHandler};
pub use error::{TransportError, TransportResult};
pub use listener::{FiapListener, ListenerHandle};
