//! Inbound dispatcher - turns query/data frames into handler calls

use std::sync::Arc;

use fiap_core::{error_transport, Error, Transport};
use fiap_protocol::Op;
use tracing::debug;

/// Handler for one operation kind. Takes the request envelope, returns
/// the response envelope or a typed failure.
pub type MethodHandler = Arc<dyn Fn(Transport) -> fiap_core::Result<Transport> + Send + Sync>;

/// Handler that fails unconditionally, for operations a role does not
/// support (the trap receiver never implements `query`).
pub fn not_implemented() -> MethodHandler {
    Arc::new(|_| Err(Error::NotImplemented))
}

/// Pairs an `on_query` and an `on_data` handler behind one uniform
/// request entry point.
///
/// The protocol has no notion of a transport-level fault: a missing
/// envelope and any handler failure both come back as an error-shaped
/// envelope, never as a failed call.
#[derive(Clone)]
pub struct Dispatcher {
    on_query: MethodHandler,
    on_data: MethodHandler,
}

impl Dispatcher {
    pub fn new(on_query: MethodHandler, on_data: MethodHandler) -> Self {
        Self { on_query, on_data }
    }

    /// Dispatch one inbound operation payload.
    pub fn dispatch(&self, op: Op, transport: Option<Transport>) -> Transport {
        let handler = match op {
            Op::Query => &self.on_query,
            Op::Data => &self.on_data,
        };

        let result = match transport.clone() {
            None => Err(Error::MissingTransport),
            Some(req) => handler(req),
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                debug!(%op, error = %e, "handler failed, shaping error envelope");
                error_transport(transport, e.kind(), e.to_string())
            }
        }
    }
}
