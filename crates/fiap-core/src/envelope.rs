//! Envelope rules: response validation and the ok/error response
//! constructors used by inbound dispatchers.

use crate::error::{Error, Result};
use crate::model::{Fault, Header, Transport};

/// Check a received envelope for the success/error markers.
///
/// Rules, in order: no header fails with [`Error::MissingHeader`];
/// neither OK nor error fails with [`Error::MissingSuccessMarker`]; an
/// error payload fails with [`Error::Remote`] even when the OK marker is
/// also present. Purely a predicate over message shape.
pub fn validate_transport(response: &Transport) -> Result<()> {
    let header = response.header.as_ref().ok_or(Error::MissingHeader)?;

    if !header.ok && header.error.is_none() {
        return Err(Error::MissingSuccessMarker);
    }

    if let Some(fault) = &header.error {
        return Err(Error::Remote {
            kind: fault.kind.clone(),
            message: fault.value.clone(),
        });
    }

    Ok(())
}

/// Success envelope: the request envelope (if any) with the OK marker
/// set on its header. The request's header shape is preserved.
pub fn ok_transport(request: Option<Transport>) -> Transport {
    let mut transport = request.unwrap_or_default();
    let mut header = transport.header.take().unwrap_or_default();
    header.ok = true;
    transport.header = Some(header);
    transport
}

/// Error envelope: the request envelope (if any) with an error payload
/// set on its header.
pub fn error_transport(
    request: Option<Transport>,
    kind: impl Into<String>,
    value: impl Into<String>,
) -> Transport {
    let mut transport = request.unwrap_or_default();
    let mut header = transport.header.take().unwrap_or_default();
    header.error = Some(Fault::new(kind, value));
    transport.header = Some(header);
    transport
}
