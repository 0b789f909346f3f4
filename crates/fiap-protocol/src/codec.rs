//! Frame codec: length-prefixed JSON over a byte stream

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::Frame;

/// Maximum frame payload size (4 MiB)
pub const MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

const LEN_PREFIX: usize = 4;

/// Encode a frame into a fresh buffer.
pub fn encode(frame: &Frame) -> ProtocolResult<BytesMut> {
    let mut buf = BytesMut::with_capacity(256);
    encode_into(frame, &mut buf)?;
    Ok(buf)
}

/// Encode a frame into an existing buffer.
pub fn encode_into(frame: &Frame, buf: &mut BytesMut) -> ProtocolResult<()> {
    let payload =
        serde_json::to_vec(frame).map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;

    if payload.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: payload.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    buf.put_u32(payload.len() as u32);
    buf.put_slice(&payload);
    Ok(())
}

/// Incremental frame decoder.
///
/// Bytes arrive in arbitrary chunks; [`feed`](FrameDecoder::feed) them in
/// and call [`decode`](FrameDecoder::decode) until it returns `None`.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Add received bytes to the decode buffer.
    pub fn feed(&mut self, data: &[u8]) -> ProtocolResult<()> {
        if self.buffer.len() + data.len() > MAX_FRAME_SIZE + LEN_PREFIX {
            return Err(ProtocolError::FrameTooLarge {
                size: self.buffer.len() + data.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Try to decode one complete frame; `None` means more bytes are
    /// needed.
    pub fn decode(&mut self) -> ProtocolResult<Option<Frame>> {
        if self.buffer.len() < LEN_PREFIX {
            return Ok(None);
        }

        let len = u32::from_be_bytes([
            self.buffer[0],
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
        ]) as usize;

        if len > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        if self.buffer.len() < LEN_PREFIX + len {
            return Ok(None);
        }

        self.buffer.advance(LEN_PREFIX);
        let payload = self.buffer.split_to(len);

        let frame = serde_json::from_slice(&payload)
            .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;
        Ok(Some(frame))
    }
}
