//! Outbound RPC channel

use std::net::SocketAddr;

use async_trait::async_trait;
use fiap_core::Transport;
use fiap_protocol::{codec, Frame, FrameDecoder, Op};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{TransportError, TransportResult};

/// The two-operation RPC boundary a FIAP client drives.
///
/// Implementations are synchronous request/response from the caller's
/// point of view: one envelope out, one envelope back.
#[async_trait]
pub trait Channel: Send + Sync {
    /// The `query` operation: pull requests and subscription
    /// registrations.
    async fn query(&self, request: Transport) -> TransportResult<Transport>;

    /// The `data` operation: writes and pushed bodies.
    async fn data(&self, request: Transport) -> TransportResult<Transport>;
}

/// Frame-over-TCP channel to a remote endpoint.
///
/// Each call opens a fresh connection, sends one request frame and waits
/// for one response frame, mirroring the request/response nature of the
/// protocol.
#[derive(Debug, Clone)]
pub struct TcpChannel {
    addr: SocketAddr,
}

impl TcpChannel {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Parse an `host:port` endpoint address.
    pub fn from_endpoint(endpoint: &str) -> TransportResult<Self> {
        Ok(Self::new(endpoint.parse()?))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn call(&self, op: Op, request: Transport) -> TransportResult<Transport> {
        let mut stream = TcpStream::connect(self.addr).await?;
        debug!(addr = %self.addr, %op, "sending request frame");

        let encoded = codec::encode(&Frame::new(op, request))?;
        stream.write_all(&encoded).await?;

        let mut decoder = FrameDecoder::new();
        let mut buf = vec![0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                return Err(TransportError::ConnectionClosed);
            }
            decoder.feed(&buf[..n])?;
            if let Some(frame) = decoder.decode()? {
                debug!(addr = %self.addr, %op, "received response frame");
                // A response without an envelope is a protocol violation
                // on the remote side.
                return frame
                    .transport
                    .ok_or(TransportError::Envelope(fiap_core::Error::MissingTransport));
            }
        }
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn query(&self, request: Transport) -> TransportResult<Transport> {
        self.call(Op::Query, request).await
    }

    async fn data(&self, request: Transport) -> TransportResult<Transport> {
        self.call(Op::Data, request).await
    }
}
