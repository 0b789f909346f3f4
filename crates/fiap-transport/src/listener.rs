//! Temporary inbound endpoint for the trap-receiver role

use std::net::SocketAddr;

use fiap_protocol::{codec, Frame, FrameDecoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::TransportResult;

/// Frame-over-TCP listener backed by a [`Dispatcher`].
pub struct FiapListener;

impl FiapListener {
    /// Bind and start serving. Returns a handle that reports the bound
    /// address (useful with port 0) and can stop the listener.
    pub async fn bind(addr: SocketAddr, dispatcher: Dispatcher) -> TransportResult<ListenerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "FIAP listener bound");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, dispatcher, shutdown_rx));

        Ok(ListenerHandle {
            local_addr,
            shutdown: shutdown_tx,
            task: tokio::sync::Mutex::new(Some(task)),
        })
    }

    /// [`bind`](Self::bind) with a `host:port` endpoint string.
    pub async fn bind_endpoint(
        endpoint: &str,
        dispatcher: Dispatcher,
    ) -> TransportResult<ListenerHandle> {
        Self::bind(endpoint.parse()?, dispatcher).await
    }
}

/// Handle to a running listener.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    /// Idempotent; later calls return immediately.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                error!(addr = %self.local_addr, error = %e, "listener task failed");
            }
            info!(addr = %self.local_addr, "FIAP listener stopped");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    dispatcher: Dispatcher,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "connection accepted");
                        let dispatcher = dispatcher.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, dispatcher, shutdown).await {
                                warn!(%peer, error = %e, "connection error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    dispatcher: Dispatcher,
    mut shutdown: watch::Receiver<bool>,
) -> TransportResult<()> {
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0u8; 4096];

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            read = stream.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    break;
                }
                decoder.feed(&buf[..n])?;
                while let Some(frame) = decoder.decode()? {
                    let response = dispatcher.dispatch(frame.op, frame.transport);
                    let encoded = codec::encode(&Frame::new(frame.op, response))?;
                    stream.write_all(&encoded).await?;
                }
            }
        }
    }

    Ok(())
}
