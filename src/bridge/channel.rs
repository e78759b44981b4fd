//! Channel manager: the single connection to the decision service
//!
//! The host drives the bridge from one synchronous thread, so the channel
//! owns a current-thread tokio runtime and blocks on each exchange. One
//! request is in flight at a time; `&mut self` on every call enforces that.

use crate::core::config::ServiceConfig;
use crate::core::error::{BridgeError, Result};
use crate::protocol::frame::{read_frame, write_frame};
use crate::protocol::messages::{decode_reply, encode_request, Reply, Request};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};

/// How a `release` ended. Release never fails; this is for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Nothing was open
    Idle,
    /// Peer acknowledged the close within the timeout
    Graceful,
    /// Timed out or errored; the connection was dropped
    Forced,
    /// The wait was interrupted; the connection was dropped and the
    /// interrupt flag set
    Interrupted,
}

struct Channel {
    runtime: Runtime,
    /// `None` once the stream broke or was never established
    stream: Option<TcpStream>,
}

pub struct ChannelManager {
    host: String,
    port: u16,
    call_timeout: Option<Duration>,
    channel: Option<Channel>,
    connections_opened: u64,
    interrupted: bool,
}

impl ChannelManager {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            call_timeout: None,
            channel: None,
            connections_opened: 0,
            interrupted: false,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let mut manager = Self::new(config.host.clone(), config.port);
        manager.call_timeout = config.call_timeout();
        manager
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn is_open(&self) -> bool {
        self.channel
            .as_ref()
            .map_or(false, |channel| channel.stream.is_some())
    }

    /// Number of connections established over this manager's lifetime
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened
    }

    /// Set when the most recent release wait was interrupted. Best-effort:
    /// only an `Interrupted` error surfaced by the socket sets it, and each
    /// `release` clears it first.
    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Open a connection unless one is already open. Idempotent.
    pub fn ensure_connected(&mut self) -> Result<()> {
        if self.is_open() {
            tracing::debug!(host = %self.host, port = self.port, "Using existing channel");
            return Ok(());
        }

        tracing::debug!(host = %self.host, port = self.port, "Opening channel");
        let runtime = match self.channel.take() {
            Some(channel) => channel.runtime,
            None => Builder::new_current_thread().enable_all().build()?,
        };

        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let connected = match self.call_timeout {
            Some(limit) => runtime.block_on(async {
                tokio::time::timeout(limit, connect)
                    .await
                    .map_err(|_| BridgeError::Timeout)?
                    .map_err(BridgeError::from)
            }),
            None => runtime.block_on(connect).map_err(BridgeError::from),
        };

        match connected {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                self.channel = Some(Channel {
                    runtime,
                    stream: Some(stream),
                });
                self.connections_opened += 1;
                tracing::debug!(host = %self.host, port = self.port, "Channel open");
                Ok(())
            }
            Err(e) => {
                self.channel = Some(Channel {
                    runtime,
                    stream: None,
                });
                Err(e)
            }
        }
    }

    /// Send one request and wait for its reply.
    ///
    /// Connects lazily. A transport failure drops the stream so the next call
    /// reconnects; the failed call itself is never retried.
    pub fn call(&mut self, request: &Request) -> Result<Reply> {
        self.ensure_connected()?;
        let payload = encode_request(request)?;
        let call_timeout = self.call_timeout;

        let Channel { runtime, stream } =
            self.channel.as_mut().ok_or(BridgeError::NotConnected)?;
        let conn = stream.as_mut().ok_or(BridgeError::NotConnected)?;

        let exchange = async {
            write_frame(conn, &payload).await?;
            read_frame(conn).await
        };
        let result = match call_timeout {
            Some(limit) => runtime.block_on(async {
                tokio::time::timeout(limit, exchange)
                    .await
                    .map_err(|_| BridgeError::Timeout)?
            }),
            None => runtime.block_on(exchange),
        };

        match result {
            Ok(bytes) => decode_reply(&bytes)?.into_result(),
            Err(e) => {
                if e.is_transport() {
                    tracing::debug!(rpc = request.kind(), error = %e, "Dropping broken channel");
                    *stream = None;
                }
                Err(e)
            }
        }
    }

    /// Shut the channel down, waiting at most `timeout` for the peer to close
    /// its side before forcing it. Always leaves the manager without an open
    /// channel and never fails.
    pub fn release(&mut self, timeout: Duration) -> ReleaseOutcome {
        self.interrupted = false;
        let Some(Channel { runtime, stream }) = self.channel.take() else {
            return ReleaseOutcome::Idle;
        };

        let outcome = match stream {
            None => ReleaseOutcome::Idle,
            Some(mut stream) => {
                // The timer must be created inside the runtime
                let graceful = runtime.block_on(async {
                    tokio::time::timeout(timeout, async {
                        stream.shutdown().await?;
                        let mut sink = [0u8; 256];
                        while stream.read(&mut sink).await? > 0 {}
                        Ok::<(), std::io::Error>(())
                    })
                    .await
                });
                match graceful {
                    Ok(Ok(())) => ReleaseOutcome::Graceful,
                    Ok(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => {
                        tracing::error!(error = %e, "Interrupted while shutting down channel");
                        self.interrupted = true;
                        ReleaseOutcome::Interrupted
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Channel shutdown failed, forcing close");
                        ReleaseOutcome::Forced
                    }
                    Err(_) => {
                        tracing::warn!(?timeout, "Channel shutdown timed out, forcing close");
                        ReleaseOutcome::Forced
                    }
                }
                // stream dropped here: force close
            }
        };

        runtime.shutdown_timeout(timeout);
        tracing::debug!(?outcome, "Channel released");
        outcome
    }
}
