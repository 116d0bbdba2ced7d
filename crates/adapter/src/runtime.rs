//! Adapter runtime integration.
//!
//! Bridges the sync rendering loop with the async TCP server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{error, warn};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::core::{Applied, MatrixError, MatrixMessage, MatrixSession};
use crate::protocol::{create_ack, create_error, ErrorCode, Reply};
use crate::server::{run_server, ServerConfig};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Message delivered to the rendering loop.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub message: MatrixMessage,
}

/// Reply to be delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub client_id: usize,
    pub reply: Reply,
}

/// What one [`Adapter::apply_pending`] pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingReport {
    /// Messages taken off the bridge.
    pub handled: usize,
    /// Whether any of them changed what is on screen.
    pub redraw: bool,
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::UnboundedReceiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: SocketAddr,
}

impl Adapter {
    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<InboundCommand>();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let listen_addr = config.listen_addr();
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                error!("matrix bridge stopped: {:#}", e);
            }
        });

        let local_addr = rt
            .block_on(async { tokio::time::timeout(STARTUP_TIMEOUT, ready_rx).await })
            .with_context(|| format!("timed out binding {}", listen_addr))?
            .map_err(|_| anyhow!("matrix bridge failed to listen on {}", listen_addr))?;

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Apply every message that has arrived, in order, and send the replies.
    ///
    /// A built grid is acked only after it is attached; a rejected frame gets
    /// an error reply. Frames that were applied or skipped get no reply.
    pub fn apply_pending(&mut self, session: &mut MatrixSession) -> PendingReport {
        let mut report = PendingReport::default();
        while let Some(cmd) = self.try_recv() {
            report.handled += 1;
            match session.handle(&cmd.message) {
                Ok(Applied::Grid { .. }) => {
                    self.ack(cmd.client_id, cmd.seq);
                    report.redraw = true;
                }
                Ok(Applied::Frame(_)) => report.redraw = true,
                Ok(Applied::Skipped) => {}
                Err(e) => {
                    warn!("client {} seq {}: {}", cmd.client_id, cmd.seq, e);
                    self.reject(cmd.client_id, cmd.seq, &e);
                }
            }
        }
        report
    }

    pub fn ack(&self, client_id: usize, seq: u64) {
        self.send(OutboundMessage {
            client_id,
            reply: Reply::Ack(create_ack(seq)),
        });
    }

    pub fn reject(&self, client_id: usize, seq: u64, err: &MatrixError) {
        let code = match err {
            MatrixError::FrameLengthMismatch { .. } => ErrorCode::FrameLengthMismatch,
            MatrixError::PixelShape { .. } => ErrorCode::InvalidMessage,
        };
        self.send(OutboundMessage {
            client_id,
            reply: Reply::Error(create_error(seq, code, &err.to_string())),
        });
    }
}
