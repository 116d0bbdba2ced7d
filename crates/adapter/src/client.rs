//! Driver-side client for the matrix bridge.
//!
//! Wraps the protocol for processes that compute pixel data: build the grid
//! once, then stream frames. Frames are fire-and-forget; error replies are
//! logged by a background reader.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::warn;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::{normalize_pixels, PixelData};
use crate::protocol::{create_init_matrix, create_set_pixels, parse_reply, AckMessage, Reply};
use crate::types::{Color, Geometry};

/// How long `init_matrix` waits for the viewer to confirm the grid.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MatrixClient {
    writer: OwnedWriteHalf,
    acks: mpsc::UnboundedReceiver<AckMessage>,
    reader: JoinHandle<()>,
    seq: u64,
    geometry: Option<Geometry>,
    buf: Vec<u8>,
}

impl MatrixClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .context("failed to connect to matrix viewer")?;
        stream.set_nodelay(true)?;
        let (read_half, writer) = stream.into_split();

        let (ack_tx, acks) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_reply(&line) {
                    Ok(Reply::Ack(ack)) => {
                        let _ = ack_tx.send(ack);
                    }
                    Ok(Reply::Error(err)) => {
                        warn!(
                            "viewer rejected seq {}: {:?} {}",
                            err.seq, err.code, err.message
                        );
                    }
                    Err(e) => warn!("unreadable reply from viewer: {}", e),
                }
            }
        });

        Ok(Self {
            writer,
            acks,
            reader,
            seq: 0,
            geometry: None,
            buf: Vec::with_capacity(64 * 1024),
        })
    }

    /// Geometry sent by the last successful `init_matrix`.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Build the grid and wait until the viewer has applied it.
    pub async fn init_matrix(&mut self, geometry: Geometry) -> Result<()> {
        let seq = self.next_seq();
        self.write_line(&create_init_matrix(seq, geometry)).await?;

        let acked = tokio::time::timeout(ACK_TIMEOUT, async {
            while let Some(ack) = self.acks.recv().await {
                if ack.seq == seq {
                    return true;
                }
            }
            false
        })
        .await
        .context("timed out waiting for init_matrix ack")?;
        if !acked {
            bail!("viewer closed the connection before acknowledging init_matrix");
        }

        self.geometry = Some(geometry);
        Ok(())
    }

    /// Send one frame given as rows or as a flat row-major list.
    pub async fn set_pixels(&mut self, pixels: impl Into<PixelData>) -> Result<()> {
        let Some(geometry) = self.geometry else {
            bail!("init_matrix must succeed before set_pixels");
        };
        let frame = normalize_pixels(pixels.into(), geometry.columns(), geometry.rows())?;
        self.send_frame(&frame).await
    }

    /// Send a frame as-is, without shape checks.
    pub async fn send_frame(&mut self, frame: &[Color]) -> Result<()> {
        let seq = self.next_seq();
        self.write_line(&create_set_pixels(seq, frame)).await
    }

    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        self.reader.abort();
        Ok(())
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    async fn write_line<T: serde::Serialize>(&mut self, msg: &T) -> Result<()> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, msg)?;
        self.buf.push(b'\n');
        self.writer
            .write_all(&self.buf)
            .await
            .context("failed to write to matrix viewer")?;
        Ok(())
    }
}

impl Drop for MatrixClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
