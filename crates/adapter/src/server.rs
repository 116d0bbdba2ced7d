//! TCP server for the matrix bridge
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking. Decoded messages are forwarded to the
//! rendering loop in arrival order; the server never touches the session.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{InboundCommand, OutboundMessage};
use crate::types::FrameLengthPolicy;

/// Longest accepted line, newline included. A 96x48 frame is about 64 KiB.
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frame_policy: FrameLengthPolicy,
    /// Lines longer than this get an error reply and the client is dropped.
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            frame_policy: FrameLengthPolicy::Lenient,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("LED_MATRIX_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("LED_MATRIX_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let frame_policy = env::var("LED_MATRIX_STRICT_FRAMES")
            .map(|s| FrameLengthPolicy::from_flag(&s))
            .unwrap_or(defaults.frame_policy);

        Self {
            host,
            port,
            frame_policy,
            max_line_bytes: defaults.max_line_bytes,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Check that `host:port` can be bound right now.
///
/// Lets the viewer fail before it takes over the terminal.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(drop)
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub tx: mpsc::UnboundedSender<Reply>,
}

/// Shared server state
#[derive(Default)]
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
}

impl ServerState {
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Register a client; returns how many are connected now.
    pub async fn register(&self, handle: ClientHandle) -> usize {
        let mut clients = self.clients.write().await;
        clients.push(handle);
        clients.len()
    }

    pub async fn remove(&self, client_id: usize) -> Option<ClientHandle> {
        let mut clients = self.clients.write().await;
        let pos = clients.iter().position(|c| c.id == client_id)?;
        Some(clients.remove(pos))
    }

    async fn send_to(&self, client_id: usize, reply: Reply) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(reply);
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::UnboundedSender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!("matrix bridge listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::default());
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                state.send_to(msg.client_id, msg.reply).await;
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let max_line_bytes = config.max_line_bytes;

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, state, command_tx, max_line_bytes).await
            {
                warn!("client {} error: {}", client_id, e);
            }
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::UnboundedSender<InboundCommand>,
    max_line_bytes: usize,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<Reply>();

    let connected = state
        .register(ClientHandle {
            id: client_id,
            addr,
            tx: tx.clone(),
        })
        .await;
    info!(
        "client {} connected from {} ({} connected)",
        client_id, addr, connected
    );

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(256);
        while let Some(reply) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &reply).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    let result: anyhow::Result<()> = loop {
        line.clear();
        let limit = max_line_bytes as u64;
        let bytes_read = match (&mut reader).take(limit).read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => break Err(e.into()),
        };
        if bytes_read == 0 {
            break Ok(());
        }
        if bytes_read as u64 >= limit && !line.ends_with('\n') {
            warn!(
                "client {} sent a line over {} bytes; closing",
                client_id, max_line_bytes
            );
            let seq = extract_seq_best_effort(&line).unwrap_or(0);
            let error = create_error(
                seq,
                ErrorCode::InvalidMessage,
                &format!("line exceeds {} bytes", max_line_bytes),
            );
            let _ = tx.send(Reply::Error(error));
            break Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Unknown(unknown)) => {
                warn!(
                    "client {} sent unknown message type {:?}",
                    client_id, unknown.msg_type
                );
                let error = create_error(
                    unknown.seq,
                    ErrorCode::InvalidMessage,
                    &format!("Unknown message type: {}", unknown.msg_type),
                );
                let _ = tx.send(Reply::Error(error));
            }
            Ok(parsed) => {
                let seq = parsed.seq();
                let Some(message) = parsed.into_matrix_message() else {
                    continue;
                };
                let inbound = InboundCommand {
                    client_id,
                    seq,
                    message,
                };
                if command_tx.send(inbound).is_err() {
                    // Rendering loop is gone.
                    break Ok(());
                }
            }
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                warn!("client {} sent malformed message: {}", client_id, e);
                let error = create_error(
                    seq,
                    ErrorCode::InvalidMessage,
                    &format!("JSON parse error: {}", e),
                );
                let _ = tx.send(Reply::Error(error));
            }
        }
    };

    match state.remove(client_id).await {
        Some(handle) => info!("client {} ({}) disconnected", client_id, handle.addr),
        None => info!("client {} disconnected", client_id),
    }

    drop(tx);
    let _ = write_task.await;

    result
}
