//! Adapter module - external control via TCP socket with JSON protocol
//!
//! This module lets the process that computes pixel values drive the viewer
//! over a TCP socket. It replaces an in-process function call with a narrow
//! message interface, so the rendering core never depends on the transport.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Driver connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Grid**: Driver sends `init_matrix`; the viewer builds the grid and acks
//! 3. **Frames**: Driver streams `set_pixels`, one full frame per line
//!
//! # Message Types
//!
//! ## Driver → Viewer
//!
//! - **init_matrix**: `width`, `height`, `pitch`, `diameter`
//! - **set_pixels**: `data`, a row-major list of `[r, g, b]` triples
//!
//! ## Viewer → Driver
//!
//! - **ack**: the `init_matrix` with this `seq` has been applied
//! - **error**: malformed line, unknown type, or a rejected frame
//!
//! Successful frames produce no reply.
//!
//! # Environment Variables
//!
//! - `LED_MATRIX_HOST`: Bind address (default: "127.0.0.1")
//! - `LED_MATRIX_PORT`: Port number (default: 7878)
//! - `LED_MATRIX_STRICT_FRAMES`: Set to "1" or "true" to reject frames whose
//!   length differs from the grid's cell count
//!
//! # Example Protocol Flow
//!
//! ```text
//! Driver -> Viewer: {"type":"init_matrix","seq":1,"width":2,"height":2,"pitch":10,"diameter":8}
//! Viewer -> Driver: {"type":"ack","seq":1,"ts":1234567890,"status":"ok"}
//! Driver -> Viewer: {"type":"set_pixels","seq":2,"data":[[255,0,0],[0,255,0],[0,0,255],[255,255,255]]}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking
//! - Multiple drivers may connect; their messages are applied in arrival order
//! - See [`protocol`] for message structure definitions
//! - See [`server`] for the TCP server, [`runtime`] for the sync bridge,
//!   and [`client`] for the driver side
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"init_matrix","seq":1,"width":1,"height":1,"pitch":5,"diameter":5}
//! {"type":"set_pixels","seq":2,"data":[[10,20,30]]}
//! ```

pub mod client;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use led_matrix_core as core;
pub use led_matrix_types as types;

pub use client::MatrixClient;
pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, OutboundMessage, PendingReport};
pub use server::*;
