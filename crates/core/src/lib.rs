//! Core grid model - pure, deterministic, and testable
//!
//! This crate contains the grid geometry model and the frame-update contract.
//! It has **no dependencies** on terminals, networking, or I/O; the only side
//! channel is the `log` facade used for frame diagnostics.
//!
//! # Module Structure
//!
//! - [`grid`]: layout derivation, pixel cells, surfaces, and the host container
//! - [`frame`]: applying a flat color sequence to the live cells
//! - [`session`]: the Unbuilt/Built session and the two inbound messages
//! - [`pixels`]: driver-side normalization of row or flat pixel data
//!
//! # Contract
//!
//! - Cells are created once, in row-major order, and never re-created.
//! - Frame entry `i` always targets cell `i` (row `i / width`, column `i % width`).
//! - A frame shorter than the grid leaves the remaining cells stale; a longer
//!   frame has its extra entries ignored. Strict length checking is opt-in via
//!   [`FrameLengthPolicy::Strict`](crate::types::FrameLengthPolicy::Strict).
//!
//! # Example
//!
//! ```
//! use led_matrix_core::{MatrixMessage, MatrixSession};
//! use led_matrix_types::{Color, Geometry};
//!
//! let mut session = MatrixSession::default();
//! session.handle(&MatrixMessage::InitMatrix(Geometry::new(2, 2, 10.0, 8.0))).unwrap();
//! session
//!     .handle(&MatrixMessage::SetPixels(vec![
//!         Color::new(255, 0, 0),
//!         Color::new(0, 255, 0),
//!         Color::new(0, 0, 255),
//!         Color::new(255, 255, 255),
//!     ]))
//!     .unwrap();
//!
//! let colors: Vec<String> = session
//!     .host()
//!     .cells()
//!     .map(|c| c.color().unwrap().to_string())
//!     .collect();
//! assert_eq!(colors[0], "rgb(255, 0, 0)");
//! assert_eq!(colors[3], "rgb(255, 255, 255)");
//! ```

pub mod error;
pub mod frame;
pub mod grid;
pub mod pixels;
pub mod session;

pub use led_matrix_types as types;

pub use error::MatrixError;
pub use frame::{render_frame, FrameRenderer, FrameReport};
pub use grid::{build_grid, GridBuilder, GridLayout, Host, PixelCell, Surface};
pub use pixels::{normalize_pixels, PixelData};
pub use session::{Applied, MatrixMessage, MatrixSession, SessionState};
