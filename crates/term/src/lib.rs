//! Terminal display surface for the LED matrix.
//!
//! This is a small rendering layer: the session's surfaces are rasterized into
//! a framebuffer of colored character cells, which is then flushed to the
//! terminal as a diff against the previous frame.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Keep the px-to-character scaling in one pure function ([`MatrixView::cell_rect`])
//! - Only write the cells that changed, so large grids stay cheap to redraw

pub mod fb;
pub mod matrix_view;
pub mod renderer;

pub use led_matrix_core as core;
pub use led_matrix_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use matrix_view::{CharRect, MatrixView, StatusView, Viewport, OFF_LED, PANEL_BG};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
