//! Terminal input module (viewer-facing).
//!
//! Maps `crossterm` key events into [`ViewerAction`]s. The matrix itself takes
//! no keyboard input; all pixel data arrives over the adapter.

pub mod map;

pub use map::{handle_key_event, should_quit, ViewerAction};
