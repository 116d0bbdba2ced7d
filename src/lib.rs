//! LED matrix emulator (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so binaries, integration
//! tests, and benches can use `led_matrix::{core,adapter,term,input,types}`.

pub use led_matrix_adapter as adapter;
pub use led_matrix_core as core;
pub use led_matrix_input as input;
pub use led_matrix_term as term;
pub use led_matrix_types as types;
