//! Frame application: maps a flat color sequence onto the live cells.

use log::{debug, log_enabled, trace, Level};

use crate::error::MatrixError;
use crate::grid::Host;
use crate::types::{Color, FrameLengthPolicy};

/// Outcome of applying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Cells that received a new color.
    pub applied: usize,
    /// Frame entries past the last live cell.
    pub ignored: usize,
    /// Live cells past the end of the frame; they keep their previous color.
    pub stale: usize,
}

impl FrameReport {
    pub fn for_lengths(frame_len: usize, cell_count: usize) -> Self {
        let applied = frame_len.min(cell_count);
        Self {
            applied,
            ignored: frame_len - applied,
            stale: cell_count - applied,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.ignored == 0 && self.stale == 0
    }
}

/// Applies frames to a host under a length policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRenderer {
    policy: FrameLengthPolicy,
}

impl FrameRenderer {
    pub fn new(policy: FrameLengthPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FrameLengthPolicy {
        self.policy
    }

    pub fn render(&self, host: &mut Host, frame: &[Color]) -> Result<FrameReport, MatrixError> {
        render_frame(host, frame, self.policy)
    }
}

/// Set cell `i` to `frame[i]` for every ordinal both sides have.
///
/// Cells are taken from the host at call time in document order. Under
/// [`FrameLengthPolicy::Strict`] a length mismatch is rejected before any
/// cell is touched.
pub fn render_frame(
    host: &mut Host,
    frame: &[Color],
    policy: FrameLengthPolicy,
) -> Result<FrameReport, MatrixError> {
    let cell_count = host.cell_count();
    let report = FrameReport::for_lengths(frame.len(), cell_count);

    debug!(
        "set_pixels: {} entries, {} applied, {} ignored, {} stale",
        frame.len(),
        report.applied,
        report.ignored,
        report.stale
    );
    if log_enabled!(Level::Trace) {
        trace!("set_pixels data: {:?}", frame);
    }

    if policy == FrameLengthPolicy::Strict && !report.is_exact() {
        return Err(MatrixError::FrameLengthMismatch {
            expected: cell_count,
            actual: frame.len(),
        });
    }

    for (cell, &color) in host.cells_mut().zip(frame.iter()) {
        cell.set_color(color);
    }

    Ok(report)
}
