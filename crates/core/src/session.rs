//! Rendering session: owns the host and dispatches the two inbound messages.

use log::warn;

use crate::error::MatrixError;
use crate::frame::{FrameRenderer, FrameReport};
use crate::grid::{build_grid, Host};
use crate::types::{Color, FrameLengthPolicy, Geometry};

/// Transport-independent inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixMessage {
    InitMatrix(Geometry),
    SetPixels(Vec<Color>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No grid yet; frames are no-ops.
    Unbuilt,
    /// At least one grid has been built.
    Built,
}

/// What a handled message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Grid { cells: usize },
    Frame(FrameReport),
    /// Frame arrived before any grid existed.
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct MatrixSession {
    host: Host,
    renderer: FrameRenderer,
    frames_rendered: u64,
}

impl MatrixSession {
    pub fn new(policy: FrameLengthPolicy) -> Self {
        Self {
            host: Host::new(),
            renderer: FrameRenderer::new(policy),
            frames_rendered: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.host.surfaces().is_empty() {
            SessionState::Unbuilt
        } else {
            SessionState::Built
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn policy(&self) -> FrameLengthPolicy {
        self.renderer.policy()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Geometry of the most recently built grid.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.host.surfaces().last().map(|s| s.geometry())
    }

    pub fn init_matrix(&mut self, geometry: Geometry) -> usize {
        if self.state() == SessionState::Built {
            warn!("init_matrix called again; appending a second grid");
        }
        build_grid(&mut self.host, geometry);
        self.host.surfaces().last().map_or(0, |s| s.len())
    }

    pub fn set_pixels(&mut self, frame: &[Color]) -> Result<Applied, MatrixError> {
        if self.state() == SessionState::Unbuilt {
            return Ok(Applied::Skipped);
        }
        let report = self.renderer.render(&mut self.host, frame)?;
        self.frames_rendered += 1;
        Ok(Applied::Frame(report))
    }

    pub fn handle(&mut self, message: &MatrixMessage) -> Result<Applied, MatrixError> {
        match message {
            MatrixMessage::InitMatrix(geometry) => Ok(Applied::Grid {
                cells: self.init_matrix(*geometry),
            }),
            MatrixMessage::SetPixels(frame) => self.set_pixels(frame),
        }
    }
}
