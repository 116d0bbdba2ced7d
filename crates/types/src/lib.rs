//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the emulator.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (grid model, terminal rendering, wire protocol).
//!
//! # Geometry
//!
//! A matrix is described by four numbers:
//!
//! | Field | Unit | Description |
//! |-------|------|-------------|
//! | `width` | cells | Number of columns |
//! | `height` | cells | Number of rows |
//! | `pitch` | px | Center-to-center spacing of adjacent cells |
//! | `diameter` | px | Visual size of one cell |
//!
//! The derived `gap` (`pitch - diameter`) is used both between cells and as the
//! outer padding of the grid.
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 96 | Columns of the reference panel |
//! | `DEFAULT_HEIGHT` | 48 | Rows of the reference panel |
//! | `DEFAULT_PITCH` | 12.7 | LED pitch in px |
//! | `DEFAULT_DIAMETER` | 7.7 | LED diameter in px |
//! | `DEFAULT_FRAME_RATE` | 30 | Playback rate of the demo feed |
//!
//! # Examples
//!
//! ```
//! use led_matrix_types::{Color, Geometry};
//!
//! let geometry = Geometry::new(2, 2, 10.0, 8.0);
//! assert_eq!(geometry.gap(), 2.0);
//! assert_eq!(geometry.cell_count(), 4);
//! assert_eq!(geometry.row_col(3), (1, 1));
//!
//! let color = Color::new(10, 20, 30);
//! assert_eq!(color.to_string(), "rgb(10, 20, 30)");
//! ```

use std::fmt;

/// Columns of the reference panel.
pub const DEFAULT_WIDTH: i32 = 96;

/// Rows of the reference panel.
pub const DEFAULT_HEIGHT: i32 = 48;

/// LED pitch in px (center-to-center).
pub const DEFAULT_PITCH: f64 = 12.7;

/// LED diameter in px.
pub const DEFAULT_DIAMETER: f64 = 7.7;

/// Playback rate of the demo feed (frames per second).
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// An RGB triple as delivered by the driving process.
///
/// Channels are expected in `[0, 255]` but are stored verbatim: no clamping or
/// validation happens here. Surfaces that cannot represent out-of-range values
/// clamp at their own boundary (see [`Color::to_rgb8`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    pub const fn from_triple(triple: [i32; 3]) -> Self {
        Self::new(triple[0], triple[1], triple[2])
    }

    pub const fn to_triple(self) -> [i32; 3] {
        [self.r, self.g, self.b]
    }

    /// Saturate each channel into `u8`.
    ///
    /// ```
    /// use led_matrix_types::Color;
    ///
    /// assert_eq!(Color::new(300, -5, 128).to_rgb8(), (255, 0, 128));
    /// ```
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (
            self.r.clamp(0, 255) as u8,
            self.g.clamp(0, 255) as u8,
            self.b.clamp(0, 255) as u8,
        )
    }
}

impl From<[i32; 3]> for Color {
    fn from(value: [i32; 3]) -> Self {
        Self::from_triple(value)
    }
}

/// Standard decimal RGB color expression, e.g. `rgb(255, 0, 0)`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Grid geometry as passed to `init_matrix`.
///
/// No constraint is enforced: zero or negative dimensions describe an empty
/// grid, and `pitch < diameter` describes overlapping cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub pitch: f64,
    pub diameter: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pitch: DEFAULT_PITCH,
            diameter: DEFAULT_DIAMETER,
        }
    }
}

impl Geometry {
    pub const fn new(width: i32, height: i32, pitch: f64, diameter: f64) -> Self {
        Self {
            width,
            height,
            pitch,
            diameter,
        }
    }

    /// Spacing between adjacent cell edges; also the outer padding.
    pub fn gap(&self) -> f64 {
        self.pitch - self.diameter
    }

    /// Number of columns, 0 for a non-positive width.
    pub fn columns(&self) -> usize {
        self.width.max(0) as usize
    }

    /// Number of rows, 0 for a non-positive height.
    pub fn rows(&self) -> usize {
        self.height.max(0) as usize
    }

    /// `width * height`, or 0 when either dimension is not positive.
    pub fn cell_count(&self) -> usize {
        self.columns().saturating_mul(self.rows())
    }

    /// Row and column of a row-major ordinal.
    ///
    /// Returns `(0, 0)` for a grid without columns.
    pub fn row_col(&self, ordinal: usize) -> (usize, usize) {
        let cols = self.columns();
        if cols == 0 {
            return (0, 0);
        }
        (ordinal / cols, ordinal % cols)
    }
}

/// How a frame whose length differs from the live cell count is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLengthPolicy {
    /// Update the overlapping prefix; keep stale cells, drop extra entries.
    #[default]
    Lenient,
    /// Reject the frame without touching any cell.
    Strict,
}

impl FrameLengthPolicy {
    /// Parse a boolean-ish flag (`"1"`, `"true"`, `"strict"`) into a policy.
    ///
    /// ```
    /// use led_matrix_types::FrameLengthPolicy;
    ///
    /// assert_eq!(FrameLengthPolicy::from_flag("1"), FrameLengthPolicy::Strict);
    /// assert_eq!(FrameLengthPolicy::from_flag("TRUE"), FrameLengthPolicy::Strict);
    /// assert_eq!(FrameLengthPolicy::from_flag("0"), FrameLengthPolicy::Lenient);
    /// ```
    pub fn from_flag(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "1" | "true" | "strict" | "yes" => FrameLengthPolicy::Strict,
            _ => FrameLengthPolicy::Lenient,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameLengthPolicy::Lenient => "lenient",
            FrameLengthPolicy::Strict => "strict",
        }
    }
}
