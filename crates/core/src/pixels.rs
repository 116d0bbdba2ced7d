//! Driver-side pixel normalization.
//!
//! Drivers may hand over either one list per row or a single flat list. Both
//! are flattened into the row-major frame the renderer expects before they
//! cross the wire.

use crate::error::MatrixError;
use crate::types::Color;

/// Pixel data as produced by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    /// One entry per row, top to bottom.
    Rows(Vec<Vec<Color>>),
    /// Row-major flat list.
    Flat(Vec<Color>),
}

impl From<Vec<Vec<Color>>> for PixelData {
    fn from(value: Vec<Vec<Color>>) -> Self {
        PixelData::Rows(value)
    }
}

impl From<Vec<Color>> for PixelData {
    fn from(value: Vec<Color>) -> Self {
        PixelData::Flat(value)
    }
}

/// Flatten driver pixel data into a frame for a `width x height` grid.
///
/// Row data is accepted when it has exactly `height` rows; rows are
/// concatenated as given. Flat data is accepted when it has exactly
/// `width * height` entries. Anything else is a [`MatrixError::PixelShape`].
pub fn normalize_pixels(
    data: PixelData,
    width: usize,
    height: usize,
) -> Result<Vec<Color>, MatrixError> {
    match data {
        PixelData::Rows(rows) if rows.len() == height => {
            Ok(rows.into_iter().flatten().collect())
        }
        PixelData::Flat(flat) if flat.len() == width * height => Ok(flat),
        PixelData::Rows(rows) => Err(MatrixError::PixelShape {
            len: rows.len(),
            width,
            height,
        }),
        PixelData::Flat(flat) => Err(MatrixError::PixelShape {
            len: flat.len(),
            width,
            height,
        }),
    }
}
