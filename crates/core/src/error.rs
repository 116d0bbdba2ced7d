use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("frame has {actual} entries but the grid has {expected} cells")]
    FrameLengthMismatch { expected: usize, actual: usize },
    #[error("pixels must be {height} rows or {width}x{height} flat entries, got {len}")]
    PixelShape {
        len: usize,
        width: usize,
        height: usize,
    },
}
