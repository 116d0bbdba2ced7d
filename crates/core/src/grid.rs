//! Grid model: layout derivation, pixel cells, and the host container.
//!
//! [`GridBuilder`] turns a [`Geometry`] into a [`Surface`] and attaches it to a
//! [`Host`]. The host owns every surface that was ever built in the session, in
//! attach order, and exposes their cells as one ordered sequence.

use log::{debug, info, warn};

use crate::types::{Color, Geometry};

/// Layout of one surface, derived from its geometry.
///
/// All lengths are in px. `gap` may be negative (overlapping cells); it is
/// reported as-is and left to the display surface to interpret.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    pub cell_size: f64,
    pub gap: f64,
    pub padding: f64,
}

impl GridLayout {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let gap = geometry.gap();
        Self {
            columns: geometry.columns(),
            rows: geometry.rows(),
            cell_size: geometry.diameter,
            gap,
            padding: gap,
        }
    }

    /// Center-to-center spacing.
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.gap
    }

    pub fn cell_count(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }

    /// Row and column of a row-major ordinal.
    pub fn row_col(&self, ordinal: usize) -> (usize, usize) {
        if self.columns == 0 {
            return (0, 0);
        }
        (ordinal / self.columns, ordinal % self.columns)
    }

    /// Top-left corner of a cell, relative to the surface's outer edge.
    pub fn cell_origin(&self, ordinal: usize) -> (f64, f64) {
        let (row, col) = self.row_col(ordinal);
        let pitch = self.pitch();
        (
            self.padding + col as f64 * pitch,
            self.padding + row as f64 * pitch,
        )
    }

    /// Outer size of the surface including padding on all sides.
    pub fn extent(&self) -> (f64, f64) {
        (
            self.axis_extent(self.columns),
            self.axis_extent(self.rows),
        )
    }

    fn axis_extent(&self, n: usize) -> f64 {
        if n == 0 {
            return 2.0 * self.padding;
        }
        2.0 * self.padding + n as f64 * self.cell_size + (n - 1) as f64 * self.gap
    }
}

/// One independently colorable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCell {
    ordinal: usize,
    color: Option<Color>,
}

impl PixelCell {
    fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            color: None,
        }
    }

    /// Row-major position within the owning surface.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Current color; `None` until a frame has reached this cell.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }
}

/// A built grid: its layout plus its cells in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    geometry: Geometry,
    layout: GridLayout,
    cells: Vec<PixelCell>,
}

impl Surface {
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cells(&self) -> &[PixelCell] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&PixelCell> {
        if col >= self.layout.columns || row >= self.layout.rows {
            return None;
        }
        self.cells.get(row * self.layout.columns + col)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The single designated container surfaces are attached to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Host {
    surfaces: Vec<Surface>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a surface. Earlier surfaces are kept.
    pub fn attach(&mut self, surface: Surface) {
        self.surfaces.push(surface);
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Total number of live cells across all surfaces.
    pub fn cell_count(&self) -> usize {
        self.surfaces.iter().map(Surface::len).sum()
    }

    /// All live cells in document order.
    pub fn cells(&self) -> impl Iterator<Item = &PixelCell> {
        self.surfaces.iter().flat_map(|s| s.cells.iter())
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut PixelCell> {
        self.surfaces.iter_mut().flat_map(|s| s.cells.iter_mut())
    }
}

/// Materializes grids from geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBuilder;

impl GridBuilder {
    /// Build a detached surface with `width * height` uncolored cells.
    ///
    /// A grid too large to allocate degrades to an empty surface.
    pub fn build(geometry: Geometry) -> Surface {
        let mut layout = GridLayout::from_geometry(&geometry);
        let count = geometry.cell_count();
        let mut cells = Vec::new();
        match cells.try_reserve_exact(count) {
            Ok(()) => cells.extend((0..count).map(PixelCell::new)),
            Err(e) => {
                warn!(
                    "cannot allocate {}x{} grid ({}); building an empty surface",
                    geometry.width, geometry.height, e
                );
                layout.columns = 0;
                layout.rows = 0;
            }
        }
        debug!(
            "built surface: {}x{} cells, size {}px, gap {}px",
            layout.columns, layout.rows, layout.cell_size, layout.gap
        );
        Surface {
            geometry,
            layout,
            cells,
        }
    }
}

/// Build a grid and attach it to `host`.
///
/// Malformed geometry yields an empty surface rather than an error. Calling
/// this twice appends a second surface.
pub fn build_grid(host: &mut Host, geometry: Geometry) {
    let surface = GridBuilder::build(geometry);
    info!(
        "init_matrix {}x{} pitch={} diameter={} ({} cells)",
        geometry.width,
        geometry.height,
        geometry.pitch,
        geometry.diameter,
        surface.len()
    );
    host.attach(surface);
}
