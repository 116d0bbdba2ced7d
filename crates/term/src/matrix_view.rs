//! MatrixView: maps the session's surfaces into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Grid geometry is expressed in px. The view scales px to character cells
//! with separate horizontal and vertical factors so that round LEDs stay
//! roughly square on a terminal whose glyphs are about twice as tall as wide.
//! The configured factors are the closest zoom; when the surfaces do not fit
//! the viewport, both factors grow by the same ratio until they do.

use crate::core::{GridLayout, Host, MatrixSession, SessionState, Surface};
use crate::fb::{CellStyle, FrameBuffer, Rgb};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Extra context shown on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView<'a> {
    pub listen_addr: &'a str,
}

/// Color of a cell that has not received a frame yet.
pub const OFF_LED: Rgb = Rgb::new(40, 40, 40);

/// Background behind and between cells.
pub const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

const LED_GLYPH: char = '█';

/// A cell's footprint in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixView {
    /// px covered by one terminal column.
    px_per_col: f64,
    /// px covered by one terminal row.
    px_per_row: f64,
}

impl Default for MatrixView {
    fn default() -> Self {
        Self {
            px_per_col: 4.0,
            px_per_row: 8.0,
        }
    }
}

impl MatrixView {
    pub fn new(px_per_col: f64, px_per_row: f64) -> Self {
        Self {
            px_per_col,
            px_per_row,
        }
    }

    /// Render the session into an existing framebuffer.
    ///
    /// Surfaces are stacked top to bottom in attach order. When `status` is
    /// given, the last row is reserved for a status line.
    pub fn render_into(
        &self,
        session: &MatrixSession,
        status: Option<&StatusView<'_>>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG).into_cell(' '));

        let matrix_rows = match status {
            Some(_) => viewport.height.saturating_sub(1),
            None => viewport.height,
        };

        let view = self.fit_to(session.host(), Viewport::new(viewport.width, matrix_rows));
        let mut origin_y: i64 = 0;
        for surface in session.host().surfaces() {
            if origin_y >= matrix_rows as i64 {
                break;
            }
            view.draw_surface(fb, surface, origin_y, matrix_rows);
            let (_, extent_h) = surface.layout().extent();
            origin_y = origin_y.saturating_add(view.rows_for(extent_h).max(0));
        }

        if let Some(status) = status {
            self.draw_status(fb, session, status, viewport);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        session: &MatrixSession,
        status: Option<&StatusView<'_>>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(session, status, viewport, &mut fb);
        fb
    }

    /// The view actually used for `host` in `area`.
    ///
    /// Keeps this view's scale when the stacked surfaces already fit, otherwise
    /// zooms out uniformly so the widest surface and the total height fit.
    pub fn fit_to(&self, host: &Host, area: Viewport) -> MatrixView {
        let (mut width_px, mut height_px) = (0.0_f64, 0.0_f64);
        for surface in host.surfaces() {
            let (w, h) = surface.layout().extent();
            width_px = width_px.max(w);
            height_px += h.max(0.0);
        }

        let zoom = (width_px / (area.width as f64 * self.px_per_col))
            .max(height_px / (area.height as f64 * self.px_per_row))
            .max(1.0);
        if !zoom.is_finite() {
            return *self;
        }
        MatrixView::new(self.px_per_col * zoom, self.px_per_row * zoom)
    }

    /// Character footprint of a cell relative to its surface's top-left.
    ///
    /// Positions are scaled and rounded independently of sizes so spacing
    /// stays even across the grid. Every cell is at least one character.
    /// Returns `None` when the cell lies entirely left of or above the origin.
    pub fn cell_rect(&self, layout: &GridLayout, ordinal: usize) -> Option<CharRect> {
        let (px, py) = layout.cell_origin(ordinal);
        let x = self.cols_for(px);
        let y = self.rows_for(py);
        let w = self.cols_for(layout.cell_size).max(1);
        let h = self.rows_for(layout.cell_size).max(1);
        let (x, w) = clip_span(x, w)?;
        let (y, h) = clip_span(y, h)?;
        Some(CharRect { x, y, w, h })
    }

    fn cols_for(&self, px: f64) -> i64 {
        (px / self.px_per_col).round() as i64
    }

    fn rows_for(&self, px: f64) -> i64 {
        (px / self.px_per_row).round() as i64
    }

    fn draw_surface(&self, fb: &mut FrameBuffer, surface: &Surface, origin_y: i64, max_rows: u16) {
        let layout = surface.layout();
        for cell in surface.cells() {
            let Some(rect) = self.cell_rect(layout, cell.ordinal()) else {
                continue;
            };
            let y = origin_y.saturating_add(rect.y as i64);
            if y >= max_rows as i64 {
                continue;
            }
            let h = rect.h.min((max_rows as i64 - y) as u16);
            let fg = cell.color().map(Rgb::from).unwrap_or(OFF_LED);
            fb.fill_rect(
                rect.x,
                y as u16,
                rect.w,
                h,
                LED_GLYPH,
                CellStyle::new(fg, PANEL_BG),
            );
        }
    }

    fn draw_status(
        &self,
        fb: &mut FrameBuffer,
        session: &MatrixSession,
        status: &StatusView<'_>,
        viewport: Viewport,
    ) {
        if viewport.height == 0 {
            return;
        }
        let y = viewport.height - 1;
        let style = CellStyle::new(Rgb::new(20, 20, 20), Rgb::new(170, 170, 170));
        fb.fill_rect(0, y, viewport.width, 1, ' ', style);

        let text = match (session.state(), session.geometry()) {
            (SessionState::Built, Some(g)) => format!(
                " {}x{}  frames {}  {}  {}",
                g.width,
                g.height,
                session.frames_rendered(),
                session.policy().as_str(),
                status.listen_addr
            ),
            _ => format!(" waiting for init_matrix  {}", status.listen_addr),
        };
        fb.put_str(0, y, &text, style);
    }
}

/// Clip a span that may start at a negative offset to the visible range.
fn clip_span(start: i64, len: i64) -> Option<(u16, u16)> {
    let end = start.saturating_add(len);
    if end <= 0 {
        return None;
    }
    let start = start.max(0);
    let start_u = u16::try_from(start).ok()?;
    let len_u = u16::try_from(end - start).unwrap_or(u16::MAX);
    Some((start_u, len_u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridBuilder;
    use crate::types::Geometry;

    #[test]
    fn default_scale_places_cells_on_rounded_origins() {
        let layout = *GridBuilder::build(Geometry::new(2, 2, 10.0, 8.0)).layout();
        let view = MatrixView::default();
        assert_eq!(
            view.cell_rect(&layout, 0),
            Some(CharRect { x: 1, y: 0, w: 2, h: 1 })
        );
        assert_eq!(
            view.cell_rect(&layout, 3),
            Some(CharRect { x: 3, y: 2, w: 2, h: 1 })
        );
    }

    #[test]
    fn negative_padding_clips_first_cell() {
        // gap = -2: padding pulls the first cell 2px past the edge.
        let layout = *GridBuilder::build(Geometry::new(2, 1, 4.0, 6.0)).layout();
        let view = MatrixView::new(1.0, 1.0);
        assert_eq!(
            view.cell_rect(&layout, 0),
            Some(CharRect { x: 0, y: 0, w: 4, h: 4 })
        );
        assert_eq!(
            view.cell_rect(&layout, 1),
            Some(CharRect { x: 2, y: 0, w: 6, h: 4 })
        );
    }

    #[test]
    fn clip_span_drops_fully_hidden_spans() {
        assert_eq!(clip_span(-3, 2), None);
        assert_eq!(clip_span(-1, 3), Some((0, 2)));
        assert_eq!(clip_span(5, 1), Some((5, 1)));
    }

    #[test]
    fn clip_span_saturates_huge_offsets() {
        assert_eq!(clip_span(i64::MAX, i64::MAX), None);
        assert_eq!(clip_span(i64::MIN, i64::MAX), None);
        assert_eq!(clip_span(-1, i64::MAX), Some((0, u16::MAX)));
    }

    #[test]
    fn huge_pitch_cells_fall_off_screen() {
        let layout = *GridBuilder::build(Geometry::new(2, 1, 1e20, 1e20)).layout();
        let view = MatrixView::default();
        assert_eq!(view.cell_rect(&layout, 1), None);
    }

    #[test]
    fn fit_keeps_scale_when_grid_fits() {
        let mut host = Host::new();
        crate::core::build_grid(&mut host, Geometry::new(2, 2, 10.0, 8.0));
        let view = MatrixView::default();
        assert_eq!(view.fit_to(&host, Viewport::new(80, 24)), view);
        assert_eq!(view.fit_to(&Host::new(), Viewport::new(0, 0)), view);
    }

    #[test]
    fn fit_zooms_out_keeping_aspect() {
        let mut host = Host::new();
        crate::core::build_grid(&mut host, Geometry::default());
        let fitted = MatrixView::default().fit_to(&host, Viewport::new(200, 49));
        assert!(fitted.px_per_col > 4.0);
        assert!((fitted.px_per_row / fitted.px_per_col - 2.0).abs() < 1e-9);
    }
}
