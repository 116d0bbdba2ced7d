//! Grid construction tests: cell counts, layout, and ordinal mapping.

use led_matrix::core::{build_grid, GridBuilder, Host, MatrixSession, SessionState};
use led_matrix::types::Geometry;

#[test]
fn test_cell_count_and_layout_for_many_sizes() {
    for w in 1..=7 {
        for h in 1..=5 {
            for &(pitch, diameter) in &[(10.0, 8.0), (12.7, 7.7), (5.0, 5.0)] {
                let surface = GridBuilder::build(Geometry::new(w, h, pitch, diameter));
                let layout = surface.layout();

                assert_eq!(surface.len(), (w * h) as usize);
                assert_eq!(layout.columns, w as usize);
                assert_eq!(layout.rows, h as usize);
                assert_eq!(layout.cell_size, diameter);
                assert_eq!(layout.gap, pitch - diameter);
                assert_eq!(layout.padding, pitch - diameter);
            }
        }
    }
}

#[test]
fn test_ordinal_maps_to_row_and_column() {
    let (w, h) = (5, 3);
    let surface = GridBuilder::build(Geometry::new(w, h, 10.0, 8.0));
    for row in 0..h as usize {
        for col in 0..w as usize {
            let cell = surface.cell(row, col).unwrap();
            let i = cell.ordinal();
            assert_eq!(i, row * w as usize + col);
            assert_eq!(surface.layout().row_col(i), (i / w as usize, i % w as usize));
        }
    }
}

#[test]
fn test_two_by_two_scenario() {
    let mut host = Host::new();
    build_grid(&mut host, Geometry::new(2, 2, 10.0, 8.0));

    let surface = &host.surfaces()[0];
    assert_eq!(surface.layout().gap, 2.0);
    assert_eq!(surface.len(), 4);
    let ordinals: Vec<_> = surface.cells().iter().map(|c| c.ordinal()).collect();
    assert_eq!(ordinals, vec![0, 1, 2, 3]);
}

#[test]
fn test_single_cell_has_zero_gap() {
    let surface = GridBuilder::build(Geometry::new(1, 1, 5.0, 5.0));
    assert_eq!(surface.layout().gap, 0.0);
    assert_eq!(surface.layout().extent(), (5.0, 5.0));
    assert_eq!(surface.len(), 1);
}

#[test]
fn test_outer_padding_matches_inter_cell_gap() {
    let layout = *GridBuilder::build(Geometry::new(3, 2, 12.0, 8.0)).layout();
    let (x0, y0) = layout.cell_origin(0);
    let (x1, _) = layout.cell_origin(1);
    let (ext_w, ext_h) = layout.extent();

    assert_eq!((x0, y0), (4.0, 4.0));
    assert_eq!(x1 - (x0 + layout.cell_size), 4.0);
    let (x_last, y_last) = layout.cell_origin(5);
    assert_eq!(ext_w - (x_last + layout.cell_size), 4.0);
    assert_eq!(ext_h - (y_last + layout.cell_size), 4.0);
}

#[test]
fn test_degenerate_inputs_build_empty_grids() {
    let mut session = MatrixSession::default();
    session.init_matrix(Geometry::new(0, 10, 10.0, 8.0));
    session.init_matrix(Geometry::new(-3, 4, 10.0, 8.0));

    assert_eq!(session.state(), SessionState::Built);
    assert_eq!(session.host().surfaces().len(), 2);
    assert_eq!(session.host().cell_count(), 0);
}

#[test]
fn test_overlapping_geometry_is_not_rejected() {
    let surface = GridBuilder::build(Geometry::new(2, 2, 6.0, 8.0));
    assert_eq!(surface.len(), 4);
    assert_eq!(surface.layout().gap, -2.0);
}

#[test]
fn test_unallocatable_grid_degrades_to_empty() {
    let mut session = MatrixSession::default();
    let cells = session.init_matrix(Geometry::new(i32::MAX, i32::MAX, 10.0, 8.0));

    assert_eq!(cells, 0);
    assert_eq!(session.state(), SessionState::Built);
    assert_eq!(session.host().cell_count(), 0);
    assert!(session.set_pixels(&[led_matrix::types::Color::WHITE]).is_ok());
}
