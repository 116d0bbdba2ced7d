use led_matrix::core::MatrixSession;
use led_matrix::term::{FrameBuffer, MatrixView, Rgb, StatusView, Viewport, OFF_LED, PANEL_BG};
use led_matrix::types::{Color, Geometry};

fn row_text(fb: &FrameBuffer, y: u16) -> String {
    (0..fb.width())
        .filter_map(|x| fb.get(x, y))
        .map(|c| c.ch)
        .collect()
}

#[test]
fn matrix_view_draws_colored_and_unlit_cells() {
    let mut session = MatrixSession::default();
    session.init_matrix(Geometry::new(2, 2, 10.0, 8.0));
    session
        .set_pixels(&[Color::new(255, 0, 0), Color::new(0, 255, 0)])
        .unwrap();

    let view = MatrixView::default();
    let fb = view.render(&session, None, Viewport::new(20, 6));

    let first = fb.get(1, 0).unwrap();
    assert_eq!(first.ch, '█');
    assert_eq!(first.style.fg, Rgb::new(255, 0, 0));
    assert_eq!(first.style.bg, PANEL_BG);

    let second = fb.get(4, 0).unwrap();
    assert_eq!(second.style.fg, Rgb::new(0, 255, 0));

    // Row 1 never got a frame entry.
    let last = fb.get(3, 2).unwrap();
    assert_eq!(last.ch, '█');
    assert_eq!(last.style.fg, OFF_LED);

    // Gap between cells stays blank.
    assert_eq!(fb.get(0, 0).unwrap().ch, ' ');
}

#[test]
fn matrix_view_clamps_out_of_range_channels() {
    let mut session = MatrixSession::default();
    session.init_matrix(Geometry::new(1, 1, 5.0, 5.0));
    session.set_pixels(&[Color::new(300, -5, 128)]).unwrap();

    let fb = MatrixView::default().render(&session, None, Viewport::new(8, 4));
    let lit = fb.cells().iter().find(|c| c.ch == '█').unwrap();
    assert_eq!(lit.style.fg, Rgb::new(255, 0, 128));
}

#[test]
fn matrix_view_status_line_tracks_session() {
    let status = StatusView {
        listen_addr: "127.0.0.1:7878",
    };
    let view = MatrixView::default();
    let viewport = Viewport::new(60, 10);

    let mut session = MatrixSession::default();
    let fb = view.render(&session, Some(&status), viewport);
    let text = row_text(&fb, 9);
    assert!(text.contains("waiting for init_matrix"), "{text}");
    assert!(text.contains("127.0.0.1:7878"), "{text}");

    session.init_matrix(Geometry::new(3, 2, 10.0, 8.0));
    session.set_pixels(&[Color::WHITE; 6]).unwrap();
    let fb = view.render(&session, Some(&status), viewport);
    let text = row_text(&fb, 9);
    assert!(text.contains("3x2"), "{text}");
    assert!(text.contains("frames 1"), "{text}");
    assert!(text.contains("lenient"), "{text}");
}

#[test]
fn matrix_view_never_draws_over_status_line() {
    let mut session = MatrixSession::default();
    session.init_matrix(Geometry::new(4, 40, 10.0, 8.0));

    let status = StatusView { listen_addr: "x" };
    let fb = MatrixView::default().render(&session, Some(&status), Viewport::new(30, 5));
    assert!(!row_text(&fb, 4).contains('█'));
    assert!(row_text(&fb, 3).contains('█'));
}

#[test]
fn matrix_view_stacks_surfaces_vertically() {
    let mut session = MatrixSession::default();
    session.init_matrix(Geometry::new(1, 1, 16.0, 8.0));
    session.init_matrix(Geometry::new(1, 1, 16.0, 8.0));
    session
        .set_pixels(&[Color::new(1, 2, 3), Color::new(4, 5, 6)])
        .unwrap();

    let fb = MatrixView::default().render(&session, None, Viewport::new(10, 10));
    let fgs: Vec<Rgb> = (0..fb.height())
        .filter_map(|y| fb.get(2, y).filter(|c| c.ch == '█'))
        .map(|c| c.style.fg)
        .collect();
    assert_eq!(fgs.first(), Some(&Rgb::new(1, 2, 3)));
    assert_eq!(fgs.last(), Some(&Rgb::new(4, 5, 6)));
}

#[test]
fn matrix_view_fits_default_panel_in_terminal() {
    let geometry = Geometry::default();
    let mut session = MatrixSession::default();
    session.init_matrix(geometry);
    let mut frame = vec![Color::BLACK; geometry.cell_count()];
    let last = frame.len() - 1;
    frame[last] = Color::new(0, 200, 255);
    session.set_pixels(&frame).unwrap();

    let status = StatusView { listen_addr: "x" };
    let viewport = Viewport::new(200, 50);
    let view = MatrixView::default();

    let fitted = view.fit_to(session.host(), Viewport::new(200, 49));
    let layout = session.host().surfaces()[0].layout();
    let rect = fitted.cell_rect(layout, last).unwrap();
    assert!(rect.x + rect.w <= 200, "{rect:?}");
    assert!(rect.y + rect.h <= 49, "{rect:?}");

    let fb = view.render(&session, Some(&status), viewport);
    let cell = fb.get(rect.x, rect.y).unwrap();
    assert_eq!(cell.ch, '█');
    assert_eq!(cell.style.fg, Rgb::new(0, 200, 255));
}

#[test]
fn matrix_view_survives_huge_geometry() {
    let status = StatusView { listen_addr: "x" };
    for geometry in [
        Geometry::new(2, 1, 1e20, 1e20),
        Geometry::new(2, 2, -1e20, 1e20),
        Geometry::new(3, 3, 1e300, 1.0),
    ] {
        let mut session = MatrixSession::default();
        session.init_matrix(geometry);
        session.set_pixels(&[Color::WHITE; 9]).unwrap();

        let fb = MatrixView::default().render(&session, Some(&status), Viewport::new(40, 12));
        assert_eq!(fb.width(), 40);
    }
}
