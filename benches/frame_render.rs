use criterion::{black_box, criterion_group, criterion_main, Criterion};
use led_matrix::core::{render_frame, Host, MatrixSession};
use led_matrix::term::{encode_diff_into, FrameBuffer, MatrixView, StatusView, Viewport};
use led_matrix::types::{Color, FrameLengthPolicy, Geometry};

fn full_frame(geometry: &Geometry, shift: i32) -> Vec<Color> {
    (0..geometry.cell_count() as i32)
        .map(|i| Color::new((i + shift) % 256, (i * 3) % 256, 255 - i % 256))
        .collect()
}

fn bench_render_frame(c: &mut Criterion) {
    let geometry = Geometry::default();
    let mut host = Host::new();
    led_matrix::core::build_grid(&mut host, geometry);
    let frame = full_frame(&geometry, 0);

    c.bench_function("render_frame_96x48", |b| {
        b.iter(|| {
            render_frame(&mut host, black_box(&frame), FrameLengthPolicy::Lenient).unwrap();
        })
    });
}

fn bench_short_frame(c: &mut Criterion) {
    let geometry = Geometry::default();
    let mut host = Host::new();
    led_matrix::core::build_grid(&mut host, geometry);
    let frame = full_frame(&geometry, 0);
    let half = &frame[..frame.len() / 2];

    c.bench_function("render_half_frame_96x48", |b| {
        b.iter(|| {
            render_frame(&mut host, black_box(half), FrameLengthPolicy::Lenient).unwrap();
        })
    });
}

fn bench_view_rasterize(c: &mut Criterion) {
    let geometry = Geometry::default();
    let mut session = MatrixSession::default();
    session.init_matrix(geometry);
    session.set_pixels(&full_frame(&geometry, 0)).unwrap();

    let view = MatrixView::default();
    let status = StatusView {
        listen_addr: "127.0.0.1:7878",
    };
    let viewport = Viewport::new(320, 80);
    let mut fb = FrameBuffer::new(viewport.width, viewport.height);

    c.bench_function("matrix_view_render_into_96x48", |b| {
        b.iter(|| {
            view.render_into(&session, Some(&status), black_box(viewport), &mut fb);
        })
    });
}

fn bench_diff_encode(c: &mut Criterion) {
    let geometry = Geometry::default();
    let view = MatrixView::default();
    let viewport = Viewport::new(320, 80);

    let mut session = MatrixSession::default();
    session.init_matrix(geometry);
    session.set_pixels(&full_frame(&geometry, 0)).unwrap();
    let prev = view.render(&session, None, viewport);
    session.set_pixels(&full_frame(&geometry, 7)).unwrap();
    let next = view.render(&session, None, viewport);

    let mut out = Vec::with_capacity(256 * 1024);
    c.bench_function("encode_diff_96x48", |b| {
        b.iter(|| {
            out.clear();
            encode_diff_into(black_box(&prev), black_box(&next), &mut out).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_render_frame,
    bench_short_frame,
    bench_view_rasterize,
    bench_diff_encode
);
criterion_main!(benches);
