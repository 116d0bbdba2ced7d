//! Demo driver: feeds a generated animation to a running viewer.
//!
//! Connects to `LED_MATRIX_HOST:LED_MATRIX_PORT`, builds the reference 96x48
//! panel, and plays a hue sweep with a moving bar at 30 fps until Ctrl-C.
//! Frames are picked by wall-clock index, so a slow viewer drops frames
//! instead of slowing the animation down.

use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;

use led_matrix::adapter::{MatrixClient, ServerConfig};
use led_matrix::types::{Color, Geometry, DEFAULT_FRAME_RATE};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    let geometry = Geometry::default();

    let mut client = MatrixClient::connect(config.listen_addr()).await?;
    client.init_matrix(geometry).await?;
    info!(
        "connected to {}, playing {}x{} at {} fps",
        config.listen_addr(),
        geometry.width,
        geometry.height,
        DEFAULT_FRAME_RATE
    );

    let frame_interval = Duration::from_secs(1) / DEFAULT_FRAME_RATE;
    let start = Instant::now();
    let mut last_index = None;
    let mut ticker = tokio::time::interval(frame_interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let index = (start.elapsed().as_secs_f64() * DEFAULT_FRAME_RATE as f64) as u64;
                if last_index == Some(index) {
                    continue;
                }
                last_index = Some(index);
                let frame = pattern_frame(&geometry, index);
                client.set_pixels(frame).await?;
            }
        }
    }

    info!("stopping after {} frames", last_index.map_or(0, |i| i + 1));
    client.close().await
}

/// Row-major frame: hue varies along x and drifts over time; a bright bar
/// sweeps left to right.
fn pattern_frame(geometry: &Geometry, index: u64) -> Vec<Color> {
    let cols = geometry.columns();
    let rows = geometry.rows();
    let bar = if cols == 0 { 0 } else { (index as usize) % cols };

    let mut frame = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            if col == bar {
                frame.push(Color::WHITE);
                continue;
            }
            let hue = (col as f64 / cols as f64 * 360.0 + index as f64 * 3.0) % 360.0;
            let value = 0.35 + 0.65 * (row as f64 / rows.max(1) as f64);
            frame.push(hsv_to_color(hue, 1.0, value));
        }
    }
    frame
}

fn hsv_to_color(h: f64, s: f64, v: f64) -> Color {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_channel = |v: f64| ((v + m) * 255.0).round() as i32;
    Color::new(to_channel(r), to_channel(g), to_channel(b))
}
