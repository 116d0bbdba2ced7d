//! Terminal LED matrix viewer (default binary).
//!
//! Listens for a driver on the matrix bridge, applies `init_matrix` and
//! `set_pixels` in arrival order, and draws the grid with 24-bit color.
//! Logging goes to `LED_MATRIX_LOG_FILE` when set, since the terminal is in
//! use by the matrix itself.

use std::fs::OpenOptions;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use log::info;

use led_matrix::adapter::{check_tcp_listen_available, Adapter, ServerConfig};
use led_matrix::core::MatrixSession;
use led_matrix::input::{handle_key_event, ViewerAction};
use led_matrix::term::{FrameBuffer, MatrixView, StatusView, TerminalRenderer, Viewport};

/// How long to wait for keyboard input before checking the bridge again.
const POLL_INTERVAL: Duration = Duration::from_millis(4);

fn main() -> Result<()> {
    init_logging()?;

    let config = ServerConfig::from_env();
    check_tcp_listen_available(&config.host, config.port)
        .with_context(|| format!("cannot listen on {}", config.listen_addr()))?;

    let mut adapter = Adapter::start(config.clone())?;
    info!(
        "viewer ready on {} ({} frames)",
        adapter.local_addr(),
        config.frame_policy.as_str()
    );

    let mut session = MatrixSession::new(config.frame_policy);
    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut adapter, &mut session);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_micros();

    match std::env::var("LED_MATRIX_LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.trim())
                .with_context(|| format!("failed to open log file {}", path.trim()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        _ => {
            // stderr shares the screen with the matrix; keep it quiet.
            builder.filter_level(log::LevelFilter::Warn);
        }
    }

    builder.init();
    Ok(())
}

fn run(term: &mut TerminalRenderer, adapter: &mut Adapter, session: &mut MatrixSession) -> Result<()> {
    let view = MatrixView::default();
    let listen_addr = adapter.local_addr().to_string();
    let mut fb = FrameBuffer::new(0, 0);
    let mut dirty = true;

    loop {
        // Apply everything that has arrived, strictly in order.
        if adapter.apply_pending(session).redraw {
            dirty = true;
        }

        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let status = StatusView {
                listen_addr: &listen_addr,
            };
            view.render_into(session, Some(&status), Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match handle_key_event(key) {
                    Some(ViewerAction::Quit) => return Ok(()),
                    Some(ViewerAction::Redraw) => {
                        term.invalidate();
                        dirty = true;
                    }
                    None => {}
                },
                Event::Resize(_, _) => {
                    term.invalidate();
                    dirty = true;
                }
                _ => {}
            }
        }
    }
}
