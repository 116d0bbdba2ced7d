//! TerminalRenderer: puts the rasterized LED panel on a real terminal.
//!
//! A streamed animation usually changes a scattered subset of LEDs per frame,
//! while the gaps between them and the status line stay put. After the first
//! paint only horizontal spans of changed characters are written, each as a
//! cursor move plus 24-bit color escapes. The first frame and every size
//! change repaint the whole panel.

use std::io::{self, Write};

use anyhow::{Context, Result};

use crossterm::{
    cursor,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    /// Panel as it is currently on screen.
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    spans: Vec<Span>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            spans: Vec::new(),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode().context("failed to disable raw mode")?;
        Ok(())
    }

    /// Repaint the whole panel on the next draw (resize, `r`, Ctrl-L).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Put `fb` on screen and take the previous panel back in exchange.
    ///
    /// The caller rasterizes into the same `FrameBuffer` every time; after the
    /// call it holds stale contents that the next `render_into` overwrites.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut shown = match self.last.take() {
            Some(shown) if same_size(&shown, fb) => {
                changed_spans(&shown, fb, &mut self.spans);
                encode_spans_into(fb, &self.spans, &mut self.buf)?;
                shown
            }
            Some(mut shown) => {
                encode_full_into(fb, &mut self.buf)?;
                shown.resize(fb.width(), fb.height());
                shown
            }
            None => {
                encode_full_into(fb, &mut self.buf)?;
                FrameBuffer::new(fb.width(), fb.height())
            }
        };
        self.flush_buf()?;

        std::mem::swap(&mut shown, fb);
        self.last = Some(shown);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// A horizontal run of characters that must be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    x: u16,
    y: u16,
    len: u16,
}

fn same_size(a: &FrameBuffer, b: &FrameBuffer) -> bool {
    a.width() == b.width() && a.height() == b.height()
}

/// Encode a repaint of every character of the panel into `out`.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut pen = None;
    for y in 0..fb.height() {
        write_span(
            fb,
            Span {
                x: 0,
                y,
                len: fb.width(),
            },
            &mut pen,
            out,
        )?;
    }
    out.queue(ResetColor)?;
    Ok(())
}

/// Encode only what differs between the panel on screen and `next`.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut spans = Vec::new();
    changed_spans(prev, next, &mut spans);
    encode_spans_into(next, &spans, out)
}

fn encode_spans_into(next: &FrameBuffer, spans: &[Span], out: &mut Vec<u8>) -> Result<()> {
    // Colors carry over between spans; the terminal keeps the last SGR.
    let mut pen = None;
    for &span in spans {
        write_span(next, span, &mut pen, out)?;
    }
    out.queue(ResetColor)?;
    Ok(())
}

fn write_span(
    fb: &FrameBuffer,
    span: Span,
    pen: &mut Option<CellStyle>,
    out: &mut Vec<u8>,
) -> Result<()> {
    out.queue(cursor::MoveTo(span.x, span.y))?;
    for x in span.x..span.x.saturating_add(span.len) {
        let cell = fb.get(x, span.y).unwrap_or_default();
        if *pen != Some(cell.style) {
            out.queue(SetForegroundColor(truecolor(cell.style.fg)))?;
            out.queue(SetBackgroundColor(truecolor(cell.style.bg)))?;
            *pen = Some(cell.style);
        }
        out.queue(Print(cell.ch))?;
    }
    Ok(())
}

fn truecolor(rgb: Rgb) -> crossterm::style::Color {
    crossterm::style::Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Collect the spans of `next` that differ from `prev` into `spans`.
///
/// Panels of different sizes differ everywhere.
fn changed_spans(prev: &FrameBuffer, next: &FrameBuffer, spans: &mut Vec<Span>) {
    spans.clear();
    let width = next.width();
    let resized = !same_size(prev, next);
    for y in 0..next.height() {
        if resized {
            spans.push(Span { x: 0, y, len: width });
            continue;
        }
        let mut run: Option<u16> = None;
        for x in 0..width {
            match (prev.get(x, y) != next.get(x, y), run) {
                (true, None) => run = Some(x),
                (false, Some(start)) => {
                    spans.push(Span {
                        x: start,
                        y,
                        len: x - start,
                    });
                    run = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run {
            spans.push(Span {
                x: start,
                y,
                len: width - start,
            });
        }
    }
}
