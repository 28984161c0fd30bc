// SPDX-License-Identifier: MIT
//
// Row-diff renderer.
//
// A key press usually changes one row and the status line. The renderer
// keeps the previous frame, compares row slices, and rewrites only rows
// that differ. Within a row it emits color and reverse-video changes only
// when the attribute actually changes from the previous cell.
//
// Output is accumulated in a Vec and written with one `write_all` per
// frame, wrapped in synchronized output (DEC 2026) so terminals that
// support it show the frame atomically.

use std::io::{self, Write};

use crate::ansi;
use crate::color::Color;
use crate::frame::{Cell, FrameBuffer};

/// Counters from one render pass, for trace logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub rows_rendered: u16,
    pub rows_skipped: u16,
}

/// Renders frames, diffing each against the last one drawn.
#[derive(Debug, Default)]
pub struct Renderer {
    output: Vec<u8>,
    previous: Option<FrameBuffer>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the previous frame into the output buffer.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        let mut stats = RenderStats::default();

        if current.width() == 0 || current.height() == 0 {
            self.previous = Some(current.clone());
            return stats;
        }

        let out = &mut self.output;
        let _ = ansi::begin_sync(out);
        let _ = ansi::cursor_hide(out);

        let previous = self
            .previous
            .as_ref()
            .filter(|p| p.width() == current.width() && p.height() == current.height());
        if previous.is_none() {
            let _ = ansi::clear_screen(out);
        }

        for y in 0..current.height() {
            let row = current.row(y).unwrap_or_default();
            if previous.and_then(|p| p.row(y)) == Some(row) {
                stats.rows_skipped += 1;
                continue;
            }
            let _ = write_row(out, y, row);
            stats.rows_rendered += 1;
        }

        let _ = ansi::reset(out);
        let _ = ansi::end_sync(out);

        match &mut self.previous {
            Some(prev) if prev.width() == current.width() && prev.height() == current.height() => {
                prev.clone_from(current);
            }
            _ => self.previous = Some(current.clone()),
        }

        tracing::trace!(
            rendered = stats.rows_rendered,
            skipped = stats.rows_skipped,
            bytes = self.output.len(),
            "frame rendered"
        );
        stats
    }

    /// The bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write the rendered bytes to `w` and clear them.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.output)?;
        w.flush()?;
        self.output.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

fn write_row(out: &mut Vec<u8>, y: u16, row: &[Cell]) -> io::Result<()> {
    ansi::cursor_to(out, 0, y)?;
    ansi::reset(out)?;

    let mut fg = Color::Default;
    let mut reverse = false;
    let mut utf8 = [0u8; 4];

    for cell in row {
        if cell.fg != fg {
            ansi::fg(out, cell.fg)?;
            fg = cell.fg;
        }
        if cell.reverse != reverse {
            ansi::reverse(out, cell.reverse)?;
            reverse = cell.reverse;
        }
        out.extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(renderer: &Renderer) -> String {
        String::from_utf8(renderer.output_bytes().to_vec()).unwrap()
    }

    #[test]
    fn first_render_draws_every_row() {
        let mut renderer = Renderer::new();
        let frame = FrameBuffer::new(3, 2);
        let stats = renderer.render(&frame);
        assert_eq!(
            stats,
            RenderStats {
                rows_rendered: 2,
                rows_skipped: 0
            }
        );
        assert!(text(&renderer).contains("\x1b[2J"));
    }

    #[test]
    fn unchanged_rows_are_skipped() {
        let mut renderer = Renderer::new();
        let mut frame = FrameBuffer::new(3, 3);
        renderer.render(&frame);

        frame.put_str(0, 1, "abc", Color::Default).unwrap();
        let stats = renderer.render(&frame);
        assert_eq!(
            stats,
            RenderStats {
                rows_rendered: 1,
                rows_skipped: 2
            }
        );
        let out = text(&renderer);
        assert!(out.contains("\x1b[2;1H"));
        assert!(out.contains("abc"));
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn color_changes_are_emitted_once_per_run() {
        let mut renderer = Renderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        frame.put_str(0, 0, "ab", Color::GREEN).unwrap();
        renderer.render(&frame);
        let out = text(&renderer);
        assert_eq!(out.matches("\x1b[32m").count(), 1);
        assert!(out.contains("\x1b[32mab\x1b[39m  "));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut renderer = Renderer::new();
        renderer.render(&FrameBuffer::new(3, 1));
        let stats = renderer.render(&FrameBuffer::new(4, 1));
        assert_eq!(stats.rows_rendered, 1);
        assert!(text(&renderer).contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_clears_history() {
        let mut renderer = Renderer::new();
        let frame = FrameBuffer::new(2, 2);
        renderer.render(&frame);
        renderer.force_redraw();
        assert_eq!(renderer.render(&frame).rows_rendered, 2);
    }

    #[test]
    fn flush_to_drains_output() {
        let mut renderer = Renderer::new();
        renderer.render(&FrameBuffer::new(2, 1));
        let mut sink = Vec::new();
        renderer.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(renderer.output_bytes().is_empty());
    }
}
