//! Cursor and viewport, moved together.
//!
//! A [`ViewportCursor`] owns the cursor position, the virtual column and the
//! visible rectangle of the buffer. Every movement request resolves to a new
//! cursor and a new viewport in one step.
//!
//! # Two kinds of movement
//!
//! - **Cursor-driven** (arrows, home/end, word motion): the cursor moves and
//!   the viewport follows, shifting by exactly the distance the cursor
//!   overflowed on each axis. It never recentres.
//! - **Scroll-driven** (Ctrl+Up/Down, Alt+Left/Right): the viewport moves,
//!   clamped to the document, and the cursor is pulled back inside it.
//!
//! Page up/down do both: the viewport moves one page and the cursor moves by
//! as many lines as the viewport actually did.
//!
//! # Virtual column
//!
//! Horizontal moves and edits set the virtual column to the new cursor
//! column. Vertical moves aim for the virtual column and stop short on lines
//! that are too short, so moving through a short line and back lands on the
//! original column again.

use crate::buffer::Buffer;
use crate::position::Position;
use crate::word;

/// The visible rectangle, in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// First visible line.
    pub origin_y: usize,
    /// First visible column.
    pub origin_x: usize,
    /// Visible lines.
    pub height: usize,
    /// Visible columns.
    pub width: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self {
            origin_y: 0,
            origin_x: 0,
            height,
            width,
        }
    }

    /// Whether `pos` is inside the rectangle.
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.line >= self.origin_y
            && pos.line < self.origin_y + self.height
            && pos.col >= self.origin_x
            && pos.col < self.origin_x + self.width
    }

    /// Largest `origin_y` that still fills the viewport.
    fn max_origin_y(&self, buf: &Buffer) -> usize {
        buf.line_count().saturating_sub(self.height)
    }

    /// Largest `origin_x`, leaving room for the append slot after the
    /// longest line.
    fn max_origin_x(&self, buf: &Buffer) -> usize {
        (buf.longest_line_len() + 1).saturating_sub(self.width)
    }

    /// Last visible line, limited to the buffer.
    fn bottom(&self, buf: &Buffer) -> usize {
        (self.origin_y + self.height.max(1) - 1).min(buf.last_line())
    }
}

/// Cursor, virtual column and viewport of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewportCursor {
    pos: Position,
    virtual_col: usize,
    view: Viewport,
}

impl ViewportCursor {
    /// A cursor at the origin of a `height × width` viewport.
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self {
            pos: Position::ZERO,
            virtual_col: 0,
            view: Viewport::new(height, width),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn virtual_col(&self) -> usize {
        self.virtual_col
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.view
    }

    /// Cursor position relative to the viewport as `(col, row)`.
    ///
    /// A cursor left of the viewport (on a line shorter than a horizontal
    /// scroll) is reported at column 0.
    #[must_use]
    pub const fn screen_cursor(&self) -> (usize, usize) {
        (
            self.pos.col.saturating_sub(self.view.origin_x),
            self.pos.line.saturating_sub(self.view.origin_y),
        )
    }

    // -- Cursor-driven ------------------------------------------------------

    /// Put the cursor at `pos`, clamped, and bring it into view. Used to seed
    /// a restored position.
    pub fn set_cursor(&mut self, buf: &Buffer, pos: Position) {
        self.pos = buf.clamp(pos.line, pos.col);
        self.virtual_col = self.pos.col;
        self.follow();
    }

    /// Horizontal move to `col` on the cursor's line.
    pub fn move_to_col(&mut self, buf: &Buffer, col: usize) {
        self.pos = buf.clamp(self.pos.line, col);
        self.virtual_col = self.pos.col;
        self.follow();
    }

    pub fn move_left(&mut self, buf: &Buffer) {
        self.move_to_col(buf, self.pos.col.saturating_sub(1));
    }

    pub fn move_right(&mut self, buf: &Buffer) {
        self.move_to_col(buf, self.pos.col + 1);
    }

    pub fn line_home(&mut self, buf: &Buffer) {
        self.move_to_col(buf, 0);
    }

    pub fn line_end(&mut self, buf: &Buffer) {
        self.move_to_col(buf, buf.line_len(self.pos.line));
    }

    pub fn word_left(&mut self, buf: &Buffer) {
        self.move_to_col(buf, word::word_backward(buf, self.pos));
    }

    pub fn word_right(&mut self, buf: &Buffer) {
        self.move_to_col(buf, word::word_forward(buf, self.pos));
    }

    /// Vertical move by `dy` lines, aiming for the virtual column.
    pub fn move_vertical(&mut self, buf: &Buffer, dy: isize) {
        let line = self.pos.line.saturating_add_signed(dy);
        self.pos = buf.clamp(line, self.virtual_col);
        self.follow();
    }

    /// First column of the first line.
    pub fn buffer_home(&mut self, buf: &Buffer) {
        self.set_cursor(buf, Position::ZERO);
    }

    /// End of the last line.
    pub fn buffer_end(&mut self, buf: &Buffer) {
        let last = buf.last_line();
        self.set_cursor(buf, Position::new(last, buf.line_len(last)));
    }

    /// Shift the viewport by exactly the distance the cursor lies outside it.
    fn follow(&mut self) {
        let height = self.view.height.max(1);
        let width = self.view.width.max(1);

        if self.pos.line < self.view.origin_y {
            self.view.origin_y = self.pos.line;
        } else if self.pos.line >= self.view.origin_y + height {
            self.view.origin_y = self.pos.line + 1 - height;
        }

        if self.pos.col < self.view.origin_x {
            self.view.origin_x = self.pos.col;
        } else if self.pos.col >= self.view.origin_x + width {
            self.view.origin_x = self.pos.col + 1 - width;
        }
    }

    // -- Scroll-driven ------------------------------------------------------

    /// Scroll by `dy` lines. The cursor is clamped to the visible lines and
    /// aims for the virtual column.
    pub fn scroll_lines(&mut self, buf: &Buffer, dy: isize) {
        self.view.origin_y = self
            .view
            .origin_y
            .saturating_add_signed(dy)
            .min(self.view.max_origin_y(buf));
        self.pull_into_rows(buf);
    }

    /// Scroll by `dx` columns. The cursor keeps its line and is clamped to
    /// the visible columns as far as its line allows; the viewport does not
    /// follow it back.
    pub fn scroll_columns(&mut self, buf: &Buffer, dx: isize) {
        self.view.origin_x = self
            .view
            .origin_x
            .saturating_add_signed(dx)
            .min(self.view.max_origin_x(buf));
        let right = self.view.origin_x + self.view.width.max(1) - 1;
        let col = self.pos.col.clamp(self.view.origin_x, right);
        self.pos = buf.clamp(self.pos.line, col);
        self.virtual_col = self.pos.col;
    }

    /// One page up. At the top, the cursor goes to the first line, then to
    /// the start of it.
    pub fn page_up(&mut self, buf: &Buffer) {
        if self.view.origin_y == 0 {
            if self.pos.line == 0 {
                self.move_to_col(buf, 0);
            } else {
                self.pos = buf.clamp(0, self.virtual_col);
                self.follow();
            }
            return;
        }
        self.page(buf, -page_delta(self.view.height));
    }

    /// One page down. At the bottom, the cursor goes to the last line, then
    /// to the end of it.
    pub fn page_down(&mut self, buf: &Buffer) {
        if self.view.origin_y >= self.view.max_origin_y(buf) {
            let last = buf.last_line();
            if self.pos.line == last {
                self.move_to_col(buf, buf.line_len(last));
            } else {
                self.pos = buf.clamp(last, self.virtual_col);
                self.follow();
            }
            return;
        }
        self.page(buf, page_delta(self.view.height));
    }

    fn page(&mut self, buf: &Buffer, dy: isize) {
        let before = self.view.origin_y;
        self.view.origin_y = before
            .saturating_add_signed(dy)
            .min(self.view.max_origin_y(buf));
        let line = if self.view.origin_y >= before {
            self.pos.line + (self.view.origin_y - before)
        } else {
            self.pos.line.saturating_sub(before - self.view.origin_y)
        };
        self.pos.line = line.min(buf.last_line());
        self.pull_into_rows(buf);
    }

    /// Clamp the cursor line into the visible rows, aim for the virtual
    /// column, and bring the column into view.
    fn pull_into_rows(&mut self, buf: &Buffer) {
        let line = self
            .pos
            .line
            .clamp(self.view.origin_y.min(buf.last_line()), self.view.bottom(buf));
        self.pos = buf.clamp(line, self.virtual_col);
        self.follow();
    }

    // -- Geometry -----------------------------------------------------------

    /// Fit a new viewport size and keep the cursor visible.
    pub fn resize(&mut self, buf: &Buffer, height: usize, width: usize) {
        self.view.height = height;
        self.view.width = width;
        self.view.origin_y = self.view.origin_y.min(self.view.max_origin_y(buf));
        self.view.origin_x = self.view.origin_x.min(self.view.max_origin_x(buf));
        self.follow();
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn page_delta(height: usize) -> isize {
    if height == 0 { 1 } else { height as isize }
}
