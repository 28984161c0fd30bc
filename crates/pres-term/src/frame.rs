// SPDX-License-Identifier: MIT
//
// FrameBuffer — the cell grid that a paint pass draws into.
//
// Every character position on screen is one cell. The application paints
// a whole frame, then the renderer compares it against the previous frame
// and writes only the rows that changed.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing (`y * width + x`) so a row
//     is a contiguous slice. The renderer compares rows with one slice
//     equality check.
//
//   - One buffer column per buffer character. The editor's viewport is
//     measured in characters, so tabs and control characters paint as a
//     single blank cell, characters that are not one column wide (CJK,
//     combining marks) paint as U+FFFD, and the cursor column stays exact.
//
//   - Painting outside the frame is an error, not a silent clip. A paint
//     pass that computes rows from stale dimensions fails loudly and the
//     event loop skips that frame.

use thiserror::Error;
use unicode_width::UnicodeWidthChar;

use crate::color::Color;

// ─── Cell ───────────────────────────────────────────────────────────────────

/// One character cell: a codepoint, its foreground color, and whether it is
/// drawn in reverse video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub reverse: bool,
}

impl Cell {
    /// A blank cell with default colors.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: Color::Default,
        reverse: false,
    };

    /// A cell with default colors.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: Color::Default,
            reverse: false,
        }
    }

    /// A cell with the given foreground.
    #[inline]
    #[must_use]
    pub const fn colored(ch: char, fg: Color) -> Self {
        Self {
            ch,
            fg,
            reverse: false,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Map a character to what a single cell can show. Tabs, line breaks and
/// other control characters become a blank; wide and zero-width characters
/// become the replacement character.
#[inline]
#[must_use]
pub fn displayable(ch: char) -> char {
    if ch.is_control() {
        return ' ';
    }
    match ch.width() {
        Some(1) => ch,
        _ => char::REPLACEMENT_CHARACTER,
    }
}

// ─── FrameError ─────────────────────────────────────────────────────────────

/// A paint operation that does not fit the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("paint at ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfBounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
}

// ─── FrameBuffer ────────────────────────────────────────────────────────────

/// A 2D grid of cells, the canvas a paint pass draws into.
///
/// # Examples
///
/// ```
/// use pres_term::frame::{Cell, FrameBuffer};
///
/// let mut frame = FrameBuffer::new(10, 2);
/// frame.set(0, 0, Cell::new('x')).unwrap();
/// assert_eq!(frame.get(0, 0).map(|c| c.ch), Some('x'));
/// assert!(frame.set(10, 0, Cell::new('y')).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a blank frame.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    const fn out_of_bounds(&self, x: u16, y: u16) -> FrameError {
        FrameError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// The cell at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    /// One row of cells, or `None` outside the frame.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + self.width as usize])
        } else {
            None
        }
    }

    /// The text of one row with trailing blanks removed. Handy in tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| cells.iter().map(|c| c.ch).collect::<String>())
            .unwrap_or_default()
            .trim_end()
            .to_owned()
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Write one cell.
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfBounds`] if `(x, y)` is outside the frame.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> Result<(), FrameError> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        Ok(())
    }

    /// Paint a run of characters starting at `(x, y)` in one color.
    ///
    /// Characters past the right edge are clipped; the return value is the
    /// number of cells written. Starting outside the frame is an error.
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfBounds`] if the start position is outside the frame.
    pub fn put_chars<I>(&mut self, x: u16, y: u16, chars: I, fg: Color) -> Result<u16, FrameError>
    where
        I: IntoIterator<Item = char>,
    {
        if y >= self.height || x > self.width {
            return Err(self.out_of_bounds(x, y));
        }
        let mut col = x;
        for ch in chars {
            if col >= self.width {
                break;
            }
            let idx = self.index(col, y);
            self.cells[idx] = Cell::colored(displayable(ch), fg);
            col += 1;
        }
        Ok(col - x)
    }

    /// [`put_chars`](Self::put_chars) for a string slice.
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfBounds`] if the start position is outside the frame.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Color) -> Result<u16, FrameError> {
        self.put_chars(x, y, text.chars(), fg)
    }

    /// Paint a full-width row in reverse video (status lines).
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfBounds`] if `y` is outside the frame.
    pub fn put_bar(&mut self, y: u16, text: &str) -> Result<(), FrameError> {
        if y >= self.height {
            return Err(self.out_of_bounds(0, y));
        }
        let mut chars = text.chars();
        for x in 0..self.width {
            let ch = chars.next().map_or(' ', displayable);
            let idx = self.index(x, y);
            self.cells[idx] = Cell {
                ch,
                fg: Color::Default,
                reverse: true,
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn displayable_keeps_one_cell_per_char() {
        assert_eq!(displayable('a'), 'a');
        assert_eq!(displayable('é'), 'é');
        assert_eq!(displayable('\t'), ' ');
        assert_eq!(displayable('\0'), ' ');
        assert_eq!(displayable('日'), char::REPLACEMENT_CHARACTER);
        assert_eq!(displayable('\u{301}'), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn new_is_blank() {
        let frame = FrameBuffer::new(4, 2);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.get(3, 1), Some(&Cell::EMPTY));
        assert_eq!(frame.get(4, 1), None);
    }

    #[test]
    fn set_out_of_bounds_errors() {
        let mut frame = FrameBuffer::new(4, 2);
        let err = frame.set(0, 2, Cell::new('x')).unwrap_err();
        assert_eq!(
            err,
            FrameError::OutOfBounds {
                x: 0,
                y: 2,
                width: 4,
                height: 2
            }
        );
    }

    #[test]
    fn put_str_clips_right_edge() {
        let mut frame = FrameBuffer::new(5, 1);
        let written = frame.put_str(2, 0, "hello", Color::GREEN).unwrap();
        assert_eq!(written, 3);
        assert_eq!(frame.row_text(0), "  hel");
        assert_eq!(frame.get(2, 0).map(|c| c.fg), Some(Color::GREEN));
    }

    #[test]
    fn put_str_below_frame_errors() {
        let mut frame = FrameBuffer::new(5, 1);
        assert!(frame.put_str(0, 1, "x", Color::Default).is_err());
    }

    #[test]
    fn put_str_at_right_edge_writes_nothing() {
        let mut frame = FrameBuffer::new(5, 1);
        assert_eq!(frame.put_str(5, 0, "x", Color::Default), Ok(0));
    }

    #[test]
    fn control_chars_paint_blank() {
        let mut frame = FrameBuffer::new(5, 1);
        frame.put_str(0, 0, "a\tb", Color::Default).unwrap();
        assert_eq!(frame.row_text(0), "a b");
    }

    #[test]
    fn put_bar_fills_row_reversed() {
        let mut frame = FrameBuffer::new(6, 2);
        frame.put_bar(1, "ok").unwrap();
        assert_eq!(frame.row_text(1), "ok");
        assert!(frame.row(1).unwrap().iter().all(|c| c.reverse));
        assert!(frame.row(0).unwrap().iter().all(|c| !c.reverse));
    }

    #[test]
    fn resize_clears() {
        let mut frame = FrameBuffer::new(3, 1);
        frame.put_str(0, 0, "abc", Color::Default).unwrap();
        frame.resize(2, 2);
        assert_eq!(frame.row_text(0), "");
        assert_eq!(frame.row(1).map(<[Cell]>::len), Some(2));
    }
}
