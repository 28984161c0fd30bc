//! Text buffer — the lines being viewed and edited.
//!
//! A `Buffer` wraps a [`ropey::Rope`] with the three character-level edits
//! the editor performs, plus line access for the lexer and the painter.
//!
//! # Invariants
//!
//! - **At least one line.** An empty document is one empty line; a document
//!   ending in a line break has a trailing empty line. This falls out of
//!   how ropey counts lines.
//!
//! - **No line contains a line break.** `\r\n` and lone `\r` are folded
//!   to `\n` on load, ropey is built without `unicode_lines` so `\n` is
//!   its only break, and `insert_char` refuses `\n` and `\r`. An edit can
//!   therefore never join or split lines.
//!
//! - **Clamping, not failing.** Every edit clamps `(line, col)` into the
//!   buffer first. Deleting before column 0 or at the end of a line does
//!   nothing. No edit returns an error.
//!
//! Columns are char offsets. Byte offsets never leave this module.

use ropey::{Rope, RopeSlice};

use crate::position::Position;

/// A rope-backed, line-oriented text buffer.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
    modified: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer: one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` on line breaks (`\n`, `\r\n`, `\r`).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rope = if text.contains('\r') {
            Rope::from_str(&text.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Rope::from_str(text)
        };
        Self {
            rope,
            modified: false,
        }
    }

    /// Build from already split lines. Lines must not contain line breaks.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_text(&text)
    }

    // -- Line access --------------------------------------------------------

    /// Number of lines, always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    /// A line including its line break, or `None` past the end.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.line_count()).then(|| self.rope.line(line))
    }

    /// Characters in `line`, excluding the line break. 0 past the end.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, |slice| {
            let total = slice.len_chars();
            if total > 0 && slice.char(total - 1) == '\n' {
                total - 1
            } else {
                total
            }
        })
    }

    /// The text of `line` without its line break. Empty past the end.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line)
            .map(|slice| slice.slice(..self.line_len(line)).to_string())
            .unwrap_or_default()
    }

    /// Length of the longest line. Bounds horizontal scrolling.
    #[must_use]
    pub fn longest_line_len(&self) -> usize {
        (0..self.line_count())
            .map(|line| self.line_len(line))
            .max()
            .unwrap_or(0)
    }

    /// The whole text, lines joined with `\n`.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Whether any edit changed the buffer since it was loaded.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    // -- Coordinates --------------------------------------------------------

    /// Clamp `(line, col)` to `line ∈ [0, N-1]`, `col ∈ [0, len(line)]`.
    #[must_use]
    pub fn clamp(&self, line: usize, col: usize) -> Position {
        let line = line.min(self.last_line());
        Position::new(line, col.min(self.line_len(line)))
    }

    fn char_idx(&self, pos: Position) -> usize {
        self.rope.line_to_char(pos.line) + pos.col
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` before `(line, col)`. Line breaks are refused.
    ///
    /// Returns whether the buffer changed.
    pub fn insert_char(&mut self, line: usize, col: usize, ch: char) -> bool {
        if matches!(ch, '\n' | '\r') {
            return false;
        }
        let pos = self.clamp(line, col);
        let idx = self.char_idx(pos);
        self.rope.insert_char(idx, ch);
        self.modified = true;
        true
    }

    /// Delete the character before `(line, col)` (backspace). A no-op at
    /// column 0.
    ///
    /// Returns whether the buffer changed.
    pub fn delete_char_before(&mut self, line: usize, col: usize) -> bool {
        let pos = self.clamp(line, col);
        if pos.col == 0 {
            return false;
        }
        let idx = self.char_idx(pos);
        self.rope.remove(idx - 1..idx);
        self.modified = true;
        true
    }

    /// Delete the character at `(line, col)` (forward delete). A no-op at or
    /// past the end of the line.
    ///
    /// Returns whether the buffer changed.
    pub fn delete_char_at(&mut self, line: usize, col: usize) -> bool {
        let pos = self.clamp(line, col);
        if pos.col >= self.line_len(pos.line) {
            return false;
        }
        let idx = self.char_idx(pos);
        self.rope.remove(idx..=idx);
        self.modified = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    // -- Construction -------------------------------------------------------

    #[test]
    fn empty_text_is_one_empty_line() {
        let buf = Buffer::from_text("");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_text(0), "");
        assert_eq!(buf.line_len(0), 0);
    }

    #[test]
    fn trailing_break_adds_empty_line() {
        let buf = Buffer::from_text("a\nb\n");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line_text(2), "");
    }

    #[test]
    fn splits_on_all_break_styles() {
        let buf = Buffer::from_text("one\r\ntwo\rthree\nfour");
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.line_text(0), "one");
        assert_eq!(buf.line_text(1), "two");
        assert_eq!(buf.line_text(2), "three");
        assert_eq!(buf.line_text(3), "four");
        assert_eq!(buf.line_len(0), 3);
    }

    #[test]
    fn form_feed_is_not_a_line_break() {
        let buf = Buffer::from_text("a\x0cb");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_len(0), 3);
    }

    #[test]
    fn from_lines_joins() {
        let buf = Buffer::from_lines(&["x", "", "yz"]);
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.contents(), "x\n\nyz");
    }

    #[test]
    fn unicode_columns_are_chars() {
        let buf = Buffer::from_text("café!");
        assert_eq!(buf.line_len(0), 5);
        assert_eq!(buf.line_text(0), "café!");
        assert_eq!(buf.line(0).map(|l| l.char(3)), Some('é'));
    }

    #[test]
    fn longest_line() {
        let buf = Buffer::from_text("ab\nabcdef\nabc");
        assert_eq!(buf.longest_line_len(), 6);
    }

    #[test]
    fn out_of_range_access_is_empty() {
        let buf = Buffer::from_text("ab");
        assert_eq!(buf.line(1), None);
        assert_eq!(buf.line_len(7), 0);
        assert_eq!(buf.line_text(7), "");
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_char_in_middle() {
        let mut buf = Buffer::from_text("ac\nxy");
        assert!(buf.insert_char(0, 1, 'b'));
        assert_eq!(buf.contents(), "abc\nxy");
        assert!(buf.is_modified());
    }

    #[test]
    fn insert_char_clamps_coordinates() {
        let mut buf = Buffer::from_text("ab\ncd");
        assert!(buf.insert_char(9, 99, '!'));
        assert_eq!(buf.line_text(1), "cd!");
    }

    #[test]
    fn insert_line_break_is_refused() {
        let mut buf = Buffer::from_text("ab");
        assert!(!buf.insert_char(0, 1, '\n'));
        assert!(!buf.insert_char(0, 1, '\r'));
        assert_eq!(buf.line_count(), 1);
        assert!(!buf.is_modified());
    }

    #[test]
    fn editing_next_to_folded_breaks_keeps_lines() {
        let mut buf = Buffer::from_text("a\rb\nc");
        assert!(buf.delete_char_at(1, 0));
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.contents(), "a\n\nc");
    }

    #[test]
    fn delete_before() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete_char_before(0, 2));
        assert_eq!(buf.contents(), "ac");
    }

    #[test]
    fn delete_before_column_zero_is_noop() {
        let mut buf = Buffer::from_text("abc\ndef");
        assert!(!buf.delete_char_before(1, 0));
        assert_eq!(buf.contents(), "abc\ndef");
        assert!(!buf.is_modified());
    }

    #[test]
    fn delete_at() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete_char_at(0, 0));
        assert_eq!(buf.contents(), "bc");
    }

    #[test]
    fn delete_at_end_of_line_is_noop() {
        let mut buf = Buffer::from_text("abc\ndef");
        assert!(!buf.delete_char_at(0, 3));
        assert!(!buf.delete_char_at(0, 50));
        assert_eq!(buf.line_count(), 2);
    }

    #[test]
    fn clamp_position() {
        let buf = Buffer::from_text("abc\nd");
        assert_eq!(buf.clamp(5, 5), Position::new(1, 1));
        assert_eq!(buf.clamp(0, 9), Position::new(0, 3));
    }

    // -- Properties ---------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Edit {
        Insert(usize, usize, char),
        Backspace(usize, usize),
        Delete(usize, usize),
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            (0..8usize, 0..12usize, any::<char>()).prop_map(|(y, x, c)| Edit::Insert(y, x, c)),
            (0..8usize, 0..12usize).prop_map(|(y, x)| Edit::Backspace(y, x)),
            (0..8usize, 0..12usize).prop_map(|(y, x)| Edit::Delete(y, x)),
        ]
    }

    proptest! {
        #[test]
        fn edits_never_change_line_count(
            text in "[a-c \n]{0,30}",
            edits in prop::collection::vec(edit(), 0..40),
        ) {
            let mut buf = Buffer::from_text(&text);
            let lines = buf.line_count();
            for e in edits {
                match e {
                    Edit::Insert(y, x, c) => { buf.insert_char(y, x, c); }
                    Edit::Backspace(y, x) => { buf.delete_char_before(y, x); }
                    Edit::Delete(y, x) => { buf.delete_char_at(y, x); }
                }
                prop_assert!(buf.line_count() >= 1);
                prop_assert_eq!(buf.line_count(), lines);
            }
        }
    }
}
