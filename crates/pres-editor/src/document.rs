//! One open document: buffer, highlighter and viewport cursor together.
//!
//! [`Document::handle`] is the whole edit cycle for one key. It runs three
//! steps in a fixed order:
//!
//! 1. **Mutate** the buffer (editing keys only, and only when editable).
//! 2. **Re-highlight** the edited line, or everything if the line's block
//!    markers changed.
//! 3. **Move** the cursor and viewport.

use std::path::{Path, PathBuf};

use crate::buffer::Buffer;
use crate::highlight::{Highlighter, Rescan};
use crate::keymap::EditKey;
use crate::position::Position;
use crate::syntax::SyntaxDefinition;
use crate::viewport::ViewportCursor;

/// What handling a key did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The buffer, cursor or viewport changed.
    pub changed: bool,
    /// The key asks to close the document.
    pub quit: bool,
}

/// A buffer being viewed or edited.
#[derive(Debug, Clone)]
pub struct Document {
    buffer: Buffer,
    highlighter: Highlighter,
    view: ViewportCursor,
    path: Option<PathBuf>,
    editable: bool,
    last_rescan: Option<Rescan>,
}

impl Document {
    /// A read-only document showing `text` in a `height × width` viewport.
    #[must_use]
    pub fn new(text: &str, syntax: Option<SyntaxDefinition>, height: usize, width: usize) -> Self {
        let buffer = Buffer::from_text(text);
        let mut highlighter = Highlighter::new(syntax);
        highlighter.full_scan(&buffer);
        tracing::debug!(
            lines = buffer.line_count(),
            syntax = highlighter.syntax().map_or("none", SyntaxDefinition::name),
            "document opened"
        );
        Self {
            buffer,
            highlighter,
            view: ViewportCursor::new(height, width),
            path: None,
            editable: false,
            last_rescan: Some(Rescan::Full),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    #[inline]
    #[must_use]
    pub const fn view(&self) -> &ViewportCursor {
        &self.view
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.view.cursor()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.editable
    }

    /// The scan the most recent edit triggered.
    #[must_use]
    pub const fn last_rescan(&self) -> Option<Rescan> {
        self.last_rescan
    }

    // -- Geometry -----------------------------------------------------------

    pub fn resize(&mut self, height: usize, width: usize) {
        self.view.resize(&self.buffer, height, width);
    }

    /// Seed the cursor from a saved position, clamped to the buffer.
    pub fn restore_cursor(&mut self, pos: Position) {
        self.view.set_cursor(&self.buffer, pos);
    }

    // -- Edit cycle ---------------------------------------------------------

    /// Apply one key.
    pub fn handle(&mut self, key: EditKey) -> Outcome {
        if key == EditKey::Quit {
            return Outcome {
                changed: false,
                quit: true,
            };
        }

        if key.is_edit() {
            if !self.editable {
                tracing::trace!(?key, "read-only, edit ignored");
                return Outcome::default();
            }
            return self.edit(key);
        }

        let before = self.view.clone();
        self.navigate(key);
        Outcome {
            changed: self.view != before,
            quit: false,
        }
    }

    fn edit(&mut self, key: EditKey) -> Outcome {
        let Position { line, col } = self.view.cursor();

        // Mutate.
        let (changed, col) = match key {
            EditKey::Char(ch) => (self.buffer.insert_char(line, col, ch), col + 1),
            EditKey::Backspace => (
                self.buffer.delete_char_before(line, col),
                col.saturating_sub(1),
            ),
            EditKey::Delete => (self.buffer.delete_char_at(line, col), col),
            _ => (false, col),
        };
        if !changed {
            return Outcome::default();
        }

        // Re-highlight.
        let rescan = self.highlighter.rehighlight_line(&self.buffer, line);
        self.last_rescan = Some(rescan);

        // Move.
        self.view.move_to_col(&self.buffer, col);

        Outcome {
            changed: true,
            quit: false,
        }
    }

    fn navigate(&mut self, key: EditKey) {
        let buf = &self.buffer;
        let view = &mut self.view;
        match key {
            EditKey::Up => view.move_vertical(buf, -1),
            EditKey::Down => view.move_vertical(buf, 1),
            EditKey::Left => view.move_left(buf),
            EditKey::Right => view.move_right(buf),
            EditKey::PageUp => view.page_up(buf),
            EditKey::PageDown => view.page_down(buf),
            EditKey::ScrollUp => view.scroll_lines(buf, -1),
            EditKey::ScrollDown => view.scroll_lines(buf, 1),
            EditKey::ScrollLeft => view.scroll_columns(buf, -1),
            EditKey::ScrollRight => view.scroll_columns(buf, 1),
            EditKey::WordLeft => view.word_left(buf),
            EditKey::WordRight => view.word_right(buf),
            EditKey::LineHome => view.line_home(buf),
            EditKey::LineEnd => view.line_end(buf),
            EditKey::BufferHome => view.buffer_home(buf),
            EditKey::BufferEnd => view.buffer_end(buf),
            EditKey::Backspace | EditKey::Delete | EditKey::Char(_) | EditKey::Quit => {}
        }
    }
}
