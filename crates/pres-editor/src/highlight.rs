//! Highlighting: lexer plus syntax state over the whole buffer.
//!
//! The [`Highlighter`] owns a [`SyntaxTable`], one [`LineSyntax`] per buffer
//! line holding the tokens of that line and the `in_block` flag it was
//! entered with.
//!
//! # Modes
//!
//! 1. **Full scan.** Tokenize every line in order, threading `in_block`
//!    from each line into the next. Runs on load, after a line count change
//!    and whenever the incremental check fails.
//! 2. **Single line.** After an edit confined to line `y`, re-classify only
//!    that line from its stored entry state and compare with the old tokens
//!    using [`state_compatible`]. Compatible means the state handed to line
//!    `y + 1` is assumed unchanged and only line `y` is replaced.
//!
//! The compatibility check counts block-marker tokens. It can miss an edit
//! that adds a block start and removes a block end in one step; such an edit
//! keeps the count and leaves later lines stale until the next full scan.

use std::collections::BTreeMap;

use pres_term::color::Color;

use crate::buffer::Buffer;
use crate::lexer::{Token, TokenClass};
use crate::syntax::SyntaxDefinition;
use crate::syntax_state::classify_line;

// ---------------------------------------------------------------------------
// Per-line table
// ---------------------------------------------------------------------------

/// Highlight state of one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSyntax {
    /// Whether the line starts inside a block.
    pub in_block: bool,
    pub tokens: Vec<Token>,
}

/// Line-indexed highlight state, parallel to the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTable {
    lines: Vec<LineSyntax>,
}

impl SyntaxTable {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, line: usize) -> Option<&LineSyntax> {
        self.lines.get(line)
    }

    /// Grow with empty entries or truncate to `lines` entries.
    pub fn resize(&mut self, lines: usize) {
        self.lines.resize_with(lines, LineSyntax::default);
    }
}

/// Which scan the last re-highlight ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescan {
    Line(usize),
    Full,
}

// ---------------------------------------------------------------------------
// Compatibility check
// ---------------------------------------------------------------------------

fn block_marker_count(tokens: &[Token], syntax: &SyntaxDefinition) -> usize {
    tokens
        .iter()
        .filter(|t| t.class == TokenClass::Block && syntax.is_block_marker(&t.text))
        .count()
}

/// Whether replacing a line's `old` tokens with `new` can leave every later
/// line's state untouched: both must hold the same number of block-classified
/// block markers. Without a definition nothing is ever a block, so any edit
/// is compatible.
#[must_use]
pub fn state_compatible(old: &[Token], new: &[Token], syntax: Option<&SyntaxDefinition>) -> bool {
    syntax.is_none_or(|syntax| {
        block_marker_count(old, syntax) == block_marker_count(new, syntax)
    })
}

// ---------------------------------------------------------------------------
// Highlighter
// ---------------------------------------------------------------------------

/// Tokens and syntax state for one buffer.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    syntax: Option<SyntaxDefinition>,
    table: SyntaxTable,
}

impl Highlighter {
    /// A highlighter with an empty table. Call [`full_scan`](Self::full_scan)
    /// before use.
    #[must_use]
    pub const fn new(syntax: Option<SyntaxDefinition>) -> Self {
        Self {
            syntax,
            table: SyntaxTable { lines: Vec::new() },
        }
    }

    #[must_use]
    pub const fn syntax(&self) -> Option<&SyntaxDefinition> {
        self.syntax.as_ref()
    }

    #[must_use]
    pub const fn table(&self) -> &SyntaxTable {
        &self.table
    }

    /// Tokens of `line`. Empty past the end of the table.
    #[must_use]
    pub fn tokens(&self, line: usize) -> &[Token] {
        self.table.get(line).map_or(&[], |entry| &entry.tokens)
    }

    /// Whether `line` starts inside a block.
    #[must_use]
    pub fn entry_in_block(&self, line: usize) -> bool {
        self.table.get(line).is_some_and(|entry| entry.in_block)
    }

    /// Rebuild the table from every line of `buf`.
    pub fn full_scan(&mut self, buf: &Buffer) {
        let syntax = self.syntax.as_ref();
        let mut in_block = false;
        self.table.resize(buf.line_count());
        for (y, entry) in self.table.lines.iter_mut().enumerate() {
            let (tokens, carry) = classify_line(&buf.line_text(y), in_block, syntax);
            *entry = LineSyntax { in_block, tokens };
            in_block = carry;
        }
        tracing::trace!(lines = buf.line_count(), "full highlight scan");
    }

    /// Re-highlight after an edit confined to `line`.
    ///
    /// Falls back to a full scan when the table no longer matches the buffer
    /// or the edit changed the line's block markers.
    pub fn rehighlight_line(&mut self, buf: &Buffer, line: usize) -> Rescan {
        if self.table.len() != buf.line_count() || line >= self.table.len() {
            tracing::debug!(
                line,
                table = self.table.len(),
                buffer = buf.line_count(),
                "table out of step with buffer, full rescan"
            );
            self.full_scan(buf);
            return Rescan::Full;
        }

        let syntax = self.syntax.as_ref();
        let entry = &mut self.table.lines[line];
        let (tokens, _) = classify_line(&buf.line_text(line), entry.in_block, syntax);

        if state_compatible(&entry.tokens, &tokens, syntax) {
            entry.tokens = tokens;
            Rescan::Line(line)
        } else {
            tracing::debug!(line, "block markers changed, full rescan");
            self.full_scan(buf);
            Rescan::Full
        }
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Display color per token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    colors: [Color; TokenClass::ALL.len()],
}

impl Default for ColorScheme {
    fn default() -> Self {
        let mut scheme = Self {
            colors: [Color::Default; TokenClass::ALL.len()],
        };
        scheme.set(TokenClass::Keyword, Color::MAGENTA);
        scheme.set(TokenClass::String, Color::GREEN);
        scheme.set(TokenClass::Comment, Color::BRIGHT_BLACK);
        scheme.set(TokenClass::Block, Color::CYAN);
        scheme.set(TokenClass::Number, Color::YELLOW);
        scheme
    }
}

impl ColorScheme {
    const fn slot(class: TokenClass) -> usize {
        match class {
            TokenClass::Word => 0,
            TokenClass::Number => 1,
            TokenClass::Operator => 2,
            TokenClass::Keyword => 3,
            TokenClass::String => 4,
            TokenClass::Comment => 5,
            TokenClass::Block => 6,
        }
    }

    #[inline]
    #[must_use]
    pub const fn color(&self, class: TokenClass) -> Color {
        self.colors[Self::slot(class)]
    }

    pub const fn set(&mut self, class: TokenClass, color: Color) {
        self.colors[Self::slot(class)] = color;
    }

    /// Apply `class name → color name` overrides from a syntax file. Unknown
    /// classes and unparsable colors are logged and skipped.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) {
        for (class_name, color_name) in overrides {
            let Some(class) = TokenClass::from_name(class_name) else {
                tracing::warn!(class = %class_name, "unknown token class in color overrides");
                continue;
            };
            let Some(color) = Color::parse(color_name) else {
                tracing::warn!(class = %class_name, color = %color_name, "unparsable color");
                continue;
            };
            self.set(class, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn python() -> SyntaxDefinition {
        SyntaxDefinition::new("python")
            .with_keywords(["for", "if", "def", "True", "False", "None"])
            .with_comments(["#"])
            .with_strings(["'", "\""])
            .with_blocks(["'''"], ["'''"])
    }

    fn scanned(text: &str) -> (Buffer, Highlighter) {
        let buf = Buffer::from_text(text);
        let mut hl = Highlighter::new(Some(python()));
        hl.full_scan(&buf);
        (buf, hl)
    }

    // -- Full scan ----------------------------------------------------------

    #[test]
    fn full_scan_threads_block_state() {
        let (_, hl) = scanned("a = '''\ntext\n''' + 1\nfor");
        assert_eq!(hl.table().len(), 4);
        assert!(!hl.entry_in_block(0));
        assert!(hl.entry_in_block(1));
        assert!(hl.entry_in_block(2));
        assert!(!hl.entry_in_block(3));
        assert_eq!(hl.tokens(1)[0].class, TokenClass::Block);
        assert_eq!(hl.tokens(3)[0].class, TokenClass::Keyword);
    }

    #[test]
    fn tokens_past_end_are_empty() {
        let (_, hl) = scanned("x");
        assert!(hl.tokens(5).is_empty());
        assert!(!hl.entry_in_block(5));
    }

    // -- Incremental --------------------------------------------------------

    #[test]
    fn plain_edit_rescans_one_line() {
        let (mut buf, mut hl) = scanned("a = 1\nb = 2");
        buf.insert_char(0, 5, '0');
        assert_eq!(hl.rehighlight_line(&buf, 0), Rescan::Line(0));
        assert_eq!(hl.tokens(0)[2].text, "10");
    }

    #[test]
    fn opening_a_block_rescans_everything() {
        let (mut buf, mut hl) = scanned("a = ''\nfor x");
        buf.insert_char(0, 6, '\'');
        assert_eq!(hl.rehighlight_line(&buf, 0), Rescan::Full);
        assert!(hl.entry_in_block(1));
        assert!(hl.tokens(1).iter().all(|t| t.class == TokenClass::Block));
    }

    #[test]
    fn stale_table_rescans_everything() {
        let buf = Buffer::from_text("a\nb");
        let mut hl = Highlighter::new(None);
        assert_eq!(hl.rehighlight_line(&buf, 0), Rescan::Full);
        assert_eq!(hl.table().len(), 2);
    }

    #[test]
    fn compatibility_counts_block_markers_only() {
        let syntax = python();
        let (old, _) = classify_line("x = 1", false, Some(&syntax));
        let (new, _) = classify_line("x = '1'", false, Some(&syntax));
        assert!(state_compatible(&old, &new, Some(&syntax)));

        let (opened, _) = classify_line("x = '''", false, Some(&syntax));
        assert!(!state_compatible(&old, &opened, Some(&syntax)));
        assert!(state_compatible(&old, &opened, None));
    }

    #[test]
    fn swapped_markers_keep_the_count() {
        let syntax = python();
        let (old, _) = classify_line("''' a", true, Some(&syntax));
        let (new, _) = classify_line("a '''", false, Some(&syntax));
        assert!(state_compatible(&old, &new, Some(&syntax)));
    }

    #[test]
    fn table_resize() {
        let mut table = SyntaxTable::default();
        table.resize(3);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2), Some(&LineSyntax::default()));
        table.resize(1);
        assert_eq!(table.len(), 1);
        assert!(table.get(1).is_none());
    }

    // -- Colors -------------------------------------------------------------

    #[test]
    fn default_scheme() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.color(TokenClass::Keyword), Color::MAGENTA);
        assert_eq!(scheme.color(TokenClass::Comment), Color::BRIGHT_BLACK);
        assert_eq!(scheme.color(TokenClass::Word), Color::Default);
        assert_eq!(scheme.color(TokenClass::Operator), Color::Default);
    }

    #[test]
    fn overrides_skip_bad_entries() {
        let mut scheme = ColorScheme::default();
        let overrides = BTreeMap::from([
            ("keyword".to_owned(), "bright-red".to_owned()),
            ("string".to_owned(), "mauve".to_owned()),
            ("gizmo".to_owned(), "red".to_owned()),
            ("number".to_owned(), "#102030".to_owned()),
        ]);
        scheme.apply_overrides(&overrides);
        assert_eq!(scheme.color(TokenClass::Keyword), Color::Ansi256(9));
        assert_eq!(scheme.color(TokenClass::String), Color::GREEN);
        assert_eq!(scheme.color(TokenClass::Number), Color::Rgb(0x10, 0x20, 0x30));
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn single_line_rescan_matches_full_scan(
            lines in prop::collection::vec("[a-c1 '#=+]{0,12}", 1..6),
            line in 0..6usize,
            col in 0..14usize,
            ch in prop::sample::select(vec!['a', '1', ' ', '\'', '#', '+', '"']),
            delete in any::<bool>(),
        ) {
            let mut buf = Buffer::from_lines(&lines);
            let mut hl = Highlighter::new(Some(python()));
            hl.full_scan(&buf);

            let line = line.min(buf.last_line());
            let changed = if delete {
                buf.delete_char_before(line, col)
            } else {
                buf.insert_char(line, col, ch)
            };
            prop_assume!(changed);

            let rescan = hl.rehighlight_line(&buf, line);
            let mut fresh = Highlighter::new(Some(python()));
            fresh.full_scan(&buf);

            prop_assert_eq!(hl.tokens(line), fresh.tokens(line));
            if rescan == Rescan::Full {
                prop_assert_eq!(hl.table(), fresh.table());
            }
        }
    }
}
