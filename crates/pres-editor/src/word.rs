//! Word motions within one line.
//!
//! A **word** character is a letter, a digit or `_`. Everything else,
//! whitespace and punctuation alike, is one non-word class. Motions never
//! leave the cursor's line.
//!
//! | Motion | Key | Lands on |
//! |--------|-----|----------|
//! | [`word_forward`] | Ctrl+Right | the first column past the run the cursor is in |
//! | [`word_backward`] | Ctrl+Left | the first character of the previous word |

use crate::buffer::Buffer;
use crate::position::Position;

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Whitespace and punctuation.
    Other,
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Other
    }
}

fn line_chars(buf: &Buffer, line: usize) -> Vec<char> {
    buf.line(line)
        .map(|slice| slice.chars().take(buf.line_len(line)).collect())
        .unwrap_or_default()
}

/// Column after the run of same-class characters starting at `pos`.
/// At the end of the line the column is unchanged.
///
/// In `ab_cd efgh`, from column 2 this is 5.
#[must_use]
pub fn word_forward(buf: &Buffer, pos: Position) -> usize {
    let chars = line_chars(buf, pos.line);
    let Some(&first) = chars.get(pos.col) else {
        return pos.col.min(chars.len());
    };
    let class = classify(first);
    chars[pos.col..]
        .iter()
        .position(|&ch| classify(ch) != class)
        .map_or(chars.len(), |run| pos.col + run)
}

/// Column of the first character of the word before `pos`: skip non-word
/// characters backwards, then word characters. 0 when no word precedes.
///
/// In `ab_cd efgh`, from column 9 this is 6.
#[must_use]
pub fn word_backward(buf: &Buffer, pos: Position) -> usize {
    let chars = line_chars(buf, pos.line);
    let mut col = pos.col.min(chars.len());
    while col > 0 && classify(chars[col - 1]) == CharClass::Other {
        col -= 1;
    }
    while col > 0 && classify(chars[col - 1]) == CharClass::Word {
        col -= 1;
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(text: &str) -> Buffer {
        Buffer::from_text(text)
    }

    #[test]
    fn forward_ends_the_current_word() {
        let b = buf("ab_cd efgh");
        assert_eq!(word_forward(&b, Position::new(0, 2)), 5);
        assert_eq!(word_forward(&b, Position::new(0, 0)), 5);
    }

    #[test]
    fn forward_from_whitespace_skips_to_next_word() {
        let b = buf("ab   cd");
        assert_eq!(word_forward(&b, Position::new(0, 2)), 5);
    }

    #[test]
    fn forward_punctuation_is_not_word() {
        let b = buf("x+=y");
        assert_eq!(word_forward(&b, Position::new(0, 1)), 3);
    }

    #[test]
    fn forward_at_end_of_line_stays() {
        let b = buf("abc\ndef");
        assert_eq!(word_forward(&b, Position::new(0, 3)), 3);
        assert_eq!(word_forward(&b, Position::new(0, 1)), 3);
    }

    #[test]
    fn backward_lands_on_word_start() {
        let b = buf("ab_cd efgh");
        assert_eq!(word_backward(&b, Position::new(0, 9)), 6);
        assert_eq!(word_backward(&b, Position::new(0, 6)), 0);
        assert_eq!(word_backward(&b, Position::new(0, 10)), 6);
    }

    #[test]
    fn backward_at_start_stays() {
        let b = buf("  ab");
        assert_eq!(word_backward(&b, Position::new(0, 0)), 0);
        assert_eq!(word_backward(&b, Position::new(0, 2)), 0);
    }

    #[test]
    fn motions_are_char_based() {
        let b = buf("héllo wörld");
        assert_eq!(word_forward(&b, Position::new(0, 0)), 5);
        assert_eq!(word_backward(&b, Position::new(0, 11)), 6);
    }

    #[test]
    fn classify_chars() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify('7'), CharClass::Word);
        assert_eq!(classify(' '), CharClass::Other);
        assert_eq!(classify('.'), CharClass::Other);
    }
}
