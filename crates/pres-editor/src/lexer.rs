//! Single-line lexer.
//!
//! A character-class tokenizer, not a parser. It splits one line into
//! maximal runs of word, number and operator characters and drops the
//! whitespace between them. Multi-line context (blocks) and the string,
//! comment and block classes are the job of [`crate::syntax_state`]; the
//! only reclassification done here is word → keyword.
//!
//! # Character classes
//!
//! | Class | Starts a token | Continues a token |
//! |-------|----------------|-------------------|
//! | word | letter | letter, digit, `_` |
//! | number | ASCII digit | ASCII digit, `.`, `_` |
//! | operator | anything else that is not whitespace | see below |
//!
//! An operator token is one character, except that a repeated character
//! merges into a two-character token (`==`, `//`, `++`) unless it is a
//! bracket, and a run that spells a prefix of one of the syntax
//! definition's markers keeps growing (`'''`, `/*`, `<!--`). When a run
//! cannot grow but its last char and the next one start a marker, that
//! char moves to the new token, so `**/` ends in `*/`.
//!
//! Columns are char offsets; `end` is exclusive.

use std::fmt;

use crate::syntax::SyntaxDefinition;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// What a token is, for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Word,
    Number,
    Operator,
    Keyword,
    String,
    Comment,
    Block,
}

impl TokenClass {
    pub const ALL: [Self; 7] = [
        Self::Word,
        Self::Number,
        Self::Operator,
        Self::Keyword,
        Self::String,
        Self::Comment,
        Self::Block,
    ];

    /// Lower-case name, as used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Number => "number",
            Self::Operator => "operator",
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Block => "block",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name() == name)
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified span of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub class: TokenClass,
}

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

#[inline]
fn starts_word(ch: char) -> bool {
    ch.is_alphabetic()
}

#[inline]
fn continues_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[inline]
const fn starts_number(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[inline]
const fn continues_number(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.' || ch == '_'
}

#[inline]
const fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}')
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split one line into tokens.
///
/// Deterministic: the same line and definition always give the same tokens.
/// With no definition nothing becomes a keyword and operators only merge
/// when doubled.
///
/// # Examples
///
/// ```
/// use pres_editor::lexer::{tokenize, TokenClass};
///
/// let tokens = tokenize("x += 10", None);
/// let classes: Vec<_> = tokens.iter().map(|t| t.class).collect();
/// assert_eq!(classes, [TokenClass::Word, TokenClass::Operator,
///                      TokenClass::Operator, TokenClass::Number]);
/// ```
#[must_use]
pub fn tokenize(line: &str, syntax: Option<&SyntaxDefinition>) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut lexer = Lexer {
        chars: &chars,
        syntax,
        tokens: Vec::new(),
        open: None,
    };

    for (i, &ch) in chars.iter().enumerate() {
        lexer.feed(i, ch);
    }
    lexer.close(chars.len());
    lexer.tokens
}

/// How an open operator takes the next punctuation char.
enum Grow {
    Extend,
    /// Hand the open run's last char to a new token that also takes `ch`.
    Split,
    No,
}

struct Lexer<'a> {
    chars: &'a [char],
    syntax: Option<&'a SyntaxDefinition>,
    tokens: Vec<Token>,
    /// Start column and lexical class of the token being built.
    open: Option<(usize, TokenClass)>,
}

impl Lexer<'_> {
    fn feed(&mut self, i: usize, ch: char) {
        if ch.is_whitespace() {
            self.close(i);
            return;
        }

        match self.open {
            Some((_, TokenClass::Number)) if continues_number(ch) => return,
            Some((_, TokenClass::Word)) if continues_word(ch) => return,
            _ => {}
        }

        if starts_word(ch) {
            self.start(i, TokenClass::Word);
        } else if starts_number(ch) {
            self.start(i, TokenClass::Number);
        } else {
            match self.grow_operator(i, ch) {
                Grow::Extend => {}
                Grow::Split => {
                    self.close(i - 1);
                    self.open = Some((i - 1, TokenClass::Operator));
                }
                Grow::No => self.start(i, TokenClass::Operator),
            }
        }
    }

    fn grow_operator(&self, i: usize, ch: char) -> Grow {
        let Some((start, TokenClass::Operator)) = self.open else {
            return Grow::No;
        };
        let open = &self.chars[start..i];
        if open.len() == 1 && open[0] == ch && !is_bracket(ch) {
            return Grow::Extend;
        }
        let Some(syntax) = self.syntax else {
            return Grow::No;
        };
        let grown = |text: &[char]| {
            let mut grown: String = text.iter().collect();
            grown.push(ch);
            grown
        };

        if syntax.is_marker_prefix(&grown(open)) {
            return Grow::Extend;
        }
        // `**/`: the run's last char starts a marker with `ch`. A run that
        // already is a marker stays whole.
        let last = &open[open.len() - 1..];
        if open.len() > 1
            && syntax.is_marker_prefix(&grown(last))
            && !syntax.is_marker(&open.iter().collect::<String>())
        {
            return Grow::Split;
        }
        Grow::No
    }

    fn start(&mut self, i: usize, class: TokenClass) {
        self.close(i);
        self.open = Some((i, class));
    }

    fn close(&mut self, end: usize) {
        let Some((start, mut class)) = self.open.take() else {
            return;
        };
        let text: String = self.chars[start..end].iter().collect();
        if class == TokenClass::Word && self.syntax.is_some_and(|s| s.is_keyword(&text)) {
            class = TokenClass::Keyword;
        }
        self.tokens.push(Token {
            start,
            end,
            text,
            class,
        });
    }
}
