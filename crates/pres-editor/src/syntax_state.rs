//! Cross-line syntax state.
//!
//! Runs over one line's lexer output and reclassifies tokens into the
//! string, comment and block classes. Only `in_block` survives the end of
//! a line; strings and comments always close at the line break.

use crate::lexer::{Token, TokenClass};
use crate::syntax::SyntaxDefinition;

/// State while walking one line. A fresh line starts with only `in_block`
/// carried over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LineState {
    in_block: bool,
    in_string: bool,
    in_comment: bool,
}

/// Reclassify `tokens` in place, starting inside a block if `in_block`.
///
/// Returns the `in_block` to carry into the next line. With no definition
/// the tokens are untouched and the flag passes through.
pub fn run(tokens: &mut [Token], in_block: bool, syntax: Option<&SyntaxDefinition>) -> bool {
    let Some(syntax) = syntax else {
        return in_block;
    };

    let mut state = LineState {
        in_block,
        ..LineState::default()
    };

    for token in tokens {
        if state.in_block {
            token.class = TokenClass::Block;
            if syntax.is_block_end(&token.text) {
                state.in_block = false;
            }
        } else if state.in_string {
            token.class = TokenClass::String;
            if syntax.is_string_delimiter(&token.text) {
                state.in_string = false;
            }
        } else if state.in_comment {
            token.class = TokenClass::Comment;
        } else if token.class == TokenClass::Operator {
            if syntax.is_block_start(&token.text) {
                state.in_block = true;
                token.class = TokenClass::Block;
            } else if syntax.is_string_delimiter(&token.text) {
                state.in_string = true;
                token.class = TokenClass::String;
            } else if syntax.is_comment_start(&token.text) {
                state.in_comment = true;
                token.class = TokenClass::Comment;
            }
        }
    }

    state.in_block
}

/// Tokenize and classify one line in a single call.
#[must_use]
pub fn classify_line(
    line: &str,
    in_block: bool,
    syntax: Option<&SyntaxDefinition>,
) -> (Vec<Token>, bool) {
    let mut tokens = crate::lexer::tokenize(line, syntax);
    let carry = run(&mut tokens, in_block, syntax);
    (tokens, carry)
}
