//! # pres-editor — editing core for pres
//!
//! - **[`position`]** — `Position` (line, col), 0-indexed
//! - **[`buffer`]** — `Buffer`, a rope of lines with single-character edits
//! - **[`syntax`]** — per-file-type keyword and marker sets, loaded from JSON
//! - **[`lexer`]** — single-line tokenizer
//! - **[`syntax_state`]** — string, comment and block state across tokens and lines
//! - **[`highlight`]** — full and single-line highlighting, token colors
//! - **[`word`]** — word motions
//! - **[`viewport`]** — cursor, virtual column and viewport moved together
//! - **[`keymap`]** — terminal keys to editor keys
//! - **[`document`]** — one key in, mutate → re-highlight → move
//! - **[`session`]** — last cursor position per file

pub mod buffer;
pub mod document;
pub mod highlight;
pub mod keymap;
pub mod lexer;
pub mod position;
pub mod session;
pub mod syntax;
pub mod syntax_state;
pub mod viewport;
pub mod word;
