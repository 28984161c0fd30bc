// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. The renderer decides that. This module
// only knows the byte-level encoding of the terminal commands we use.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed for
// the terminal.

use std::io::{self, Write};

use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` (CUP). 0-indexed in, 1-indexed out.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_to_eol(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Switch to the alternate screen buffer.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Return to the main screen buffer.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Begin synchronized output (DEC 2026). Terminals without support ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Reset all SGR attributes (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Select the terminal's default foreground and background (SGR 39;49).
#[inline]
pub fn default_colors(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[39;49m")
}

/// Save the current SGR state on the terminal's stack (XTPUSHSGR).
#[inline]
pub fn push_colors(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[#{")
}

/// Restore the SGR state saved by [`push_colors`] (XTPOPSGR).
#[inline]
pub fn pop_colors(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[#}")
}

/// Set the foreground color.
///
/// Compact codes for the 16 ANSI colors (30–37, 90–97), the 256-color
/// form for indices 16–255, and truecolor for RGB.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Ansi256(idx) => {
            if idx < 8 {
                write!(w, "\x1b[{}m", 30 + u16::from(idx))
            } else if idx < 16 {
                write!(w, "\x1b[{}m", 82 + u16::from(idx))
            } else {
                write!(w, "\x1b[38;5;{idx}m")
            }
        }
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
    }
}

/// Toggle reverse video (SGR 7 / 27). Used for the status line.
#[inline]
pub fn reverse(w: &mut impl Write, on: bool) -> io::Result<()> {
    let seq: &[u8] = if on { b"\x1b[7m" } else { b"\x1b[27m" };
    w.write_all(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cursor_to_is_one_indexed() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn fg_standard_and_bright() {
        assert_eq!(emit(|w| fg(w, Color::RED)), "\x1b[31m");
        assert_eq!(emit(|w| fg(w, Color::BRIGHT_BLACK)), "\x1b[90m");
        assert_eq!(emit(|w| fg(w, Color::Ansi256(15))), "\x1b[97m");
    }

    #[test]
    fn fg_extended() {
        assert_eq!(emit(|w| fg(w, Color::Ansi256(208))), "\x1b[38;5;208m");
        assert_eq!(emit(|w| fg(w, Color::Rgb(1, 2, 3))), "\x1b[38;2;1;2;3m");
        assert_eq!(emit(|w| fg(w, Color::Default)), "\x1b[39m");
    }

    #[test]
    fn push_pop_pair() {
        assert_eq!(emit(|w| push_colors(w)), "\x1b[#{");
        assert_eq!(emit(|w| pop_colors(w)), "\x1b[#}");
    }

    #[test]
    fn reverse_toggle() {
        assert_eq!(emit(|w| reverse(w, true)), "\x1b[7m");
        assert_eq!(emit(|w| reverse(w, false)), "\x1b[27m");
    }
}
