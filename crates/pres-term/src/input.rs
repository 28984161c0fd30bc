// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw tty bytes into key events. pres only enables plain raw mode
// (no mouse, no bracketed paste, no keyboard protocol upgrades), so the
// parser handles exactly what legacy terminals send:
//
// - CSI sequences with xterm modifiers (`ESC [ 1 ; 5 A` is Ctrl+Up)
// - Tilde-terminated editing keys (`ESC [ 5 ~` is PageUp)
// - rxvt variants: `ESC [ a..d` (Shift+arrows), `ESC O a..d`
//   (Ctrl+arrows) and the `^`/`$` finals for Ctrl/Shift editing keys
// - SS3 sequences (application cursor mode arrows, Home/End, F1-F4)
// - Alt+key (ESC followed by a printable character)
// - Control characters and UTF-8 multi-byte characters
//
// The parser buffers incomplete sequences across `advance` calls. A lone
// ESC stays pending until the caller decides no more bytes are coming
// and calls `flush`.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// A key with Ctrl held.
    #[inline]
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(code, Modifiers::CTRL)
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character. Control characters arrive as their letter with
    /// [`Modifiers::CTRL`] set (Ctrl+D is `Char('d')` + CTRL).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags, in the xterm CSI encoding
    /// (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental key parser.
///
/// Feed raw bytes with [`advance`](Parser::advance). Incomplete sequences
/// are kept and completed by later calls. After a short quiet period call
/// [`flush`](Parser::flush) to turn a pending lone ESC into an Escape key.
///
/// # Examples
///
/// ```
/// use pres_term::input::{KeyCode, KeyEvent, Modifiers, Parser};
///
/// let mut parser = Parser::new();
/// let keys = parser.advance(b"\x1b[1;5C");
/// assert_eq!(keys, vec![KeyEvent::new(KeyCode::Right, Modifiers::CTRL)]);
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed bytes and return every key that could be parsed.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => {
                    tracing::trace!(bytes = ?&self.buf[pos..pos + n], "unrecognized input");
                    pos += n;
                }
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Are there buffered bytes waiting for more input?
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys: ESC becomes Escape, anything
    /// else printable becomes a character.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                b @ 0x01..=0x1A => Some(KeyEvent::ctrl(KeyCode::Char(ctrl_letter(b)))),
                0x7F => Some(KeyEvent::plain(KeyCode::Backspace)),
                b @ 0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(char::from(b)))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        keys
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    Key(KeyEvent, usize),
    Incomplete,
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Key(KeyEvent::ctrl(KeyCode::Char('@')), 1),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Key(KeyEvent::ctrl(KeyCode::Char(ctrl_letter(b))), 1),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::plain(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Key(KeyEvent::new(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent::new(KeyCode::Char(char::from(b)), Modifiers::ALT),
            2,
        ),
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, then one
    // final byte. rxvt uses `^` (0x5E) and `$` (0x24) as finals for
    // Ctrl/Shift editing keys, so `$` is accepted as a final too.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) || b == b'$' {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let param_mods = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let key = match final_byte {
        b'~' | b'^' | b'$' => {
            let modifiers = match final_byte {
                b'^' => Modifiers::CTRL,
                b'$' => Modifiers::SHIFT,
                _ => param_mods,
            };
            let Some(code) = tilde_key(params.first().copied().unwrap_or(0)) else {
                return Parsed::Skip(consumed);
            };
            KeyEvent::new(code, modifiers)
        }
        b'A' => KeyEvent::new(KeyCode::Up, param_mods),
        b'B' => KeyEvent::new(KeyCode::Down, param_mods),
        b'C' => KeyEvent::new(KeyCode::Right, param_mods),
        b'D' => KeyEvent::new(KeyCode::Left, param_mods),
        b'H' => KeyEvent::new(KeyCode::Home, param_mods),
        b'F' => KeyEvent::new(KeyCode::End, param_mods),
        b'P' => KeyEvent::new(KeyCode::F(1), param_mods),
        b'Q' => KeyEvent::new(KeyCode::F(2), param_mods),
        b'R' => KeyEvent::new(KeyCode::F(3), param_mods),
        b'S' => KeyEvent::new(KeyCode::F(4), param_mods),
        b'Z' => KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT),
        // rxvt Shift+arrows.
        b'a' => KeyEvent::new(KeyCode::Up, Modifiers::SHIFT),
        b'b' => KeyEvent::new(KeyCode::Down, Modifiers::SHIFT),
        b'c' => KeyEvent::new(KeyCode::Right, Modifiers::SHIFT),
        b'd' => KeyEvent::new(KeyCode::Left, Modifiers::SHIFT),
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(key, consumed)
}

/// The key named by the first parameter of a `~`-terminated sequence.
#[allow(clippy::cast_possible_truncation)]
const fn tilde_key(param: u16) -> Option<KeyCode> {
    let code = match param {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((param - 10) as u8),
        17..=21 => KeyCode::F((param - 11) as u8),
        23..=26 => KeyCode::F((param - 12) as u8),
        28 | 29 => KeyCode::F((param - 13) as u8),
        31..=34 => KeyCode::F((param - 14) as u8),
        _ => return None,
    };
    Some(code)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&third) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let key = match third {
        b'A' => KeyEvent::plain(KeyCode::Up),
        b'B' => KeyEvent::plain(KeyCode::Down),
        b'C' => KeyEvent::plain(KeyCode::Right),
        b'D' => KeyEvent::plain(KeyCode::Left),
        b'H' => KeyEvent::plain(KeyCode::Home),
        b'F' => KeyEvent::plain(KeyCode::End),
        b'P' => KeyEvent::plain(KeyCode::F(1)),
        b'Q' => KeyEvent::plain(KeyCode::F(2)),
        b'R' => KeyEvent::plain(KeyCode::F(3)),
        b'S' => KeyEvent::plain(KeyCode::F(4)),
        // rxvt Ctrl+arrows.
        b'a' => KeyEvent::ctrl(KeyCode::Up),
        b'b' => KeyEvent::ctrl(KeyCode::Down),
        b'c' => KeyEvent::ctrl(KeyCode::Right),
        b'd' => KeyEvent::ctrl(KeyCode::Left),
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(key, 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// The letter a C0 control byte is typed with (0x04 → 'd').
const fn ctrl_letter(byte: u8) -> char {
    (byte + b'a' - 1) as char
}

/// Semicolon-separated decimal parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// Decode an xterm modifier parameter (`1 + bitmask`).
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Byte length of a UTF-8 character from its lead byte; 0 if invalid.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<KeyEvent> {
        Parser::new().advance(data)
    }

    fn one(data: &[u8]) -> KeyEvent {
        let keys = parse(data);
        assert_eq!(keys.len(), 1, "expected one key from {data:?}, got {keys:?}");
        keys[0]
    }

    // ── Plain bytes ─────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(
            parse(b"ab"),
            vec![
                KeyEvent::plain(KeyCode::Char('a')),
                KeyEvent::plain(KeyCode::Char('b'))
            ]
        );
    }

    #[test]
    fn control_chars() {
        assert_eq!(one(b"\x04"), KeyEvent::ctrl(KeyCode::Char('d')));
        assert_eq!(one(b"\x18"), KeyEvent::ctrl(KeyCode::Char('x')));
        assert_eq!(one(b"\x03"), KeyEvent::ctrl(KeyCode::Char('c')));
    }

    #[test]
    fn backspace_both_encodings() {
        assert_eq!(one(b"\x7f"), KeyEvent::plain(KeyCode::Backspace));
        assert_eq!(one(b"\x08"), KeyEvent::plain(KeyCode::Backspace));
    }

    #[test]
    fn enter_and_tab() {
        assert_eq!(one(b"\r"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(one(b"\t"), KeyEvent::plain(KeyCode::Tab));
    }

    #[test]
    fn utf8_char() {
        assert_eq!(one("é".as_bytes()), KeyEvent::plain(KeyCode::Char('é')));
        assert_eq!(one("日".as_bytes()), KeyEvent::plain(KeyCode::Char('日')));
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "é".as_bytes();
        let mut parser = Parser::new();
        assert!(parser.advance(&bytes[..1]).is_empty());
        assert_eq!(
            parser.advance(&bytes[1..]),
            vec![KeyEvent::plain(KeyCode::Char('é'))]
        );
    }

    // ── CSI ─────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(one(b"\x1b[A"), KeyEvent::plain(KeyCode::Up));
        assert_eq!(one(b"\x1b[B"), KeyEvent::plain(KeyCode::Down));
        assert_eq!(one(b"\x1b[C"), KeyEvent::plain(KeyCode::Right));
        assert_eq!(one(b"\x1b[D"), KeyEvent::plain(KeyCode::Left));
    }

    #[test]
    fn ctrl_arrows_xterm() {
        assert_eq!(one(b"\x1b[1;5A"), KeyEvent::ctrl(KeyCode::Up));
        assert_eq!(one(b"\x1b[1;5D"), KeyEvent::ctrl(KeyCode::Left));
    }

    #[test]
    fn ctrl_home_end_xterm() {
        assert_eq!(one(b"\x1b[1;5H"), KeyEvent::ctrl(KeyCode::Home));
        assert_eq!(one(b"\x1b[1;5F"), KeyEvent::ctrl(KeyCode::End));
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(one(b"\x1b[3~"), KeyEvent::plain(KeyCode::Delete));
        assert_eq!(one(b"\x1b[5~"), KeyEvent::plain(KeyCode::PageUp));
        assert_eq!(one(b"\x1b[6~"), KeyEvent::plain(KeyCode::PageDown));
        assert_eq!(one(b"\x1b[1~"), KeyEvent::plain(KeyCode::Home));
        assert_eq!(one(b"\x1b[4~"), KeyEvent::plain(KeyCode::End));
        assert_eq!(one(b"\x1b[15~"), KeyEvent::plain(KeyCode::F(5)));
        assert_eq!(one(b"\x1b[24~"), KeyEvent::plain(KeyCode::F(12)));
    }

    #[test]
    fn tilde_with_modifiers() {
        assert_eq!(one(b"\x1b[3;5~"), KeyEvent::ctrl(KeyCode::Delete));
    }

    #[test]
    fn rxvt_ctrl_keys() {
        assert_eq!(one(b"\x1b[7^"), KeyEvent::ctrl(KeyCode::Home));
        assert_eq!(one(b"\x1b[8^"), KeyEvent::ctrl(KeyCode::End));
        assert_eq!(one(b"\x1bOa"), KeyEvent::ctrl(KeyCode::Up));
        assert_eq!(one(b"\x1bOd"), KeyEvent::ctrl(KeyCode::Left));
        assert_eq!(
            one(b"\x1b[c"),
            KeyEvent::new(KeyCode::Right, Modifiers::SHIFT)
        );
        assert_eq!(
            one(b"\x1b[7$"),
            KeyEvent::new(KeyCode::Home, Modifiers::SHIFT)
        );
    }

    #[test]
    fn ss3_keys() {
        assert_eq!(one(b"\x1bOA"), KeyEvent::plain(KeyCode::Up));
        assert_eq!(one(b"\x1bOH"), KeyEvent::plain(KeyCode::Home));
        assert_eq!(one(b"\x1bOP"), KeyEvent::plain(KeyCode::F(1)));
    }

    #[test]
    fn alt_char() {
        assert_eq!(
            one(b"\x1bx"),
            KeyEvent::new(KeyCode::Char('x'), Modifiers::ALT)
        );
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(parse(b"\x1b[99~a"), vec![KeyEvent::plain(KeyCode::Char('a'))]);
    }

    // ── Incomplete input ────────────────────────────────────────

    #[test]
    fn csi_split_across_reads() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[1;").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(b"5C"), vec![KeyEvent::ctrl(KeyCode::Right)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn lone_escape_needs_flush() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert_eq!(parser.flush(), vec![KeyEvent::plain(KeyCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn sequence_then_text() {
        assert_eq!(
            parse(b"\x1b[Ahi"),
            vec![
                KeyEvent::plain(KeyCode::Up),
                KeyEvent::plain(KeyCode::Char('h')),
                KeyEvent::plain(KeyCode::Char('i')),
            ]
        );
    }

    // ── Helpers ─────────────────────────────────────────────────

    #[test]
    fn params_parse() {
        assert_eq!(parse_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_params(b";5"), vec![0, 5]);
        assert!(parse_params(b"").is_empty());
    }

    #[test]
    fn modifier_decoding() {
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(6), Modifiers::SHIFT | Modifiers::CTRL);
    }
}
