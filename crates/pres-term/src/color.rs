// SPDX-License-Identifier: MIT
//
// Terminal colors.
//
// pres only ever paints a foreground color per cell, picked from the
// terminal's own palette so highlighting adapts to the user's theme.
// Truecolor is kept for terminals that the user configures that way.

use std::fmt;

/// A foreground color as the terminal understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's default foreground (SGR 39).
    #[default]
    Default,
    /// An index into the 256-color palette. 0–15 are the user's ANSI colors.
    Ansi256(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Ansi256(0);
    pub const RED: Self = Self::Ansi256(1);
    pub const GREEN: Self = Self::Ansi256(2);
    pub const YELLOW: Self = Self::Ansi256(3);
    pub const BLUE: Self = Self::Ansi256(4);
    pub const MAGENTA: Self = Self::Ansi256(5);
    pub const CYAN: Self = Self::Ansi256(6);
    pub const WHITE: Self = Self::Ansi256(7);
    pub const BRIGHT_BLACK: Self = Self::Ansi256(8);

    /// True for [`Color::Default`].
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse a color name as used in configuration: `default`, one of the
    /// eight ANSI names (optionally prefixed `bright-`), a palette index
    /// `0`–`255`, or `#rrggbb`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("default") {
            return Some(Self::Default);
        }
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Self::Rgb(r, g, b));
        }
        if let Ok(idx) = s.parse::<u8>() {
            return Some(Self::Ansi256(idx));
        }
        let (bright, name) = s
            .strip_prefix("bright-")
            .map_or((false, s), |rest| (true, rest));
        let base = match name {
            "black" => 0,
            "red" => 1,
            "green" => 2,
            "yellow" => 3,
            "blue" => 4,
            "magenta" => 5,
            "cyan" => 6,
            "white" => 7,
            _ => return None,
        };
        Some(Self::Ansi256(if bright { base + 8 } else { base }))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Ansi256(idx) => write!(f, "{idx}"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_default() {
        assert!(Color::default().is_default());
        assert!(!Color::RED.is_default());
    }

    #[test]
    fn parse_names() {
        assert_eq!(Color::parse("default"), Some(Color::Default));
        assert_eq!(Color::parse("magenta"), Some(Color::MAGENTA));
        assert_eq!(Color::parse("bright-black"), Some(Color::BRIGHT_BLACK));
        assert_eq!(Color::parse("bright-cyan"), Some(Color::Ansi256(14)));
    }

    #[test]
    fn parse_index_and_hex() {
        assert_eq!(Color::parse("208"), Some(Color::Ansi256(208)));
        assert_eq!(Color::parse("#ff8000"), Some(Color::Rgb(255, 128, 0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Color::parse("mauve"), None);
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("256"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for c in [Color::Default, Color::GREEN, Color::Rgb(1, 2, 3)] {
            assert_eq!(Color::parse(&c.to_string()), Some(c));
        }
    }
}
