//! Terminal keys → editor keys.
//!
//! | Key | [`EditKey`] |
//! |-----|-------------|
//! | arrows | `Up`, `Down`, `Left`, `Right` |
//! | Ctrl+Up / Ctrl+Down | `ScrollUp`, `ScrollDown` |
//! | Ctrl+Left / Ctrl+Right | `WordLeft`, `WordRight` |
//! | Alt+Left / Alt+Right | `ScrollLeft`, `ScrollRight` |
//! | PageUp / PageDown | `PageUp`, `PageDown` |
//! | Home / End | `LineHome`, `LineEnd` |
//! | Ctrl+Home / Ctrl+End | `BufferHome`, `BufferEnd` |
//! | Backspace (0x7F, and 0x08 which Ctrl+H sends) | `Backspace` |
//! | Delete | `Delete` |
//! | printable character | `Char` |
//! | Ctrl+D, Ctrl+X, Ctrl+C | `Quit` |
//!
//! Everything else, Enter and Tab included, has no binding.

use pres_term::input::{KeyCode, KeyEvent, Modifiers};

/// What a key asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    WordLeft,
    WordRight,
    LineHome,
    LineEnd,
    BufferHome,
    BufferEnd,
    Backspace,
    Delete,
    Char(char),
    Quit,
}

impl EditKey {
    /// Whether the key changes the buffer.
    #[must_use]
    pub const fn is_edit(self) -> bool {
        matches!(self, Self::Backspace | Self::Delete | Self::Char(_))
    }
}

/// Translate a terminal key. Unbound keys give `None`.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<EditKey> {
    let ctrl = key.modifiers.contains(Modifiers::CTRL);
    let alt = key.modifiers.contains(Modifiers::ALT);

    let mapped = match key.code {
        KeyCode::Char('d' | 'x' | 'c') if ctrl => Some(EditKey::Quit),
        KeyCode::Char(ch) if !ctrl && !alt && !ch.is_control() => Some(EditKey::Char(ch)),

        KeyCode::Up if ctrl => Some(EditKey::ScrollUp),
        KeyCode::Down if ctrl => Some(EditKey::ScrollDown),
        KeyCode::Left if ctrl => Some(EditKey::WordLeft),
        KeyCode::Right if ctrl => Some(EditKey::WordRight),
        KeyCode::Left if alt => Some(EditKey::ScrollLeft),
        KeyCode::Right if alt => Some(EditKey::ScrollRight),
        KeyCode::Home if ctrl => Some(EditKey::BufferHome),
        KeyCode::End if ctrl => Some(EditKey::BufferEnd),

        KeyCode::Up => Some(EditKey::Up),
        KeyCode::Down => Some(EditKey::Down),
        KeyCode::Left => Some(EditKey::Left),
        KeyCode::Right => Some(EditKey::Right),
        KeyCode::Home => Some(EditKey::LineHome),
        KeyCode::End => Some(EditKey::LineEnd),
        KeyCode::PageUp => Some(EditKey::PageUp),
        KeyCode::PageDown => Some(EditKey::PageDown),
        KeyCode::Backspace => Some(EditKey::Backspace),
        KeyCode::Delete => Some(EditKey::Delete),

        _ => None,
    };

    if mapped.is_none() {
        tracing::trace!(?key, "unbound key");
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pres_term::input::Parser;
    use pretty_assertions::assert_eq;

    fn with(code: KeyCode, modifiers: Modifiers) -> Option<EditKey> {
        map_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn quit_keys() {
        for ch in ['d', 'x', 'c'] {
            assert_eq!(map_key(KeyEvent::ctrl(KeyCode::Char(ch))), Some(EditKey::Quit));
        }
        assert_eq!(map_key(KeyEvent::ctrl(KeyCode::Char('q'))), None);
    }

    #[test]
    fn printable_chars() {
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Char('a'))), Some(EditKey::Char('a')));
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Char('日'))), Some(EditKey::Char('日')));
        assert_eq!(
            with(KeyCode::Char('A'), Modifiers::SHIFT),
            Some(EditKey::Char('A'))
        );
        assert_eq!(with(KeyCode::Char('a'), Modifiers::ALT), None);
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(with(KeyCode::Up, Modifiers::CTRL), Some(EditKey::ScrollUp));
        assert_eq!(with(KeyCode::Down, Modifiers::CTRL), Some(EditKey::ScrollDown));
        assert_eq!(with(KeyCode::Left, Modifiers::CTRL), Some(EditKey::WordLeft));
        assert_eq!(with(KeyCode::Right, Modifiers::CTRL), Some(EditKey::WordRight));
        assert_eq!(with(KeyCode::Left, Modifiers::ALT), Some(EditKey::ScrollLeft));
        assert_eq!(with(KeyCode::Right, Modifiers::ALT), Some(EditKey::ScrollRight));
        assert_eq!(with(KeyCode::Left, Modifiers::SHIFT), Some(EditKey::Left));
    }

    #[test]
    fn navigation() {
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Home)), Some(EditKey::LineHome));
        assert_eq!(map_key(KeyEvent::ctrl(KeyCode::Home)), Some(EditKey::BufferHome));
        assert_eq!(map_key(KeyEvent::ctrl(KeyCode::End)), Some(EditKey::BufferEnd));
        assert_eq!(map_key(KeyEvent::plain(KeyCode::PageDown)), Some(EditKey::PageDown));
    }

    #[test]
    fn deletion() {
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Backspace)), Some(EditKey::Backspace));
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Delete)), Some(EditKey::Delete));
    }

    #[test]
    fn backspace_bytes_from_the_terminal() {
        let keys: Vec<_> = Parser::new()
            .advance(b"\x7f\x08")
            .into_iter()
            .map(map_key)
            .collect();
        assert_eq!(keys, [Some(EditKey::Backspace), Some(EditKey::Backspace)]);
    }

    #[test]
    fn unbound() {
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Enter)), None);
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Tab)), None);
        assert_eq!(map_key(KeyEvent::plain(KeyCode::F(5))), None);
        assert_eq!(map_key(KeyEvent::plain(KeyCode::Escape)), None);
    }

    #[test]
    fn edit_keys() {
        assert!(EditKey::Char('x').is_edit());
        assert!(EditKey::Delete.is_edit());
        assert!(!EditKey::PageUp.is_edit());
    }
}
