//! Normalized identifiers for physical keys.
//!
//! A [`KeyToken`] is what every key source resolves its raw events to before anything else
//! looks at them. Two tokens are equal when they name the same physical key, regardless of
//! how the source spelled it: `"I"`, `"i"` and `'i'` are one token, as are `"semicolon"` and
//! `";"`.
//!
//! # Token syntax
//!
//! - Printable characters stand for themselves and are lowercased (`"l"`, `"U"`, `"0"`)
//! - Symbols may be written literally or by name (`";"` or `"semicolon"`)
//! - Special keys use their name, case-insensitively (`"Up"`, `"space"`, `"Escape"`)
//! - Modifiers use `alt`, `alt_r`, `ctrl`, `ctrl_r`, `shift`, `shift_r`, `super`

use std::{fmt, str::FromStr};

/// Modifier keys the controller tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
}

/// Keys that are not identified by the character they type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedKey {
    Up,
    Down,
    Left,
    Right,
    Space,
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    CapsLock,
    AltLeft,
    AltRight,
    CtrlLeft,
    CtrlRight,
    ShiftLeft,
    ShiftRight,
    SuperLeft,
    SuperRight,
    F(u8),
}

const NAMED: &[(&str, NamedKey)] = &[
    ("up", NamedKey::Up),
    ("down", NamedKey::Down),
    ("left", NamedKey::Left),
    ("right", NamedKey::Right),
    ("space", NamedKey::Space),
    ("escape", NamedKey::Escape),
    ("enter", NamedKey::Enter),
    ("tab", NamedKey::Tab),
    ("backspace", NamedKey::Backspace),
    ("delete", NamedKey::Delete),
    ("insert", NamedKey::Insert),
    ("home", NamedKey::Home),
    ("end", NamedKey::End),
    ("page_up", NamedKey::PageUp),
    ("page_down", NamedKey::PageDown),
    ("caps_lock", NamedKey::CapsLock),
    ("alt", NamedKey::AltLeft),
    ("alt_r", NamedKey::AltRight),
    ("ctrl", NamedKey::CtrlLeft),
    ("ctrl_r", NamedKey::CtrlRight),
    ("shift", NamedKey::ShiftLeft),
    ("shift_r", NamedKey::ShiftRight),
    ("super", NamedKey::SuperLeft),
    ("super_r", NamedKey::SuperRight),
];

/// Alternate spellings accepted on input. Never produced by [`fmt::Display`].
const NAMED_ALIASES: &[(&str, NamedKey)] = &[
    ("arrowup", NamedKey::Up),
    ("arrowdown", NamedKey::Down),
    ("arrowleft", NamedKey::Left),
    ("arrowright", NamedKey::Right),
    ("esc", NamedKey::Escape),
    ("return", NamedKey::Enter),
    ("del", NamedKey::Delete),
    ("pageup", NamedKey::PageUp),
    ("pgup", NamedKey::PageUp),
    ("pagedown", NamedKey::PageDown),
    ("pgdn", NamedKey::PageDown),
    ("capslock", NamedKey::CapsLock),
    ("alt_l", NamedKey::AltLeft),
    ("altgr", NamedKey::AltRight),
    ("ctrl_l", NamedKey::CtrlLeft),
    ("control", NamedKey::CtrlLeft),
    ("shift_l", NamedKey::ShiftLeft),
    ("super_l", NamedKey::SuperLeft),
    ("meta", NamedKey::SuperLeft),
];

/// Symbol characters that also have a spelled-out name.
const SYMBOLS: &[(&str, char)] = &[
    ("semicolon", ';'),
    ("apostrophe", '\''),
    ("comma", ','),
    ("period", '.'),
    ("slash", '/'),
    ("backslash", '\\'),
    ("minus", '-'),
    ("equal", '='),
    ("grave", '`'),
    ("bracketleft", '['),
    ("bracketright", ']'),
];

impl NamedKey {
    pub fn modifier(self) -> Option<Modifier> {
        match self {
            NamedKey::AltLeft | NamedKey::AltRight => Some(Modifier::Alt),
            NamedKey::CtrlLeft | NamedKey::CtrlRight => Some(Modifier::Ctrl),
            NamedKey::ShiftLeft | NamedKey::ShiftRight => Some(Modifier::Shift),
            _ => None,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            return (1..=24).contains(&n).then_some(NamedKey::F(n));
        }
        NAMED
            .iter()
            .chain(NAMED_ALIASES)
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, key)| *key)
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let NamedKey::F(n) = self {
            return write!(f, "f{n}");
        }
        let name = NAMED
            .iter()
            .find(|(_, key)| key == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

/// A case-normalized physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

impl KeyToken {
    /// Token for a typed character. Whitespace maps to the matching named key.
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => KeyToken::Named(NamedKey::Space),
            '\t' => KeyToken::Named(NamedKey::Tab),
            '\n' | '\r' => KeyToken::Named(NamedKey::Enter),
            _ => KeyToken::Char(c.to_lowercase().next().unwrap_or(c)),
        }
    }

    pub fn named(key: NamedKey) -> Self {
        KeyToken::Named(key)
    }

    /// Parses a token from its textual form, returning `None` for anything unrecognized.
    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return None,
            (Some(c), None) => return Some(Self::from_char(c)),
            _ => {},
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().count() == 1 {
            return trimmed.chars().next().map(Self::from_char);
        }

        let lower = trimmed.to_ascii_lowercase();
        if let Some((_, c)) = SYMBOLS.iter().find(|(name, _)| *name == lower) {
            return Some(KeyToken::Char(*c));
        }
        NamedKey::parse(&lower).map(KeyToken::Named)
    }

    /// The modifier this key acts as, if any.
    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            KeyToken::Named(named) => named.modifier(),
            KeyToken::Char(_) => None,
        }
    }

    pub fn is_escape(&self) -> bool {
        *self == KeyToken::Named(NamedKey::Escape)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Named(named) => named.fmt(f),
            KeyToken::Char(c) => match SYMBOLS.iter().find(|(_, symbol)| symbol == c) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "{c}"),
            },
        }
    }
}

/// Error returned by [`KeyToken::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key token: {:?}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for KeyToken {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyToken::parse(s).ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// Whether an event reports a key going down or coming up.
///
/// Auto-repeat is reported as [`Phase::Press`]; every consumer treats presses idempotently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Press,
    Release,
}

/// A key event after the source has resolved it to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub token: KeyToken,
    pub phase: Phase,
}

impl KeyEvent {
    pub fn press(token: KeyToken) -> Self {
        Self {
            token,
            phase: Phase::Press,
        }
    }

    pub fn release(token: KeyToken) -> Self {
        Self {
            token,
            phase: Phase::Release,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_are_lowercased() {
        assert_eq!(KeyToken::parse("I"), Some(KeyToken::Char('i')));
        assert_eq!(KeyToken::from_char('L'), KeyToken::Char('l'));
    }

    #[test]
    fn named_keys_are_case_insensitive() {
        assert_eq!(KeyToken::parse("Up"), Some(KeyToken::Named(NamedKey::Up)));
        assert_eq!(
            KeyToken::parse("SPACE"),
            Some(KeyToken::Named(NamedKey::Space))
        );
        assert_eq!(
            KeyToken::parse("esc"),
            Some(KeyToken::Named(NamedKey::Escape))
        );
    }

    #[test]
    fn symbol_names_match_literal_symbols() {
        assert_eq!(KeyToken::parse("semicolon"), KeyToken::parse(";"));
        assert_eq!(KeyToken::parse(";"), Some(KeyToken::Char(';')));
    }

    #[test]
    fn space_character_is_the_space_key() {
        assert_eq!(KeyToken::parse(" "), Some(KeyToken::Named(NamedKey::Space)));
    }

    #[test]
    fn function_keys() {
        assert_eq!(
            KeyToken::parse("F5"),
            Some(KeyToken::Named(NamedKey::F(5)))
        );
        assert_eq!(KeyToken::parse("f25"), None);
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert_eq!(KeyToken::parse(""), None);
        assert_eq!(KeyToken::parse("   "), None);
        assert_eq!(KeyToken::parse("hyperdrive"), None);
        assert!("nope-nope".parse::<KeyToken>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for input in ["up", "space", "semicolon", "l", "alt_r", "f12", "page_down"] {
            let token = KeyToken::parse(input).unwrap();
            assert_eq!(token.to_string(), input);
            assert_eq!(KeyToken::parse(&token.to_string()), Some(token));
        }
    }

    #[test]
    fn modifiers() {
        assert_eq!(
            KeyToken::parse("alt_r").and_then(|t| t.modifier()),
            Some(Modifier::Alt)
        );
        assert_eq!(
            KeyToken::parse("Control").and_then(|t| t.modifier()),
            Some(Modifier::Ctrl)
        );
        assert_eq!(KeyToken::parse("super").and_then(|t| t.modifier()), None);
        assert_eq!(KeyToken::Char('a').modifier(), None);
    }
}
