//! Translation between evdev key codes and [`KeyToken`]s.
//!
//! Codes follow the US layout, which is what evdev reports regardless of the active
//! keymap.

use evdev::Key;
use homerow::{KeyToken, NamedKey};

const fn ch(c: char) -> KeyToken {
    KeyToken::Char(c)
}

const fn named(key: NamedKey) -> KeyToken {
    KeyToken::Named(key)
}

const TABLE: &[(Key, KeyToken)] = &[
    (Key::KEY_A, ch('a')),
    (Key::KEY_B, ch('b')),
    (Key::KEY_C, ch('c')),
    (Key::KEY_D, ch('d')),
    (Key::KEY_E, ch('e')),
    (Key::KEY_F, ch('f')),
    (Key::KEY_G, ch('g')),
    (Key::KEY_H, ch('h')),
    (Key::KEY_I, ch('i')),
    (Key::KEY_J, ch('j')),
    (Key::KEY_K, ch('k')),
    (Key::KEY_L, ch('l')),
    (Key::KEY_M, ch('m')),
    (Key::KEY_N, ch('n')),
    (Key::KEY_O, ch('o')),
    (Key::KEY_P, ch('p')),
    (Key::KEY_Q, ch('q')),
    (Key::KEY_R, ch('r')),
    (Key::KEY_S, ch('s')),
    (Key::KEY_T, ch('t')),
    (Key::KEY_U, ch('u')),
    (Key::KEY_V, ch('v')),
    (Key::KEY_W, ch('w')),
    (Key::KEY_X, ch('x')),
    (Key::KEY_Y, ch('y')),
    (Key::KEY_Z, ch('z')),
    (Key::KEY_1, ch('1')),
    (Key::KEY_2, ch('2')),
    (Key::KEY_3, ch('3')),
    (Key::KEY_4, ch('4')),
    (Key::KEY_5, ch('5')),
    (Key::KEY_6, ch('6')),
    (Key::KEY_7, ch('7')),
    (Key::KEY_8, ch('8')),
    (Key::KEY_9, ch('9')),
    (Key::KEY_0, ch('0')),
    (Key::KEY_SEMICOLON, ch(';')),
    (Key::KEY_APOSTROPHE, ch('\'')),
    (Key::KEY_COMMA, ch(',')),
    (Key::KEY_DOT, ch('.')),
    (Key::KEY_SLASH, ch('/')),
    (Key::KEY_BACKSLASH, ch('\\')),
    (Key::KEY_MINUS, ch('-')),
    (Key::KEY_EQUAL, ch('=')),
    (Key::KEY_GRAVE, ch('`')),
    (Key::KEY_LEFTBRACE, ch('[')),
    (Key::KEY_RIGHTBRACE, ch(']')),
    (Key::KEY_UP, named(NamedKey::Up)),
    (Key::KEY_DOWN, named(NamedKey::Down)),
    (Key::KEY_LEFT, named(NamedKey::Left)),
    (Key::KEY_RIGHT, named(NamedKey::Right)),
    (Key::KEY_SPACE, named(NamedKey::Space)),
    (Key::KEY_ESC, named(NamedKey::Escape)),
    (Key::KEY_ENTER, named(NamedKey::Enter)),
    (Key::KEY_TAB, named(NamedKey::Tab)),
    (Key::KEY_BACKSPACE, named(NamedKey::Backspace)),
    (Key::KEY_DELETE, named(NamedKey::Delete)),
    (Key::KEY_INSERT, named(NamedKey::Insert)),
    (Key::KEY_HOME, named(NamedKey::Home)),
    (Key::KEY_END, named(NamedKey::End)),
    (Key::KEY_PAGEUP, named(NamedKey::PageUp)),
    (Key::KEY_PAGEDOWN, named(NamedKey::PageDown)),
    (Key::KEY_CAPSLOCK, named(NamedKey::CapsLock)),
    (Key::KEY_LEFTALT, named(NamedKey::AltLeft)),
    (Key::KEY_RIGHTALT, named(NamedKey::AltRight)),
    (Key::KEY_LEFTCTRL, named(NamedKey::CtrlLeft)),
    (Key::KEY_RIGHTCTRL, named(NamedKey::CtrlRight)),
    (Key::KEY_LEFTSHIFT, named(NamedKey::ShiftLeft)),
    (Key::KEY_RIGHTSHIFT, named(NamedKey::ShiftRight)),
    (Key::KEY_LEFTMETA, named(NamedKey::SuperLeft)),
    (Key::KEY_RIGHTMETA, named(NamedKey::SuperRight)),
    (Key::KEY_F1, named(NamedKey::F(1))),
    (Key::KEY_F2, named(NamedKey::F(2))),
    (Key::KEY_F3, named(NamedKey::F(3))),
    (Key::KEY_F4, named(NamedKey::F(4))),
    (Key::KEY_F5, named(NamedKey::F(5))),
    (Key::KEY_F6, named(NamedKey::F(6))),
    (Key::KEY_F7, named(NamedKey::F(7))),
    (Key::KEY_F8, named(NamedKey::F(8))),
    (Key::KEY_F9, named(NamedKey::F(9))),
    (Key::KEY_F10, named(NamedKey::F(10))),
    (Key::KEY_F11, named(NamedKey::F(11))),
    (Key::KEY_F12, named(NamedKey::F(12))),
];

pub fn token_for(key: Key) -> Option<KeyToken> {
    TABLE
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, token)| *token)
}

pub fn key_for(token: &KeyToken) -> Option<Key> {
    TABLE
        .iter()
        .find(|(_, candidate)| candidate == token)
        .map(|(key, _)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_keys() {
        assert_eq!(token_for(Key::KEY_J), Some(KeyToken::Char('j')));
        assert_eq!(token_for(Key::KEY_SEMICOLON), KeyToken::parse("semicolon"));
        assert_eq!(token_for(Key::KEY_LEFTALT), KeyToken::parse("alt"));
        assert_eq!(token_for(Key::BTN_LEFT), None);
    }

    #[test]
    fn every_token_maps_back_to_its_key() {
        for (key, token) in TABLE {
            assert_eq!(key_for(token), Some(*key), "{token}");
        }
    }
}
