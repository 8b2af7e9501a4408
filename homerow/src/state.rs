//! Key state tracked across events: held modifiers and held movement/scroll keys.

use crate::{
    action::{Direction, ScrollDirection},
    key::{KeyToken, Modifier, NamedKey},
};
use rustc_hash::FxHashMap;

/// Left and right keys of one modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sides {
    left: bool,
    right: bool,
}

impl Sides {
    fn any(self) -> bool {
        self.left || self.right
    }
}

/// Modifier keys currently held down. Left and right keys are tracked separately, so a
/// modifier stays held until both are up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    ctrl: Sides,
    shift: Sides,
    alt: Sides,
}

impl Modifiers {
    /// Records a press or release of `token`. Tokens that are not modifiers are ignored.
    pub fn set(&mut self, token: KeyToken, held: bool) {
        let KeyToken::Named(key) = token else {
            return;
        };
        let side = match key {
            NamedKey::CtrlLeft => &mut self.ctrl.left,
            NamedKey::CtrlRight => &mut self.ctrl.right,
            NamedKey::ShiftLeft => &mut self.shift.left,
            NamedKey::ShiftRight => &mut self.shift.right,
            NamedKey::AltLeft => &mut self.alt.left,
            NamedKey::AltRight => &mut self.alt.right,
            _ => return,
        };
        *side = held;
    }

    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl.any(),
            Modifier::Shift => self.shift.any(),
            Modifier::Alt => self.alt.any(),
        }
    }

    pub fn ctrl(&self) -> bool {
        self.ctrl.any()
    }

    pub fn shift(&self) -> bool {
        self.shift.any()
    }

    pub fn alt(&self) -> bool {
        self.alt.any()
    }
}

/// What a held key asks the movement engine to do on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Move(Direction),
    Scroll(ScrollDirection),
}

/// The set of directions commanded this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Directions {
    pub fn contains(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    fn insert(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.up = true,
            Direction::Down => self.down = true,
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Held keys that drive continuous movement or scrolling.
///
/// Keyed by token, so a direction stays active while any of its keys is still down:
/// pressing `i` and `up` together and then releasing `up` keeps moving up.
#[derive(Debug, Clone, Default)]
pub struct ActiveIntents {
    held: FxHashMap<KeyToken, Intent>,
}

impl ActiveIntents {
    /// Records `token` as commanding `direction`. Returns true if the direction was not
    /// already commanded by another held key.
    pub fn press_move(&mut self, token: KeyToken, direction: Direction) -> bool {
        let was_active = self.movement().contains(direction);
        self.held.insert(token, Intent::Move(direction));
        !was_active
    }

    pub fn press_scroll(&mut self, token: KeyToken, direction: ScrollDirection) {
        self.held.insert(token, Intent::Scroll(direction));
    }

    /// Forgets `token`, returning what it was commanding.
    pub fn release(&mut self, token: &KeyToken) -> Option<Intent> {
        self.held.remove(token)
    }

    pub fn movement(&self) -> Directions {
        let mut directions = Directions::default();
        for intent in self.held.values() {
            if let Intent::Move(direction) = intent {
                directions.insert(*direction);
            }
        }
        directions
    }

    /// Net scroll direction: +1 up, -1 down, 0 when nothing or both are held.
    pub fn scroll(&self) -> i32 {
        let (mut up, mut down) = (false, false);
        for intent in self.held.values() {
            match intent {
                Intent::Scroll(ScrollDirection::Up) => up = true,
                Intent::Scroll(ScrollDirection::Down) => down = true,
                Intent::Move(_) => {},
            }
        }
        i32::from(up) - i32::from(down)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_survives_release_of_one_of_two_keys() {
        let mut intents = ActiveIntents::default();
        assert!(intents.press_move(KeyToken::Char('i'), Direction::Up));
        assert!(!intents.press_move(KeyToken::parse("up").unwrap(), Direction::Up));

        intents.release(&KeyToken::parse("up").unwrap());
        assert!(intents.movement().up);

        intents.release(&KeyToken::Char('i'));
        assert!(intents.movement().is_empty());
        assert!(intents.is_empty());
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut intents = ActiveIntents::default();
        assert!(intents.press_move(KeyToken::Char('l'), Direction::Right));
        assert!(!intents.press_move(KeyToken::Char('l'), Direction::Right));
        assert_eq!(intents.len(), 1);
    }

    #[test]
    fn opposing_scroll_keys_cancel() {
        let mut intents = ActiveIntents::default();
        intents.press_scroll(KeyToken::Char('u'), ScrollDirection::Up);
        assert_eq!(intents.scroll(), 1);
        intents.press_scroll(KeyToken::Char('m'), ScrollDirection::Down);
        assert_eq!(intents.scroll(), 0);
        intents.release(&KeyToken::Char('u'));
        assert_eq!(intents.scroll(), -1);
    }

    #[test]
    fn modifiers() {
        let ctrl = KeyToken::parse("ctrl").unwrap();
        let mut modifiers = Modifiers::default();
        modifiers.set(ctrl, true);
        assert!(modifiers.is_held(Modifier::Ctrl));
        assert!(modifiers.ctrl());
        assert!(!modifiers.alt());
        modifiers.set(KeyToken::Char('a'), true);
        modifiers.set(ctrl, false);
        assert_eq!(modifiers, Modifiers::default());
    }

    #[test]
    fn modifier_held_until_both_sides_are_up() {
        let (alt, alt_r) = (
            KeyToken::parse("alt").unwrap(),
            KeyToken::parse("alt_r").unwrap(),
        );
        let mut modifiers = Modifiers::default();
        modifiers.set(alt, true);
        modifiers.set(alt_r, true);
        modifiers.set(alt, false);
        assert!(modifiers.alt());
        modifiers.set(alt_r, false);
        assert!(!modifiers.alt());
    }
}
