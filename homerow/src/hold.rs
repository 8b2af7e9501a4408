//! Reference counting for the held left button.
//!
//! The button goes down when the first hold key is pressed and comes up when the last one is
//! released. Auto-repeat presses and releases of keys that were never counted do nothing, so
//! the button can never be released twice or left down after every hold key is up.

use crate::key::KeyToken;
use rustc_hash::FxHashSet;

/// Transition of the held button caused by a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// First hold key went down; press the button.
    Rising,
    /// Last hold key came up; release the button.
    Falling,
    /// Count changed or stayed put without crossing zero.
    Level,
}

#[derive(Debug, Clone, Default)]
pub struct HoldCounter {
    active: FxHashSet<KeyToken>,
}

impl HoldCounter {
    pub fn activate(&mut self, token: KeyToken) -> Edge {
        let was_idle = self.active.is_empty();
        if self.active.insert(token) && was_idle {
            Edge::Rising
        } else {
            Edge::Level
        }
    }

    pub fn deactivate(&mut self, token: &KeyToken) -> Edge {
        if self.active.remove(token) && self.active.is_empty() {
            Edge::Falling
        } else {
            Edge::Level
        }
    }

    /// Forgets every held key. Returns true if the button was down.
    pub fn reset(&mut self) -> bool {
        let was_down = !self.active.is_empty();
        self.active.clear();
        was_down
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    pub fn is_down(&self) -> bool {
        !self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: KeyToken = KeyToken::Char('a');
    const B: KeyToken = KeyToken::Char('b');

    #[test]
    fn button_follows_first_press_and_last_release() {
        let mut hold = HoldCounter::default();
        assert_eq!(hold.activate(A), Edge::Rising);
        assert_eq!(hold.activate(B), Edge::Level);
        assert_eq!(hold.count(), 2);
        assert_eq!(hold.deactivate(&A), Edge::Level);
        assert_eq!(hold.deactivate(&B), Edge::Falling);
        assert!(!hold.is_down());
    }

    #[test]
    fn repeats_and_stray_releases_are_ignored() {
        let mut hold = HoldCounter::default();
        assert_eq!(hold.deactivate(&A), Edge::Level);
        assert_eq!(hold.activate(A), Edge::Rising);
        assert_eq!(hold.activate(A), Edge::Level);
        assert_eq!(hold.count(), 1);
        assert_eq!(hold.deactivate(&A), Edge::Falling);
        assert_eq!(hold.deactivate(&A), Edge::Level);
    }

    #[test]
    fn reset_reports_whether_button_was_down() {
        let mut hold = HoldCounter::default();
        assert!(!hold.reset());
        hold.activate(A);
        assert!(hold.reset());
        assert_eq!(hold.count(), 0);
    }
}
