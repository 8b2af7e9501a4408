//! The fixed vocabulary of things a bound key can do.

use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Displacement of one step of `distance` pixels. Screen y grows downwards.
    pub fn delta(self, distance: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -distance),
            Direction::Down => (0, distance),
            Direction::Left => (-distance, 0),
            Direction::Right => (distance, 0),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Sign of a wheel tick in this direction; positive scrolls up.
    pub fn sign(self) -> i32 {
        match self {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        }
    }
}

/// Pointer buttons, numbered the way X11 and xdotool number them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    Left = 1,
    Middle = 2,
    Right = 3,
}

impl Button {
    pub fn number(self) -> u8 {
        self as u8
    }
}

/// A logical command resolved from a bound key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalAction {
    Navigate(Direction),
    Scroll(ScrollDirection),
    Click(Button),
    /// Keeps the left button down for as long as a bound key is held.
    HoldClick,
}

impl LogicalAction {
    /// Every action in the order bindings are listed.
    pub const ALL: [LogicalAction; 9] = [
        LogicalAction::Navigate(Direction::Up),
        LogicalAction::Navigate(Direction::Down),
        LogicalAction::Navigate(Direction::Left),
        LogicalAction::Navigate(Direction::Right),
        LogicalAction::Scroll(ScrollDirection::Up),
        LogicalAction::Scroll(ScrollDirection::Down),
        LogicalAction::Click(Button::Left),
        LogicalAction::Click(Button::Right),
        LogicalAction::HoldClick,
    ];

    /// Configuration name, e.g. `navigate:left` or `hold:left`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalAction::Navigate(d) => write!(f, "navigate:{}", d.name()),
            LogicalAction::Scroll(ScrollDirection::Up) => f.write_str("scroll:up"),
            LogicalAction::Scroll(ScrollDirection::Down) => f.write_str("scroll:down"),
            LogicalAction::Click(Button::Left) => f.write_str("click:left"),
            LogicalAction::Click(Button::Middle) => f.write_str("click:middle"),
            LogicalAction::Click(Button::Right) => f.write_str("click:right"),
            LogicalAction::HoldClick => f.write_str("hold:left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action: {:?}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for LogicalAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        LogicalAction::ALL
            .into_iter()
            .find(|action| action.to_string() == normalized)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
