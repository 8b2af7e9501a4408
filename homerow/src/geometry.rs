//! Screen coordinates.

use std::fmt;

/// An absolute pointer position in screen pixels, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of the screen the pointer lives on.
///
/// A zero dimension means unknown; clamping along that axis only keeps coordinates
/// non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub const UNKNOWN: ScreenSize = ScreenSize {
        width: 0,
        height: 0,
    };

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Pulls `position` into `[0, width-1] x [0, height-1]`.
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: clamp_axis(position.x, self.width),
            y: clamp_axis(position.y, self.height),
        }
    }
}

fn clamp_axis(value: i32, extent: i32) -> i32 {
    if extent > 0 {
        value.clamp(0, extent - 1)
    } else {
        value.max(0)
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_screen_edges() {
        let screen = ScreenSize::new(1920, 1080);
        assert_eq!(screen.clamp(Position::new(-5, 20)), Position::new(0, 20));
        assert_eq!(
            screen.clamp(Position::new(2000, 1080)),
            Position::new(1919, 1079)
        );
        assert_eq!(screen.clamp(Position::new(10, 10)), Position::new(10, 10));
    }

    #[test]
    fn unknown_screen_only_floors_at_zero() {
        let screen = ScreenSize::UNKNOWN;
        assert!(!screen.is_known());
        assert_eq!(
            screen.clamp(Position::new(-1, 99_999)),
            Position::new(0, 99_999)
        );
    }

    #[test]
    fn offset_saturates() {
        assert_eq!(
            Position::new(i32::MAX, 0).offset(1, -1),
            Position::new(i32::MAX, -1)
        );
    }
}
