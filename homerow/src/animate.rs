//! Linear subdivision of one tick's displacement into smaller absolute moves.

use crate::geometry::Position;

/// Points along the segment from `start` to `end`, excluding `start` and ending exactly at
/// `end`. Yields only `end` when `steps` is 0 or 1.
pub fn interpolate(start: Position, end: Position, steps: u32) -> impl Iterator<Item = Position> {
    let steps = steps.max(1);
    (1..=steps).map(move |i| Position {
        x: lerp(start.x, end.x, i, steps),
        y: lerp(start.y, end.y, i, steps),
    })
}

fn lerp(from: i32, to: i32, i: u32, steps: u32) -> i32 {
    let progress = f64::from(i) / f64::from(steps);
    (f64::from(from) + f64::from(to - from) * progress) as i32
}
