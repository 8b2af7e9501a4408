//! The fixed-rate movement scheduler.
//!
//! The engine is a two-state machine. It enters [`EngineState::Running`] when the first
//! movement or scroll key goes down and returns to [`EngineState::Stopped`] when the last one
//! comes up or mouse mode ends. Each start hands out a fresh generation number; a tick loop
//! only keeps running while its generation is still current, so a stop followed by a quick
//! restart never leaves two loops ticking at once.
//!
//! What a tick does is decided by [`plan_step`], a pure function of the held keys, the held
//! modifiers and the settings. The controller executes the returned [`Step`].

use crate::{
    action::Direction,
    config::Settings,
    state::{ActiveIntents, Directions, Modifiers},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Stopped,
    Running {
        generation: u64,
    },
}

#[derive(Debug, Default)]
pub struct Engine {
    state: EngineState,
    next_generation: u64,
}

impl Engine {
    /// Moves to [`EngineState::Running`]. Returns the new generation when the engine was
    /// stopped, `None` if it was already running.
    pub fn start(&mut self) -> Option<u64> {
        if self.is_running() {
            return None;
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.state = EngineState::Running { generation };
        Some(generation)
    }

    pub fn stop(&mut self) {
        self.state = EngineState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running { .. })
    }

    /// Whether a loop started with `generation` should keep ticking.
    pub fn is_current(&self, generation: u64) -> bool {
        self.state == EngineState::Running { generation }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }
}

/// What one engine tick does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Scroll by this many wheel ticks; positive is up.
    Scroll(i32),
    Move { dx: i32, dy: i32 },
    Idle,
}

/// Decides the next tick. Scrolling takes the whole tick when it has a net direction.
pub fn plan_step(intents: &ActiveIntents, modifiers: Modifiers, settings: &Settings) -> Step {
    let net = intents.scroll();
    if net != 0 {
        return Step::Scroll(settings.scroll_step * net);
    }

    let (dx, dy) = displacement(intents.movement(), modifiers, settings);
    if (dx, dy) == (0, 0) {
        Step::Idle
    } else {
        Step::Move { dx, dy }
    }
}

/// The immediate move made when a direction key goes down, before any tick runs.
pub fn single_step(direction: Direction, modifiers: Modifiers, settings: &Settings) -> (i32, i32) {
    direction.delta(step_distance(modifiers, settings))
}

fn step_distance(modifiers: Modifiers, settings: &Settings) -> i32 {
    if modifiers.ctrl() {
        settings.ctrl_leap_distance
    } else {
        settings.move_speed
    }
}

fn displacement(directions: Directions, modifiers: Modifiers, settings: &Settings) -> (i32, i32) {
    let distance = step_distance(modifiers, settings);
    let (mut dx, mut dy) = (0, 0);
    for direction in Direction::ALL {
        if directions.contains(direction) {
            let (ddx, ddy) = direction.delta(distance);
            dx += ddx;
            dy += ddy;
        }
    }

    if dx != 0 && dy != 0 {
        // `as` truncates toward zero
        dx = (f64::from(dx) * settings.acceleration) as i32;
        dy = (f64::from(dy) * settings.acceleration) as i32;
    }
    (dx, dy)
}
