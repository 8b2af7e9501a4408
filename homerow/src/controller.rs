//! The keyboard-to-pointer state machine.
//!
//! A [`Controller`] owns every piece of mutable state behind one lock: held modifiers,
//! `mouse_mode`, the active movement/scroll intents, the hold-click counter, the cached
//! pointer position, the movement engine, the pointer driver and the key grab. Three units
//! of execution share it:
//!
//! - the global feed, which calls [`Controller::handle_key`] with [`Feed::Global`] for every
//!   key event on the system
//! - the intercepted loop, which drains [`KeyGrab::poll`] while mouse mode is on
//! - the engine loop, which calls [`Controller::tick`] at a fixed rate while an intent is held
//!
//! Each operation takes the lock once, mutates, and releases it. Sleeps never happen under
//! the lock. Turning mouse mode off clears intents, stops the engine, releases a held button
//! and drops the grab inside a single critical section, so a key event racing with the Alt
//! release either lands before it or finds mouse mode already off.
//!
//! # Scheduling
//!
//! With [`Scheduling::Threaded`] the controller spawns its engine and intercepted loops on
//! demand. With [`Scheduling::Manual`] nothing is spawned; the caller drives [`Controller::tick`]
//! and [`Controller::pump_intercepted`] directly, which is what tests do.
//!
//! # Related
//!
//! - [`engine`](crate::engine) - Decides what each tick does
//! - [`BindingTable`] - Resolves tokens to actions
//! - [`PointerDriver`] and [`KeyGrab`] - The two outward seams

use crate::{
    action::{Button, LogicalAction},
    animate::interpolate,
    binding::BindingTable,
    config::Settings,
    driver::PointerDriver,
    engine::{plan_step, single_step, Engine, EngineState, Step},
    geometry::{Position, ScreenSize},
    grab::KeyGrab,
    hold::{Edge, HoldCounter},
    key::{KeyEvent, KeyToken, Modifier, Phase},
    state::{ActiveIntents, Directions, Modifiers},
};
use parking_lot::Mutex;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, info, trace, warn};

/// Where a key event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// The system-wide, non-exclusive listener. Never suppresses.
    Global,
    /// Events captured by the active [`KeyGrab`].
    Intercepted,
}

/// Whether a handled event should still reach the focused application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PassThrough,
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduling {
    /// Engine and intercepted loops run on their own threads.
    Threaded,
    /// The caller drives ticks and intercepted polling.
    Manual,
}

/// Result of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine is not running (or this loop's generation was superseded).
    Stopped,
    /// Mouse mode was off.
    Skipped,
    /// Held keys cancel each other out.
    Idle,
    Scrolled(i32),
    Moved { dx: i32, dy: i32 },
}

/// Point-in-time copy of the controller state, for tests and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mouse_mode: bool,
    pub modifiers: Modifiers,
    pub movement: Directions,
    pub scroll: i32,
    pub hold_count: usize,
    pub engine: EngineState,
    pub position: Position,
    pub screen: ScreenSize,
    pub intercepting: bool,
}

#[derive(Debug, Default)]
enum Interception {
    #[default]
    Inactive,
    Active {
        generation: u64,
    },
}

impl Interception {
    fn is_current(&self, generation: u64) -> bool {
        matches!(self, Interception::Active { generation: g } if *g == generation)
    }
}

struct ControllerState {
    modifiers: Modifiers,
    mouse_mode: bool,
    intents: ActiveIntents,
    hold: HoldCounter,
    position: Position,
    screen: ScreenSize,
    engine: Engine,
    interception: Interception,
    intercept_generations: u64,
    last_activity: Instant,
    driver: Box<dyn PointerDriver>,
    grab: Box<dyn KeyGrab>,
}

struct Shared {
    settings: Settings,
    bindings: BindingTable,
    quit: KeyToken,
    scheduling: Scheduling,
    running: AtomicBool,
    /// Held for a whole move, so animated bursts never interleave.
    /// Lock order: `burst` before `state` before `workers`.
    burst: Mutex<()>,
    state: Mutex<ControllerState>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

/// Handle to the shared controller. Cloning is cheap and every clone drives the same state.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    pub fn new(
        settings: Settings,
        bindings: BindingTable,
        driver: Box<dyn PointerDriver>,
        grab: Box<dyn KeyGrab>,
        scheduling: Scheduling,
    ) -> Self {
        let quit = settings.quit_token();
        let state = ControllerState {
            modifiers: Modifiers::default(),
            mouse_mode: false,
            intents: ActiveIntents::default(),
            hold: HoldCounter::default(),
            position: Position::default(),
            screen: ScreenSize::UNKNOWN,
            engine: Engine::default(),
            interception: Interception::Inactive,
            intercept_generations: 0,
            last_activity: Instant::now(),
            driver,
            grab,
        };

        Self {
            shared: Arc::new(Shared {
                settings,
                bindings,
                quit,
                scheduling,
                running: AtomicBool::new(true),
                burst: Mutex::new(()),
                state: Mutex::new(state),
                workers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.shared.bindings
    }

    pub fn quit_token(&self) -> KeyToken {
        self.shared.quit
    }

    pub fn driver_name(&self) -> &'static str {
        self.shared.state.lock().driver.name()
    }

    /// Queries the screen size from the driver if it is not known yet.
    pub fn probe_screen(&self) -> ScreenSize {
        let mut state = self.shared.state.lock();
        if !state.screen.is_known() {
            state.screen = state.driver.screen_size();
            debug!(screen = %state.screen, "Screen size");
        }
        state.screen
    }

    /// Feeds one key event through the state machine.
    ///
    /// Modifiers, the quit combination and unbound keys always pass through. A bound key is
    /// suppressed only when it arrived on [`Feed::Intercepted`] and was consumed.
    pub fn handle_key(&self, event: KeyEvent, feed: Feed) -> Disposition {
        let token = event.token;
        if token.is_escape() {
            return Disposition::PassThrough;
        }

        if token.modifier().is_some() {
            match event.phase {
                Phase::Press => self.on_modifier_press(token),
                Phase::Release => self.on_modifier_release(token),
            }
            return Disposition::PassThrough;
        }

        if event.phase == Phase::Press
            && token == self.shared.quit
            && self.shared.state.lock().modifiers.ctrl()
        {
            self.request_quit();
            return Disposition::PassThrough;
        }

        let Some(action) = self.shared.bindings.action_for(&token) else {
            return Disposition::PassThrough;
        };

        let consumed = self.apply(action, event);
        match feed {
            Feed::Intercepted if consumed => Disposition::Suppress,
            _ => Disposition::PassThrough,
        }
    }

    /// Records a modifier key going down. The first Alt key enters mouse mode.
    pub fn on_modifier_press(&self, token: KeyToken) {
        let mut state = self.shared.state.lock();
        state.modifiers.set(token, true);
        if token.modifier() == Some(Modifier::Alt) && !state.mouse_mode {
            self.enter_mouse_mode(&mut state);
        }
    }

    /// Records a modifier key going up. Mouse mode ends once no Alt key is held.
    pub fn on_modifier_release(&self, token: KeyToken) {
        let mut state = self.shared.state.lock();
        state.modifiers.set(token, false);
        if state.mouse_mode && !state.modifiers.alt() {
            self.exit_mouse_mode(&mut state);
        }
    }

    fn enter_mouse_mode(&self, state: &mut ControllerState) {
        state.mouse_mode = true;

        let tokens: Vec<KeyToken> = self.shared.bindings.tokens().copied().collect();
        let report = state.grab.grab(&tokens);
        for token in &report.failed {
            debug!(%token, "Key not intercepted");
        }
        if !report.grabbed.is_empty() && !report.is_complete() {
            warn!(
                grabbed = report.grabbed.len(),
                failed = report.failed.len(),
                "Partial interception, ungrabbed keys also reach the focused window"
            );
        }

        state.intercept_generations += 1;
        let generation = state.intercept_generations;
        state.interception = Interception::Active { generation };
        if self.shared.scheduling == Scheduling::Threaded {
            let controller = self.clone();
            self.spawn("homerow-intercept", move || {
                controller.intercept_loop(generation)
            });
        }

        if !state.screen.is_known() {
            state.screen = state.driver.screen_size();
        }
        Self::resync(state);
        debug!(position = %state.position, "Mouse mode on");
    }

    fn exit_mouse_mode(&self, state: &mut ControllerState) {
        state.intents.clear();
        state.engine.stop();
        if state.hold.reset() {
            if let Err(e) = state.driver.release(Button::Left) {
                debug!("Releasing held button failed: {e}");
            }
        }
        if let Err(e) = state.grab.release() {
            debug!("Releasing interception failed: {e}");
        }
        state.interception = Interception::Inactive;
        state.mouse_mode = false;
        debug!("Mouse mode off");
    }

    /// Applies a resolved action. Shared by both feeds. Returns whether it was consumed.
    fn apply(&self, action: LogicalAction, event: KeyEvent) -> bool {
        let token = event.token;
        let mut state = self.shared.state.lock();
        state.last_activity = Instant::now();
        if !state.mouse_mode {
            return false;
        }

        match (action, event.phase) {
            (LogicalAction::Navigate(direction), Phase::Press) => {
                if state.intents.press_move(token, direction) {
                    trace!(?direction, "Direction active");
                }
                self.start_engine(&mut state);
                let (dx, dy) = single_step(direction, state.modifiers, &self.shared.settings);
                drop(state);
                self.move_pointer(dx, dy);
            },
            (LogicalAction::Scroll(direction), Phase::Press) => {
                state.intents.press_scroll(token, direction);
                self.start_engine(&mut state);
            },
            (LogicalAction::Click(button), Phase::Press) => {
                if let Err(e) = state.driver.click(button) {
                    debug!(?button, "Click failed: {e}");
                }
            },
            (LogicalAction::HoldClick, Phase::Press) => {
                if state.hold.activate(token) == Edge::Rising {
                    if let Err(e) = state.driver.press(Button::Left) {
                        debug!("Pressing held button failed: {e}");
                    }
                }
            },
            (LogicalAction::Navigate(_) | LogicalAction::Scroll(_), Phase::Release) => {
                state.intents.release(&token);
                if state.intents.is_empty() {
                    state.engine.stop();
                }
            },
            (LogicalAction::Click(_), Phase::Release) => {},
            (LogicalAction::HoldClick, Phase::Release) => {
                if state.hold.deactivate(&token) == Edge::Falling {
                    if let Err(e) = state.driver.release(Button::Left) {
                        debug!("Releasing held button failed: {e}");
                    }
                }
            },
        }
        true
    }

    fn start_engine(&self, state: &mut ControllerState) {
        let Some(generation) = state.engine.start() else {
            return;
        };
        Self::resync(state);
        trace!(generation, position = %state.position, "Engine started");

        if self.shared.scheduling == Scheduling::Threaded {
            let controller = self.clone();
            self.spawn("homerow-engine", move || controller.engine_loop(generation));
        }
    }

    fn resync(state: &mut ControllerState) {
        match state.driver.query_position() {
            Ok(position) => state.position = position,
            Err(e) => debug!("Position query failed, keeping {}: {e}", state.position),
        }
    }

    /// Runs one engine tick against the current state.
    pub fn tick(&self) -> TickOutcome {
        self.run_tick(None)
    }

    fn run_tick(&self, generation: Option<u64>) -> TickOutcome {
        let mut state = self.shared.state.lock();
        let live = match generation {
            Some(generation) => state.engine.is_current(generation),
            None => state.engine.is_running(),
        };
        if !live {
            return TickOutcome::Stopped;
        }
        if !state.mouse_mode {
            return TickOutcome::Skipped;
        }

        match plan_step(&state.intents, state.modifiers, &self.shared.settings) {
            Step::Scroll(ticks) => {
                if let Err(e) = state.driver.scroll(ticks) {
                    debug!(ticks, "Scroll failed: {e}");
                }
                TickOutcome::Scrolled(ticks)
            },
            Step::Move { dx, dy } => {
                drop(state);
                self.move_pointer(dx, dy);
                TickOutcome::Moved { dx, dy }
            },
            Step::Idle => TickOutcome::Idle,
        }
    }

    /// Moves by `(dx, dy)` from the cached position, animating when smoothing is on.
    ///
    /// The cache is advanced to the clamped target up front and never re-queried mid-burst.
    /// A second move waits for the running burst and starts from its target.
    fn move_pointer(&self, dx: i32, dy: i32) {
        let settings = &self.shared.settings;
        let _burst = self.shared.burst.lock();
        let mut state = self.shared.state.lock();
        if !state.mouse_mode {
            return;
        }
        let start = state.position;
        let target = state.screen.clamp(start.offset(dx, dy));
        state.position = target;

        if !settings.smooth_movement || settings.animation_steps <= 1 {
            if let Err(e) = state.driver.move_relative(dx, dy) {
                debug!(dx, dy, "Move failed: {e}");
            }
            return;
        }
        drop(state);

        let delay = settings.animation_delay();
        let mut points = interpolate(start, target, settings.animation_steps).peekable();
        while let Some(point) = points.next() {
            {
                let mut state = self.shared.state.lock();
                if !state.mouse_mode {
                    return;
                }
                if let Err(e) = state.driver.move_absolute(point) {
                    debug!(%point, "Move failed: {e}");
                }
            }
            if points.peek().is_some() && !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }

    /// Handles one event from the key grab, forwarding it back if it was not consumed.
    /// Returns false when no event was waiting.
    pub fn pump_intercepted(&self) -> bool {
        let event = self.shared.state.lock().grab.poll();
        let Some(event) = event else {
            return false;
        };

        if self.handle_key(event, Feed::Intercepted) == Disposition::PassThrough {
            self.shared.state.lock().grab.forward(&event);
        }
        true
    }

    fn engine_loop(&self, generation: u64) {
        let interval = self.shared.settings.movement_interval();
        let mut next = Instant::now() + interval;
        while self.is_running() {
            if self.run_tick(Some(generation)) == TickOutcome::Stopped {
                break;
            }
            thread::sleep(next.saturating_duration_since(Instant::now()));
            next += interval;
        }
        trace!(generation, "Engine loop exited");
    }

    fn intercept_loop(&self, generation: u64) {
        let idle = self.shared.settings.intercept_poll();
        while self.is_running() && self.shared.state.lock().interception.is_current(generation) {
            if !self.pump_intercepted() {
                thread::sleep(idle);
            }
        }
        // Keys read together with the one that ended the grab
        while self.is_running() && self.pump_intercepted() {}
        trace!(generation, "Intercept loop exited");
    }

    fn spawn(&self, name: &str, work: impl FnOnce() + Send + 'static) {
        if !self.is_running() {
            return;
        }
        match thread::Builder::new().name(name.to_string()).spawn(work) {
            Ok(handle) => {
                let mut workers = self.shared.workers.lock();
                workers.retain(|worker| !worker.is_finished());
                workers.push(handle);
            },
            Err(e) => warn!("Failed to spawn {name}: {e}"),
        }
    }

    pub fn mouse_mode(&self) -> bool {
        self.shared.state.lock().mouse_mode
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Clears the running flag. The owner of the controller notices and calls
    /// [`Controller::shutdown`].
    pub fn request_quit(&self) {
        if self.shared.running.swap(false, Ordering::SeqCst) {
            info!("Quit requested");
        }
    }

    /// Time since the last bound key event.
    pub fn idle_for(&self) -> Duration {
        self.shared.state.lock().last_activity.elapsed()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.shared.state.lock();
        Snapshot {
            mouse_mode: state.mouse_mode,
            modifiers: state.modifiers,
            movement: state.intents.movement(),
            scroll: state.intents.scroll(),
            hold_count: state.hold.count(),
            engine: state.engine.state(),
            position: state.position,
            screen: state.screen,
            intercepting: matches!(state.interception, Interception::Active { .. }),
        }
    }

    /// Stops the engine and intercepted loop, drops the grab and releases a held button,
    /// then waits for worker threads. Failures are logged and otherwise ignored.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        {
            let mut state = self.shared.state.lock();
            state.engine.stop();
            state.interception = Interception::Inactive;
            if let Err(e) = state.grab.release() {
                warn!("Releasing interception during shutdown failed: {e}");
            }
            state.intents.clear();
            if state.hold.reset() {
                if let Err(e) = state.driver.release(Button::Left) {
                    warn!("Releasing held button during shutdown failed: {e}");
                }
            }
            state.mouse_mode = false;
        }

        let workers = std::mem::take(&mut *self.shared.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                warn!("Worker thread panicked");
            }
        }
        debug!("Controller stopped");
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("scheduling", &self.shared.scheduling)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
