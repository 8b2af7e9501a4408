//! Test doubles and a fluent harness for driving a [`Controller`] without real devices.
//!
//! ```ignore
//! use homerow::{testing::DriverCall, Controller};
//!
//! let mut h = Controller::test();
//! h.press("alt").press("l");
//! h.clear_calls();
//! h.tick();
//! assert_eq!(h.calls(), vec![DriverCall::MoveRelative { dx: 2, dy: 0 }]);
//! ```

use crate::{
    action::Button,
    binding::BindingTable,
    config::Settings,
    controller::{Controller, Disposition, Feed, Scheduling, Snapshot, TickOutcome},
    driver::{DriverError, PointerDriver},
    engine::EngineState,
    geometry::{Position, ScreenSize},
    grab::{GrabError, GrabReport, KeyGrab},
    key::{KeyEvent, KeyToken},
};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::{collections::VecDeque, sync::Arc};

/// A call made on a [`RecordingDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    MoveRelative { dx: i32, dy: i32 },
    MoveAbsolute(Position),
    Press(Button),
    Release(Button),
    Scroll(i32),
}

#[derive(Debug)]
struct Recorded {
    calls: Vec<DriverCall>,
    position: Position,
    screen: ScreenSize,
    queries: usize,
    failing: bool,
}

/// Shared view of everything a [`RecordingDriver`] was asked to do.
#[derive(Debug, Clone)]
pub struct DriverLog {
    inner: Arc<Mutex<Recorded>>,
}

impl DriverLog {
    pub fn calls(&self) -> Vec<DriverCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear(&self) {
        self.inner.lock().calls.clear();
    }

    /// The position the fake pointer is at. Relative and absolute moves update it.
    pub fn position(&self) -> Position {
        self.inner.lock().position
    }

    /// Moves the fake pointer behind the controller's back, as a physical mouse would.
    pub fn set_position(&self, position: Position) {
        self.inner.lock().position = position;
    }

    pub fn queries(&self) -> usize {
        self.inner.lock().queries
    }

    /// Makes every subsequent call fail after being recorded.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }
}

/// A [`PointerDriver`] that records calls instead of moving anything.
///
/// Starts at (500, 500) on a 1920x1080 screen.
#[derive(Debug)]
pub struct RecordingDriver {
    log: DriverLog,
}

impl RecordingDriver {
    pub fn with_log() -> (Self, DriverLog) {
        let log = DriverLog {
            inner: Arc::new(Mutex::new(Recorded {
                calls: Vec::new(),
                position: Position::new(500, 500),
                screen: ScreenSize::new(1920, 1080),
                queries: 0,
                failing: false,
            })),
        };
        (Self { log: log.clone() }, log)
    }

    fn record(&self, call: DriverCall) -> Result<(), DriverError> {
        let mut inner = self.log.inner.lock();
        inner.calls.push(call);
        match call {
            DriverCall::MoveRelative { dx, dy } => {
                inner.position = inner.screen.clamp(inner.position.offset(dx, dy));
            },
            DriverCall::MoveAbsolute(position) => {
                inner.position = inner.screen.clamp(position);
            },
            _ => {},
        }
        if inner.failing {
            return Err(DriverError::Unsupported {
                operation: "recording",
            });
        }
        Ok(())
    }
}

impl PointerDriver for RecordingDriver {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DriverError> {
        self.record(DriverCall::MoveRelative { dx, dy })
    }

    fn move_absolute(&mut self, position: Position) -> Result<(), DriverError> {
        self.record(DriverCall::MoveAbsolute(position))
    }

    fn press(&mut self, button: Button) -> Result<(), DriverError> {
        self.record(DriverCall::Press(button))
    }

    fn release(&mut self, button: Button) -> Result<(), DriverError> {
        self.record(DriverCall::Release(button))
    }

    fn scroll(&mut self, ticks: i32) -> Result<(), DriverError> {
        self.record(DriverCall::Scroll(ticks))
    }

    fn query_position(&mut self) -> Result<Position, DriverError> {
        let mut inner = self.log.inner.lock();
        inner.queries += 1;
        if inner.failing {
            return Err(DriverError::Position {
                output: String::new(),
            });
        }
        Ok(inner.position)
    }

    fn screen_size(&mut self) -> ScreenSize {
        self.log.inner.lock().screen
    }
}

#[derive(Debug, Default)]
struct GrabState {
    active: bool,
    grabbed: Vec<KeyToken>,
    refused: FxHashSet<KeyToken>,
    pending: VecDeque<KeyEvent>,
    forwarded: Vec<KeyEvent>,
    grabs: usize,
    releases: usize,
}

/// Shared view of a [`FakeGrab`].
#[derive(Debug, Clone, Default)]
pub struct GrabLog {
    inner: Arc<Mutex<GrabState>>,
}

impl GrabLog {
    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    pub fn grabbed(&self) -> Vec<KeyToken> {
        self.inner.lock().grabbed.clone()
    }

    /// Makes future grabs fail for `token`, as if another program owned it.
    pub fn refuse(&self, token: KeyToken) {
        self.inner.lock().refused.insert(token);
    }

    /// Queues an event as if the grabbed device produced it.
    pub fn push(&self, event: KeyEvent) {
        self.inner.lock().pending.push_back(event);
    }

    pub fn forwarded(&self) -> Vec<KeyEvent> {
        self.inner.lock().forwarded.clone()
    }

    pub fn grabs(&self) -> usize {
        self.inner.lock().grabs
    }

    pub fn releases(&self) -> usize {
        self.inner.lock().releases
    }
}

/// A [`KeyGrab`] fed by hand through its [`GrabLog`]. Queued events are only delivered
/// while the grab is active.
#[derive(Debug)]
pub struct FakeGrab {
    log: GrabLog,
}

impl FakeGrab {
    pub fn with_log() -> (Self, GrabLog) {
        let log = GrabLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl KeyGrab for FakeGrab {
    fn grab(&mut self, tokens: &[KeyToken]) -> GrabReport {
        let mut inner = self.log.inner.lock();
        let (failed, grabbed): (Vec<KeyToken>, Vec<KeyToken>) =
            tokens.iter().copied().partition(|token| inner.refused.contains(token));
        inner.active = true;
        inner.grabs += 1;
        inner.grabbed = grabbed.clone();
        GrabReport { grabbed, failed }
    }

    fn release(&mut self) -> Result<(), GrabError> {
        let mut inner = self.log.inner.lock();
        if inner.active {
            inner.active = false;
            inner.releases += 1;
            inner.grabbed.clear();
        }
        Ok(())
    }

    fn poll(&mut self) -> Option<KeyEvent> {
        let mut inner = self.log.inner.lock();
        if !inner.active {
            return None;
        }
        inner.pending.pop_front()
    }

    fn forward(&mut self, event: &KeyEvent) {
        self.log.inner.lock().forwarded.push(*event);
    }
}

fn token(key: &str) -> KeyToken {
    KeyToken::parse(key).unwrap_or_else(|| panic!("unknown key {key:?}"))
}

/// Drives a manually scheduled [`Controller`] wired to a [`RecordingDriver`] and a
/// [`FakeGrab`].
///
/// Smoothing is off by default so each move is a single [`DriverCall::MoveRelative`].
pub struct Harness {
    controller: Controller,
    driver: DriverLog,
    grab: GrabLog,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(Self::default_settings())
    }

    /// Default settings with smoothing disabled.
    pub fn default_settings() -> Settings {
        Settings {
            smooth_movement: false,
            ..Settings::default()
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        let bindings = settings
            .binding_table()
            .unwrap_or_else(|e| panic!("invalid test bindings: {e}"));
        Self::with_bindings(settings, bindings)
    }

    pub fn with_bindings(settings: Settings, bindings: BindingTable) -> Self {
        let (driver, driver_log) = RecordingDriver::with_log();
        let (grab, grab_log) = FakeGrab::with_log();
        let controller = Controller::new(
            settings,
            bindings,
            Box::new(driver),
            Box::new(grab),
            Scheduling::Manual,
        );
        Self {
            controller,
            driver: driver_log,
            grab: grab_log,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn driver(&self) -> &DriverLog {
        &self.driver
    }

    pub fn grab(&self) -> &GrabLog {
        &self.grab
    }

    /// Presses `key` the way a keyboard would: grabbed keys go through the intercepted feed,
    /// everything else through the global feed.
    pub fn press(&mut self, key: &str) -> &mut Self {
        self.physical(KeyEvent::press(token(key)));
        self
    }

    pub fn release(&mut self, key: &str) -> &mut Self {
        self.physical(KeyEvent::release(token(key)));
        self
    }

    fn physical(&mut self, event: KeyEvent) {
        if self.grab.is_active() && self.grab.grabbed().contains(&event.token) {
            self.grab.push(event);
            self.pump();
        } else {
            self.key(event, Feed::Global);
        }
    }

    pub fn tap(&mut self, key: &str) -> &mut Self {
        self.press(key).release(key)
    }

    pub fn key(&mut self, event: KeyEvent, feed: Feed) -> Disposition {
        self.controller.handle_key(event, feed)
    }

    /// Queues `key` on the grabbed device. Nothing happens until [`Harness::pump`].
    pub fn intercept_press(&mut self, key: &str) -> &mut Self {
        self.grab.push(KeyEvent::press(token(key)));
        self
    }

    pub fn intercept_release(&mut self, key: &str) -> &mut Self {
        self.grab.push(KeyEvent::release(token(key)));
        self
    }

    /// Drains the intercepted feed. Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while self.controller.pump_intercepted() {
            handled += 1;
        }
        handled
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.controller.tick()
    }

    pub fn ticks(&mut self, count: usize) -> Vec<TickOutcome> {
        (0..count).map(|_| self.controller.tick()).collect()
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.driver.calls()
    }

    pub fn clear_calls(&mut self) -> &mut Self {
        self.driver.clear();
        self
    }

    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    #[track_caller]
    pub fn assert_mode(&self, mouse_mode: bool) {
        assert_eq!(self.controller.mouse_mode(), mouse_mode, "mouse mode");
    }

    #[track_caller]
    pub fn assert_engine_running(&self, running: bool) {
        assert_eq!(
            self.snapshot().engine != EngineState::Stopped,
            running,
            "engine running"
        );
    }

    #[track_caller]
    pub fn assert_hold_count(&self, count: usize) {
        assert_eq!(self.snapshot().hold_count, count, "hold count");
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// A manually scheduled controller wired to test doubles.
    pub fn test() -> Harness {
        Harness::new()
    }
}
