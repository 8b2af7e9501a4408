//! Pointer driver backed by a uinput virtual mouse.
//!
//! Events go straight into the kernel input stack, so this works under X11 and Wayland
//! alike, but needs write access to `/dev/uinput`. The device only reports relative motion;
//! absolute moves are turned into the delta from the tracked position. Desktops that apply
//! pointer acceleration to the virtual device will scale every move, so a flat acceleration
//! profile gives the most predictable speed.
//!
//! The tracked position is resynchronized from `xdotool getmouselocation` when `xdotool` is
//! installed; otherwise the driver trusts its own bookkeeping.

use crate::{screen, BackendError, Tool};
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key, RelativeAxisType,
};
use homerow::{BackendChoice, Button, DriverError, PointerDriver, Position, ScreenSize};
use tracing::debug;

const DEVICE_NAME: &str = "homerow virtual pointer";

pub struct UinputPointer {
    device: VirtualDevice,
    position: Position,
    screen: ScreenSize,
    locator: Option<Tool>,
}

impl UinputPointer {
    pub fn new() -> Result<Self, BackendError> {
        let device = build_device().map_err(|e| BackendError::Unavailable {
            backend: BackendChoice::Uinput,
            reason: format!("cannot create virtual pointer: {e}"),
        })?;

        let screen = screen::detect();
        let locator = Tool::locate("xdotool");
        if locator.is_none() {
            debug!("xdotool not found, uinput pointer tracks its own position");
        }

        let mut pointer = Self {
            device,
            position: Position::new(screen.width / 2, screen.height / 2),
            screen,
            locator,
        };
        if let Err(e) = pointer.query_position() {
            debug!("Initial position query failed: {e}");
        }
        Ok(pointer)
    }

    fn emit(&mut self, operation: &'static str, events: &[InputEvent]) -> Result<(), DriverError> {
        self.device
            .emit(events)
            .map_err(|source| DriverError::Io { operation, source })
    }
}

fn build_device() -> std::io::Result<VirtualDevice> {
    let mut buttons = AttributeSet::<Key>::new();
    buttons.insert(Key::BTN_LEFT);
    buttons.insert(Key::BTN_RIGHT);
    buttons.insert(Key::BTN_MIDDLE);

    let mut axes = AttributeSet::<RelativeAxisType>::new();
    axes.insert(RelativeAxisType::REL_X);
    axes.insert(RelativeAxisType::REL_Y);
    axes.insert(RelativeAxisType::REL_WHEEL);

    VirtualDeviceBuilder::new()?
        .name(DEVICE_NAME)
        .with_keys(&buttons)?
        .with_relative_axes(&axes)?
        .build()
}

fn button_key(button: Button) -> Key {
    match button {
        Button::Left => Key::BTN_LEFT,
        Button::Middle => Key::BTN_MIDDLE,
        Button::Right => Key::BTN_RIGHT,
    }
}

fn motion(dx: i32, dy: i32) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(2);
    if dx != 0 {
        events.push(InputEvent::new(
            EventType::RELATIVE,
            RelativeAxisType::REL_X.0,
            dx,
        ));
    }
    if dy != 0 {
        events.push(InputEvent::new(
            EventType::RELATIVE,
            RelativeAxisType::REL_Y.0,
            dy,
        ));
    }
    events
}

impl PointerDriver for UinputPointer {
    fn name(&self) -> &'static str {
        "uinput"
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DriverError> {
        let events = motion(dx, dy);
        if events.is_empty() {
            return Ok(());
        }
        self.emit("move", &events)?;
        self.position = self.screen.clamp(self.position.offset(dx, dy));
        Ok(())
    }

    fn move_absolute(&mut self, position: Position) -> Result<(), DriverError> {
        let target = self.screen.clamp(position);
        let (dx, dy) = (target.x - self.position.x, target.y - self.position.y);
        self.move_relative(dx, dy)
    }

    fn press(&mut self, button: Button) -> Result<(), DriverError> {
        let key = button_key(button);
        self.emit("press", &[InputEvent::new(EventType::KEY, key.code(), 1)])
    }

    fn release(&mut self, button: Button) -> Result<(), DriverError> {
        let key = button_key(button);
        self.emit("release", &[InputEvent::new(EventType::KEY, key.code(), 0)])
    }

    fn scroll(&mut self, ticks: i32) -> Result<(), DriverError> {
        if ticks == 0 {
            return Ok(());
        }
        self.emit(
            "scroll",
            &[InputEvent::new(
                EventType::RELATIVE,
                RelativeAxisType::REL_WHEEL.0,
                ticks,
            )],
        )
    }

    fn query_position(&mut self) -> Result<Position, DriverError> {
        if let Some(locator) = &self.locator {
            let output = locator.output(&["getmouselocation"])?;
            self.position = crate::xdotool::parse_mouse_location(&output)
                .ok_or(DriverError::Position { output })?;
        }
        Ok(self.position)
    }

    fn screen_size(&mut self) -> ScreenSize {
        self.screen
    }
}
