//! The seam between the controller and whatever actually moves the system pointer.
//!
//! # Architecture
//!
//! [`PointerDriver`] is the only way the controller touches the pointer. Concrete drivers live
//! in the `homerow_backend` crate (a uinput virtual device, or the `xdotool` tool); tests use
//! [`RecordingDriver`](crate::testing::RecordingDriver).
//!
//! Every call happens while the controller holds its state lock, so implementations only need
//! to be [`Send`]. Failures are reported but never fatal: the controller logs them at debug
//! level and keeps going, since a dropped pointer event is harmless.
//!
//! # Related
//!
//! - [`Controller`](crate::Controller) - Sole caller of the driver
//! - [`ScreenSize`] - Returned by [`PointerDriver::screen_size`]

use crate::{
    action::Button,
    geometry::{Position, ScreenSize},
};
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DriverError {
    #[snafu(display("Pointer {operation} failed"))]
    Io {
        operation: &'static str,
        source: std::io::Error,
    },

    #[snafu(display("{program} exited with {status}"))]
    Command { program: String, status: String },

    #[snafu(display("Could not read pointer position from {output:?}"))]
    Position { output: String },

    #[snafu(display("{operation} is not supported by this driver"))]
    Unsupported { operation: &'static str },
}

/// Synthesizes pointer input.
pub trait PointerDriver: Send {
    /// Short identifier used in logs and the startup banner.
    fn name(&self) -> &'static str;

    /// Moves the pointer by a displacement relative to where it is now.
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DriverError>;

    /// Moves the pointer to an absolute, already clamped, screen position.
    fn move_absolute(&mut self, position: Position) -> Result<(), DriverError>;

    fn press(&mut self, button: Button) -> Result<(), DriverError>;

    fn release(&mut self, button: Button) -> Result<(), DriverError>;

    /// A full press and release of `button`.
    fn click(&mut self, button: Button) -> Result<(), DriverError> {
        self.press(button)?;
        self.release(button)
    }

    /// Scrolls by `ticks` wheel notches; positive scrolls up.
    fn scroll(&mut self, ticks: i32) -> Result<(), DriverError>;

    /// The true system pointer position.
    fn query_position(&mut self) -> Result<Position, DriverError>;

    /// Screen dimensions, or [`ScreenSize::UNKNOWN`] if the driver cannot tell.
    fn screen_size(&mut self) -> ScreenSize;
}

impl<T: PointerDriver + ?Sized> PointerDriver for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DriverError> {
        (**self).move_relative(dx, dy)
    }

    fn move_absolute(&mut self, position: Position) -> Result<(), DriverError> {
        (**self).move_absolute(position)
    }

    fn press(&mut self, button: Button) -> Result<(), DriverError> {
        (**self).press(button)
    }

    fn release(&mut self, button: Button) -> Result<(), DriverError> {
        (**self).release(button)
    }

    fn click(&mut self, button: Button) -> Result<(), DriverError> {
        (**self).click(button)
    }

    fn scroll(&mut self, ticks: i32) -> Result<(), DriverError> {
        (**self).scroll(ticks)
    }

    fn query_position(&mut self) -> Result<Position, DriverError> {
        (**self).query_position()
    }

    fn screen_size(&mut self) -> ScreenSize {
        (**self).screen_size()
    }
}
