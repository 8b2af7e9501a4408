//! Keyboard-driven pointer control.
//!
//! Holding Alt turns on mouse mode, in which bound keys move, click, drag and scroll the
//! pointer instead of typing. The [`Controller`] turns key events from any source into
//! pointer calls on a [`PointerDriver`], and captures bound keys through a [`KeyGrab`] so
//! they do not leak into the focused application.

pub mod action;
pub mod animate;
pub mod binding;
pub mod config;
pub mod controller;
pub mod driver;
pub mod engine;
pub mod geometry;
pub mod grab;
pub mod hold;
pub mod key;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use action::{Button, Direction, LogicalAction, ScrollDirection};
pub use binding::{BindingError, BindingTable};
pub use config::{BackendChoice, ConfigError, Settings};
pub use controller::{Controller, Disposition, Feed, Scheduling, Snapshot, TickOutcome};
pub use driver::{DriverError, PointerDriver};
pub use engine::EngineState;
pub use geometry::{Position, ScreenSize};
pub use grab::{GrabError, GrabReport, KeyGrab, NoGrab};
pub use key::{KeyEvent, KeyToken, Modifier, NamedKey, Phase};
