//! Linux backends for homerow.
//!
//! Pointer drivers ([`UinputPointer`], [`XdotoolDriver`]) and the keyboard side
//! ([`GlobalListener`] for the global feed, [`EvdevGrab`] for the intercepted one), plus the
//! X11 helpers they lean on: `xrandr` for the screen size and `xset`/`xsetroot` for
//! [`DisplayToggles`].

mod command;
pub mod display;
pub mod keyboard;
pub mod keys;
pub mod screen;
pub mod select;
pub mod uinput;
pub mod xdotool;

pub use command::Tool;
pub use display::DisplayToggles;
pub use keyboard::{find_keyboard, EvdevGrab, GlobalListener};
pub use select::open_pointer;
pub use uinput::UinputPointer;
pub use xdotool::XdotoolDriver;

use homerow::BackendChoice;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} backend unavailable: {reason}")]
    Unavailable {
        backend: BackendChoice,
        reason: String,
    },

    #[error("No pointer backend available (tried {tried})")]
    NoBackend { tried: String },

    #[error("No keyboard found under /dev/input; pass --device or check permissions")]
    NoKeyboard,

    #[error("Failed to open input device {}", path.display())]
    Device {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
