//! Keyboard input from evdev.
//!
//! # Architecture
//!
//! Both feeds read the same physical keyboard through separate file descriptors:
//!
//! - [`GlobalListener`] reads without grabbing, on its own thread, and hands every event to
//!   [`Controller::handle_key`] as [`Feed::Global`]. It never suppresses anything.
//! - [`EvdevGrab`] takes an exclusive `EVIOCGRAB` on the device while mouse mode is on. The
//!   kernel then delivers events only to that descriptor, so the global listener goes quiet
//!   and nothing reaches other applications. Events the controller does not consume are
//!   re-emitted through a virtual keyboard that mirrors the real one.
//!
//! The grab is whole-device: every bound key is captured at once, and unbound keys keep
//! working through the pass-through device.

use crate::{keys, BackendError};
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, Device, EventType, InputEvent, InputEventKind, Key,
};
use homerow::{Controller, Feed, GrabError, GrabReport, KeyEvent, KeyGrab, KeyToken, Phase};
use std::{
    collections::VecDeque,
    io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, info, trace, warn};

const PASSTHROUGH_NAME: &str = "homerow passthrough keyboard";
const IDLE_SLEEP: Duration = Duration::from_millis(5);

/// Finds the first input device that looks like a full keyboard.
pub fn find_keyboard() -> Result<PathBuf, BackendError> {
    for (path, device) in evdev::enumerate() {
        let name = device.name().unwrap_or_default();
        if name == PASSTHROUGH_NAME {
            continue;
        }
        let is_keyboard = device.supported_keys().is_some_and(|keys| {
            keys.contains(Key::KEY_A) && keys.contains(Key::KEY_SPACE) && keys.contains(Key::KEY_LEFTALT)
        });
        if is_keyboard {
            info!(path = %path.display(), device = name, "Using keyboard");
            return Ok(path);
        }
    }
    Err(BackendError::NoKeyboard)
}

fn open(path: &Path) -> Result<Device, BackendError> {
    let device = Device::open(path).map_err(|source| BackendError::Device {
        path: path.to_path_buf(),
        source,
    })?;
    set_nonblocking(&device)?;
    Ok(device)
}

fn set_nonblocking(device: &Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    // SAFETY: `fd` is owned by `device` and stays open for the duration of both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above; only O_NONBLOCK is added to the existing flags.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Resolves a raw event to a key event. Auto-repeat (value 2) counts as a press.
fn key_event(event: &InputEvent) -> Option<KeyEvent> {
    let InputEventKind::Key(key) = event.kind() else {
        return None;
    };
    let phase = match event.value() {
        0 => Phase::Release,
        1 | 2 => Phase::Press,
        _ => return None,
    };
    let token = keys::token_for(key)?;
    Some(KeyEvent { token, phase })
}

/// Reads and discards whatever is queued until the source would block. Returns how many
/// events were dropped. `fetch` returns the size of each batch it read.
fn drain(mut fetch: impl FnMut() -> io::Result<usize>) -> usize {
    let mut dropped = 0;
    loop {
        match fetch() {
            Ok(0) => return dropped,
            Ok(count) => dropped += count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => {
                if e.kind() != io::ErrorKind::WouldBlock {
                    debug!("Draining keyboard failed: {e}");
                }
                return dropped;
            },
        }
    }
}

/// Non-exclusive reader feeding [`Feed::Global`].
pub struct GlobalListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GlobalListener {
    pub fn spawn(path: &Path, controller: Controller) -> Result<Self, BackendError> {
        let mut device = open(path)?;
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();

        let handle = thread::Builder::new()
            .name("homerow-keyboard".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) && controller.is_running() {
                    match device.fetch_events() {
                        Ok(events) => {
                            for event in events.filter_map(|event| key_event(&event)) {
                                controller.handle_key(event, Feed::Global);
                            }
                        },
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(IDLE_SLEEP),
                        Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                            warn!("Keyboard disappeared: {e}");
                            controller.request_quit();
                            break;
                        },
                        Err(e) => {
                            debug!("Keyboard read failed: {e}");
                            thread::sleep(IDLE_SLEEP);
                        },
                    }
                }
                trace!("Keyboard listener exited");
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Keyboard listener panicked");
            }
        }
    }
}

/// Exclusive grab of the keyboard feeding [`Feed::Intercepted`].
pub struct EvdevGrab {
    device: Device,
    passthrough: VirtualDevice,
    grabbed: bool,
    pending: VecDeque<KeyEvent>,
}

impl EvdevGrab {
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let device = open(path)?;

        let mut keys = AttributeSet::<Key>::new();
        if let Some(supported) = device.supported_keys() {
            for key in supported.iter() {
                keys.insert(key);
            }
        }
        let passthrough = VirtualDeviceBuilder::new()?
            .name(PASSTHROUGH_NAME)
            .with_keys(&keys)?
            .build()?;

        Ok(Self {
            device,
            passthrough,
            grabbed: false,
            pending: VecDeque::new(),
        })
    }

    fn emit(&mut self, events: &[InputEvent]) {
        if let Err(e) = self.passthrough.emit(events) {
            debug!("Pass-through failed: {e}");
        }
    }
}

impl KeyGrab for EvdevGrab {
    fn grab(&mut self, tokens: &[KeyToken]) -> GrabReport {
        if !self.grabbed {
            // Typing since the last grab queued up on this descriptor and already reached
            // other applications through the ungrabbed device
            self.pending.clear();
            let device = &mut self.device;
            let stale = drain(|| device.fetch_events().map(Iterator::count));
            if stale > 0 {
                trace!(stale, "Discarded events queued before the grab");
            }
            if let Err(e) = self.device.grab() {
                debug!("Keyboard grab failed: {e}");
                return GrabReport {
                    grabbed: Vec::new(),
                    failed: tokens.to_vec(),
                };
            }
            self.grabbed = true;
        }

        let (grabbed, failed): (Vec<KeyToken>, Vec<KeyToken>) = tokens
            .iter()
            .copied()
            .partition(|token| keys::key_for(token).is_some());
        GrabReport { grabbed, failed }
    }

    fn release(&mut self) -> Result<(), GrabError> {
        if !self.grabbed {
            return Ok(());
        }
        self.grabbed = false;
        self.device
            .ungrab()
            .map_err(|source| GrabError::Release { source })
    }

    /// Events read in the same batch as the one that ended the grab stay queued and are
    /// still returned after [`KeyGrab::release`].
    fn poll(&mut self) -> Option<KeyEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if !self.grabbed {
            return None;
        }

        let raw: Vec<InputEvent> = match self.device.fetch_events() {
            Ok(events) => events.collect(),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return None,
            Err(e) => {
                debug!("Grabbed keyboard read failed: {e}");
                return None;
            },
        };

        let mut unmapped = Vec::new();
        for event in raw {
            match key_event(&event) {
                Some(key) => self.pending.push_back(key),
                None if event.event_type() == EventType::KEY => unmapped.push(event),
                None => {},
            }
        }
        if !unmapped.is_empty() {
            self.emit(&unmapped);
        }
        self.pending.pop_front()
    }

    fn forward(&mut self, event: &KeyEvent) {
        let Some(key) = keys::key_for(&event.token) else {
            return;
        };
        let value = match event.phase {
            Phase::Press => 1,
            Phase::Release => 0,
        };
        self.emit(&[InputEvent::new(EventType::KEY, key.code(), value)]);
    }
}
