//! Display-level toggles applied for the lifetime of the process.
//!
//! The screensaver and DPMS blanking are switched off at startup and back on at shutdown.
//! While idle, the root cursor is periodically reset with `xsetroot`, which brings back a
//! pointer some window managers hide after synthetic input.

use crate::Tool;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Idle time before cursor refreshes start.
const IDLE_BEFORE_REFRESH: Duration = Duration::from_secs(2);
/// Minimum time between two cursor refreshes.
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct DisplayToggles {
    xset: Option<Tool>,
    xsetroot: Option<Tool>,
    screensaver_disabled: bool,
    last_refresh: Option<Instant>,
}

impl DisplayToggles {
    pub fn detect() -> Self {
        Self {
            xset: Tool::locate("xset"),
            xsetroot: Tool::locate("xsetroot"),
            screensaver_disabled: false,
            last_refresh: None,
        }
    }

    pub fn apply(&mut self, disable_screensaver: bool) {
        if disable_screensaver {
            if let Some(xset) = &self.xset {
                for args in [&["s", "off"][..], &["s", "noblank"], &["-dpms"]] {
                    if let Err(e) = xset.run(args) {
                        debug!("xset {} failed: {e}", args.join(" "));
                    }
                }
                self.screensaver_disabled = true;
            } else {
                debug!("xset not found, leaving screensaver alone");
            }
        }
        self.refresh_cursor();
    }

    pub fn refresh_cursor(&mut self) {
        self.last_refresh = Some(Instant::now());
        let Some(xsetroot) = &self.xsetroot else {
            return;
        };
        if let Err(e) = xsetroot.run(&["-cursor_name", "left_ptr"]) {
            debug!("xsetroot failed: {e}");
        }
    }

    /// Refreshes the cursor when the keyboard has been idle long enough.
    pub fn maintain(&mut self, idle: Duration) {
        let since_refresh = self.last_refresh.map(|at| at.elapsed());
        if should_refresh(idle, since_refresh) {
            self.refresh_cursor();
        }
    }

    pub fn restore(&mut self) {
        if !self.screensaver_disabled {
            return;
        }
        if let Some(xset) = &self.xset {
            for args in [&["s", "on"][..], &["+dpms"]] {
                if let Err(e) = xset.run(args) {
                    warn!("Restoring xset {} failed: {e}", args.join(" "));
                }
            }
        }
        self.screensaver_disabled = false;
    }
}

fn should_refresh(idle: Duration, since_refresh: Option<Duration>) -> bool {
    idle > IDLE_BEFORE_REFRESH && since_refresh.map_or(true, |since| since >= REFRESH_INTERVAL)
}
