//! Exclusive capture of bound keys while mouse mode is on.
//!
//! When mouse mode starts, the controller asks a [`KeyGrab`] to take every bound key away
//! from other applications. Grabbed keys then arrive on the intercepted feed through
//! [`KeyGrab::poll`] instead of reaching the focused window. Keys the controller does not
//! consume are handed back with [`KeyGrab::forward`] so typing keeps working.
//!
//! Grabbing is best effort. Keys that cannot be grabbed are reported in
//! [`GrabReport::failed`] and keep working through the global feed; they just also reach
//! the focused application.

use crate::key::{KeyEvent, KeyToken};
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GrabError {
    #[snafu(display("Failed to release keyboard grab"))]
    Release { source: std::io::Error },
}

/// Outcome of a [`KeyGrab::grab`] request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrabReport {
    pub grabbed: Vec<KeyToken>,
    pub failed: Vec<KeyToken>,
}

impl GrabReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub trait KeyGrab: Send {
    /// Starts capturing `tokens`. Grabbing again replaces the previous set.
    fn grab(&mut self, tokens: &[KeyToken]) -> GrabReport;

    /// Stops capturing. Releasing when nothing is grabbed is a no-op.
    fn release(&mut self) -> Result<(), GrabError>;

    /// Next captured event, without blocking.
    ///
    /// Captured events that do not resolve to a [`KeyToken`] are passed on by the
    /// implementation itself and never returned.
    fn poll(&mut self) -> Option<KeyEvent>;

    /// Re-injects a captured event the controller did not consume.
    fn forward(&mut self, event: &KeyEvent);
}

/// A grab that captures nothing. Every key keeps reaching the focused application.
#[derive(Debug, Default)]
pub struct NoGrab;

impl KeyGrab for NoGrab {
    fn grab(&mut self, tokens: &[KeyToken]) -> GrabReport {
        GrabReport {
            grabbed: Vec::new(),
            failed: tokens.to_vec(),
        }
    }

    fn release(&mut self) -> Result<(), GrabError> {
        Ok(())
    }

    fn poll(&mut self) -> Option<KeyEvent> {
        None
    }

    fn forward(&mut self, _event: &KeyEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_grab_reports_every_token_as_failed() {
        let mut grab = NoGrab;
        let tokens = [KeyToken::Char('i'), KeyToken::Char('j')];
        let report = grab.grab(&tokens);
        assert!(!report.is_complete());
        assert_eq!(report.failed, tokens);
        assert!(grab.poll().is_none());
        assert!(grab.release().is_ok());
    }
}
