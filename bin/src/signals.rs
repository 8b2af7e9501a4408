use homerow::Controller;
use signal_hook::{
    consts::signal::{SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};
use std::{io, thread::JoinHandle};
use tracing::{info, warn};

/// Routes SIGINT and SIGTERM to [`Controller::request_quit`] until dropped.
#[derive(Debug)]
pub struct SignalGuard {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalGuard {
    pub fn install(controller: Controller) -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("homerow-signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    info!(signal, "Termination signal received");
                    controller.request_quit();
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Signal thread panicked");
            }
        }
    }
}
