// Unix signal bridge: SIGUSR1 toggles pass-through, SIGTERM/SIGINT quit.
use anyhow::{Context, Result};
use log::{info, warn};
use signal_hook::consts::signal::{SIGINT, SIGTERM, SIGUSR1};
use signal_hook::iterator::Signals;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Flags set by the signal thread and drained by the event loop.
#[derive(Clone, Default)]
pub(super) struct SignalFlags {
    toggle_passthrough: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
}

impl SignalFlags {
    pub(super) fn take_toggle(&self) -> bool {
        self.toggle_passthrough.swap(false, Ordering::AcqRel)
    }

    pub(super) fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    fn record(&self, signal: i32) {
        match signal {
            SIGUSR1 => {
                info!("Received SIGUSR1 - toggling pass-through");
                self.toggle_passthrough.store(true, Ordering::Release);
            }
            SIGTERM | SIGINT => {
                info!(
                    "Received {} - shutting down",
                    if signal == SIGTERM { "SIGTERM" } else { "SIGINT" }
                );
                self.quit.store(true, Ordering::Release);
            }
            other => warn!("Received unexpected signal: {}", other),
        }
    }
}

/// Starts the signal thread. Each signal sets its flag and pings the loop.
///
/// The thread lives until the process exits.
pub(super) fn spawn(waker: calloop::ping::Ping) -> Result<SignalFlags> {
    let mut signals =
        Signals::new([SIGUSR1, SIGTERM, SIGINT]).context("Failed to register signal handler")?;
    let flags = SignalFlags::default();
    let thread_flags = flags.clone();

    thread::Builder::new()
        .name("annotateit-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                thread_flags.record(signal);
                waker.ping();
            }
        })
        .context("Failed to spawn signal thread")?;

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_consumed_once() {
        let flags = SignalFlags::default();
        flags.record(SIGUSR1);
        assert!(flags.take_toggle());
        assert!(!flags.take_toggle());
        assert!(!flags.quit_requested());
    }

    #[test]
    fn term_and_int_request_quit() {
        let flags = SignalFlags::default();
        flags.record(SIGINT);
        assert!(flags.quit_requested());
        assert!(flags.quit_requested());

        let flags = SignalFlags::default();
        flags.record(SIGTERM);
        assert!(flags.quit_requested());
    }
}
