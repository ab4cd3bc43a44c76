//! Process-wide run flag.
//!
//! [`RunState`] is the reader side polled by the run loop; [`ShutdownHandle`]
//! is the single writer. The handle is not `Clone`, so at most one party can
//! ever stop the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Shortest wake-up interval for [`RunState::sleep`].
const MIN_SLICE: Duration = Duration::from_millis(1);

/// Reader side of the run flag. Starts out running.
#[derive(Debug, Clone)]
pub struct RunState {
    running: Arc<AtomicBool>,
}

/// Writer side of the run flag.
#[derive(Debug)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
}

impl RunState {
    /// Create a running flag and its only writer.
    pub fn new() -> (Self, ShutdownHandle) {
        let running = Arc::new(AtomicBool::new(true));
        (
            Self {
                running: Arc::clone(&running),
            },
            ShutdownHandle { running },
        )
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Sleep for `delay`, waking every `slice` to check the flag.
    ///
    /// Returns `false` as soon as the flag is seen cleared.
    pub async fn sleep(&self, delay: Duration, slice: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let slice = slice.max(MIN_SLICE);
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            tokio::time::sleep((deadline - now).min(slice)).await;
        }
        false
    }
}

impl ShutdownHandle {
    /// Clear the flag. Returns `true` only for the call that actually stopped it.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }
}

/// Wait for SIGINT or SIGTERM, then clear the flag.
///
/// Later signals are ignored; the loop exits on its next poll.
pub async fn wait_for_signal(handle: ShutdownHandle) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    if handle.stop() {
        tracing::warn!("Shutdown signal received - bot will exit shortly");
    }
}
