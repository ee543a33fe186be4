use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_STEP: Duration = Duration::from_millis(100);

/// Liveness flag shared by every background thread.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    running: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Sleeps for `duration` in short steps. Returns false once shutdown is
    /// requested.
    pub fn wait(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while self.is_running() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            thread::sleep(remaining.min(POLL_STEP));
        }
        false
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
