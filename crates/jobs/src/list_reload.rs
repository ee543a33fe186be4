use crate::runner::BackgroundJob;
use crate::shutdown::ShutdownSignal;
use ferrous_forwarder_application::ports::{ListReloadOutcome, ListReloadPort};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rebuilds a file-backed domain list when its file changes.
///
/// The first check happens one interval after start; the list is expected
/// to be loaded once during startup. A failed reload is retried after the
/// shorter retry interval.
pub struct ListReloadJob {
    list: Arc<dyn ListReloadPort>,
    interval: Duration,
    retry_interval: Duration,
}

impl ListReloadJob {
    pub fn new(list: Arc<dyn ListReloadPort>, interval: Duration) -> Self {
        Self {
            list,
            interval,
            retry_interval: interval,
        }
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Runs one check and returns how long to wait before the next.
    fn tick(&self) -> Duration {
        match self.list.reload_if_changed() {
            Ok(ListReloadOutcome::Reloaded { entries }) => {
                info!(list = self.list.name(), entries, "List reloaded");
                self.interval
            }
            Ok(ListReloadOutcome::Unchanged) => {
                debug!(list = self.list.name(), "List unchanged");
                self.interval
            }
            Err(e) => {
                warn!(
                    list = self.list.name(),
                    error = %e,
                    retry_secs = self.retry_interval.as_secs(),
                    "List reload failed"
                );
                self.retry_interval
            }
        }
    }
}

impl BackgroundJob for ListReloadJob {
    fn run(self, signal: ShutdownSignal) {
        info!(
            list = self.list.name(),
            interval_secs = self.interval.as_secs(),
            "Starting list reload job"
        );
        let mut wait = self.interval;
        while signal.wait(wait) {
            wait = self.tick();
        }
        info!(list = self.list.name(), "ListReloadJob: shutting down");
    }
}
