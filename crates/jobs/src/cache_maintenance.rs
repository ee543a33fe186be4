use crate::runner::BackgroundJob;
use crate::shutdown::ShutdownSignal;
use ferrous_forwarder_application::ports::CacheMaintenancePort;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Periodic record cache eviction.
///
/// The interval comes from the cache's expiry mode: one second when TTLs
/// count down, longer when they are compared against the wall clock.
pub struct CacheMaintenanceJob {
    maintenance: Arc<dyn CacheMaintenancePort>,
    interval: Duration,
}

impl CacheMaintenanceJob {
    pub fn new(maintenance: Arc<dyn CacheMaintenancePort>, interval: Duration) -> Self {
        Self {
            maintenance,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn tick(&self) {
        match self.maintenance.run_sweep() {
            Ok(outcome) if outcome.entries_expired > 0 => {
                debug!(
                    expired = outcome.entries_expired,
                    live = outcome.live_entries,
                    end_cursor = outcome.end_cursor,
                    "Cache sweep completed"
                );
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Cache sweep failed"),
        }
    }
}

impl BackgroundJob for CacheMaintenanceJob {
    fn run(self, signal: ShutdownSignal) {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting cache sweep job");
        while signal.wait(self.interval) {
            self.tick();
        }
        info!("CacheMaintenanceJob: shutting down");
    }
}
