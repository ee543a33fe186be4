use super::clock::now_secs;
use super::record_cache::{ExpiryMode, RecordCache};
use crate::dns::wire::RecordView;
use ferrous_forwarder_application::ports::{CacheMaintenancePort, CacheSweepOutcome};
use ferrous_forwarder_domain::{DomainError, RecordClass, RecordType};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// The record cache behind one reader/writer lock.
///
/// Lookups and the scan phase of a wall-clock sweep share the read lock;
/// inserts and evictions take the write lock.
pub struct SharedRecordCache {
    inner: RwLock<RecordCache>,
    expiry: ExpiryMode,
}

impl SharedRecordCache {
    pub fn new(cache: RecordCache) -> Self {
        let expiry = cache.expiry();
        Self {
            inner: RwLock::new(cache),
            expiry,
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, RecordCache> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, RecordCache> {
        self.inner.write()
    }

    pub fn expiry(&self) -> ExpiryMode {
        self.expiry
    }

    /// `None` when records never expire and no sweep should run.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.expiry.sweep_interval()
    }

    pub fn get_by_question(
        &self,
        name: &str,
        rtype: RecordType,
        class: RecordClass,
        now: u64,
    ) -> Option<Vec<RecordView>> {
        self.inner.read().get_by_question(name, rtype, class, now)
    }

    pub fn store_response(&self, response: &[u8], now: u64) -> Result<usize, DomainError> {
        self.inner.write().store_response(response, now)
    }

    pub fn sweep_at(&self, now: u64) -> CacheSweepOutcome {
        match self.expiry {
            ExpiryMode::Countdown => self.inner.write().sweep_countdown_tick(),
            ExpiryMode::WallClock => {
                let expired = self.inner.read().collect_expired(now);
                if expired.is_empty() {
                    return self.inner.read().sweep_outcome();
                }
                self.inner.write().remove_expired(&expired, now)
            }
            ExpiryMode::Never => self.inner.read().sweep_outcome(),
        }
    }

    pub fn flush(&self) -> Result<(), DomainError> {
        self.inner.read().flush()
    }
}

impl CacheMaintenancePort for SharedRecordCache {
    fn run_sweep(&self) -> Result<CacheSweepOutcome, DomainError> {
        Ok(self.sweep_at(now_secs()))
    }
}
