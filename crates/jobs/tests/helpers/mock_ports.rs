use ferrous_forwarder_application::ports::{
    CacheMaintenancePort, CacheSweepOutcome, ListReloadOutcome, ListReloadPort, StatisticsSource,
};
use ferrous_forwarder_domain::{DomainCounters, DomainError, StatisticsSnapshot};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

pub struct MockCacheMaintenancePort {
    sweep_count: AtomicU64,
    should_fail: AtomicBool,
}

impl MockCacheMaintenancePort {
    pub fn new() -> Self {
        Self {
            sweep_count: AtomicU64::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn sweep_count(&self) -> u64 {
        self.sweep_count.load(Ordering::SeqCst)
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }
}

impl CacheMaintenancePort for MockCacheMaintenancePort {
    fn run_sweep(&self) -> Result<CacheSweepOutcome, DomainError> {
        self.sweep_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Io("mock sweep failure".to_string()));
        }
        Ok(CacheSweepOutcome {
            entries_expired: 1,
            live_entries: 0,
            end_cursor: 128,
        })
    }
}

/// Records the instant of every reload call.
pub struct MockListReload {
    calls: Mutex<Vec<Instant>>,
    should_fail: AtomicBool,
}

impl MockListReload {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let mock = Self::new();
        mock.should_fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ListReloadPort for MockListReload {
    fn name(&self) -> &str {
        "mock-list"
    }

    fn reload_if_changed(&self) -> Result<ListReloadOutcome, DomainError> {
        self.calls.lock().unwrap().push(Instant::now());
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Io("mock list unreadable".to_string()));
        }
        Ok(ListReloadOutcome::Reloaded { entries: 3 })
    }
}

pub struct MockStatisticsSource {
    snapshot_count: AtomicU64,
    domains: Vec<(String, DomainCounters)>,
}

impl MockStatisticsSource {
    pub fn with_domains(domains: &[(&str, u64)]) -> Self {
        Self {
            snapshot_count: AtomicU64::new(0),
            domains: domains
                .iter()
                .map(|(name, total)| {
                    (
                        name.to_string(),
                        DomainCounters {
                            total: *total,
                            ..DomainCounters::default()
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count.load(Ordering::SeqCst)
    }
}

impl StatisticsSource for MockStatisticsSource {
    fn snapshot(&self) -> StatisticsSnapshot {
        self.snapshot_count.fetch_add(1, Ordering::SeqCst);
        StatisticsSnapshot {
            domains: self.domains.clone(),
        }
    }
}
