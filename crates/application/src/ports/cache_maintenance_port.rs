use ferrous_forwarder_domain::DomainError;

/// Outcome of one eviction sweep over the record cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheSweepOutcome {
    pub entries_expired: usize,
    pub live_entries: usize,
    /// First free payload byte after the sweep.
    pub end_cursor: usize,
}

/// Port for periodic record cache eviction.
pub trait CacheMaintenancePort: Send + Sync {
    /// Expire entries whose TTL has run out and reclaim their space.
    fn run_sweep(&self) -> Result<CacheSweepOutcome, DomainError>;
}
