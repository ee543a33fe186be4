use crate::ports::{StatisticsSink, StatisticsSource};
use dashmap::DashMap;
use ferrous_forwarder_domain::{DomainCounters, QuerySource, StatisticsSnapshot};
use rustc_hash::FxBuildHasher;

/// In-memory per-domain query counters, safe to update from every worker.
pub struct DomainStatistics {
    counters: DashMap<String, DomainCounters, FxBuildHasher>,
}

impl DomainStatistics {
    pub fn new() -> Self {
        Self {
            counters: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn get(&self, domain: &str) -> Option<DomainCounters> {
        self.counters.get(domain).map(|entry| *entry)
    }

    fn update(&self, domain: &str, f: impl FnOnce(&mut DomainCounters)) {
        if let Some(mut entry) = self.counters.get_mut(domain) {
            f(&mut entry);
            return;
        }
        f(&mut self.counters.entry(domain.to_ascii_lowercase()).or_default());
    }
}

impl Default for DomainStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsSink for DomainStatistics {
    fn record_answer(&self, domain: &str, source: QuerySource) {
        self.update(domain, |c| c.record_answer(source));
    }

    fn record_refused(&self, domain: &str) {
        self.update(domain, |c| c.record_refused());
    }

    fn record_failure(&self, domain: &str) {
        self.update(domain, |c| c.record_failure());
    }
}

impl StatisticsSource for DomainStatistics {
    fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            domains: self
                .counters
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }
}

/// Sink used when domain statistics are turned off.
pub struct NoopStatistics;

impl StatisticsSink for NoopStatistics {
    fn record_answer(&self, _domain: &str, _source: QuerySource) {}

    fn record_refused(&self, _domain: &str) {}

    fn record_failure(&self, _domain: &str) {}
}
