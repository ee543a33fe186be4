use crate::QuerySource;

/// Per-domain query counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainCounters {
    pub total: u64,
    pub refused: u64,
    pub hosts: u64,
    pub cache: u64,
    pub udp: u64,
    pub tcp: u64,
}

impl DomainCounters {
    pub fn record_answer(&mut self, source: QuerySource) {
        self.total += 1;
        match source {
            QuerySource::Hosts => self.hosts += 1,
            QuerySource::Cache => self.cache += 1,
            QuerySource::Udp => self.udp += 1,
            QuerySource::Tcp => self.tcp += 1,
        }
    }

    pub fn record_refused(&mut self) {
        self.total += 1;
        self.refused += 1;
    }

    pub fn record_failure(&mut self) {
        self.total += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticsSnapshot {
    pub domains: Vec<(String, DomainCounters)>,
}

impl StatisticsSnapshot {
    /// Domains ordered by total queries, busiest first.
    pub fn top(&self, n: usize) -> Vec<(String, DomainCounters)> {
        let mut sorted = self.domains.clone();
        sorted.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(n);
        sorted
    }
}
