use ferrous_forwarder_domain::{QuerySource, StatisticsSnapshot};

/// Receives one event per dispatched query.
pub trait StatisticsSink: Send + Sync {
    fn record_answer(&self, domain: &str, source: QuerySource);

    fn record_refused(&self, domain: &str);

    fn record_failure(&self, domain: &str);
}

pub trait StatisticsSource: Send + Sync {
    fn snapshot(&self) -> StatisticsSnapshot;
}
