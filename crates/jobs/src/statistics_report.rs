use crate::runner::BackgroundJob;
use crate::shutdown::ShutdownSignal;
use ferrous_forwarder_application::ports::StatisticsSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_TOP_DOMAINS: usize = 10;

/// Logs the busiest domains on every interval.
pub struct StatisticsReportJob {
    source: Arc<dyn StatisticsSource>,
    interval: Duration,
    top: usize,
}

impl StatisticsReportJob {
    pub fn new(source: Arc<dyn StatisticsSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            top: DEFAULT_TOP_DOMAINS,
        }
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Logs one report and returns how many domains it covered.
    pub fn report(&self) -> usize {
        let snapshot = self.source.snapshot();
        let top = snapshot.top(self.top);
        if top.is_empty() {
            return 0;
        }
        info!(domains = snapshot.domains.len(), "Query statistics");
        for (domain, counters) in &top {
            info!(
                domain = %domain,
                total = counters.total,
                refused = counters.refused,
                hosts = counters.hosts,
                cache = counters.cache,
                udp = counters.udp,
                tcp = counters.tcp,
                "Domain statistics"
            );
        }
        top.len()
    }
}

impl BackgroundJob for StatisticsReportJob {
    fn run(self, signal: ShutdownSignal) {
        info!(interval_secs = self.interval.as_secs(), "Starting statistics report job");
        while signal.wait(self.interval) {
            self.report();
        }
        info!("StatisticsReportJob: shutting down");
    }
}
