use ferrous_forwarder_application::ports::{ListReloadPort, StatisticsSink};
use ferrous_forwarder_application::services::{DomainStatistics, NoopStatistics};
use ferrous_forwarder_domain::Config;
use ferrous_forwarder_infrastructure::dns::{
    AddressBook, BlockedIpSet, DnsDispatcher, DomainFilters, HostsProvider, ProtocolPolicy,
    RecordCache, RecordCacheOptions, ResponseValidator, SharedRecordCache, SocketExchange,
};
use ferrous_forwarder_jobs::{
    CacheMaintenanceJob, JobRunner, ListReloadJob, StatisticsReportJob,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct DnsServices {
    pub dispatcher: Arc<DnsDispatcher>,
    pub cache: Option<Arc<SharedRecordCache>>,
    pub hosts: Arc<HostsProvider>,
    pub filters: Arc<DomainFilters>,
    pub statistics: Option<Arc<DomainStatistics>>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing DNS services");

        let filters = Arc::new(DomainFilters::from_config(&config.filtering)?);
        Self::initial_load(filters.as_ref());

        let hosts = Arc::new(HostsProvider::from_config(&config.hosts)?);
        Self::initial_load(hosts.as_ref());

        let cache = Self::build_cache(config)?;
        let upstream = Arc::new(AddressBook::from_config(&config.upstream)?);
        let exchange = Arc::new(SocketExchange::new(
            Duration::from_millis(config.upstream.query_timeout_ms),
            Self::build_validator(config),
        ));

        let statistics = config
            .statistics
            .enabled
            .then(|| Arc::new(DomainStatistics::new()));
        let sink: Arc<dyn StatisticsSink> = match &statistics {
            Some(stats) => stats.clone(),
            None => Arc::new(NoopStatistics),
        };

        let mut dispatcher = DnsDispatcher::new(
            filters.clone(),
            hosts.clone(),
            upstream,
            exchange,
            ProtocolPolicy::from_config(&config.upstream),
        )
        .with_statistics(sink)
        .with_compression(true);
        if let Some(cache) = &cache {
            dispatcher = dispatcher.with_cache(cache.clone());
        }

        info!(
            primary = %config.upstream.primary_protocol,
            cache = cache.is_some(),
            hosts = hosts.len(),
            excluded = filters.excluded_count(),
            "DNS services ready"
        );

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            cache,
            hosts,
            filters,
            statistics,
        })
    }

    pub fn job_runner(&self, config: &Config) -> JobRunner {
        let mut runner = JobRunner::new();

        if let Some(cache) = &self.cache {
            if let Some(interval) = cache.sweep_interval() {
                runner = runner.with_cache_sweep(CacheMaintenanceJob::new(cache.clone(), interval));
            }
        }

        if config.hosts.file.is_some() {
            runner = runner.with_hosts_reload(
                ListReloadJob::new(
                    self.hosts.clone(),
                    Duration::from_secs(config.hosts.update_interval),
                )
                .with_retry_interval(Duration::from_secs(config.hosts.retry_interval)),
            );
        }

        if self.filters.has_gfw_list() {
            runner = runner.with_gfw_reload(
                ListReloadJob::new(
                    self.filters.clone(),
                    Duration::from_secs(config.filtering.gfw_list_update_interval),
                )
                .with_retry_interval(Duration::from_secs(config.filtering.gfw_list_retry_interval)),
            );
        }

        if let Some(statistics) = &self.statistics {
            runner = runner.with_statistics_report(StatisticsReportJob::new(
                statistics.clone(),
                Duration::from_secs(config.statistics.report_interval),
            ));
        }

        runner
    }

    fn initial_load(list: &dyn ListReloadPort) {
        match list.reload_if_changed() {
            Ok(outcome) => info!(list = list.name(), ?outcome, "List loaded"),
            Err(e) => warn!(list = list.name(), error = %e, "Initial list load failed, will retry"),
        }
    }

    fn build_cache(config: &Config) -> anyhow::Result<Option<Arc<SharedRecordCache>>> {
        if !config.cache.enabled {
            info!("Record cache disabled");
            return Ok(None);
        }
        let cache = RecordCache::open(RecordCacheOptions::from_config(&config.cache))?;
        info!(
            size = cache.size(),
            live = cache.live_count(),
            expiry = ?cache.expiry(),
            "Record cache opened"
        );
        Ok(Some(Arc::new(SharedRecordCache::new(cache))))
    }

    fn build_validator(config: &Config) -> ResponseValidator {
        let mut validator = ResponseValidator::new().with_edns_probe(config.upstream.append_edns_opt);
        if config.upstream.anti_pollution {
            let (blocked, rejected) =
                BlockedIpSet::from_entries(config.upstream.blocked_ips.iter().map(String::as_str));
            for entry in rejected {
                warn!(entry = %entry, "Ignoring invalid blocked IP");
            }
            info!(blocked = blocked.len(), "Anti-pollution enabled");
            validator = validator.with_blocked_ips(blocked);
        }
        validator
    }
}
