use ferrous_forwarder_application::ports::StatisticsSink;
use ferrous_forwarder_domain::{
    FilteringConfig, HostsConfig, RecordClass, RecordType, UpstreamProtocol,
};
use ferrous_forwarder_infrastructure::dns::cache::{RecordCache, RecordCacheOptions, SharedRecordCache};
use ferrous_forwarder_infrastructure::dns::wire::{
    build_query, build_response, extract_question, write_record_with_pointer, QUESTION_POINTER,
};
use ferrous_forwarder_infrastructure::dns::{
    AddressBook, DnsDispatcher, DomainFilters, HostsProvider, ProtocolPolicy, UpstreamExchange,
};
use std::net::SocketAddr;
use std::sync::Arc;

pub fn query(name: &str, rtype: RecordType) -> Vec<u8> {
    build_query(name, rtype).unwrap().1
}

/// A NOERROR answer to `request` carrying one A record.
pub fn a_answer(request: &[u8], octets: [u8; 4], ttl: u32) -> Vec<u8> {
    let question = extract_question(request).unwrap();
    let mut rr = Vec::new();
    write_record_with_pointer(
        &mut rr,
        QUESTION_POINTER,
        RecordType::A,
        RecordClass::IN,
        ttl,
        &octets,
    )
    .unwrap();
    build_response(request, question.end, 0, 1, &rr)
}

pub struct DispatcherBuilder {
    filtering: FilteringConfig,
    hosts: Vec<String>,
    udp: Vec<SocketAddr>,
    tcp: Vec<SocketAddr>,
    dedicated: Vec<(String, SocketAddr)>,
    parallel: bool,
    policy: ProtocolPolicy,
    cache: Option<Arc<SharedRecordCache>>,
    statistics: Option<Arc<dyn StatisticsSink>>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            filtering: FilteringConfig::default(),
            hosts: Vec::new(),
            udp: vec!["192.0.2.1:53".parse().unwrap(), "192.0.2.2:53".parse().unwrap()],
            tcp: Vec::new(),
            dedicated: Vec::new(),
            parallel: false,
            policy: ProtocolPolicy::primary_only(UpstreamProtocol::Udp),
            cache: None,
            statistics: None,
        }
    }

    pub fn hosts(mut self, lines: &[&str]) -> Self {
        self.hosts = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn filtering(mut self, filtering: FilteringConfig) -> Self {
        self.filtering = filtering;
        self
    }

    pub fn udp_servers(mut self, servers: Vec<SocketAddr>) -> Self {
        self.udp = servers;
        self
    }

    pub fn tcp_servers(mut self, servers: Vec<SocketAddr>) -> Self {
        self.tcp = servers;
        self
    }

    pub fn dedicated(mut self, domain: &str, server: SocketAddr) -> Self {
        self.dedicated.push((domain.to_string(), server));
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn policy(mut self, policy: ProtocolPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache(mut self) -> Self {
        let cache = RecordCache::open(RecordCacheOptions::in_memory(200 * 1024)).unwrap();
        self.cache = Some(Arc::new(SharedRecordCache::new(cache)));
        self
    }

    pub fn statistics(mut self, sink: Arc<dyn StatisticsSink>) -> Self {
        self.statistics = Some(sink);
        self
    }

    pub fn cache(&self) -> Option<Arc<SharedRecordCache>> {
        self.cache.clone()
    }

    pub fn build(self, exchange: Arc<dyn UpstreamExchange>) -> DnsDispatcher {
        let filters = DomainFilters::from_config(&self.filtering).unwrap();
        let hosts = HostsProvider::from_config(&HostsConfig {
            append_hosts: self.hosts,
            ..HostsConfig::default()
        })
        .unwrap();
        let mut book = AddressBook::new(self.udp, self.tcp).with_parallel_udp(self.parallel);
        for (domain, server) in &self.dedicated {
            book = book.with_dedicated(domain, *server).unwrap();
        }

        let mut dispatcher = DnsDispatcher::new(
            Arc::new(filters),
            Arc::new(hosts),
            Arc::new(book),
            exchange,
            self.policy,
        );
        if let Some(cache) = self.cache {
            dispatcher = dispatcher.with_cache(cache);
        }
        if let Some(statistics) = self.statistics {
            dispatcher = dispatcher.with_statistics(statistics);
        }
        dispatcher
    }
}
