use super::context::QueryContext;
use crate::dns::cache::{now_secs, SharedRecordCache};
use crate::dns::filters::DomainFilters;
use crate::dns::hosts::{HostsMatch, HostsProvider};
use crate::dns::transport::{UpstreamExchange, UpstreamSession};
use crate::dns::upstream::AddressBook;
use crate::dns::wire::{
    answer_records, build_response, compress, serialize_resource_record, write_name,
    write_record_with_pointer, QUESTION_POINTER, RCODE_NOERROR, RCODE_SERVFAIL,
};
use ferrous_forwarder_application::ports::StatisticsSink;
use ferrous_forwarder_application::services::NoopStatistics;
use ferrous_forwarder_domain::{
    DomainError, QueryOutcome, QuerySource, RecordClass, RecordType, UpstreamConfig,
    UpstreamProtocol,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// TTL of answers synthesized from hosts entries.
pub const HOSTS_TTL: u32 = 60;

/// Which protocol a request tries first, and whether it may retry on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolPolicy {
    pub primary: UpstreamProtocol,
    pub secondary: Option<UpstreamProtocol>,
    pub allow_fallback: bool,
}

impl ProtocolPolicy {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            primary: config.primary_protocol,
            secondary: config.secondary_protocol(),
            allow_fallback: config.allow_fallback,
        }
    }

    pub fn primary_only(primary: UpstreamProtocol) -> Self {
        Self {
            primary,
            secondary: None,
            allow_fallback: false,
        }
    }
}

/// Answers one request: policy check, hosts, cache, then upstream.
pub struct DnsDispatcher {
    filters: Arc<DomainFilters>,
    hosts: Arc<HostsProvider>,
    cache: Option<Arc<SharedRecordCache>>,
    upstream: Arc<AddressBook>,
    exchange: Arc<dyn UpstreamExchange>,
    statistics: Arc<dyn StatisticsSink>,
    policy: ProtocolPolicy,
    compress_answers: bool,
}

impl DnsDispatcher {
    pub fn new(
        filters: Arc<DomainFilters>,
        hosts: Arc<HostsProvider>,
        upstream: Arc<AddressBook>,
        exchange: Arc<dyn UpstreamExchange>,
        policy: ProtocolPolicy,
    ) -> Self {
        Self {
            filters,
            hosts,
            cache: None,
            upstream,
            exchange,
            statistics: Arc::new(NoopStatistics),
            policy,
            compress_answers: false,
        }
    }

    pub fn with_cache(mut self, cache: Arc<SharedRecordCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_statistics(mut self, statistics: Arc<dyn StatisticsSink>) -> Self {
        self.statistics = statistics;
        self
    }

    /// Re-encode hosts and cache answers with name compression.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_answers = enabled;
        self
    }

    pub fn refusing_response_code(&self) -> u8 {
        self.filters.refusing_response_code()
    }

    /// Handles raw request bytes and returns the bytes to send back, if any.
    ///
    /// Requests without a readable question are dropped.
    pub fn respond(
        &self,
        request: &[u8],
        client: Option<SocketAddr>,
        session: &mut UpstreamSession,
    ) -> Option<Vec<u8>> {
        let mut ctx = match QueryContext::new(request, client, session) {
            Ok(ctx) => ctx,
            Err(e) => {
                debug!(client = ?client, error = %e, "Dropping unreadable request");
                return None;
            }
        };
        let outcome = self.dispatch(&mut ctx);
        let end = ctx.question().end;
        match outcome {
            QueryOutcome::Answered { .. } => Some(ctx.into_response()),
            QueryOutcome::Disabled => Some(build_response(
                request,
                end,
                self.refusing_response_code(),
                0,
                &[],
            )),
            QueryOutcome::Error => Some(build_response(request, end, RCODE_SERVFAIL, 0, &[])),
        }
    }

    /// Runs the pipeline for a top-level request and records statistics.
    pub fn dispatch(&self, ctx: &mut QueryContext<'_>) -> QueryOutcome {
        let outcome = self.resolve(ctx);
        let name = ctx.question().name.as_str();
        match outcome {
            QueryOutcome::Answered { source, len } => {
                debug!(
                    client = ?ctx.client(),
                    domain = %name,
                    record_type = %ctx.question().qtype.as_str(),
                    source = %source,
                    len,
                    "Query answered"
                );
                self.statistics.record_answer(name, source);
            }
            QueryOutcome::Disabled => self.statistics.record_refused(name),
            QueryOutcome::Error => {
                warn!(domain = %name, "Query failed on every upstream attempt");
                self.statistics.record_failure(name);
            }
        }
        outcome
    }

    fn resolve(&self, ctx: &mut QueryContext<'_>) -> QueryOutcome {
        let qtype = ctx.question().qtype;
        if self.filters.is_type_disabled(qtype) || self.filters.is_domain_disabled(&ctx.question().name)
        {
            info!(
                domain = %ctx.question().name,
                record_type = %qtype.as_str(),
                "Refused by policy"
            );
            return QueryOutcome::Disabled;
        }

        if ctx.single_question() {
            if let Some(outcome) = self.answer_from_hosts(ctx) {
                return outcome;
            }
            if let Some(outcome) = self.answer_from_cache(ctx) {
                return outcome;
            }
        }
        self.answer_from_upstream(ctx)
    }

    fn answer_from_hosts(&self, ctx: &mut QueryContext<'_>) -> Option<QueryOutcome> {
        let question = ctx.question().clone();
        match self.hosts.lookup(&question.name, question.qtype) {
            HostsMatch::Perfect { rtype, rdata } => {
                let mut answers = Vec::new();
                write_record_with_pointer(
                    &mut answers,
                    QUESTION_POINTER,
                    rtype,
                    question.qclass,
                    HOSTS_TTL,
                    &rdata,
                )
                .ok()?;
                Some(self.finish_local(ctx, 1, &answers, QuerySource::Hosts))
            }
            HostsMatch::OnlyCname(target) => self.follow_hosts_cname(ctx, &target),
            HostsMatch::None | HostsMatch::Disabled => None,
        }
    }

    /// Answers with the hosts CNAME plus whatever the target resolves to.
    fn follow_hosts_cname(&self, ctx: &mut QueryContext<'_>, target: &str) -> Option<QueryOutcome> {
        let mut cname_rdata = Vec::with_capacity(target.len() + 2);
        write_name(&mut cname_rdata, target).ok()?;

        let domain = ctx.question().name.clone();
        let mut child = match ctx.child(target) {
            Ok(child) => child,
            Err(e) => {
                warn!(domain = %domain, cname = %target, error = %e, "Hosts CNAME not followed");
                return None;
            }
        };

        let mut answers = Vec::new();
        write_record_with_pointer(
            &mut answers,
            QUESTION_POINTER,
            RecordType::CNAME,
            RecordClass::IN,
            HOSTS_TTL,
            &cname_rdata,
        )
        .ok()?;
        let mut count: u16 = 1;

        match self.resolve(&mut child) {
            QueryOutcome::Answered { .. } => match answer_records(child.response()) {
                Ok(records) => {
                    for record in records {
                        if serialize_resource_record(
                            &mut answers,
                            &record.name,
                            record.rtype,
                            record.class,
                            record.ttl,
                            &record.rdata,
                        )
                        .is_ok()
                        {
                            count = count.saturating_add(1);
                        }
                    }
                }
                Err(e) => debug!(cname = %target, error = %e, "Unreadable CNAME target answer"),
            },
            outcome => debug!(cname = %target, ?outcome, "CNAME target unresolved"),
        }
        drop(child);

        Some(self.finish_local(ctx, count, &answers, QuerySource::Hosts))
    }

    fn answer_from_cache(&self, ctx: &mut QueryContext<'_>) -> Option<QueryOutcome> {
        let cache = self.cache.as_ref()?;
        let question = ctx.question();
        let records =
            cache.get_by_question(&question.name, question.qtype, question.qclass, now_secs())?;

        let mut answers = Vec::new();
        let mut count: u16 = 0;
        for record in &records {
            if let Err(e) = serialize_resource_record(
                &mut answers,
                &record.name,
                record.rtype,
                record.class,
                record.ttl,
                &record.rdata,
            ) {
                debug!(domain = %record.name, error = %e, "Skipping unserializable cached record");
                continue;
            }
            count = count.saturating_add(1);
        }
        if count == 0 {
            return None;
        }
        Some(self.finish_local(ctx, count, &answers, QuerySource::Cache))
    }

    fn finish_local(
        &self,
        ctx: &mut QueryContext<'_>,
        count: u16,
        answers: &[u8],
        source: QuerySource,
    ) -> QueryOutcome {
        let mut response = build_response(
            ctx.request(),
            ctx.question().end,
            RCODE_NOERROR,
            count,
            answers,
        );
        if self.compress_answers {
            response = compress(&response).into_owned();
        }
        let len = response.len();
        ctx.set_response(response, source);
        QueryOutcome::Answered { len, source }
    }

    fn answer_from_upstream(&self, ctx: &mut QueryContext<'_>) -> QueryOutcome {
        let first = match self.policy.secondary {
            Some(secondary) if self.filters.is_excluded(&ctx.question().name) => secondary,
            _ => self.policy.primary,
        };

        match self.query_protocol(ctx, first) {
            Ok(response) => return self.accept_upstream(ctx, response, first),
            Err(e) => {
                debug!(domain = %ctx.question().name, protocol = %first, error = %e, "Upstream attempt failed");
                self.upstream.advance(first);
            }
        }

        let second = first.other();
        if !self.policy.allow_fallback || !self.upstream.has_servers(second) {
            return QueryOutcome::Error;
        }
        match self.query_protocol(ctx, second) {
            Ok(response) => self.accept_upstream(ctx, response, second),
            Err(e) => {
                debug!(domain = %ctx.question().name, protocol = %second, error = %e, "Fallback attempt failed");
                self.upstream.advance(second);
                QueryOutcome::Error
            }
        }
    }

    fn query_protocol(
        &self,
        ctx: &mut QueryContext<'_>,
        protocol: UpstreamProtocol,
    ) -> Result<Vec<u8>, DomainError> {
        let selection = self
            .upstream
            .select(&ctx.question().name, protocol)
            .ok_or(DomainError::NoUpstream {
                protocol: protocol.as_str(),
            })?;
        let (request, session) = ctx.request_and_session();
        self.exchange
            .exchange(session, protocol, selection.addresses(), request)
    }

    fn accept_upstream(
        &self,
        ctx: &mut QueryContext<'_>,
        response: Vec<u8>,
        protocol: UpstreamProtocol,
    ) -> QueryOutcome {
        if let Some(cache) = &self.cache {
            match cache.store_response(&response, now_secs()) {
                Ok(stored) => debug!(domain = %ctx.question().name, stored, "Cached upstream answer"),
                Err(e) => info!(domain = %ctx.question().name, error = %e, "Caching failed"),
            }
        }
        let source = match protocol {
            UpstreamProtocol::Udp => QuerySource::Udp,
            UpstreamProtocol::Tcp => QuerySource::Tcp,
        };
        let len = response.len();
        ctx.set_response(response, source);
        QueryOutcome::Answered { len, source }
    }
}
