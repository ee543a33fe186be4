use ferrous_forwarder_application::services::DomainStatistics;
use ferrous_forwarder_domain::{
    FilteringConfig, QueryOutcome, QuerySource, RecordType, UpstreamProtocol,
};
use ferrous_forwarder_infrastructure::dns::cache::now_secs;
use ferrous_forwarder_infrastructure::dns::wire::{
    answer_records, first_answer_address, rcode, RCODE_SERVFAIL,
};
use ferrous_forwarder_infrastructure::dns::{ProtocolPolicy, QueryContext, UpstreamSession};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

mod helpers;
use helpers::{a_answer, query, DispatcherBuilder, MockExchange};

fn ip(a: u8, b: u8, c: u8, d: u8) -> Option<IpAddr> {
    Some(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
}

#[test]
fn test_hosts_answer_wins_over_cache() {
    let builder = DispatcherBuilder::new()
        .hosts(&["10.0.0.1 both.example"])
        .with_cache();
    let cache = builder.cache().unwrap();
    let request = query("both.example", RecordType::A);
    cache
        .store_response(&a_answer(&request, [203, 0, 113, 5], 300), now_secs())
        .unwrap();

    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = builder.build(exchange.clone());
    let mut session = UpstreamSession::new();
    let mut ctx = QueryContext::new(&request, None, &mut session).unwrap();

    let outcome = dispatcher.dispatch(&mut ctx);

    assert_eq!(outcome.source(), Some(QuerySource::Hosts));
    assert_eq!(ctx.source(), Some(QuerySource::Hosts));
    assert_eq!(first_answer_address(ctx.response()), ip(10, 0, 0, 1));
    assert_eq!(exchange.call_count(), 0);
}

#[test]
fn test_hosts_answer_uses_fixed_ttl() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = DispatcherBuilder::new()
        .hosts(&["10.0.0.7 nas.lan"])
        .build(exchange);
    let mut session = UpstreamSession::new();

    let response = dispatcher
        .respond(&query("nas.lan", RecordType::A), None, &mut session)
        .unwrap();
    let records = answer_records(&response).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "nas.lan");
    assert_eq!(records[0].ttl, 60);
}

#[test]
fn test_cache_hit_skips_upstream() {
    let builder = DispatcherBuilder::new().with_cache();
    let cache = builder.cache().unwrap();
    let request = query("cached.example", RecordType::A);
    cache
        .store_response(&a_answer(&request, [203, 0, 113, 5], 300), now_secs())
        .unwrap();

    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = builder.build(exchange.clone());
    let mut session = UpstreamSession::new();
    let mut ctx = QueryContext::new(&request, None, &mut session).unwrap();

    assert_eq!(dispatcher.dispatch(&mut ctx).source(), Some(QuerySource::Cache));
    assert_eq!(first_answer_address(ctx.response()), ip(203, 0, 113, 5));
    assert_eq!(exchange.call_count(), 0);
}

#[test]
fn test_upstream_answer_is_cached_for_next_request() {
    let builder = DispatcherBuilder::new().with_cache();
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = builder.build(exchange.clone());
    let request = query("fresh.example", RecordType::A);
    let mut session = UpstreamSession::new();

    let mut first = QueryContext::new(&request, None, &mut session).unwrap();
    assert_eq!(dispatcher.dispatch(&mut first).source(), Some(QuerySource::Udp));
    drop(first);

    let mut second = QueryContext::new(&request, None, &mut session).unwrap();
    assert_eq!(dispatcher.dispatch(&mut second).source(), Some(QuerySource::Cache));
    assert_eq!(first_answer_address(second.response()), ip(198, 51, 100, 1));
    assert_eq!(exchange.call_count(), 1);
}

#[test]
fn test_disabled_domain_never_reaches_upstream() {
    let statistics = Arc::new(DomainStatistics::new());
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = DispatcherBuilder::new()
        .filtering(FilteringConfig {
            disabled_domains: vec!["ads.example".to_string()],
            refusing_response_code: 5,
            ..FilteringConfig::default()
        })
        .statistics(statistics.clone())
        .build(exchange.clone());
    let mut session = UpstreamSession::new();
    let request = query("tracker.ads.example", RecordType::A);

    let mut ctx = QueryContext::new(&request, None, &mut session).unwrap();
    assert_eq!(dispatcher.dispatch(&mut ctx), QueryOutcome::Disabled);
    drop(ctx);

    let response = dispatcher.respond(&request, None, &mut session).unwrap();
    assert_eq!(rcode(&response), 5);
    assert_eq!(exchange.call_count(), 0);
    assert_eq!(statistics.get("tracker.ads.example").unwrap().refused, 2);
}

#[test]
fn test_disabled_type_refused_with_empty_answer() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = DispatcherBuilder::new()
        .filtering(FilteringConfig {
            disabled_types: vec![28],
            ..FilteringConfig::default()
        })
        .build(exchange.clone());
    let mut session = UpstreamSession::new();

    let response = dispatcher
        .respond(&query("example.org", RecordType::AAAA), None, &mut session)
        .unwrap();
    assert_eq!(rcode(&response), 0);
    assert!(answer_records(&response).unwrap().is_empty());
    assert_eq!(exchange.call_count(), 0);
}

#[test]
fn test_failure_without_fallback_is_servfail_and_advances_cursor() {
    let exchange = Arc::new(MockExchange::answering([0; 4]).failing_on(UpstreamProtocol::Udp));
    let dispatcher = DispatcherBuilder::new().build(exchange.clone());
    let mut session = UpstreamSession::new();

    let response = dispatcher
        .respond(&query("down.example", RecordType::A), None, &mut session)
        .unwrap();
    assert_eq!(rcode(&response), RCODE_SERVFAIL);

    dispatcher.respond(&query("down.example", RecordType::A), None, &mut session);
    let calls = exchange.calls();
    let first: SocketAddr = "192.0.2.1:53".parse().unwrap();
    let second: SocketAddr = "192.0.2.2:53".parse().unwrap();
    assert_eq!(calls[0].servers, vec![first]);
    assert_eq!(calls[1].servers, vec![second]);
}

#[test]
fn test_fallback_retries_on_other_protocol() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 9]).failing_on(UpstreamProtocol::Udp));
    let dispatcher = DispatcherBuilder::new()
        .tcp_servers(vec!["198.51.100.53:53".parse().unwrap()])
        .policy(ProtocolPolicy {
            primary: UpstreamProtocol::Udp,
            secondary: Some(UpstreamProtocol::Tcp),
            allow_fallback: true,
        })
        .build(exchange.clone());
    let mut session = UpstreamSession::new();
    let request = query("fallback.example", RecordType::A);
    let mut ctx = QueryContext::new(&request, None, &mut session).unwrap();

    assert_eq!(dispatcher.dispatch(&mut ctx).source(), Some(QuerySource::Tcp));
    let protocols: Vec<_> = exchange.calls().iter().map(|c| c.protocol).collect();
    assert_eq!(protocols, vec![UpstreamProtocol::Udp, UpstreamProtocol::Tcp]);
}

#[test]
fn test_excluded_domain_goes_to_secondary_first() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 9]));
    let dispatcher = DispatcherBuilder::new()
        .tcp_servers(vec!["198.51.100.53:53".parse().unwrap()])
        .filtering(FilteringConfig {
            excluded_domains: vec!["blocked.example".to_string()],
            ..FilteringConfig::default()
        })
        .policy(ProtocolPolicy {
            primary: UpstreamProtocol::Udp,
            secondary: Some(UpstreamProtocol::Tcp),
            allow_fallback: false,
        })
        .build(exchange.clone());
    let mut session = UpstreamSession::new();

    dispatcher.respond(&query("www.blocked.example", RecordType::A), None, &mut session);
    dispatcher.respond(&query("open.example", RecordType::A), None, &mut session);

    let protocols: Vec<_> = exchange.calls().iter().map(|c| c.protocol).collect();
    assert_eq!(protocols, vec![UpstreamProtocol::Tcp, UpstreamProtocol::Udp]);
}

#[test]
fn test_dedicated_server_receives_its_domain() {
    let dedicated: SocketAddr = "10.53.0.1:53".parse().unwrap();
    let exchange = Arc::new(MockExchange::answering([10, 1, 1, 1]));
    let dispatcher = DispatcherBuilder::new()
        .dedicated("corp.example", dedicated)
        .build(exchange.clone());
    let mut session = UpstreamSession::new();

    dispatcher.respond(&query("wiki.corp.example", RecordType::A), None, &mut session);
    assert_eq!(exchange.calls()[0].servers, vec![dedicated]);
}

#[test]
fn test_hosts_cname_resolves_target_from_hosts() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = DispatcherBuilder::new()
        .hosts(&["target.example alias.example", "10.9.9.9 target.example"])
        .build(exchange.clone());
    let mut session = UpstreamSession::new();
    let request = query("alias.example", RecordType::A);
    let mut ctx = QueryContext::new(&request, None, &mut session).unwrap();

    assert_eq!(dispatcher.dispatch(&mut ctx).source(), Some(QuerySource::Hosts));
    let records = answer_records(ctx.response()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].rtype, RecordType::CNAME);
    assert_eq!(records[0].cname_target().as_deref(), Some("target.example"));
    assert_eq!(records[1].name, "target.example");
    assert_eq!(records[1].address(), ip(10, 9, 9, 9));
    assert_eq!(exchange.call_count(), 0);
}

#[test]
fn test_hosts_cname_target_resolved_upstream() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 77]));
    let dispatcher = DispatcherBuilder::new()
        .hosts(&["real.example short.example"])
        .build(exchange.clone());
    let mut session = UpstreamSession::new();

    let response = dispatcher
        .respond(&query("short.example", RecordType::A), None, &mut session)
        .unwrap();
    let records = answer_records(&response).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].name, "real.example");
    assert_eq!(records[1].address(), ip(198, 51, 100, 77));
    assert_eq!(exchange.call_count(), 1);
}

#[test]
fn test_hosts_cname_cycle_terminates() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 2]));
    let dispatcher = DispatcherBuilder::new()
        .hosts(&["b.example a.example", "a.example b.example"])
        .build(exchange.clone());
    let mut session = UpstreamSession::new();
    let request = query("a.example", RecordType::A);
    let mut ctx = QueryContext::new(&request, None, &mut session).unwrap();

    let outcome = dispatcher.dispatch(&mut ctx);

    assert_eq!(outcome.source(), Some(QuerySource::Hosts));
    let records = answer_records(ctx.response()).unwrap();
    assert_eq!(records[0].rtype, RecordType::CNAME);
    assert_eq!(exchange.call_count(), 1);
}

#[test]
fn test_statistics_count_sources() {
    let statistics = Arc::new(DomainStatistics::new());
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = DispatcherBuilder::new()
        .hosts(&["10.0.0.1 local.example"])
        .statistics(statistics.clone())
        .build(exchange);
    let mut session = UpstreamSession::new();

    dispatcher.respond(&query("local.example", RecordType::A), None, &mut session);
    dispatcher.respond(&query("remote.example", RecordType::A), None, &mut session);

    assert_eq!(statistics.get("local.example").unwrap().hosts, 1);
    assert_eq!(statistics.get("remote.example").unwrap().udp, 1);
}

#[test]
fn test_unreadable_request_is_dropped() {
    let exchange = Arc::new(MockExchange::answering([198, 51, 100, 1]));
    let dispatcher = DispatcherBuilder::new().build(exchange);
    let mut session = UpstreamSession::new();
    assert!(dispatcher.respond(&[0x12, 0x34], None, &mut session).is_none());
}
