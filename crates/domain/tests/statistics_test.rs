use ferrous_forwarder_domain::{DomainCounters, QuerySource, StatisticsSnapshot};

#[test]
fn test_counters_track_sources() {
    let mut counters = DomainCounters::default();
    counters.record_answer(QuerySource::Hosts);
    counters.record_answer(QuerySource::Cache);
    counters.record_answer(QuerySource::Udp);
    counters.record_refused();

    assert_eq!(counters.total, 4);
    assert_eq!(counters.hosts, 1);
    assert_eq!(counters.cache, 1);
    assert_eq!(counters.udp, 1);
    assert_eq!(counters.tcp, 0);
    assert_eq!(counters.refused, 1);
}

#[test]
fn test_snapshot_top_orders_by_total() {
    let busy = DomainCounters {
        total: 10,
        ..Default::default()
    };
    let quiet = DomainCounters {
        total: 2,
        ..Default::default()
    };
    let snapshot = StatisticsSnapshot {
        domains: vec![
            ("quiet.example".to_string(), quiet),
            ("busy.example".to_string(), busy),
        ],
    };

    let top = snapshot.top(1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].0, "busy.example");
}

#[test]
fn test_source_tags() {
    assert_eq!(QuerySource::Hosts.tag(), 'H');
    assert_eq!(QuerySource::Cache.tag(), 'C');
    assert_eq!(QuerySource::Udp.tag(), 'U');
    assert_eq!(QuerySource::Tcp.tag(), 'T');
}
