//! Ferrous Forwarder Domain Layer
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod query;
pub mod statistics;
pub mod upstream;

pub use config::{
    CacheConfig, CliOverrides, Config, ConfigError, FilteringConfig, HostsConfig, LoggingConfig,
    ServerConfig, StatisticsConfig, TtlPolicy, UpstreamConfig,
};
pub use dns_record::{RecordClass, RecordType};
pub use errors::DomainError;
pub use query::{QueryOutcome, QuerySource};
pub use statistics::{DomainCounters, StatisticsSnapshot};
pub use upstream::{parse_server_addr, UpstreamProtocol};
