pub mod cache;
pub mod errors;
pub mod filtering;
pub mod hosts;
pub mod logging;
pub mod root;
pub mod server;
pub mod statistics;
pub mod upstream;

pub use cache::{CacheConfig, TtlPolicy};
pub use errors::ConfigError;
pub use filtering::FilteringConfig;
pub use hosts::HostsConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use statistics::StatisticsConfig;
pub use upstream::UpstreamConfig;
