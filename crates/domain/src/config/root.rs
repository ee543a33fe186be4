use serde::{Deserialize, Serialize};

use super::cache::{CacheConfig, MIN_CACHE_SIZE};
use super::errors::ConfigError;
use super::filtering::FilteringConfig;
use super::hosts::HostsConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::statistics::StatisticsConfig;
use super::upstream::UpstreamConfig;
use crate::parse_server_addr;

/// Main configuration structure for Ferrous Forwarder
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Local listeners
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream servers and transport policy
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Record cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Disabled types/domains and excluded-domain lists
    #[serde(default)]
    pub filtering: FilteringConfig,

    /// Static hosts overrides
    #[serde(default)]
    pub hosts: HostsConfig,

    /// Per-domain query counters
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-forwarder.toml in current directory
    /// 3. /etc/ferrous-forwarder/config.toml
    /// 4. Default configuration
    ///
    /// Returns the configuration together with notes about options that
    /// normalization rewrote, for the caller to log.
    pub fn load(
        path: Option<&str>,
        cli_overrides: CliOverrides,
    ) -> Result<(Self, Vec<String>), ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-forwarder.toml").exists() {
            Self::from_file("ferrous-forwarder.toml")?
        } else if std::path::Path::new("/etc/ferrous-forwarder/config.toml").exists() {
            Self::from_file("/etc/ferrous-forwarder/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        let notes = config.normalize();
        config.validate()?;
        Ok((config, notes))
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Reconcile options that contradict each other.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        let cache = &mut self.cache;

        if cache.multiple_ttl == 0 {
            notes.push(
                "multiple_ttl is 0; set cache.enabled = false to disable caching. Restored to 1"
                    .to_string(),
            );
            cache.multiple_ttl = 1;
        }
        if cache.ignore_ttl {
            if cache.multiple_ttl != 1 {
                notes.push("Ignored multiple_ttl because TTLs are ignored".to_string());
                cache.multiple_ttl = 1;
            }
            if cache.override_ttl > -1 {
                notes.push("Ignored override_ttl because TTLs are ignored".to_string());
                cache.override_ttl = -1;
            }
        }
        if cache.multiple_ttl != 1 && cache.override_ttl > -1 {
            notes.push(format!(
                "Ignored multiple_ttl because TTLs are overridden to {}",
                cache.override_ttl
            ));
            cache.multiple_ttl = 1;
        }
        if cache.size % 8 != 0 {
            cache.size = cache.size.div_ceil(8) * 8;
        }

        if self.server.udp_threads == 0 {
            notes.push("udp_threads must be at least 1".to_string());
            self.server.udp_threads = 1;
        }

        notes
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        let primary = self.upstream.primary_protocol;
        if self.upstream.servers(primary).is_empty() {
            return Err(ConfigError::Validation(format!(
                "No {} upstream servers configured for the primary protocol",
                primary
            )));
        }

        for server in self
            .upstream
            .udp_servers
            .iter()
            .chain(self.upstream.tcp_servers.iter())
        {
            parse_server_addr(server).map_err(|e| ConfigError::Validation(e.to_string()))?;
        }

        for entry in &self.upstream.dedicated_servers {
            let mut parts = entry.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(_), Some(server)) => {
                    parse_server_addr(server)
                        .map_err(|e| ConfigError::Validation(e.to_string()))?;
                }
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "Dedicated server entry '{}' must be 'domain server'",
                        entry
                    )))
                }
            }
        }

        if self.cache.enabled {
            if self.cache.size < MIN_CACHE_SIZE {
                return Err(ConfigError::Validation(format!(
                    "Cache size must not be less than {} bytes",
                    MIN_CACHE_SIZE
                )));
            }
            if !self.cache.memory_cache && self.cache.cache_file.is_none() {
                return Err(ConfigError::Validation(
                    "cache_file is required when memory_cache is false".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
