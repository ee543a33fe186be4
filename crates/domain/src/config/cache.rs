use serde::{Deserialize, Serialize};

pub const MIN_CACHE_SIZE: usize = 102_400;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Total bytes of the cache region, header and index included.
    #[serde(default = "default_size")]
    pub size: usize,

    /// Keep the region on the heap instead of mapping `cache_file`.
    #[serde(default = "default_true")]
    pub memory_cache: bool,

    #[serde(default)]
    pub cache_file: Option<String>,

    /// Records never expire.
    #[serde(default)]
    pub ignore_ttl: bool,

    /// Fixed TTL for every cached record; negative keeps upstream TTLs.
    #[serde(default = "default_override_ttl")]
    pub override_ttl: i32,

    #[serde(default = "default_multiple_ttl")]
    pub multiple_ttl: u32,

    /// Reattach an existing cache file instead of starting empty.
    #[serde(default)]
    pub reload_cache: bool,

    /// Rebuild an incompatible cache file instead of refusing to start.
    #[serde(default)]
    pub overwrite_cache: bool,

    /// Expire by wall clock instead of decrementing TTLs every second.
    #[serde(default)]
    pub static_ttl_countdown: bool,
}

/// How the TTL stored for a cached record is derived from the upstream TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlPolicy {
    Override(u32),
    Multiply(u32),
}

impl TtlPolicy {
    pub fn apply(&self, record_ttl: u32) -> u32 {
        match self {
            TtlPolicy::Override(ttl) => *ttl,
            TtlPolicy::Multiply(factor) => record_ttl.saturating_mul(*factor),
        }
    }
}

impl CacheConfig {
    pub fn ttl_policy(&self) -> TtlPolicy {
        if self.override_ttl >= 0 {
            TtlPolicy::Override(self.override_ttl as u32)
        } else {
            TtlPolicy::Multiply(self.multiple_ttl.max(1))
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: default_size(),
            memory_cache: true,
            cache_file: None,
            ignore_ttl: false,
            override_ttl: default_override_ttl(),
            multiple_ttl: default_multiple_ttl(),
            reload_cache: false,
            overwrite_cache: false,
            static_ttl_countdown: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_size() -> usize {
    1_048_576
}

fn default_override_ttl() -> i32 {
    -1
}

fn default_multiple_ttl() -> u32 {
    1
}
