use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostsConfig {
    #[serde(default)]
    pub file: Option<String>,

    /// Inline hosts lines, consulted before the file.
    #[serde(default)]
    pub append_hosts: Vec<String>,

    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            file: None,
            append_hosts: Vec::new(),
            update_interval: default_update_interval(),
            retry_interval: default_retry_interval(),
        }
    }
}

fn default_update_interval() -> u64 {
    600
}

fn default_retry_interval() -> u64 {
    30
}
