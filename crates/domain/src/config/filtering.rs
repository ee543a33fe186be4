use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilteringConfig {
    /// Record type numbers that are always refused.
    #[serde(default)]
    pub disabled_types: Vec<u16>,

    #[serde(default)]
    pub disabled_domains: Vec<String>,

    /// Domains always sent over the secondary protocol.
    #[serde(default)]
    pub excluded_domains: Vec<String>,

    /// Path to a GFW-style list merged into the excluded domains.
    #[serde(default)]
    pub gfw_list: Option<String>,

    #[serde(default)]
    pub gfw_list_base64_decode: bool,

    #[serde(default = "default_gfw_list_update_interval")]
    pub gfw_list_update_interval: u64,

    #[serde(default = "default_retry_interval")]
    pub gfw_list_retry_interval: u64,

    /// RCODE of refusals; 0 answers with an empty NOERROR response.
    #[serde(default)]
    pub refusing_response_code: u8,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            disabled_types: Vec::new(),
            disabled_domains: Vec::new(),
            excluded_domains: Vec::new(),
            gfw_list: None,
            gfw_list_base64_decode: false,
            gfw_list_update_interval: default_gfw_list_update_interval(),
            gfw_list_retry_interval: default_retry_interval(),
            refusing_response_code: 0,
        }
    }
}

fn default_gfw_list_update_interval() -> u64 {
    7200
}

fn default_retry_interval() -> u64 {
    30
}
