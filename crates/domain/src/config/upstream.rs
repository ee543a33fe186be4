use crate::UpstreamProtocol;
use serde::{Deserialize, Serialize};

/// Upstream resolvers and the transport policy used to reach them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub primary_protocol: UpstreamProtocol,

    #[serde(default)]
    pub udp_servers: Vec<String>,

    #[serde(default)]
    pub tcp_servers: Vec<String>,

    /// `"domain server"` pairs; the server answers for that domain only.
    #[serde(default)]
    pub dedicated_servers: Vec<String>,

    /// Retry once on the other protocol when the first one fails.
    #[serde(default)]
    pub allow_fallback: bool,

    /// Send each UDP query to every UDP server and keep the first good answer.
    #[serde(default)]
    pub parallel_query: bool,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default)]
    pub anti_pollution: bool,

    /// Attach an OPT record to UDP queries and reject answers without one.
    #[serde(default)]
    pub append_edns_opt: bool,

    /// Addresses known to be injected by forged responses.
    #[serde(default)]
    pub blocked_ips: Vec<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            primary_protocol: UpstreamProtocol::Udp,
            udp_servers: vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()],
            tcp_servers: Vec::new(),
            dedicated_servers: Vec::new(),
            allow_fallback: false,
            parallel_query: false,
            query_timeout_ms: default_query_timeout_ms(),
            anti_pollution: false,
            append_edns_opt: false,
            blocked_ips: Vec::new(),
        }
    }
}

impl UpstreamConfig {
    pub fn servers(&self, protocol: UpstreamProtocol) -> &[String] {
        match protocol {
            UpstreamProtocol::Udp => &self.udp_servers,
            UpstreamProtocol::Tcp => &self.tcp_servers,
        }
    }

    /// The protocol used for excluded domains and fallback, if any servers exist for it.
    pub fn secondary_protocol(&self) -> Option<UpstreamProtocol> {
        let other = self.primary_protocol.other();
        (!self.servers(other).is_empty()).then_some(other)
    }
}

fn default_query_timeout_ms() -> u64 {
    3000
}
