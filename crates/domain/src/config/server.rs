use serde::{Deserialize, Serialize};

/// Local listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Worker threads sharing the UDP listening socket.
    #[serde(default = "default_udp_threads")]
    pub udp_threads: usize,

    /// Also accept queries over TCP.
    #[serde(default = "default_true")]
    pub open_tcp: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            udp_threads: default_udp_threads(),
            open_tcp: true,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    53
}

fn default_udp_threads() -> usize {
    3
}

fn default_true() -> bool {
    true
}
