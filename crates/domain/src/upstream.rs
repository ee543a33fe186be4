use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_DNS_PORT: u16 = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamProtocol {
    #[default]
    Udp,
    Tcp,
}

impl UpstreamProtocol {
    pub fn other(&self) -> Self {
        match self {
            UpstreamProtocol::Udp => UpstreamProtocol::Tcp,
            UpstreamProtocol::Tcp => UpstreamProtocol::Udp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamProtocol::Udp => "udp",
            UpstreamProtocol::Tcp => "tcp",
        }
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `1.2.3.4`, `1.2.3.4:5353`, `::1`, or `[::1]:5353`.
pub fn parse_server_addr(s: &str) -> Result<SocketAddr, DomainError> {
    let s = s.trim();
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }
    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        if let Ok(ip) = inner.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, DEFAULT_DNS_PORT));
        }
    }
    Err(DomainError::InvalidServerAddress(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_addr_forms() {
        assert_eq!(
            parse_server_addr("8.8.8.8").unwrap(),
            "8.8.8.8:53".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_server_addr("8.8.4.4:5353").unwrap(),
            "8.8.4.4:5353".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_server_addr("[2001:db8::1]:54").unwrap(),
            "[2001:db8::1]:54".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(parse_server_addr("::1").unwrap().port(), 53);
        assert!(parse_server_addr("dns.example").is_err());
    }

    #[test]
    fn test_protocol_other() {
        assert_eq!(UpstreamProtocol::Udp.other(), UpstreamProtocol::Tcp);
        assert_eq!(UpstreamProtocol::Tcp.other(), UpstreamProtocol::Udp);
    }
}
