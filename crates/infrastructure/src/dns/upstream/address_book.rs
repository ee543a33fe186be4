use super::address_list::{AddressList, AddressSet};
use crate::dns::matcher::DomainMatcher;
use ferrous_forwarder_domain::{parse_server_addr, DomainError, UpstreamConfig, UpstreamProtocol};
use std::net::SocketAddr;
use tracing::{info, warn};

/// Where one upstream attempt is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerSelection {
    /// A server bound to the requested domain.
    Dedicated(SocketAddr),
    /// Every same-family UDP server, queried at once.
    Parallel(AddressSet),
    Single(SocketAddr),
}

impl ServerSelection {
    pub fn addresses(&self) -> &[SocketAddr] {
        match self {
            ServerSelection::Dedicated(addr) | ServerSelection::Single(addr) => {
                std::slice::from_ref(addr)
            }
            ServerSelection::Parallel(set) => set.as_slice(),
        }
    }

    /// The server a connection-oriented transport talks to.
    pub fn primary(&self) -> Option<SocketAddr> {
        self.addresses().first().copied()
    }
}

/// Upstream servers per protocol plus per-domain dedicated servers.
pub struct AddressBook {
    udp: AddressList,
    tcp: AddressList,
    dedicated: DomainMatcher,
    parallel_udp: bool,
}

impl AddressBook {
    pub fn new(udp: Vec<SocketAddr>, tcp: Vec<SocketAddr>) -> Self {
        Self {
            udp: AddressList::new(udp),
            tcp: AddressList::new(tcp),
            dedicated: DomainMatcher::new(),
            parallel_udp: false,
        }
    }

    pub fn with_parallel_udp(mut self, enabled: bool) -> Self {
        self.parallel_udp = enabled;
        self
    }

    pub fn with_dedicated(mut self, domain: &str, server: SocketAddr) -> Result<Self, DomainError> {
        self.dedicated
            .add_unique(domain, Some(server.to_string().as_bytes()))?;
        Ok(self)
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let parse_all = |servers: &[String]| -> Result<Vec<SocketAddr>, DomainError> {
            servers.iter().map(|s| parse_server_addr(s)).collect()
        };
        let mut book = Self::new(parse_all(&config.udp_servers)?, parse_all(&config.tcp_servers)?)
            .with_parallel_udp(config.parallel_query);

        for line in &config.dedicated_servers {
            let mut columns = line.split_whitespace();
            let (Some(domain), Some(server)) = (columns.next(), columns.next()) else {
                warn!(entry = %line, "Invalid dedicated server entry");
                continue;
            };
            let server = parse_server_addr(server)?;
            info!(domain, server = %server, "Dedicated server added");
            book = book.with_dedicated(domain, server)?;
        }

        info!(
            udp_servers = book.udp.len(),
            tcp_servers = book.tcp.len(),
            dedicated = book.dedicated.len(),
            parallel_udp = book.parallel_udp,
            "Upstream address book loaded"
        );
        Ok(book)
    }

    pub fn list(&self, protocol: UpstreamProtocol) -> &AddressList {
        match protocol {
            UpstreamProtocol::Udp => &self.udp,
            UpstreamProtocol::Tcp => &self.tcp,
        }
    }

    pub fn has_servers(&self, protocol: UpstreamProtocol) -> bool {
        !self.list(protocol).is_empty()
    }

    /// Dedicated server first, then the parallel set for UDP when enabled,
    /// then the current round-robin server.
    pub fn select(&self, domain: &str, protocol: UpstreamProtocol) -> Option<ServerSelection> {
        if let Some(server) = self
            .dedicated
            .find_with_parents(domain)
            .and_then(|m| m.data_str())
            .and_then(|s| s.parse().ok())
        {
            return Some(ServerSelection::Dedicated(server));
        }

        let list = self.list(protocol);
        if self.parallel_udp && protocol == UpstreamProtocol::Udp && list.len() > 1 {
            return Some(ServerSelection::Parallel(list.same_family()));
        }
        list.current().map(ServerSelection::Single)
    }

    /// Skips the current server of `protocol` after a failed attempt.
    pub fn advance(&self, protocol: UpstreamProtocol) {
        self.list(protocol).advance();
    }
}
