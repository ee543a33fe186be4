use super::builders::a_answer;
use ferrous_forwarder_domain::{DomainError, UpstreamProtocol};
use ferrous_forwarder_infrastructure::dns::{UpstreamExchange, UpstreamSession};
use parking_lot::Mutex;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCall {
    pub protocol: UpstreamProtocol,
    pub servers: Vec<SocketAddr>,
}

/// Answers every query with one A record unless its protocol is set to fail.
pub struct MockExchange {
    address: [u8; 4],
    failing: Vec<UpstreamProtocol>,
    calls: Mutex<Vec<ExchangeCall>>,
}

impl MockExchange {
    pub fn answering(address: [u8; 4]) -> Self {
        Self {
            address,
            failing: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, protocol: UpstreamProtocol) -> Self {
        self.failing.push(protocol);
        self
    }

    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl UpstreamExchange for MockExchange {
    fn exchange(
        &self,
        _session: &mut UpstreamSession,
        protocol: UpstreamProtocol,
        servers: &[SocketAddr],
        query: &[u8],
    ) -> Result<Vec<u8>, DomainError> {
        self.calls.lock().push(ExchangeCall {
            protocol,
            servers: servers.to_vec(),
        });
        if self.failing.contains(&protocol) {
            return Err(DomainError::TransportTimeout {
                server: servers[0].to_string(),
            });
        }
        Ok(a_answer(query, self.address, 300))
    }
}
