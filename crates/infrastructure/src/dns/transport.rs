//! Blocking UDP/TCP exchanges with upstream resolvers.
mod session;
pub mod tcp;
pub mod udp;
mod validation;

use ferrous_forwarder_domain::{DomainError, UpstreamProtocol};
use std::net::SocketAddr;
use std::time::Duration;

pub use session::UpstreamSession;
pub use validation::{Rejection, ResponseValidator};

/// Sends one query upstream and returns the accepted response.
///
/// `servers` holds the selected destinations; only UDP uses more than the first.
pub trait UpstreamExchange: Send + Sync {
    fn exchange(
        &self,
        session: &mut UpstreamSession,
        protocol: UpstreamProtocol,
        servers: &[SocketAddr],
        query: &[u8],
    ) -> Result<Vec<u8>, DomainError>;
}

/// Exchange over real sockets held in the caller's session.
pub struct SocketExchange {
    timeout: Duration,
    validator: ResponseValidator,
}

impl SocketExchange {
    pub fn new(timeout: Duration, validator: ResponseValidator) -> Self {
        Self { timeout, validator }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl UpstreamExchange for SocketExchange {
    fn exchange(
        &self,
        session: &mut UpstreamSession,
        protocol: UpstreamProtocol,
        servers: &[SocketAddr],
        query: &[u8],
    ) -> Result<Vec<u8>, DomainError> {
        if servers.is_empty() {
            return Err(DomainError::NoUpstream {
                protocol: protocol.as_str(),
            });
        }
        match protocol {
            UpstreamProtocol::Udp => {
                udp::exchange(session, servers, query, self.timeout, &self.validator)
            }
            UpstreamProtocol::Tcp => tcp::exchange(session, servers[0], query, self.timeout),
        }
    }
}
