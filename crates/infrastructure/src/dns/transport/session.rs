use ferrous_forwarder_domain::UpstreamProtocol;
use std::net::{SocketAddr, TcpStream, UdpSocket};
use tracing::debug;

/// Upstream sockets owned by one listener thread or TCP client connection.
///
/// Sockets are kept between requests and reopened whenever the destination
/// changes. A CNAME sub-query runs on its parent's session.
#[derive(Debug, Default)]
pub struct UpstreamSession {
    pub(super) udp: Option<(SocketAddr, UdpSocket)>,
    pub(super) tcp: Option<(SocketAddr, TcpStream)>,
    last: Option<(UpstreamProtocol, SocketAddr)>,
}

impl UpstreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protocol and server of the most recent exchange.
    pub fn last_server(&self) -> Option<(UpstreamProtocol, SocketAddr)> {
        self.last
    }

    pub(super) fn note_server(&mut self, protocol: UpstreamProtocol, server: SocketAddr) {
        if let Some((last_protocol, last_server)) = self.last {
            if last_protocol == protocol && last_server != server {
                debug!(protocol = %protocol, from = %last_server, to = %server, "Upstream server changed");
                match protocol {
                    UpstreamProtocol::Udp => self.udp = None,
                    UpstreamProtocol::Tcp => self.tcp = None,
                }
            }
        }
        self.last = Some((protocol, server));
    }

    pub fn close(&mut self) {
        self.udp = None;
        self.tcp = None;
    }

    pub fn has_tcp_connection(&self) -> bool {
        self.tcp.is_some()
    }
}
