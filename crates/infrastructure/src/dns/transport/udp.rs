//! UDP exchange with optional parallel fan-out.
//!
//! The query goes to every selected server from one socket. The first
//! datagram that passes validation wins and anything already queued behind
//! it is drained. Rejected datagrams keep the wait going until the deadline.

use super::{ResponseValidator, UpstreamSession};
use crate::dns::wire::{append_edns_probe, message_id};
use ferrous_forwarder_domain::{DomainError, UpstreamProtocol};
use socket2::{Domain, Protocol, Socket, Type};
use std::borrow::Cow;
use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};
use tracing::debug;

/// Largest answer accepted over UDP.
pub const MAX_UDP_RESPONSE_SIZE: usize = 4096;

const RECV_BUFFER_SIZE: usize = 256 * 1024;

/// Binds an ephemeral socket of the same family as `server`.
pub fn bind_ephemeral(server: SocketAddr) -> io::Result<UdpSocket> {
    let (domain, local): (Domain, SocketAddr) = if server.is_ipv4() {
        (Domain::IPV4, (Ipv4Addr::UNSPECIFIED, 0).into())
    } else {
        (Domain::IPV6, (Ipv6Addr::UNSPECIFIED, 0).into())
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_recv_buffer_size(RECV_BUFFER_SIZE)?;
    socket.bind(&local.into())?;
    Ok(socket.into())
}

pub fn exchange(
    session: &mut UpstreamSession,
    servers: &[SocketAddr],
    query: &[u8],
    timeout: Duration,
    validator: &ResponseValidator,
) -> Result<Vec<u8>, DomainError> {
    let primary = servers[0];
    let transport_error = |e: io::Error| DomainError::Transport {
        server: primary.to_string(),
        reason: e.to_string(),
    };

    let expected_id = message_id(query)
        .ok_or_else(|| DomainError::MalformedMessage("query shorter than its id".to_string()))?;
    let outgoing: Cow<'_, [u8]> = if validator.appends_edns() {
        let mut probed = query.to_vec();
        append_edns_probe(&mut probed);
        Cow::Owned(probed)
    } else {
        Cow::Borrowed(query)
    };

    session.note_server(UpstreamProtocol::Udp, primary);
    let socket = match session.udp.take() {
        Some((addr, socket)) if addr == primary => socket,
        _ => bind_ephemeral(primary).map_err(transport_error)?,
    };

    let mut sent = 0;
    for server in servers {
        match socket.send_to(&outgoing, server) {
            Ok(_) => sent += 1,
            Err(e) => debug!(server = %server, error = %e, "UDP send failed"),
        }
    }
    if sent == 0 {
        return Err(DomainError::Transport {
            server: primary.to_string(),
            reason: "query could not be sent to any server".to_string(),
        });
    }

    let result = receive_first_valid(&socket, servers, expected_id, timeout, validator);
    if !matches!(&result, Err(DomainError::Transport { .. })) {
        session.udp = Some((primary, socket));
    }
    result
}

fn receive_first_valid(
    socket: &UdpSocket,
    servers: &[SocketAddr],
    expected_id: u16,
    timeout: Duration,
    validator: &ResponseValidator,
) -> Result<Vec<u8>, DomainError> {
    let primary = servers[0];
    let timed_out = || DomainError::TransportTimeout {
        server: primary.to_string(),
    };
    let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }
        socket
            .set_read_timeout(Some(remaining))
            .map_err(|e| DomainError::Transport {
                server: primary.to_string(),
                reason: e.to_string(),
            })?;

        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if !servers.contains(&from) {
                    debug!(from = %from, "Ignoring datagram from unexpected source");
                    continue;
                }
                match validator.check(&buf[..len], expected_id) {
                    Ok(()) => {
                        let response = buf[..len].to_vec();
                        drain(socket, &mut buf);
                        return Ok(response);
                    }
                    Err(rejection) => {
                        debug!(server = %from, reason = %rejection, "Discarded upstream datagram");
                    }
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(timed_out());
            }
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused) => {
                debug!(error = %e, "ICMP error while waiting for upstream");
            }
            Err(e) => {
                return Err(DomainError::Transport {
                    server: primary.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Discards datagrams already queued on the socket without waiting.
fn drain(socket: &UdpSocket, buf: &mut [u8]) {
    if socket.set_nonblocking(true).is_err() {
        return;
    }
    let mut discarded = 0usize;
    while socket.recv_from(buf).is_ok() {
        discarded += 1;
    }
    let _ = socket.set_nonblocking(false);
    if discarded > 0 {
        debug!(discarded, "Drained late upstream datagrams");
    }
}
