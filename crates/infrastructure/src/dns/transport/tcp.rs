//! Length-prefixed DNS over TCP on a per-session connection.

use super::UpstreamSession;
use crate::dns::wire::message_id;
use ferrous_forwarder_domain::{DomainError, UpstreamProtocol};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tracing::debug;

pub fn exchange(
    session: &mut UpstreamSession,
    server: SocketAddr,
    query: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, DomainError> {
    session.note_server(UpstreamProtocol::Tcp, server);

    let reused = match session.tcp.take() {
        Some((addr, stream)) if addr == server && is_alive(&stream) => Some(stream),
        _ => None,
    };

    if let Some(mut stream) = reused {
        match round_trip(&mut stream, query, timeout) {
            Ok(response) => {
                session.tcp = Some((server, stream));
                return Ok(response);
            }
            Err(e) => debug!(server = %server, error = %e, "Reused TCP connection failed, reconnecting"),
        }
    }

    let mut stream = connect(server, timeout).map_err(|e| map_io(server, e))?;
    let response = round_trip(&mut stream, query, timeout).map_err(|e| map_io(server, e))?;
    session.tcp = Some((server, stream));
    Ok(response)
}

pub fn connect(server: SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    let stream = TcpStream::connect_timeout(&server, timeout)?;
    stream.set_nodelay(true)?;
    debug!(server = %server, "TCP connection established");
    Ok(stream)
}

/// A connection is reusable when a non-blocking peek has nothing to read:
/// no EOF and no stray bytes.
pub fn is_alive(stream: &TcpStream) -> bool {
    if stream.set_nonblocking(true).is_err() {
        return false;
    }
    let mut probe = [0u8; 1];
    let idle = matches!(stream.peek(&mut probe), Err(ref e) if e.kind() == ErrorKind::WouldBlock);
    stream.set_nonblocking(false).is_ok() && idle
}

pub fn write_framed(stream: &mut impl Write, message: &[u8]) -> io::Result<()> {
    let len = u16::try_from(message.len())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "message longer than 65535"))?;
    let mut frame = Vec::with_capacity(message.len() + 2);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(message);
    stream.write_all(&frame)
}

pub fn read_framed(stream: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut len = [0u8; 2];
    stream.read_exact(&mut len)?;
    let mut message = vec![0u8; u16::from_be_bytes(len) as usize];
    stream.read_exact(&mut message)?;
    Ok(message)
}

fn round_trip(stream: &mut TcpStream, query: &[u8], timeout: Duration) -> io::Result<Vec<u8>> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    write_framed(stream, query)?;
    let response = read_framed(stream)?;
    if message_id(&response) != message_id(query) {
        return Err(io::Error::new(ErrorKind::InvalidData, "response id mismatch"));
    }
    Ok(response)
}

fn map_io(server: SocketAddr, e: io::Error) -> DomainError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => DomainError::TransportTimeout {
            server: server.to_string(),
        },
        _ => DomainError::Transport {
            server: server.to_string(),
            reason: e.to_string(),
        },
    }
}
