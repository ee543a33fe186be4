use ferrous_forwarder_domain::ServerConfig;
use ferrous_forwarder_infrastructure::dns::transport::tcp::{read_framed, write_framed};
use ferrous_forwarder_infrastructure::dns::{DnsDispatcher, UpstreamSession};
use ferrous_forwarder_jobs::ShutdownSignal;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

const RECV_POLL_TIMEOUT: Duration = Duration::from_secs(1);
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Binds the listeners and starts their threads. Returns the UDP worker
/// handles; they exit once `signal` is shut down.
pub fn start_dns_server(
    socket_addr: SocketAddr,
    dispatcher: Arc<DnsDispatcher>,
    config: &ServerConfig,
    signal: ShutdownSignal,
) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let num_workers = config.udp_threads.max(1);

    info!(bind_address = %socket_addr, num_workers, "Starting DNS server");

    let udp_socket = create_udp_socket(domain, socket_addr)?;
    let mut workers = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        let socket = udp_socket.try_clone()?;
        let dispatcher = dispatcher.clone();
        let signal = signal.clone();
        let handle = thread::Builder::new()
            .name(format!("dns-udp-{i}"))
            .spawn(move || run_udp_worker(socket, dispatcher, signal, i))?;
        workers.push(handle);
    }

    if config.open_tcp {
        let listener = create_tcp_listener(domain, socket_addr)?;
        thread::Builder::new()
            .name("dns-tcp-accept".to_string())
            .spawn(move || run_tcp_acceptor(listener, dispatcher))?;
    }

    info!(
        "DNS server ready: {} UDP workers on {}",
        num_workers, socket_addr
    );
    Ok(workers)
}

fn run_udp_worker(
    socket: UdpSocket,
    dispatcher: Arc<DnsDispatcher>,
    signal: ShutdownSignal,
    worker_id: usize,
) {
    let mut session = UpstreamSession::new();
    let mut recv_buf = [0u8; 4096];

    while signal.is_running() {
        match socket.recv_from(&mut recv_buf) {
            Ok((n, from)) => {
                if let Some(response) = dispatcher.respond(&recv_buf[..n], Some(from), &mut session)
                {
                    if let Err(e) = socket.send_to(&response, from) {
                        debug!(worker = worker_id, client = %from, error = %e, "UDP send failed");
                    }
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                error!(worker = worker_id, error = %e, "UDP recv error");
                thread::sleep(Duration::from_millis(100));
            }
        }
    }
    debug!(worker = worker_id, "UDP worker stopped");
}

fn run_tcp_acceptor(listener: TcpListener, dispatcher: Arc<DnsDispatcher>) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let dispatcher = dispatcher.clone();
                let spawned = thread::Builder::new()
                    .name("dns-tcp-client".to_string())
                    .spawn(move || serve_tcp_client(stream, dispatcher));
                if let Err(e) = spawned {
                    error!(error = %e, "Failed to spawn TCP client thread");
                }
            }
            Err(e) => debug!(error = %e, "TCP accept failed"),
        }
    }
}

/// Answers length-prefixed queries until the client closes or idles out.
fn serve_tcp_client(mut stream: TcpStream, dispatcher: Arc<DnsDispatcher>) {
    let peer = stream.peer_addr().ok();
    if stream.set_read_timeout(Some(TCP_IDLE_TIMEOUT)).is_err() {
        return;
    }
    let mut session = UpstreamSession::new();

    while let Ok(request) = read_framed(&mut stream) {
        let Some(response) = dispatcher.respond(&request, peer, &mut session) else {
            continue;
        };
        if let Err(e) = write_framed(&mut stream, &response) {
            debug!(client = ?peer, error = %e, "TCP write failed");
            break;
        }
    }
    debug!(client = ?peer, "TCP client disconnected");
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_read_timeout(Some(RECV_POLL_TIMEOUT))?;
    Ok(socket.into())
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    Ok(socket.into())
}
