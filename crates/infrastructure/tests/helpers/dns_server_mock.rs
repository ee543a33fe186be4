use super::builders::a_answer;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// Reply with an A record after `delay`.
    Answer { address: [u8; 4], delay: Duration },
    /// Reply at once with a forged transaction ID.
    WrongId { address: [u8; 4] },
    Silent,
}

/// A loopback UDP resolver running on its own thread.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
}

impl MockDnsServer {
    pub fn start(behavior: MockBehavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(AtomicUsize::new(0));
        let running = Arc::new(AtomicBool::new(true));

        let counter = received.clone();
        let alive = running.clone();
        thread::spawn(move || {
            let mut buf = [0u8; 512];
            while alive.load(Ordering::Relaxed) {
                let Ok((len, peer)) = socket.recv_from(&mut buf) else {
                    continue;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let query = &buf[..len];
                let reply = match behavior {
                    MockBehavior::Answer { address, delay } => {
                        thread::sleep(delay);
                        a_answer(query, address, 300)
                    }
                    MockBehavior::WrongId { address } => {
                        let mut reply = a_answer(query, address, 300);
                        reply[0] ^= 0xFF;
                        reply
                    }
                    MockBehavior::Silent => continue,
                };
                let _ = socket.send_to(&reply, peer);
            }
        });

        Self {
            addr,
            received,
            running,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
