use smallvec::SmallVec;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type AddressSet = SmallVec<[SocketAddr; 4]>;

/// Configured servers of one protocol with a round-robin cursor.
///
/// The cursor is a relaxed atomic: concurrent advances may skip or repeat
/// a server, which only affects which server is tried next.
#[derive(Debug, Default)]
pub struct AddressList {
    addrs: Vec<SocketAddr>,
    cursor: AtomicUsize,
}

impl AddressList {
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self {
            addrs,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn all(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn current(&self) -> Option<SocketAddr> {
        if self.addrs.is_empty() {
            return None;
        }
        let index = self.cursor.load(Ordering::Relaxed) % self.addrs.len();
        Some(self.addrs[index])
    }

    /// Moves the cursor to the next server.
    pub fn advance(&self) {
        if self.addrs.len() > 1 {
            self.cursor.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Every server sharing the address family of the current one, current first.
    pub fn same_family(&self) -> AddressSet {
        let Some(current) = self.current() else {
            return AddressSet::new();
        };
        let mut set = AddressSet::new();
        set.push(current);
        set.extend(
            self.addrs
                .iter()
                .copied()
                .filter(|a| *a != current && a.is_ipv4() == current.is_ipv4()),
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_robin_wraps() {
        let list = AddressList::new(vec![addr("192.0.2.1:53"), addr("192.0.2.2:53")]);
        assert_eq!(list.current(), Some(addr("192.0.2.1:53")));
        list.advance();
        assert_eq!(list.current(), Some(addr("192.0.2.2:53")));
        list.advance();
        assert_eq!(list.current(), Some(addr("192.0.2.1:53")));
    }

    #[test]
    fn test_same_family_excludes_other_family() {
        let list = AddressList::new(vec![
            addr("192.0.2.1:53"),
            addr("[2001:db8::1]:53"),
            addr("192.0.2.2:53"),
        ]);
        let set = list.same_family();
        assert_eq!(set.as_slice(), &[addr("192.0.2.1:53"), addr("192.0.2.2:53")]);
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        let list = AddressList::default();
        assert!(list.current().is_none());
        assert!(list.same_family().is_empty());
    }
}
