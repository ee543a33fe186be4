use crate::collections::IndexBst;
use std::net::IpAddr;

/// Addresses known to be forged by response injectors.
///
/// IPv4 addresses are stored in their IPv4-mapped IPv6 form so both
/// families share one ordered set.
#[derive(Debug, Clone, Default)]
pub struct BlockedIpSet {
    tree: IndexBst<u128>,
}

#[inline]
fn key(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(v4.to_ipv6_mapped()),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

impl BlockedIpSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses each entry as an address; entries that do not parse are
    /// returned so the caller can report them.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> (Self, Vec<String>) {
        let mut set = Self::new();
        let mut rejected = Vec::new();
        for entry in entries {
            match entry.trim().parse::<IpAddr>() {
                Ok(addr) => {
                    set.insert(addr);
                }
                Err(_) => rejected.push(entry.to_string()),
            }
        }
        (set, rejected)
    }

    /// Returns `false` if the address was already present.
    pub fn insert(&mut self, addr: IpAddr) -> bool {
        let key = key(addr);
        if self.tree.contains(&key) {
            return false;
        }
        self.tree.insert(key);
        true
    }

    pub fn remove(&mut self, addr: IpAddr) -> bool {
        match self.tree.search(&key(addr)) {
            Some(node) => {
                self.tree.delete(node);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.tree.contains(&key(addr))
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
