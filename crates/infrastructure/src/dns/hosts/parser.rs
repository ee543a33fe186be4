use std::net::{Ipv4Addr, Ipv6Addr};

pub const MAX_HOSTS_DOMAIN_LEN: usize = 128;

/// What a hosts line maps its domain to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsTarget {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Cname(String),
    /// `@@` lines keep the domain out of hosts answers.
    Excluded,
}

/// Classifies the target column of a hosts line: `@@` excludes, a colon
/// means IPv6, any letter means a CNAME target, anything else is IPv4.
pub fn classify_target(target: &str) -> Option<HostsTarget> {
    if target.starts_with("@@") {
        return Some(HostsTarget::Excluded);
    }
    if target.contains(':') {
        return target.parse().ok().map(HostsTarget::Ipv6);
    }
    if target.bytes().any(|b| b.is_ascii_alphabetic()) {
        let valid = target
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_');
        return valid.then(|| HostsTarget::Cname(target.trim_end_matches('.').to_ascii_lowercase()));
    }
    target.parse().ok().map(HostsTarget::Ipv4)
}

/// Parses `<target> <domain>`, ignoring blank lines and `#` comments.
pub fn parse_hosts_line(line: &str) -> Option<(HostsTarget, &str)> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut columns = line.split_whitespace();
    let target = columns.next()?;
    let domain = columns.next()?;
    if domain.len() > MAX_HOSTS_DOMAIN_LEN {
        return None;
    }
    Some((classify_target(target)?, domain))
}
