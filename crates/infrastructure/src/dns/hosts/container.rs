use super::parser::{parse_hosts_line, HostsTarget};
use crate::dns::matcher::DomainMatcher;
use crate::dns::wire::write_name;
use ferrous_forwarder_domain::{DomainError, RecordType};
use tracing::debug;

/// Result of a hosts lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsMatch {
    /// An answer of the requested type; `rdata` is ready to serialize.
    Perfect { rtype: RecordType, rdata: Vec<u8> },
    /// Only a CNAME is known; the target must be resolved separately.
    OnlyCname(String),
    None,
    /// The domain is excluded from hosts answers.
    Disabled,
}

/// One parsed hosts table: per-family address maps, CNAME redirects and
/// excluded domains. Entries keep their first occurrence.
#[derive(Clone, Default)]
pub struct HostsContainer {
    ipv4: DomainMatcher,
    ipv6: DomainMatcher,
    cname: DomainMatcher,
    excluded: DomainMatcher,
}

impl HostsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, DomainError> {
        let mut container = Self::new();
        for line in lines {
            container.add_line(line)?;
        }
        Ok(container)
    }

    /// Adds one hosts line. Returns `false` for lines that are skipped:
    /// comments, unrecognised targets, or domains already present.
    pub fn add_line(&mut self, line: &str) -> Result<bool, DomainError> {
        let Some((target, domain)) = parse_hosts_line(line) else {
            return Ok(false);
        };
        let added = match &target {
            HostsTarget::Ipv4(addr) => self.ipv4.add_unique(domain, Some(&addr.octets()))?,
            HostsTarget::Ipv6(addr) => self.ipv6.add_unique(domain, Some(&addr.octets()))?,
            HostsTarget::Cname(name) => self.cname.add_unique(domain, Some(name.as_bytes()))?,
            HostsTarget::Excluded => self.excluded.add_unique(domain, None)?,
        };
        if !added {
            debug!(domain, "Duplicate hosts entry, keeping the first occurrence");
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len() + self.cname.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(&self, name: &str, rtype: RecordType) -> HostsMatch {
        if self.excluded.matches(name) {
            return HostsMatch::Disabled;
        }

        let direct = match rtype {
            RecordType::A => self.ipv4.find(name),
            RecordType::AAAA => self.ipv6.find(name),
            RecordType::CNAME => {
                return match self.cname.find(name).and_then(|m| m.data_str()) {
                    Some(target) => cname_rdata(target)
                        .map(|rdata| HostsMatch::Perfect {
                            rtype: RecordType::CNAME,
                            rdata,
                        })
                        .unwrap_or(HostsMatch::None),
                    None => HostsMatch::None,
                };
            }
            _ => None,
        };
        if let Some(data) = direct.and_then(|m| m.data) {
            return HostsMatch::Perfect {
                rtype,
                rdata: data.to_vec(),
            };
        }

        match self.cname.find(name).and_then(|m| m.data_str()) {
            Some(target) => HostsMatch::OnlyCname(target.to_string()),
            None => HostsMatch::None,
        }
    }
}

fn cname_rdata(target: &str) -> Option<Vec<u8>> {
    let mut rdata = Vec::with_capacity(target.len() + 2);
    write_name(&mut rdata, target).ok()?;
    Some(rdata)
}
