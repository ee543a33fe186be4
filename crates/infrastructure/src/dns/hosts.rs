//! Local hosts overrides.
mod container;
mod parser;
mod provider;

pub use container::{HostsContainer, HostsMatch};
pub use parser::{classify_target, parse_hosts_line, HostsTarget, MAX_HOSTS_DOMAIN_LEN};
pub use provider::HostsProvider;
