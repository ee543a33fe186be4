//! Request policy: disabled types and domains, excluded domains, forged addresses.
mod blocked_ips;
mod domain_filters;
mod gfw_list;

pub use blocked_ips::BlockedIpSet;
pub use domain_filters::DomainFilters;
pub use gfw_list::{decode_base64_list, load_gfw_list, parse_gfw_item, parse_gfw_list};
