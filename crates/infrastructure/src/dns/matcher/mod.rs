mod domain_matcher;
mod glob;

pub use domain_matcher::{DomainMatch, DomainMatcher};
pub use glob::{glob_match, is_wildcard};
