mod domain_statistics;

pub use domain_statistics::{DomainStatistics, NoopStatistics};
