mod cache_maintenance_port;
mod list_reload_port;
mod statistics_port;

pub use cache_maintenance_port::{CacheMaintenancePort, CacheSweepOutcome};
pub use list_reload_port::{ListReloadOutcome, ListReloadPort};
pub use statistics_port::{StatisticsSink, StatisticsSource};
