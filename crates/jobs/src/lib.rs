pub mod cache_maintenance;
pub mod list_reload;
pub mod runner;
pub mod shutdown;
pub mod statistics_report;

pub use cache_maintenance::CacheMaintenanceJob;
pub use list_reload::ListReloadJob;
pub use runner::{BackgroundJob, JobRunner, RunningJobs};
pub use shutdown::ShutdownSignal;
pub use statistics_report::StatisticsReportJob;
