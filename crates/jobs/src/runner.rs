use crate::shutdown::ShutdownSignal;
use crate::{CacheMaintenanceJob, ListReloadJob, StatisticsReportJob};
use std::io;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// A periodic job that owns its thread until shutdown.
pub trait BackgroundJob: Send + 'static {
    fn run(self, signal: ShutdownSignal);
}

fn spawn_job<J: BackgroundJob>(
    job: Option<J>,
    thread_name: &str,
    signal: &ShutdownSignal,
    handles: &mut Vec<JoinHandle<()>>,
) -> io::Result<()> {
    if let Some(job) = job {
        let signal = signal.clone();
        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || job.run(signal))?;
        handles.push(handle);
    }
    Ok(())
}

pub struct JobRunner {
    cache_sweep: Option<CacheMaintenanceJob>,
    hosts_reload: Option<ListReloadJob>,
    gfw_reload: Option<ListReloadJob>,
    statistics_report: Option<StatisticsReportJob>,
    signal: ShutdownSignal,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            cache_sweep: None,
            hosts_reload: None,
            gfw_reload: None,
            statistics_report: None,
            signal: ShutdownSignal::new(),
        }
    }

    pub fn with_cache_sweep(mut self, job: CacheMaintenanceJob) -> Self {
        self.cache_sweep = Some(job);
        self
    }

    pub fn with_hosts_reload(mut self, job: ListReloadJob) -> Self {
        self.hosts_reload = Some(job);
        self
    }

    pub fn with_gfw_reload(mut self, job: ListReloadJob) -> Self {
        self.gfw_reload = Some(job);
        self
    }

    pub fn with_statistics_report(mut self, job: StatisticsReportJob) -> Self {
        self.statistics_report = Some(job);
        self
    }

    pub fn with_shutdown_signal(mut self, signal: ShutdownSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn start(self) -> io::Result<RunningJobs> {
        info!("Starting background job runner");

        let mut handles = Vec::new();
        spawn_job(self.cache_sweep, "cache-sweep", &self.signal, &mut handles)?;
        spawn_job(self.hosts_reload, "hosts-reload", &self.signal, &mut handles)?;
        spawn_job(self.gfw_reload, "gfw-reload", &self.signal, &mut handles)?;
        spawn_job(self.statistics_report, "statistics", &self.signal, &mut handles)?;

        info!(jobs = handles.len(), "All background jobs started");
        Ok(RunningJobs {
            handles,
            signal: self.signal,
        })
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles of started job threads.
pub struct RunningJobs {
    handles: Vec<JoinHandle<()>>,
    signal: ShutdownSignal,
}

impl RunningJobs {
    pub fn job_count(&self) -> usize {
        self.handles.len()
    }

    pub fn signal(&self) -> &ShutdownSignal {
        &self.signal
    }

    /// Flips the liveness flag and waits for every job thread to exit.
    pub fn shutdown(self) {
        self.signal.shutdown();
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("job").to_string();
            if handle.join().is_err() {
                warn!(job = %name, "Background job panicked");
            }
        }
        info!("Background jobs stopped");
    }
}
