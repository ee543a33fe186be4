use ferrous_forwarder_jobs::{BackgroundJob, CacheMaintenanceJob, ShutdownSignal};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod helpers;
use helpers::MockCacheMaintenancePort;

#[test]
fn test_cache_sweep_fires_on_interval() {
    let mock = Arc::new(MockCacheMaintenancePort::new());
    let job = CacheMaintenanceJob::new(mock.clone(), Duration::from_millis(20));
    let signal = ShutdownSignal::new();

    let worker = {
        let signal = signal.clone();
        thread::spawn(move || job.run(signal))
    };
    thread::sleep(Duration::from_millis(200));
    signal.shutdown();
    worker.join().unwrap();

    assert!(
        mock.sweep_count() >= 2,
        "Sweep should have fired repeatedly"
    );
}

#[test]
fn test_cache_sweep_error_is_non_fatal() {
    let mock = Arc::new(MockCacheMaintenancePort::new());
    mock.set_should_fail(true);
    let job = CacheMaintenanceJob::new(mock.clone(), Duration::from_millis(20));
    let signal = ShutdownSignal::new();

    let worker = {
        let signal = signal.clone();
        thread::spawn(move || job.run(signal))
    };
    thread::sleep(Duration::from_millis(200));
    signal.shutdown();
    worker.join().unwrap();

    assert!(
        mock.sweep_count() >= 2,
        "Job should keep sweeping after failures"
    );
}

#[test]
fn test_cache_sweep_does_not_run_before_first_interval() {
    let mock = Arc::new(MockCacheMaintenancePort::new());
    let job = CacheMaintenanceJob::new(mock.clone(), Duration::from_secs(3600));
    let signal = ShutdownSignal::new();

    let worker = {
        let signal = signal.clone();
        thread::spawn(move || job.run(signal))
    };
    thread::sleep(Duration::from_millis(50));
    signal.shutdown();
    worker.join().unwrap();

    assert_eq!(mock.sweep_count(), 0);
}
