// src/scheduler.rs
//! Fixed-interval host for the scan orchestrator

use crate::scan::{ScanOutcome, ScanService};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Drive `run_scan` every `period`. The first run happens one full period
/// after startup, not immediately. The task never exits on its own.
pub fn spawn_scan_scheduler(service: Arc<ScanService>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "Scan scheduler started");

    spawn_at_interval(period, move || {
        let service = Arc::clone(&service);
        async move {
            match service.run_scan().await {
                ScanOutcome::Completed(summary) => info!(
                    companies_scanned = summary.companies_scanned,
                    companies_failed = summary.companies_failed,
                    jobs_added = summary.jobs_added,
                    "Scheduled scan finished"
                ),
                ScanOutcome::AlreadyRunning => {
                    warn!("Scheduled scan skipped, another scan is in progress")
                }
            }
        }
    })
}

fn spawn_at_interval<F, Fut>(period: Duration, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            on_tick().await;
        }
    })
}
