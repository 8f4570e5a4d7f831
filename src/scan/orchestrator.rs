// src/scan/orchestrator.rs
//! The scan entry point shared by the scheduler, the HTTP trigger and the
//! CLI. Iterates active companies sequentially, absorbing per-company
//! failures, under a global lock so overlapping triggers cannot race.

use crate::core::browser::Browser;
use crate::core::config::EnvironmentConfig;
use crate::core::database::Store;
use crate::core::llm::LlmClient;
use crate::scan::{CompanyScanner, ScanSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What a trigger gets back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanSummary),
    AlreadyRunning,
}

/// Independent readiness booleans, reported by `verify`
#[derive(Debug, Clone, Copy)]
pub struct ReadinessReport {
    pub credential_configured: bool,
    pub llm_reachable: bool,
    pub store_reachable: bool,
}

impl ReadinessReport {
    pub fn healthy(&self) -> bool {
        self.credential_configured && self.llm_reachable && self.store_reachable
    }
}

pub struct ScanService {
    store: Store,
    browser: Arc<dyn Browser>,
    llm: Arc<dyn LlmClient>,
    navigation_timeout: Duration,
    max_navigation_steps: u32,
    scan_lock: Mutex<()>,
}

impl ScanService {
    pub fn new(
        store: Store,
        browser: Arc<dyn Browser>,
        llm: Arc<dyn LlmClient>,
        config: &EnvironmentConfig,
    ) -> Self {
        Self {
            store,
            browser,
            llm,
            navigation_timeout: config.navigation_timeout(),
            max_navigation_steps: config.max_navigation_steps,
            scan_lock: Mutex::new(()),
        }
    }

    /// Whether a scan pass currently holds the lock
    pub fn is_running(&self) -> bool {
        self.scan_lock.try_lock().is_err()
    }

    /// One full scan pass over all active companies. Companies are scanned
    /// one at a time; each scan holds a single browser session. A failed
    /// company is logged and the pass continues with the next one.
    pub async fn run_scan(&self) -> ScanOutcome {
        let _guard = match self.scan_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Scan already running, ignoring trigger");
                return ScanOutcome::AlreadyRunning;
            }
        };

        let pass_id = Uuid::new_v4();
        let companies = match self.store.companies().active().await {
            Ok(companies) => companies,
            Err(e) => {
                error!(%pass_id, "Failed to list active companies: {e:#}");
                return ScanOutcome::Completed(ScanSummary::default());
            }
        };

        info!(%pass_id, companies = companies.len(), "Scan pass starting");

        let scanner = CompanyScanner::new(
            self.store.clone(),
            self.browser.clone(),
            self.llm.clone(),
            self.navigation_timeout,
            self.max_navigation_steps,
        );

        let mut summary = ScanSummary::default();
        for company in &companies {
            match scanner.scan(company).await {
                Ok(added) => {
                    summary.companies_scanned += 1;
                    summary.jobs_added += added;
                }
                Err(e) => {
                    summary.companies_failed += 1;
                    error!(
                        %pass_id,
                        company = %company.name,
                        company_id = company.id,
                        error = %e,
                        "Company scan failed"
                    );
                }
            }
        }

        info!(
            %pass_id,
            companies_scanned = summary.companies_scanned,
            companies_failed = summary.companies_failed,
            jobs_added = summary.jobs_added,
            "Scan pass finished"
        );
        ScanOutcome::Completed(summary)
    }

    /// Readiness check: credential, model reachability and store health as
    /// independent booleans
    pub async fn verify(&self) -> ReadinessReport {
        ReadinessReport {
            credential_configured: self.llm.is_configured(),
            llm_reachable: self.llm.verify().await,
            store_reachable: self.store.health_check().await.is_ok(),
        }
    }
}
