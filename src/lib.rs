// src/lib.rs
//! jobscout - periodically visits employer career pages, discovers job
//! postings, scores them against the candidate profile with a language
//! model, and keeps only newly-seen postings.

pub mod core;
pub mod scan;
pub mod scheduler;
pub mod utils;
pub mod web;

pub use crate::core::{AppConfig, Browser, CdpBrowser, LlmClient, OpenRouterClient, Store};
pub use crate::scan::{ScanOutcome, ScanService, ScanSummary};
pub use crate::scheduler::spawn_scan_scheduler;
pub use crate::web::start_web_server;
