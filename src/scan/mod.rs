// src/scan/mod.rs
//! The scan pipeline: navigate career pages, extract candidate links,
//! deduplicate, fetch details, score against the profile and persist.

pub mod analyzer;
pub mod extractor;
pub mod navigator;
pub mod orchestrator;
pub mod scanner;

#[cfg(test)]
pub mod testing;

pub use analyzer::MatchAnalyzer;
pub use extractor::extract_candidates;
pub use navigator::Navigator;
pub use orchestrator::{ReadinessReport, ScanOutcome, ScanService};
pub use scanner::CompanyScanner;

use serde::Deserialize;
use thiserror::Error;

/// Failures the pipeline distinguishes. Everything below the company level
/// is absorbed where it happens; company-level failures are absorbed by the
/// orchestrator. Nothing here is allowed to take the host process down.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("page {url} did not quiesce within {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("detail fetch for {url} failed: {cause}")]
    DetailFetch { url: String, cause: anyhow::Error },

    #[error("match analysis failed: {0}")]
    Analysis(String),

    #[error("no language-model credential configured")]
    ConfigurationMissing,

    #[error("browser failure: {0}")]
    Browser(anyhow::Error),

    #[error("store failure: {0}")]
    Store(anyhow::Error),
}

/// Rendered state of a loaded page, as captured in the browser
#[derive(Debug, Clone, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

/// An anchor heuristically judged possibly-a-job-posting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub text: String,
    pub href: String,
}

/// Outcome of scoring one job against the profile
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub match_score: i64,
    pub reasoning: String,
    pub missing_skills: Vec<String>,
}

impl MatchResult {
    /// Degraded result used whenever scoring fails; discovery must not
    /// be blocked by a scoring failure
    pub fn failure(cause: &ScanError) -> Self {
        Self {
            match_score: 0,
            reasoning: format!("Error: {cause}"),
            missing_skills: Vec::new(),
        }
    }
}

/// Next step chosen by the model during AI-directed navigation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NavAction {
    Click { selector: String },
    Type { selector: String, value: String },
    Stop,
}

/// Counters reported after a full orchestrator pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub companies_scanned: u32,
    pub companies_failed: u32,
    pub jobs_added: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_result_is_zero_scored_and_prefixed() {
        let result = MatchResult::failure(&ScanError::ConfigurationMissing);

        assert_eq!(result.match_score, 0);
        assert!(result.missing_skills.is_empty());
        assert!(result.reasoning.starts_with("Error:"));
    }

    #[test]
    fn nav_actions_parse_from_model_output() {
        let click: NavAction =
            serde_json::from_str(r##"{"action":"click","selector":"#load-more"}"##).unwrap();
        assert_eq!(
            click,
            NavAction::Click {
                selector: "#load-more".to_string()
            }
        );

        let typed: NavAction =
            serde_json::from_str(r#"{"action":"type","selector":"input","value":"engineer"}"#)
                .unwrap();
        assert_eq!(
            typed,
            NavAction::Type {
                selector: "input".to_string(),
                value: "engineer".to_string()
            }
        );

        let stop: NavAction = serde_json::from_str(r#"{"action":"stop"}"#).unwrap();
        assert_eq!(stop, NavAction::Stop);

        assert!(serde_json::from_str::<NavAction>(r#"{"action":"scroll"}"#).is_err());
        assert!(serde_json::from_str::<NavAction>(r#"{"action":"click"}"#).is_err());
    }
}
