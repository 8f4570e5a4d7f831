// src/scan/analyzer.rs
//! Match analysis - scores job postings against the profile via the
//! language-model capability. Infallible by construction: every failure
//! degrades to a zero-score placeholder so discovery is never blocked.

use crate::core::database::UserProfile;
use crate::core::llm::{LlmClient, LlmError};
use crate::scan::{MatchResult, NavAction, ScanError};
use crate::utils::{strip_code_fences, truncate_chars};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Job text is cut to this prefix before submission, to bound cost and latency
const JOB_TEXT_MAX_CHARS: usize = 10_000;

/// Page state submitted for a navigation decision is cut to this prefix
const NAV_STATE_MAX_CHARS: usize = 15_000;

const SCORE_MAX_TOKENS: u32 = 1024;
const NAV_MAX_TOKENS: u32 = 256;

const SCORE_SYSTEM_PROMPT: &str = "You are a technical recruiter comparing a job posting against a candidate profile. \
Respond with strict JSON only, in the shape \
{\"match_score\": <integer 0-100>, \"reasoning\": \"<one short paragraph>\", \"missing_skills\": [\"<skill>\"]}. \
No prose outside the JSON.";

const NAV_SYSTEM_PROMPT: &str = "You are operating a web browser on an employer's career page, trying to reach the page \
that lists open positions. Given the current page state and the user's preferences, \
choose exactly one action. Respond with strict JSON only: \
{\"action\":\"click\",\"selector\":\"<css selector>\"} or \
{\"action\":\"type\",\"selector\":\"<css selector>\",\"value\":\"<text>\"} or \
{\"action\":\"stop\"} when the current page already lists jobs.";

/// What the model is asked to return for a scoring call
#[derive(Deserialize)]
struct RawMatch {
    match_score: i64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    missing_skills: Vec<String>,
}

pub struct MatchAnalyzer {
    llm: Arc<dyn LlmClient>,
}

impl MatchAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Score one job posting against the profile. Never fails: model errors
    /// and malformed output come back as `MatchResult::failure`.
    pub async fn score(&self, job_text: &str, profile: &UserProfile) -> MatchResult {
        match self.try_score(job_text, profile).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Match analysis degraded to zero score");
                MatchResult::failure(&e)
            }
        }
    }

    async fn try_score(
        &self,
        job_text: &str,
        profile: &UserProfile,
    ) -> Result<MatchResult, ScanError> {
        let excerpt = truncate_chars(job_text, JOB_TEXT_MAX_CHARS);
        let user_prompt = format!(
            "Candidate profile:\nName: {}\nResume and skills:\n{}\nPreferences:\n{}\n\nJob posting:\n{}",
            profile.name, profile.resume_text, profile.preferences, excerpt
        );

        let raw = self
            .llm
            .complete(SCORE_SYSTEM_PROMPT, &user_prompt, true, SCORE_MAX_TOKENS)
            .await
            .map_err(map_llm_error)?;

        let parsed: RawMatch = serde_json::from_str(strip_code_fences(&raw))
            .map_err(|e| ScanError::Analysis(format!("malformed model output: {e}")))?;

        debug!(score = parsed.match_score, "Job scored");
        Ok(MatchResult {
            match_score: parsed.match_score.clamp(0, 100),
            reasoning: parsed.reasoning,
            missing_skills: parsed.missing_skills,
        })
    }

    /// Choose the next navigation action for the AI-directed loop. Any
    /// failure, including a missing credential, means `stop`.
    pub async fn decide_navigation(&self, page_state: &str, preferences: &str) -> NavAction {
        let user_prompt = format!(
            "User preferences:\n{}\n\nCurrent page state:\n{}",
            preferences,
            truncate_chars(page_state, NAV_STATE_MAX_CHARS)
        );

        let raw = match self
            .llm
            .complete(NAV_SYSTEM_PROMPT, &user_prompt, true, NAV_MAX_TOKENS)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "Navigation decision unavailable, stopping");
                return NavAction::Stop;
            }
        };

        match serde_json::from_str(strip_code_fences(&raw)) {
            Ok(action) => action,
            Err(e) => {
                debug!(error = %e, "Unparseable navigation action, stopping");
                NavAction::Stop
            }
        }
    }
}

fn map_llm_error(error: LlmError) -> ScanError {
    match error {
        LlmError::Unconfigured => ScanError::ConfigurationMissing,
        other => ScanError::Analysis(other.to_string()),
    }
}
