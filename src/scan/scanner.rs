// src/scan/scanner.rs
//! One company's scan: navigate the career page, extract candidate links,
//! skip known URLs, fetch and score the new ones, persist the results.

use crate::core::browser::{Browser, BrowserSession};
use crate::core::database::{Company, NewJobListing, Store, UserProfile};
use crate::core::llm::LlmClient;
use crate::scan::navigator::close_page;
use crate::scan::{
    extract_candidates, LinkCandidate, MatchAnalyzer, Navigator, ScanError,
};
use crate::utils::truncate_chars;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Listing titles are cut to this many characters at creation
const MAX_TITLE_CHARS: usize = 200;

pub struct CompanyScanner {
    store: Store,
    browser: Arc<dyn Browser>,
    navigator: Navigator,
    analyzer: MatchAnalyzer,
}

impl CompanyScanner {
    pub fn new(
        store: Store,
        browser: Arc<dyn Browser>,
        llm: Arc<dyn LlmClient>,
        navigation_timeout: Duration,
        max_navigation_steps: u32,
    ) -> Self {
        Self {
            store,
            browser,
            navigator: Navigator::new(navigation_timeout, max_navigation_steps),
            analyzer: MatchAnalyzer::new(llm),
        }
    }

    /// Scan one company's career page. Per-link failures are absorbed here;
    /// anything that happens before extraction aborts the whole company and
    /// is left for the orchestrator to absorb. Returns the number of new
    /// listings persisted.
    pub async fn scan(&self, company: &Company) -> Result<u32, ScanError> {
        info!(
            company = %company.name,
            url = %company.career_page_url,
            "Scanning company"
        );

        let session = self.browser.launch().await.map_err(ScanError::Browser)?;
        let result = self.scan_with_session(session.as_ref(), company).await;
        if let Err(e) = session.close().await {
            warn!(company = %company.name, "Failed to close browser session: {e:#}");
        }
        result
    }

    async fn scan_with_session(
        &self,
        session: &dyn BrowserSession,
        company: &Company,
    ) -> Result<u32, ScanError> {
        let profile = self
            .store
            .profile()
            .get()
            .await
            .map_err(ScanError::Store)?
            .unwrap_or_else(UserProfile::empty);

        let page = self
            .navigator
            .load(session, &company.career_page_url)
            .await?;
        self.navigator
            .run_navigation_loop(page.as_ref(), &self.analyzer, &profile.preferences)
            .await;
        let snapshot = self.navigator.snapshot(page.as_ref()).await;
        close_page(page).await;
        let snapshot = snapshot?;

        let candidates = extract_candidates(&snapshot);
        info!(
            company = %company.name,
            candidates = candidates.len(),
            "Extracted candidate links"
        );

        let mut staged = Vec::new();
        let mut seen_this_scan = HashSet::new();
        for candidate in candidates {
            // Repeated anchors to the same URL on one page count once
            if !seen_this_scan.insert(candidate.href.clone()) {
                continue;
            }

            match self.stage_candidate(session, company, &profile, &candidate).await {
                Ok(Some(listing)) => staged.push(listing),
                Ok(None) => debug!(url = %candidate.href, "Already known, skipped"),
                Err(e) => warn!(
                    company = %company.name,
                    url = %candidate.href,
                    error = %e,
                    "Skipping candidate link"
                ),
            }
        }

        let mut added = 0u32;
        for listing in &staged {
            match self.store.jobs().insert(listing).await {
                Ok(true) => added += 1,
                Ok(false) => debug!(url = %listing.url, "Listing landed meanwhile, skipped"),
                Err(e) => error!(url = %listing.url, error = %e, "Failed to persist listing"),
            }
        }

        self.store
            .companies()
            .mark_scanned(company.id, Utc::now())
            .await
            .map_err(ScanError::Store)?;

        info!(company = %company.name, added, "Company scan finished");
        Ok(added)
    }

    /// Dedup-check one candidate and, if new, fetch its detail page and score
    /// it. `Ok(None)` means the URL is already persisted.
    async fn stage_candidate(
        &self,
        session: &dyn BrowserSession,
        company: &Company,
        profile: &UserProfile,
        candidate: &LinkCandidate,
    ) -> Result<Option<NewJobListing>, ScanError> {
        let is_new = !self
            .store
            .jobs()
            .exists_by_url(&candidate.href)
            .await
            .map_err(ScanError::Store)?;
        if !is_new {
            return Ok(None);
        }

        let description = self
            .navigator
            .fetch_detail_text(session, &candidate.href)
            .await?;
        let analysis = self.analyzer.score(&description, profile).await;

        let title_source = if candidate.text.is_empty() {
            &candidate.href
        } else {
            &candidate.text
        };

        Ok(Some(NewJobListing {
            title: truncate_chars(title_source, MAX_TITLE_CHARS).to_string(),
            url: candidate.href.clone(),
            company_id: company.id,
            description_text: description,
            match_score: analysis.match_score,
            match_reasoning: analysis.reasoning,
            missing_skills: analysis.missing_skills,
        }))
    }
}
