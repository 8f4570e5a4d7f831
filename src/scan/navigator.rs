// src/scan/navigator.rs
//! Page navigation - drives a browser session through a career page and
//! captures structural snapshots. Pages opened here are closed on every
//! exit path; close failures are logged, never propagated over the result.

use crate::core::browser::{BrowserPage, BrowserSession};
use crate::scan::{MatchAnalyzer, NavAction, PageSnapshot, ScanError};
use anyhow::{anyhow, Context};
use std::time::Duration;
use tracing::{debug, warn};

pub(crate) const SNAPSHOT_SCRIPT: &str =
    "(() => ({ url: window.location.href, html: document.documentElement.outerHTML }))()";

pub(crate) const BODY_TEXT_SCRIPT: &str =
    "(() => document.body ? document.body.innerText : '')()";

pub struct Navigator {
    timeout: Duration,
    max_navigation_steps: u32,
}

impl Navigator {
    pub fn new(timeout: Duration, max_navigation_steps: u32) -> Self {
        Self {
            timeout,
            max_navigation_steps,
        }
    }

    /// Open a page on the session and navigate it to `url`, waiting for the
    /// page to quiesce. Timeouts are fatal to the company scan.
    pub async fn load(
        &self,
        session: &dyn BrowserSession,
        url: &str,
    ) -> Result<Box<dyn BrowserPage>, ScanError> {
        let page = session.new_page().await.map_err(ScanError::Browser)?;

        match self.navigate(page.as_ref(), url).await {
            Ok(()) => Ok(page),
            Err(e) => {
                close_page(page).await;
                Err(e)
            }
        }
    }

    async fn navigate(&self, page: &dyn BrowserPage, url: &str) -> Result<(), ScanError> {
        let navigation = tokio::time::timeout(self.timeout, async {
            page.goto(url).await?;
            page.wait_quiescent().await
        })
        .await;

        match navigation {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScanError::Browser(
                e.context(format!("navigation to {url} failed")),
            )),
            Err(_) => Err(ScanError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }

    /// Capture the page's current URL and rendered markup
    pub async fn snapshot(&self, page: &dyn BrowserPage) -> Result<PageSnapshot, ScanError> {
        let value = page
            .evaluate(SNAPSHOT_SCRIPT)
            .await
            .map_err(ScanError::Browser)?;

        serde_json::from_value(value)
            .map_err(|e| ScanError::Browser(anyhow!("snapshot was not {{url, html}}: {e}")))
    }

    /// The optional AI-directed navigation loop. Asks the analyzer for one
    /// action at a time and applies it, up to the configured step cap. On
    /// `stop`, on any error, or on cap exhaustion the page is left as-is and
    /// extraction proceeds from the current state.
    pub async fn run_navigation_loop(
        &self,
        page: &dyn BrowserPage,
        analyzer: &MatchAnalyzer,
        preferences: &str,
    ) {
        for step in 0..self.max_navigation_steps {
            let snapshot = match self.snapshot(page).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(step, error = %e, "Snapshot failed during navigation loop");
                    return;
                }
            };

            let action = analyzer.decide_navigation(&snapshot.html, preferences).await;
            let script = match &action {
                NavAction::Stop => {
                    debug!(step, "Model chose to stop navigating");
                    return;
                }
                NavAction::Click { selector } => click_script(selector),
                NavAction::Type { selector, value } => type_script(selector, value),
            };

            match page.evaluate(&script).await {
                Ok(result) if result == serde_json::Value::Bool(false) => {
                    debug!(step, ?action, "Selector matched nothing, stopping navigation");
                    return;
                }
                Ok(_) => debug!(step, ?action, "Applied navigation action"),
                Err(e) => {
                    warn!(step, ?action, error = %e, "Navigation action failed, stopping");
                    return;
                }
            }

            // Give the page a chance to settle after the action
            let _ = tokio::time::timeout(self.timeout, page.wait_quiescent()).await;
        }

        debug!(
            steps = self.max_navigation_steps,
            "Navigation step cap reached, proceeding to extraction"
        );
    }

    /// Fetch the rendered visible text of a detail page through a fresh page
    /// on the same session. The page is closed even when the fetch fails.
    pub async fn fetch_detail_text(
        &self,
        session: &dyn BrowserSession,
        url: &str,
    ) -> Result<String, ScanError> {
        let page = match session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                return Err(ScanError::DetailFetch {
                    url: url.to_string(),
                    cause: e,
                })
            }
        };

        let text = self.read_body_text(page.as_ref(), url).await;
        close_page(page).await;

        text.map_err(|e| ScanError::DetailFetch {
            url: url.to_string(),
            cause: e,
        })
    }

    async fn read_body_text(&self, page: &dyn BrowserPage, url: &str) -> anyhow::Result<String> {
        tokio::time::timeout(self.timeout, async {
            page.goto(url).await?;
            page.wait_quiescent().await
        })
        .await
        .map_err(|_| anyhow!("page did not quiesce within {}s", self.timeout.as_secs()))??;

        let value = page
            .evaluate(BODY_TEXT_SCRIPT)
            .await
            .context("body text extraction failed")?;

        Ok(value.as_str().unwrap_or("").to_string())
    }
}

pub(crate) async fn close_page(page: Box<dyn BrowserPage>) {
    if let Err(e) = page.close().await {
        warn!("Failed to close page: {e:#}");
    }
}

fn click_script(selector: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    format!(
        "(() => {{ const el = document.querySelector({selector}); if (el) el.click(); return el !== null; }})()"
    )
}

fn type_script(selector: &str, value: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    let value = serde_json::Value::String(value.to_string());
    format!(
        "(() => {{ const el = document.querySelector({selector}); if (!el) return false; \
el.value = {value}; el.dispatchEvent(new Event('input', {{ bubbles: true }})); return true; }})()"
    )
}
