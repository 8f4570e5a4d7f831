// src/core/browser.rs
//! Browser automation capability - chromiumoxide behind session/page traits

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as ChromiumBrowser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::page::Page as ChromiumPage;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CDP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// One rendered page inside a session
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait for the page to reach a quiescent network state
    async fn wait_quiescent(&self) -> Result<()>;

    /// Run a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// One running browser process
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// Launcher for browser sessions; each company scan holds one session
#[async_trait]
pub trait Browser: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

// ===== chromiumoxide implementation =====

pub struct CdpBrowser {
    chrome_executable: Option<PathBuf>,
}

impl CdpBrowser {
    pub fn new(chrome_executable: Option<PathBuf>) -> Self {
        Self { chrome_executable }
    }
}

#[async_trait]
impl Browser for CdpBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let executable = match &self.chrome_executable {
            Some(path) => path.clone(),
            None => find_browser_executable()?,
        };

        let config = BrowserConfigBuilder::default()
            .request_timeout(Duration::from_secs(CDP_REQUEST_TIMEOUT_SECS))
            .chrome_executable(executable)
            .headless_mode(HeadlessMode::default())
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = ChromiumBrowser::launch(config)
            .await
            .context("Failed to launch browser")?;

        // Drain CDP events for the lifetime of the session
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {e:?}");
                }
            }
        });

        debug!("Browser session launched");
        Ok(Box::new(CdpSession {
            browser,
            handler_task,
        }))
    }
}

struct CdpSession {
    browser: ChromiumBrowser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        Ok(Box::new(CdpPage { page }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let CdpSession {
            mut browser,
            handler_task,
        } = *self;

        let closed = browser.close().await;
        // Wait for the process to exit even if close failed, then stop the handler
        let waited = browser.wait().await;
        handler_task.abort();

        closed.context("Failed to close browser")?;
        let _ = waited.context("Browser process did not exit cleanly")?;
        Ok(())
    }
}

struct CdpPage {
    page: ChromiumPage,
}

#[async_trait]
impl BrowserPage for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Navigation to {url} failed"))?;
        Ok(())
    }

    async fn wait_quiescent(&self) -> Result<()> {
        self.page
            .wait_for_navigation()
            .await
            .context("Page did not finish loading")?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("Script evaluation failed")?;

        result
            .into_value::<serde_json::Value>()
            .context("Script result was not valid JSON")
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let CdpPage { page } = *self;
        page.close().await.context("Failed to close page")?;
        Ok(())
    }
}

/// Find a Chrome/Chromium executable. CHROMIUM_PATH overrides the search.
fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path_str.is_empty() {
                        let path = PathBuf::from(path_str);
                        info!("Found browser via which: {}", path.display());
                        return Ok(path);
                    }
                }
            }
        }
    }

    anyhow::bail!(
        "No Chrome/Chromium executable found. Set CHROMIUM_PATH or chrome_executable in config.yaml."
    )
}
