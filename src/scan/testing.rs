// src/scan/testing.rs
//! Hand-rolled fakes for the browser and language-model capabilities,
//! shared by the pipeline tests.

use crate::core::browser::{Browser, BrowserPage, BrowserSession};
use crate::core::llm::{LlmClient, LlmError};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ===== Fake browser =====

/// In-memory "site": URL → served markup, plus URLs that refuse to load.
/// Counters track page/session lifecycles so tests can assert that every
/// acquired resource was released.
#[derive(Default)]
pub struct FakeSite {
    pages: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
    sessions_launched: AtomicUsize,
    sessions_closed: AtomicUsize,
}

impl FakeSite {
    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }

    pub fn sessions_launched(&self) -> usize {
        self.sessions_launched.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.sessions_closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    site: Arc<FakeSite>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site(&self) -> Arc<FakeSite> {
        self.site.clone()
    }

    /// Serve `html` at `url`
    pub fn serve(&self, url: &str, html: &str) {
        self.site
            .pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.to_string());
    }

    /// Make navigation to `url` fail
    pub fn fail(&self, url: &str) {
        self.site.failing.lock().unwrap().insert(url.to_string());
    }

    /// Make `url` load but never quiesce
    pub fn hang(&self, url: &str) {
        self.site.hanging.lock().unwrap().insert(url.to_string());
    }

    /// Shortcut past the `Browser` trait for tests that drive a session directly
    pub async fn launch_session(&self) -> Box<dyn BrowserSession> {
        Box::new(FakeSession {
            site: self.site.clone(),
        })
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        self.site.sessions_launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            site: self.site.clone(),
        }))
    }
}

struct FakeSession {
    site: Arc<FakeSite>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        self.site.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            site: self.site.clone(),
            current: Mutex::new(None),
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.site.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakePage {
    site: Arc<FakeSite>,
    current: Mutex<Option<(String, String)>>,
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        if self.site.failing.lock().unwrap().contains(url) {
            anyhow::bail!("connection refused: {url}");
        }
        let html = self
            .site
            .pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no page served at {url}"))?;

        *self.current.lock().unwrap() = Some((url.to_string(), html));
        Ok(())
    }

    async fn wait_quiescent(&self) -> Result<()> {
        let hung = match &*self.current.lock().unwrap() {
            Some((url, _)) => self.site.hanging.lock().unwrap().contains(url),
            None => false,
        };
        if hung {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let current = self.current.lock().unwrap().clone();
        let (url, html) = current.ok_or_else(|| anyhow::anyhow!("no page loaded"))?;

        if script == super::navigator::SNAPSHOT_SCRIPT {
            Ok(serde_json::json!({ "url": url, "html": html }))
        } else if script == super::navigator::BODY_TEXT_SCRIPT {
            // Close enough to innerText for test pages
            Ok(serde_json::Value::String(html))
        } else {
            Ok(serde_json::Value::Null)
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.site.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ===== Fake language model =====

enum CannedReply {
    Content(String),
    Failure,
}

/// Canned-response language model. Replies are consumed from a queue; when
/// the queue is empty the default reply (if any) repeats. User prompts are
/// recorded for assertions.
pub struct FakeLlm {
    configured: bool,
    replies: Mutex<VecDeque<CannedReply>>,
    default_reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeLlm {
    pub fn new() -> Self {
        Self {
            configured: true,
            replies: Mutex::new(VecDeque::new()),
            default_reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `content` on every call
    pub fn always(content: &str) -> Self {
        Self {
            default_reply: Some(content.to_string()),
            ..Self::new()
        }
    }

    /// Model with no credential; every call fails with `Unconfigured`
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn push_content(&self, content: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(CannedReply::Content(content.to_string()));
    }

    pub fn push_failure(&self) {
        self.replies.lock().unwrap().push_back(CannedReply::Failure);
    }

    /// Handle to the recorded user prompts, usable after the fake is moved
    /// behind an `Arc<dyn LlmClient>`
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        self.prompts.clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _json_mode: bool,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());

        if !self.configured {
            return Err(LlmError::Unconfigured);
        }

        match self.replies.lock().unwrap().pop_front() {
            Some(CannedReply::Content(content)) => Ok(content),
            Some(CannedReply::Failure) => Err(LlmError::Status {
                status: 500,
                body: "canned failure".to_string(),
            }),
            None => match &self.default_reply {
                Some(content) => Ok(content.clone()),
                None => Err(LlmError::EmptyResponse),
            },
        }
    }
}
