// src/web/types.rs
//! Request and response bodies for the HTTP surface

use rocket::serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: error_code.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ServiceBanner {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct CreateCompanyRequest {
    pub name: String,
    pub career_page_url: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ProfileRequest {
    pub name: String,
    pub resume_text: String,
    pub preferences: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ScanTriggerResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: String,
}

impl ScanTriggerResponse {
    pub fn started() -> Self {
        Self {
            success: true,
            status: "started",
            message: "Scan started in the background".to_string(),
        }
    }

    pub fn already_running() -> Self {
        Self {
            success: true,
            status: "already_running",
            message: "A scan is already in progress".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct VerifyResponse {
    pub healthy: bool,
    pub credential_configured: bool,
    pub llm_reachable: bool,
    pub store_reachable: bool,
}
