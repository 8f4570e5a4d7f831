// src/core/mod.rs
//! Core services - configuration, persistence and external capabilities

pub mod browser;
pub mod config;
pub mod database;
pub mod llm;

pub use browser::{Browser, BrowserPage, BrowserSession, CdpBrowser};
pub use config::{AppConfig, EnvironmentConfig, LlmConfig};
pub use database::{
    Company, JobFilter, JobListing, JobStats, NewJobListing, Store, UserProfile,
};
pub use llm::{LlmClient, LlmError, OpenRouterClient};
