// src/core/database.rs
//! Database operations - connection management, models and repositories

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::types::Json;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

// ===== Connection Management =====

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the database file with automatic setup
    pub async fn connect(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open a private in-memory database, for tests
    pub async fn connect_in_memory() -> Result<Self> {
        // One connection only: each sqlite :memory: connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get pool reference for custom operations
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                career_page_url TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                last_scraped_at TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                company_id INTEGER NOT NULL REFERENCES companies(id),
                description_text TEXT,
                date_found TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                match_score INTEGER,
                match_reasoning TEXT,
                missing_skills TEXT NOT NULL DEFAULT '[]',
                CONSTRAINT match_score_range CHECK (
                    match_score IS NULL OR match_score BETWEEN 0 AND 100
                )
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                resume_text TEXT NOT NULL,
                preferences TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_job_listings_company ON job_listings(company_id);",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_job_listings_score ON job_listings(match_score);",
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    pub fn companies(&self) -> CompanyRepository<'_> {
        CompanyRepository::new(&self.pool)
    }

    pub fn jobs(&self) -> JobRepository<'_> {
        JobRepository::new(&self.pool)
    }

    pub fn profile(&self) -> ProfileRepository<'_> {
        ProfileRepository::new(&self.pool)
    }
}

// ===== Models =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub career_page_url: String,
    pub is_active: bool,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobListing {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub company_id: i64,
    pub description_text: Option<String>,
    pub date_found: DateTime<Utc>,
    pub is_active: bool,
    pub match_score: Option<i64>,
    pub match_reasoning: Option<String>,
    pub missing_skills: Json<Vec<String>>,
}

/// Listing as staged by the company scanner, before it has a row id
#[derive(Debug, Clone)]
pub struct NewJobListing {
    pub title: String,
    pub url: String,
    pub company_id: i64,
    pub description_text: String,
    pub match_score: i64,
    pub match_reasoning: String,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub resume_text: String,
    pub preferences: String,
}

impl UserProfile {
    /// Stand-in used when no profile has been saved yet; scans proceed
    /// against it and analysis degrades instead of failing
    pub fn empty() -> Self {
        Self {
            id: 0,
            name: "Default User".to_string(),
            resume_text: String::new(),
            preferences: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobStats {
    pub total: i64,
    pub analyzed: i64,
    pub strong_matches: i64,
    pub average_score: Option<f64>,
}

/// Filters for the job listing queries
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub company_id: Option<i64>,
    pub min_score: Option<i64>,
    pub active_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const JOB_COLUMNS: &str = "id, title, url, company_id, description_text, date_found, is_active, match_score, match_reasoning, missing_skills";

// ===== Company Repository =====

pub struct CompanyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CompanyRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        career_page_url: &str,
        is_active: bool,
    ) -> Result<Company> {
        let result = sqlx::query(
            r#"
            INSERT INTO companies (name, career_page_url, is_active, last_scraped_at)
            VALUES (?, ?, ?, NULL)
            "#,
        )
        .bind(name)
        .bind(career_page_url)
        .bind(is_active)
        .execute(self.pool)
        .await?;

        let company = Company {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            career_page_url: career_page_url.to_string(),
            is_active,
            last_scraped_at: None,
        };

        info!("Created company: {} ({})", company.name, company.id);
        Ok(company)
    }

    pub async fn list(&self) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, career_page_url, is_active, last_scraped_at
            FROM companies
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(companies)
    }

    /// Companies eligible for scanning, in a deterministic order
    pub async fn active(&self) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, career_page_url, is_active, last_scraped_at
            FROM companies
            WHERE is_active = TRUE
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(companies)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, career_page_url, is_active, last_scraped_at
            FROM companies
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(company)
    }

    /// Record that a scan of this company finished
    pub async fn mark_scanned(&self, id: i64, scanned_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE companies SET last_scraped_at = ? WHERE id = ?")
            .bind(scanned_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

// ===== Job Repository =====

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a listing, ignoring URL duplicates. Returns whether a row landed.
    pub async fn insert(&self, listing: &NewJobListing) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_listings
                (title, url, company_id, description_text, date_found, is_active,
                 match_score, match_reasoning, missing_skills)
            VALUES (?, ?, ?, ?, ?, TRUE, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.url)
        .bind(listing.company_id)
        .bind(&listing.description_text)
        .bind(Utc::now())
        .bind(listing.match_score)
        .bind(&listing.match_reasoning)
        .bind(Json(listing.missing_skills.clone()))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists_by_url(&self, url: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM job_listings WHERE url = ?",
        )
        .bind(url)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<JobListing>> {
        let listing = sqlx::query_as::<_, JobListing>(&format!(
            "SELECT {} FROM job_listings WHERE url = ?",
            JOB_COLUMNS
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(listing)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<JobListing>> {
        let listing = sqlx::query_as::<_, JobListing>(&format!(
            "SELECT {} FROM job_listings WHERE id = ?",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(listing)
    }

    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<JobListing>> {
        let limit = filter.limit.unwrap_or(50);
        let offset = filter.offset.unwrap_or(0);

        let listings = sqlx::query_as::<_, JobListing>(&format!(
            r#"
            SELECT {}
            FROM job_listings
            WHERE (? IS NULL OR company_id = ?)
              AND (? IS NULL OR match_score >= ?)
              AND (? = FALSE OR is_active = TRUE)
            ORDER BY date_found DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
            JOB_COLUMNS
        ))
        .bind(filter.company_id)
        .bind(filter.company_id)
        .bind(filter.min_score)
        .bind(filter.min_score)
        .bind(filter.active_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(listings)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_listings WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(&self) -> Result<JobStats> {
        let stats = sqlx::query_as::<_, JobStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(match_score) AS analyzed,
                COALESCE(SUM(CASE WHEN match_score >= 70 THEN 1 ELSE 0 END), 0) AS strong_matches,
                AVG(match_score) AS average_score
            FROM job_listings
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}

// ===== Profile Repository =====

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The singleton profile, if one has been saved
    pub async fn get(&self) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, resume_text, preferences FROM user_profiles ORDER BY id ASC LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn upsert(
        &self,
        name: &str,
        resume_text: &str,
        preferences: &str,
    ) -> Result<UserProfile> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, name, resume_text, preferences)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                resume_text = excluded.resume_text,
                preferences = excluded.preferences
            "#,
        )
        .bind(name)
        .bind(resume_text)
        .bind(preferences)
        .execute(self.pool)
        .await?;

        Ok(UserProfile {
            id: 1,
            name: name.to_string(),
            resume_text: resume_text.to_string(),
            preferences: preferences.to_string(),
        })
    }
}
