// src/web/handlers/job_handlers.rs
use crate::core::database::{JobFilter, JobListing, JobStats, Store};
use crate::web::types::ErrorResponse;

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

fn database_error(context: &str, e: anyhow::Error) -> Custom<Json<ErrorResponse>> {
    error!("{context}: {e:#}");
    Custom(
        Status::InternalServerError,
        Json(ErrorResponse::new(context, "DATABASE_ERROR")),
    )
}

fn not_found(id: i64) -> Custom<Json<ErrorResponse>> {
    Custom(
        Status::NotFound,
        Json(ErrorResponse::new(
            format!("No job listing with id {id}"),
            "JOB_NOT_FOUND",
        )),
    )
}

pub async fn list_jobs_handler(
    company_id: Option<i64>,
    min_score: Option<i64>,
    active_only: Option<bool>,
    limit: Option<i64>,
    offset: Option<i64>,
    store: &State<Store>,
) -> Result<Json<Vec<JobListing>>, Custom<Json<ErrorResponse>>> {
    let filter = JobFilter {
        company_id,
        min_score,
        active_only: active_only.unwrap_or(false),
        limit,
        offset,
    };

    store
        .jobs()
        .list(&filter)
        .await
        .map(Json)
        .map_err(|e| database_error("Failed to list job listings", e))
}

pub async fn job_stats_handler(
    store: &State<Store>,
) -> Result<Json<JobStats>, Custom<Json<ErrorResponse>>> {
    store
        .jobs()
        .stats()
        .await
        .map(Json)
        .map_err(|e| database_error("Failed to compute job stats", e))
}

pub async fn get_job_handler(
    id: i64,
    store: &State<Store>,
) -> Result<Json<JobListing>, Custom<Json<ErrorResponse>>> {
    store
        .jobs()
        .find_by_id(id)
        .await
        .map_err(|e| database_error("Failed to load job listing", e))?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

pub async fn delete_job_handler(
    id: i64,
    store: &State<Store>,
) -> Result<Status, Custom<Json<ErrorResponse>>> {
    let deleted = store
        .jobs()
        .delete(id)
        .await
        .map_err(|e| database_error("Failed to delete job listing", e))?;

    if deleted {
        info!(job_id = id, "Job listing deleted");
        Ok(Status::NoContent)
    } else {
        Err(not_found(id))
    }
}
