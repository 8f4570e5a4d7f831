// src/web/handlers/system_handlers.rs
use crate::scan::ScanService;
use crate::web::types::{ServiceBanner, VerifyResponse};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

pub async fn banner_handler() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        service: "jobscout",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

/// Readiness booleans; 503 when any of them is false
pub async fn verify_handler(service: &State<Arc<ScanService>>) -> Custom<Json<VerifyResponse>> {
    let report = service.verify().await;
    let status = if report.healthy() {
        Status::Ok
    } else {
        Status::ServiceUnavailable
    };

    Custom(
        status,
        Json(VerifyResponse {
            healthy: report.healthy(),
            credential_configured: report.credential_configured,
            llm_reachable: report.llm_reachable,
            store_reachable: report.store_reachable,
        }),
    )
}
