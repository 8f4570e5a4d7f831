// src/web/handlers/scan_handlers.rs
use crate::scan::ScanService;
use crate::web::types::ScanTriggerResponse;

use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::info;

/// Trigger a scan pass. Replies immediately; the scan runs in a background
/// task. The global scan lock inside `run_scan` makes a lost race with
/// another trigger harmless.
pub async fn scan_now_handler(service: &State<Arc<ScanService>>) -> Json<ScanTriggerResponse> {
    if service.is_running() {
        return Json(ScanTriggerResponse::already_running());
    }

    info!("Scan triggered over HTTP");
    let service = service.inner().clone();
    tokio::spawn(async move {
        service.run_scan().await;
    });

    Json(ScanTriggerResponse::started())
}
