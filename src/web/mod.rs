// src/web/mod.rs
//! HTTP surface - CRUD for companies, jobs and the profile, plus the scan
//! trigger and the readiness check. Handlers live in `handlers/`; the route
//! functions here stay thin.

pub mod handlers;
pub mod types;

pub use types::*;

use crate::core::config::EnvironmentConfig;
use crate::core::database::{Company, JobListing, JobStats, Store, UserProfile};
use crate::scan::ScanService;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status::{Created, Custom};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Request, Response, State};
use std::sync::Arc;
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Routes

#[get("/")]
pub async fn banner() -> Json<ServiceBanner> {
    handlers::banner_handler().await
}

#[post("/companies", data = "<request>")]
pub async fn create_company(
    request: Json<CreateCompanyRequest>,
    store: &State<Store>,
) -> Result<Created<Json<Company>>, Custom<Json<ErrorResponse>>> {
    handlers::create_company_handler(request, store).await
}

#[get("/companies")]
pub async fn list_companies(
    store: &State<Store>,
) -> Result<Json<Vec<Company>>, Custom<Json<ErrorResponse>>> {
    handlers::list_companies_handler(store).await
}

#[get("/jobs?<company_id>&<min_score>&<active_only>&<limit>&<offset>")]
pub async fn list_jobs(
    company_id: Option<i64>,
    min_score: Option<i64>,
    active_only: Option<bool>,
    limit: Option<i64>,
    offset: Option<i64>,
    store: &State<Store>,
) -> Result<Json<Vec<JobListing>>, Custom<Json<ErrorResponse>>> {
    handlers::list_jobs_handler(company_id, min_score, active_only, limit, offset, store).await
}

#[get("/jobs/stats")]
pub async fn job_stats(
    store: &State<Store>,
) -> Result<Json<JobStats>, Custom<Json<ErrorResponse>>> {
    handlers::job_stats_handler(store).await
}

#[get("/jobs/<id>")]
pub async fn get_job(
    id: i64,
    store: &State<Store>,
) -> Result<Json<JobListing>, Custom<Json<ErrorResponse>>> {
    handlers::get_job_handler(id, store).await
}

#[delete("/jobs/<id>")]
pub async fn delete_job(
    id: i64,
    store: &State<Store>,
) -> Result<Status, Custom<Json<ErrorResponse>>> {
    handlers::delete_job_handler(id, store).await
}

#[get("/profile")]
pub async fn get_profile(
    store: &State<Store>,
) -> Result<Json<UserProfile>, Custom<Json<ErrorResponse>>> {
    handlers::get_profile_handler(store).await
}

#[put("/profile", data = "<request>")]
pub async fn put_profile(
    request: Json<ProfileRequest>,
    store: &State<Store>,
) -> Result<Json<UserProfile>, Custom<Json<ErrorResponse>>> {
    handlers::put_profile_handler(request, store).await
}

#[post("/scan-now")]
pub async fn scan_now(service: &State<Arc<ScanService>>) -> Json<ScanTriggerResponse> {
    handlers::scan_now_handler(service).await
}

#[get("/verify")]
pub async fn verify(service: &State<Arc<ScanService>>) -> Custom<Json<VerifyResponse>> {
    handlers::verify_handler(service).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(
        ErrorResponse::new("Invalid request format", "BAD_REQUEST").with_suggestions(vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ]),
    )
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Resource not found", "NOT_FOUND"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(
        ErrorResponse::new("Internal server error", "INTERNAL_ERROR").with_suggestions(vec![
            "Try again in a few moments".to_string(),
        ]),
    )
}

/// Assemble the rocket instance; split out so tests can drive it with a
/// local client
pub fn build_rocket(
    port: u16,
    store: Store,
    service: Arc<ScanService>,
) -> rocket::Rocket<rocket::Build> {
    let config = rocket::Config {
        port,
        address: std::net::Ipv4Addr::UNSPECIFIED.into(),
        ..rocket::Config::default()
    };

    rocket::build()
        .configure(config)
        .attach(Cors)
        .manage(store)
        .manage(service)
        .register("/api", catchers![bad_request, not_found, internal_error])
        .mount("/", routes![banner])
        .mount(
            "/api",
            routes![
                create_company,
                list_companies,
                list_jobs,
                job_stats,
                get_job,
                delete_job,
                get_profile,
                put_profile,
                scan_now,
                verify,
                options,
            ],
        )
}

pub async fn start_web_server(
    config: &EnvironmentConfig,
    store: Store,
    service: Arc<ScanService>,
) -> Result<()> {
    info!("Starting jobscout API server on port {}", config.server_port);

    let _rocket = build_rocket(config.server_port, store, service)
        .launch()
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::testing::{FakeBrowser, FakeLlm};
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;

    async fn client() -> (Client, Store) {
        let store = Store::connect_in_memory().await.unwrap();
        let config = EnvironmentConfig {
            database_path: "unused.db".into(),
            server_port: 8000,
            scan_interval_hours: 24,
            navigation_timeout_secs: 5,
            max_navigation_steps: 0,
            chrome_executable: None,
        };
        let service = Arc::new(ScanService::new(
            store.clone(),
            Arc::new(FakeBrowser::new()),
            Arc::new(FakeLlm::always("OK")),
            &config,
        ));

        let client = Client::tracked(build_rocket(8000, store.clone(), service))
            .await
            .unwrap();
        (client, store)
    }

    #[tokio::test]
    async fn banner_reports_the_service() {
        let (client, _store) = client().await;

        let response = client.get("/").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["service"], "jobscout");
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    async fn companies_can_be_created_and_listed() {
        let (client, _store) = client().await;

        let response = client
            .post("/api/companies")
            .header(ContentType::JSON)
            .body(r#"{"name":"Acme","career_page_url":"https://acme.test/careers"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let created: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(created["name"], "Acme");
        assert_eq!(created["is_active"], true);

        let response = client.get("/api/companies").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let listed: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_company_urls_are_rejected() {
        let (client, _store) = client().await;

        let response = client
            .post("/api/companies")
            .header(ContentType::JSON)
            .body(r#"{"name":"Acme","career_page_url":"not a url"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "INVALID_URL");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn profile_round_trips_and_404s_before_creation() {
        let (client, _store) = client().await;

        let response = client.get("/api/profile").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .put("/api/profile")
            .header(ContentType::JSON)
            .body(r#"{"name":"Ada","resume_text":"Rust","preferences":"Remote"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get("/api/profile").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[tokio::test]
    async fn missing_jobs_give_404_and_deletes_are_terminal() {
        let (client, store) = client().await;

        let response = client.get("/api/jobs/42").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let company = store
            .companies()
            .create("Acme", "https://acme.test", true)
            .await
            .unwrap();
        store
            .jobs()
            .insert(&crate::core::database::NewJobListing {
                title: "Engineer".to_string(),
                url: "https://acme.test/job/1".to_string(),
                company_id: company.id,
                description_text: "Work".to_string(),
                match_score: 50,
                match_reasoning: "ok".to_string(),
                missing_skills: vec![],
            })
            .await
            .unwrap();

        let job = store
            .jobs()
            .find_by_url("https://acme.test/job/1")
            .await
            .unwrap()
            .unwrap();

        let response = client.delete(format!("/api/jobs/{}", job.id)).dispatch().await;
        assert_eq!(response.status(), Status::NoContent);

        let response = client.delete(format!("/api/jobs/{}", job.id)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[tokio::test]
    async fn job_stats_start_empty() {
        let (client, _store) = client().await;

        let response = client.get("/api/jobs/stats").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["total"], 0);
        assert_eq!(body["analyzed"], 0);
    }

    #[tokio::test]
    async fn scan_trigger_replies_immediately() {
        let (client, _store) = client().await;

        let response = client.post("/api/scan-now").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["status"], "started");
    }

    #[tokio::test]
    async fn verify_reports_readiness_booleans() {
        let (client, _store) = client().await;

        let response = client.get("/api/verify").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["healthy"], true);
        assert_eq!(body["credential_configured"], true);
        assert_eq!(body["llm_reachable"], true);
        assert_eq!(body["store_reachable"], true);
    }

    #[tokio::test]
    async fn cors_headers_are_attached() {
        let (client, _store) = client().await;

        let response = client.get("/").dispatch().await;

        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
