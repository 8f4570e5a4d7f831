// src/web/handlers/company_handlers.rs
use crate::core::database::{Company, Store};
use crate::web::types::{CreateCompanyRequest, ErrorResponse};

use rocket::http::Status;
use rocket::response::status::{Created, Custom};
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;
use url::Url;

pub async fn create_company_handler(
    request: Json<CreateCompanyRequest>,
    store: &State<Store>,
) -> Result<Created<Json<Company>>, Custom<Json<ErrorResponse>>> {
    let request = request.into_inner();

    if request.name.trim().is_empty() {
        return Err(Custom(
            Status::BadRequest,
            Json(ErrorResponse::new("Company name is required", "INVALID_NAME")),
        ));
    }

    if Url::parse(&request.career_page_url).is_err() {
        return Err(Custom(
            Status::BadRequest,
            Json(
                ErrorResponse::new(
                    "career_page_url is not a valid absolute URL",
                    "INVALID_URL",
                )
                .with_suggestions(vec![
                    "Include the scheme, e.g. https://example.com/careers".to_string()
                ]),
            ),
        ));
    }

    let company = store
        .companies()
        .create(
            request.name.trim(),
            &request.career_page_url,
            request.is_active.unwrap_or(true),
        )
        .await
        .map_err(|e| {
            error!("Failed to create company: {e:#}");
            Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Failed to create company", "DATABASE_ERROR")),
            )
        })?;

    Ok(Created::new(format!("/api/companies/{}", company.id)).body(Json(company)))
}

pub async fn list_companies_handler(
    store: &State<Store>,
) -> Result<Json<Vec<Company>>, Custom<Json<ErrorResponse>>> {
    store.companies().list().await.map(Json).map_err(|e| {
        error!("Failed to list companies: {e:#}");
        Custom(
            Status::InternalServerError,
            Json(ErrorResponse::new("Failed to list companies", "DATABASE_ERROR")),
        )
    })
}
