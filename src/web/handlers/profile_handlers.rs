// src/web/handlers/profile_handlers.rs
use crate::core::database::{Store, UserProfile};
use crate::web::types::{ErrorResponse, ProfileRequest};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn get_profile_handler(
    store: &State<Store>,
) -> Result<Json<UserProfile>, Custom<Json<ErrorResponse>>> {
    let profile = store.profile().get().await.map_err(|e| {
        error!("Failed to load profile: {e:#}");
        Custom(
            Status::InternalServerError,
            Json(ErrorResponse::new("Failed to load profile", "DATABASE_ERROR")),
        )
    })?;

    profile.map(Json).ok_or_else(|| {
        Custom(
            Status::NotFound,
            Json(
                ErrorResponse::new("No profile has been saved yet", "PROFILE_NOT_FOUND")
                    .with_suggestions(vec!["Create one with PUT /api/profile".to_string()]),
            ),
        )
    })
}

pub async fn put_profile_handler(
    request: Json<ProfileRequest>,
    store: &State<Store>,
) -> Result<Json<UserProfile>, Custom<Json<ErrorResponse>>> {
    let request = request.into_inner();

    let profile = store
        .profile()
        .upsert(&request.name, &request.resume_text, &request.preferences)
        .await
        .map_err(|e| {
            error!("Failed to save profile: {e:#}");
            Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Failed to save profile", "DATABASE_ERROR")),
            )
        })?;

    info!(name = %profile.name, "Profile saved");
    Ok(Json(profile))
}
