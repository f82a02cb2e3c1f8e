//! Settings endpoints

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::settings::{Settings, UpdateSettings},
};

use super::AuthenticatedUser;

/// Get current settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current settings", body = Settings)
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Settings>> {
    claims.require_staff()?;

    let settings = state.services.settings.get().await?;
    Ok(Json(settings))
}

/// Update settings
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings updated", body = Settings),
        (status = 400, description = "Invalid value", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn update_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateSettings>,
) -> AppResult<Json<Settings>> {
    claims.require_admin()?;

    let settings = state.services.settings.update(&request).await?;
    Ok(Json(settings))
}

/// Upload the company logo (multipart, field `logo`)
#[utoipa::path(
    post,
    path = "/settings/logo",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body(content = String, content_type = "multipart/form-data", description = "Image file in field `logo`"),
    responses(
        (status = 200, description = "Logo stored", body = Settings),
        (status = 400, description = "Missing, empty, oversized or non-image file", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn upload_logo(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<Settings>> {
    claims.require_admin()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None if field.name() == Some("logo") => String::new(),
            None => continue,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read upload: {}", e)))?;

        let settings = state
            .services
            .settings
            .upload_logo(&file_name, &bytes)
            .await?;
        return Ok(Json(settings));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}
