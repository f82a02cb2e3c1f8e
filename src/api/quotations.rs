//! Quotation API endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppResult,
    models::quotation::{CreateQuotation, Quotation},
    services::documents::RenderedDocument,
};

use super::AuthenticatedUser;

/// List quotations, newest first
#[utoipa::path(
    get,
    path = "/quotations",
    tag = "quotations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quotation list", body = Vec<Quotation>)
    )
)]
pub async fn list_quotations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Quotation>>> {
    claims.require_staff()?;
    let quotations = state.services.quotations.list().await?;
    Ok(Json(quotations))
}

/// Get quotation by ID
#[utoipa::path(
    get,
    path = "/quotations/{id}",
    tag = "quotations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Quotation details", body = Quotation),
        (status = 404, description = "Quotation not found")
    )
)]
pub async fn get_quotation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Quotation>> {
    claims.require_staff()?;
    let quotation = state.services.quotations.get_by_id(id).await?;
    Ok(Json(quotation))
}

/// Create a Draft quotation priced from current equipment rates
#[utoipa::path(
    post,
    path = "/quotations",
    tag = "quotations",
    security(("bearer_auth" = [])),
    request_body = CreateQuotation,
    responses(
        (status = 201, description = "Quotation created", body = Quotation),
        (status = 400, description = "No items or invalid quantity", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown customer or equipment", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_quotation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateQuotation>,
) -> AppResult<(StatusCode, Json<Quotation>)> {
    claims.require_staff()?;
    let quotation = state.services.quotations.create(&data).await?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

/// Mark a Draft quotation as sent
#[utoipa::path(
    post,
    path = "/quotations/{id}/send",
    tag = "quotations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Quotation sent", body = Quotation),
        (status = 422, description = "Quotation is not a draft", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_quotation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Quotation>> {
    claims.require_staff()?;
    let quotation = state.services.quotations.send(id).await?;
    Ok(Json(quotation))
}

/// Accept a quotation
#[utoipa::path(
    post,
    path = "/quotations/{id}/accept",
    tag = "quotations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Quotation accepted", body = Quotation),
        (status = 422, description = "Quotation already accepted or declined", body = crate::error::ErrorResponse)
    )
)]
pub async fn accept_quotation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Quotation>> {
    claims.require_staff()?;
    let quotation = state.services.quotations.accept(id).await?;
    Ok(Json(quotation))
}

/// Decline a quotation
#[utoipa::path(
    post,
    path = "/quotations/{id}/decline",
    tag = "quotations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Quotation declined", body = Quotation),
        (status = 422, description = "Quotation already accepted or declined", body = crate::error::ErrorResponse)
    )
)]
pub async fn decline_quotation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Quotation>> {
    claims.require_staff()?;
    let quotation = state.services.quotations.decline(id).await?;
    Ok(Json(quotation))
}

/// Download a quotation as PDF
#[utoipa::path(
    get,
    path = "/quotations/{id}/pdf",
    tag = "quotations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 404, description = "Quotation not found")
    )
)]
pub async fn quotation_pdf(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    claims.require_staff()?;
    let document = state.services.documents.quotation(id).await?;
    Ok(attachment(document))
}

/// Serve a rendered document as a file download
pub(crate) fn attachment(document: RenderedDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.bytes,
    )
        .into_response()
}
