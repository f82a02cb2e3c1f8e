//! Booking API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::booking::{Booking, BookingStatusUpdate, CreateBooking},
};

use super::{quotations::attachment, AuthenticatedUser};

/// List bookings, newest first
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Booking list", body = Vec<Booking>)
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Booking>>> {
    claims.require_staff()?;
    let bookings = state.services.bookings.list().await?;
    Ok(Json(bookings))
}

/// Get booking by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = Booking),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    claims.require_staff()?;
    let booking = state.services.bookings.get_by_id(id).await?;
    Ok(Json(booking))
}

/// Create a booking, standalone or from an accepted quotation
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Missing customer or items, negative deposit", body = crate::error::ErrorResponse),
        (status = 422, description = "Quotation is not accepted", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    claims.require_staff()?;
    let booking = state.services.bookings.create(&data).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Hand out the equipment: Confirmed -> On Rent
#[utoipa::path(
    post,
    path = "/bookings/{id}/start",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Rental started", body = Booking),
        (status = 422, description = "Booking is not confirmed", body = crate::error::ErrorResponse)
    )
)]
pub async fn start_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    claims.require_staff()?;
    let booking = state.services.bookings.start(id).await?;
    Ok(Json(booking))
}

/// Record the return: On Rent -> Completed
#[utoipa::path(
    put,
    path = "/bookings/{id}/complete",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking completed", body = Booking),
        (status = 422, description = "Booking is not on rent", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    claims.require_staff()?;
    let booking = state.services.bookings.complete_return(id).await?;
    Ok(Json(booking))
}

/// Cancel a booking that has not finished
#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 422, description = "Booking already completed or cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    claims.require_staff()?;
    let booking = state.services.bookings.cancel(id).await?;
    Ok(Json(booking))
}

/// Set any status directly (admin only)
#[utoipa::path(
    put,
    path = "/bookings/{id}/status",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = BookingStatusUpdate,
    responses(
        (status = 200, description = "Status written", body = Booking),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn override_booking_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<BookingStatusUpdate>,
) -> AppResult<Json<Booking>> {
    claims.require_admin()?;
    let booking = state
        .services
        .bookings
        .override_status(id, data.status)
        .await?;
    Ok(Json(booking))
}

/// Download the rental agreement as PDF
#[utoipa::path(
    get,
    path = "/bookings/{id}/pdf",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn booking_pdf(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    claims.require_staff()?;
    let document = state.services.documents.booking(id).await?;
    Ok(attachment(document))
}
