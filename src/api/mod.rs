//! API handlers for RentFlow REST endpoints

pub mod auth;
pub mod bookings;
pub mod customers;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod quotations;
pub mod settings;
pub mod stats;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, services::uploads::PUBLIC_PREFIX, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Multipart framing needs headroom over the file itself
    let logo_limit = state.config.uploads.max_bytes + 64 * 1024;
    let uploads_dir = state.config.uploads.dir.clone();

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", put(auth::change_password))
        .route("/auth/register", post(auth::register))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Customers
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        // Quotations
        .route(
            "/quotations",
            get(quotations::list_quotations).post(quotations::create_quotation),
        )
        .route("/quotations/:id", get(quotations::get_quotation))
        .route("/quotations/:id/send", post(quotations::send_quotation))
        .route("/quotations/:id/accept", post(quotations::accept_quotation))
        .route("/quotations/:id/decline", post(quotations::decline_quotation))
        .route("/quotations/:id/pdf", get(quotations::quotation_pdf))
        // Bookings
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/start", post(bookings::start_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/bookings/:id/complete", put(bookings::complete_booking))
        .route("/bookings/:id/status", put(bookings::override_booking_status))
        .route("/bookings/:id/pdf", get(bookings::booking_pdf))
        // Statistics
        .route("/stats", get(stats::get_stats))
        // Settings
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/settings/logo",
            post(settings::upload_logo).layer(DefaultBodyLimit::max(logo_limit)),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(uploads_dir))
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
