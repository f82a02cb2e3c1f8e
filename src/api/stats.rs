//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::stats::DashboardStats};

use super::AuthenticatedUser;

/// Dashboard counts and amounts
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    claims.require_staff()?;

    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}
