//! Dashboard statistics endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    services::stats::{Dashboard, Stats},
};

use super::AuthenticatedUser;

/// Collection counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Book, member and loan counts", body = Stats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Json<Stats> {
    Json(user.services(&state).stats.get_stats().await)
}

/// Dashboard overview
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts and the most recent loans", body = Dashboard)
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = user.services(&state).stats.dashboard().await?;
    Ok(Json(dashboard))
}
