//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::auth::{AuthUser, Session},
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Session),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Session>> {
    let session = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(session))
}

/// Sign out (revokes the refresh token)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Signed out")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.services.auth.logout(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the signed-in user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = AuthUser),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<AuthUser>> {
    let me = state.services.auth.me(&user.token).await?;
    Ok(Json(me))
}
