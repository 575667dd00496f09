//! API handlers for Athenaeum REST endpoints

pub mod auth;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod stats;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post, put},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::auth::Claims, services::Services, AppState};

/// Extractor for a user signed in through the backend
pub struct AuthenticatedUser {
    pub claims: Claims,
    /// Raw access token, forwarded to the backend on every query
    pub token: String,
}

impl AuthenticatedUser {
    /// Services acting on behalf of this user
    pub fn services(&self, state: &AppState) -> Services {
        state.services.as_user(&self.token)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

        // Tokens are signed by the backend with the project's JWT secret
        let auth = &state.config.auth;
        let claims = Claims::from_token(bearer.token(), &auth.jwt_secret, &auth.jwt_audience)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser {
            claims,
            token: bearer.token().to_string(),
        })
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Public catalog
        .route("/catalog", get(catalog::browse))
        .route("/catalog/:id", get(catalog::get_book))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", put(books::update_book).delete(books::delete_book))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        // Dashboard
        .route("/stats", get(stats::get_stats))
        .route("/dashboard", get(stats::get_dashboard))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
