//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, catalog, health, loans, members, stats};

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athenaeum API",
        version = "0.3.0",
        description = "Library Management Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Catalog
        catalog::browse,
        catalog::get_book,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Members
        members::list_members,
        members::create_member,
        // Loans
        loans::list_loans,
        loans::create_loan,
        loans::return_loan,
        // Stats
        stats::get_stats,
        stats::get_dashboard,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            crate::models::auth::Session,
            crate::models::auth::AuthUser,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::enums::BookStatus,
            crate::services::catalog::CatalogPage,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanBook,
            crate::models::loan::LoanMember,
            crate::models::loan::CheckOut,
            crate::models::enums::LoanStatus,
            // Stats
            crate::services::stats::Stats,
            crate::services::stats::Dashboard,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Public catalog"),
        (name = "books", description = "Book management"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Loan management"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/catalog", "/books/{id}", "/loans/{id}/return", "/dashboard"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
