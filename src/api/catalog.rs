//! Public catalog endpoints (no sign-in required)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, CatalogQuery},
    services::catalog::CatalogPage,
};

/// Browse the catalog
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Filtered books and available categories", body = CatalogPage)
    )
)]
pub async fn browse(
    State(state): State<crate::AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<CatalogPage>> {
    let page = state.services.catalog.browse(&query).await?;
    Ok(Json(page))
}

/// Get book details
#[utoipa::path(
    get,
    path = "/catalog/{id}",
    tag = "catalog",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}
