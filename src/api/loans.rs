//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::loan::{CheckOut, Loan, LoanDetails, LoanQuery},
};

use super::AuthenticatedUser;

/// List loans with their book and member
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans, newest first", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = user.services(&state).loans.list(query.limit).await?;
    Ok(Json(loans))
}

/// Check a book out to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CheckOut,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "Book already borrowed")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(mut request): Json<CheckOut>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    if request.staff_id.is_none() {
        request.staff_id = user.claims.sub.parse().ok();
    }

    let loan = user.services(&state).loans.check_out(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(loan_id): Path<Uuid>,
) -> AppResult<Json<Loan>> {
    let loan = user.services(&state).loans.return_loan(loan_id).await?;
    Ok(Json(loan))
}
