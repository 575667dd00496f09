//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::enums::LoanStatus;

/// Loan row as stored in the `loans` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Book fields embedded in a loan listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanBook {
    pub title: String,
    pub author: String,
}

/// Member fields embedded in a loan listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanMember {
    pub name: String,
    pub email: String,
}

/// Loan with the borrowed book and borrowing member for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "books")]
    pub book: Option<LoanBook>,
    #[serde(default, alias = "members")]
    pub member: Option<LoanMember>,
}

/// Check-out request (borrow a book)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckOut {
    pub book_id: Uuid,
    pub member_id: Uuid,
    /// Staff member recording the loan (defaults to the signed-in user)
    pub staff_id: Option<Uuid>,
}

/// Row sent to the backend when a loan is created
#[derive(Debug, Clone, Serialize)]
pub struct NewLoan {
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub borrow_date: DateTime<Utc>,
    pub status: LoanStatus,
}

/// Status change of a loan; `return_date` is always written, null included
#[derive(Debug, Clone, Serialize)]
pub struct LoanStatusPatch {
    pub status: LoanStatus,
    pub return_date: Option<DateTime<Utc>>,
}

/// Loan list parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// Maximum number of loans, most recent first
    pub limit: Option<usize>,
}
