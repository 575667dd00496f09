//! Loans repository for backend operations

use chrono::Utc;
use uuid::Uuid;

use crate::{
    backend::Query,
    error::{AppError, AppResult},
    models::{
        enums::LoanStatus,
        loan::{Loan, LoanDetails, LoanStatusPatch, NewLoan},
    },
};

use super::Gateway;

const TABLE: &str = "loans";

#[derive(Clone)]
pub struct LoansRepository {
    gateway: Gateway,
}

impl LoansRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    fn by_id(&self, id: Uuid) -> Query {
        self.gateway.from(TABLE).eq("id", id)
    }

    /// Loans with their book and member, newest first
    pub async fn list(&self, limit: Option<usize>) -> AppResult<Vec<LoanDetails>> {
        let mut query = self
            .gateway
            .from(TABLE)
            .embed("books", "book_id", &["title", "author"])
            .embed("members", "member_id", &["name", "email"])
            .order("created_at", false);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        self.gateway.select(&query).await
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Loan> {
        self.gateway
            .select_one(&self.by_id(id), &format!("Loan with id {}", id))
            .await
    }

    /// Record a new loan, borrowed as of now
    pub async fn create(&self, book_id: Uuid, member_id: Uuid, staff_id: Option<Uuid>) -> AppResult<Loan> {
        let loan = NewLoan {
            book_id,
            member_id,
            staff_id,
            borrow_date: Utc::now(),
            status: LoanStatus::Borrowed,
        };
        self.gateway.insert_one(&self.gateway.from(TABLE), &loan).await
    }

    async fn set_status(&self, id: Uuid, patch: LoanStatusPatch) -> AppResult<Loan> {
        self.gateway
            .update::<Loan, _>(&self.by_id(id), &patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Close a loan as of now
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<Loan> {
        self.set_status(
            id,
            LoanStatusPatch {
                status: LoanStatus::Returned,
                return_date: Some(Utc::now()),
            },
        )
        .await
    }

    /// Undo [`mark_returned`](Self::mark_returned)
    pub async fn reopen(&self, id: Uuid) -> AppResult<Loan> {
        self.set_status(
            id,
            LoanStatusPatch {
                status: LoanStatus::Borrowed,
                return_date: None,
            },
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.gateway.delete(&self.by_id(id)).await?;
        Ok(())
    }

    /// Status column of every loan, for counting
    pub async fn statuses(&self) -> AppResult<Vec<LoanStatus>> {
        #[derive(serde::Deserialize)]
        struct Row {
            status: LoanStatus,
        }

        let query = self.gateway.from(TABLE).columns(&["status"]);
        let rows: Vec<Row> = self.gateway.select(&query).await?;
        Ok(rows.into_iter().map(|r| r.status).collect())
    }
}
