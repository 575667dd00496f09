//! Loan management service
//!
//! Checking a book out and returning it each touch two tables: the loan row
//! and the book's status. The backend offers no transaction across the two
//! writes, so when the second write fails the first one is undone.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{BookStatus, LoanStatus},
        loan::{CheckOut, Loan, LoanDetails},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Loans with book and member, newest first
    pub async fn list(&self, limit: Option<usize>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(limit).await
    }

    /// Lend a book to a member
    pub async fn check_out(&self, request: CheckOut) -> AppResult<Loan> {
        let book = self.repository.books.get_by_id(request.book_id).await?;
        if book.status == BookStatus::Borrowed {
            return Err(AppError::Conflict(format!("Book '{}' is already borrowed", book.title)));
        }
        self.repository.members.get_by_id(request.member_id).await?;

        let loan = self
            .repository
            .loans
            .create(request.book_id, request.member_id, request.staff_id)
            .await?;

        // Only an available book flips to borrowed; a concurrent checkout loses here
        let failure = match self.repository.books.mark_borrowed(request.book_id).await {
            Ok(Some(_)) => None,
            Ok(None) => Some(AppError::Conflict(format!("Book '{}' is already borrowed", book.title))),
            Err(e) => Some(e),
        };
        if let Some(e) = failure {
            tracing::warn!(loan_id = %loan.id, "Book could not be marked borrowed, removing loan: {}", e);
            if let Err(undo) = self.repository.loans.delete(loan.id).await {
                tracing::error!(loan_id = %loan.id, "Could not remove loan after failed checkout: {}", undo);
            }
            return Err(e);
        }

        tracing::info!(loan_id = %loan.id, book_id = %loan.book_id, member_id = %loan.member_id, "Book checked out");
        Ok(loan)
    }

    /// Take a borrowed book back
    pub async fn return_loan(&self, loan_id: Uuid) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        if loan.status == LoanStatus::Returned {
            return Err(AppError::Conflict(format!("Loan {} is already returned", loan_id)));
        }

        let returned = self.repository.loans.mark_returned(loan_id).await?;

        match self
            .repository
            .books
            .set_status(loan.book_id, BookStatus::Available)
            .await
        {
            Ok(_) => {}
            // The book was removed from the collection; the loan still closes
            Err(AppError::NotFound(_)) => {
                tracing::warn!(loan_id = %loan_id, book_id = %loan.book_id, "Returned loan refers to a missing book");
            }
            Err(e) => {
                tracing::warn!(loan_id = %loan_id, "Book status update failed, reopening loan: {}", e);
                if let Err(undo) = self.repository.loans.reopen(loan_id).await {
                    tracing::error!(loan_id = %loan_id, "Could not reopen loan after failed return: {}", undo);
                }
                return Err(e);
            }
        }

        tracing::info!(loan_id = %loan_id, book_id = %loan.book_id, "Book returned");
        Ok(returned)
    }
}
