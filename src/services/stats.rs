//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        enums::{BookStatus, LoanStatus},
        loan::LoanDetails,
    },
    repository::Repository,
};

/// Number of loans shown on the dashboard overview
const RECENT_LOANS: usize = 5;

/// Collection counters
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
pub struct Stats {
    pub total_books: usize,
    pub available_books: usize,
    pub borrowed_books: usize,
    pub total_members: usize,
    pub active_loans: usize,
}

/// Dashboard overview: counters plus the latest loans
#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub stats: Stats,
    pub recent_loans: Vec<LoanDetails>,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Count books, members and open loans; a failed count reads as zero
    pub async fn get_stats(&self) -> Stats {
        let (books, members, loans) = tokio::join!(
            self.repository.books.statuses(),
            self.repository.members.count(),
            self.repository.loans.statuses(),
        );

        let books = books.unwrap_or_else(|e| {
            tracing::warn!("Book counts unavailable: {}", e);
            Vec::new()
        });
        let total_members = members.unwrap_or_else(|e| {
            tracing::warn!("Member count unavailable: {}", e);
            0
        });
        let loans = loans.unwrap_or_else(|e| {
            tracing::warn!("Loan counts unavailable: {}", e);
            Vec::new()
        });

        Stats {
            total_books: books.len(),
            available_books: books.iter().filter(|s| **s == BookStatus::Available).count(),
            borrowed_books: books.iter().filter(|s| **s == BookStatus::Borrowed).count(),
            total_members,
            active_loans: loans.iter().filter(|s| **s == LoanStatus::Borrowed).count(),
        }
    }

    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        let stats = self.get_stats().await;
        let recent_loans = self.repository.loans.list(Some(RECENT_LOANS)).await?;
        Ok(Dashboard { stats, recent_loans })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::backend::MockDataBackend;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_counts_by_status() {
        let mut backend = MockDataBackend::new();
        backend
            .expect_select()
            .withf(|q| q.table_name() == "books")
            .returning(|_| {
                Ok(vec![
                    json!({"status": "available"}),
                    json!({"status": "borrowed"}),
                    json!({"status": "available"}),
                ])
            });
        backend
            .expect_select()
            .withf(|q| q.table_name() == "members")
            .returning(|_| Ok(vec![json!({"id": "a"}), json!({"id": "b"})]));
        backend
            .expect_select()
            .withf(|q| q.table_name() == "loans")
            .returning(|_| Ok(vec![json!({"status": "borrowed"}), json!({"status": "returned"})]));

        let service = StatsService::new(Repository::new(Arc::new(backend)));
        assert_eq!(
            service.get_stats().await,
            Stats {
                total_books: 3,
                available_books: 2,
                borrowed_books: 1,
                total_members: 2,
                active_loans: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_queries_count_as_zero() {
        let mut backend = MockDataBackend::new();
        backend.expect_select().returning(|_| {
            Err(AppError::Backend {
                status: 503,
                message: "unavailable".to_string(),
            })
        });

        let service = StatsService::new(Repository::new(Arc::new(backend)));
        assert_eq!(service.get_stats().await, Stats::default());
    }
}
