//! Books repository for backend operations

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, NewBook, UpdateBook},
        enums::BookStatus,
    },
};

use super::Gateway;

const TABLE: &str = "books";

#[derive(Clone)]
pub struct BooksRepository {
    gateway: Gateway,
}

impl BooksRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// List books, newest first, narrowed by the optional filters
    pub async fn list(&self, filter: &BookQuery) -> AppResult<Vec<Book>> {
        let mut query = self.gateway.from(TABLE);

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.eq("category", category);
        }
        if let Some(author) = filter.author.as_deref().filter(|a| !a.is_empty()) {
            query = query.ilike("author", format!("%{}%", author));
        }
        if let Some(status) = filter.status {
            query = query.eq("status", status.as_str());
        }

        self.gateway.select(&query.order("created_at", false)).await
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let query = self.gateway.from(TABLE).eq("id", id);
        self.gateway
            .select_one(&query, &format!("Book with id {}", id))
            .await
    }

    /// Insert a book and return the stored row
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        self.gateway.insert_one(&self.gateway.from(TABLE), book).await
    }

    /// Apply a partial update
    pub async fn update(&self, id: Uuid, patch: &UpdateBook) -> AppResult<Book> {
        let query = self.gateway.from(TABLE).eq("id", id);
        self.gateway
            .update::<Book, _>(&query, patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn set_status(&self, id: Uuid, status: BookStatus) -> AppResult<Book> {
        self.update(
            id,
            &UpdateBook {
                status: Some(status),
                ..UpdateBook::default()
            },
        )
        .await
    }

    /// Flip an available book to borrowed; `None` when it was not available
    pub async fn mark_borrowed(&self, id: Uuid) -> AppResult<Option<Book>> {
        let query = self
            .gateway
            .from(TABLE)
            .eq("id", id)
            .eq("status", BookStatus::Available.as_str());
        let patch = UpdateBook {
            status: Some(BookStatus::Borrowed),
            ..UpdateBook::default()
        };
        Ok(self
            .gateway
            .update::<Book, _>(&query, &patch)
            .await?
            .into_iter()
            .next())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let deleted = self.gateway.delete(&self.gateway.from(TABLE).eq("id", id)).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Status column of every book, for counting
    pub async fn statuses(&self) -> AppResult<Vec<BookStatus>> {
        #[derive(serde::Deserialize)]
        struct Row {
            status: BookStatus,
        }

        let query = self.gateway.from(TABLE).columns(&["status"]);
        let rows: Vec<Row> = self.gateway.select(&query).await?;
        Ok(rows.into_iter().map(|r| r.status).collect())
    }
}
