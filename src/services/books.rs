//! Book administration service

use chrono::{Datelike, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, NewBook, UpdateBook},
        enums::BookStatus,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.list(query).await
    }

    /// Add a book to the collection
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;

        let new_book = NewBook {
            title: book.title.trim().to_string(),
            author: book.author.trim().to_string(),
            publisher: book.publisher.filter(|p| !p.trim().is_empty()),
            year: book.year.unwrap_or_else(|| Utc::now().year()),
            category: book.category.trim().to_string(),
            status: book.status.unwrap_or_default(),
        };

        let created = self.repository.books.create(&new_book).await?;
        tracing::info!(book_id = %created.id, title = %created.title, "Book created");
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, patch: UpdateBook) -> AppResult<Book> {
        let trim = |field: Option<String>| field.map(|v| v.trim().to_string());
        let patch = UpdateBook {
            title: trim(patch.title),
            author: trim(patch.author),
            category: trim(patch.category),
            ..patch
        };
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        self.repository.books.update(id, &patch).await
    }

    /// Remove a book; a book out on loan stays until it is returned
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;
        if book.status == BookStatus::Borrowed {
            return Err(AppError::Conflict(format!(
                "Book '{}' is borrowed and cannot be deleted",
                book.title
            )));
        }

        self.repository.books.delete(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::backend::MockDataBackend;

    fn form() -> CreateBook {
        CreateBook {
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            publisher: Some("Ace Books".to_string()),
            year: Some(1969),
            category: "Science Fiction".to_string(),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_issues_one_insert() {
        let mut backend = MockDataBackend::new();
        backend
            .expect_insert()
            .withf(|query, row| {
                query.table_name() == "books"
                    && row["status"] == "available"
                    && row["title"] == "The Left Hand of Darkness"
            })
            .times(1)
            .returning(|_, row| {
                let mut row = row;
                row["id"] = json!("0b5a7c1e-3f0e-4a8e-9c43-1f2d3e4a5b6c");
                row["created_at"] = json!("2026-10-19T10:00:00Z");
                Ok(vec![row])
            });
        backend.expect_select().times(0);

        let service = BooksService::new(Repository::new(Arc::new(backend)));
        let book = service.create(form()).await.unwrap();

        assert_eq!(book.status, BookStatus::Available);
        assert_eq!(book.year, 1969);
        assert_eq!(book.publisher.as_deref(), Some("Ace Books"));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_backend() {
        let mut backend = MockDataBackend::new();
        backend.expect_insert().times(0);

        let service = BooksService::new(Repository::new(Arc::new(backend)));
        let err = service
            .create(CreateBook {
                title: String::new(),
                ..form()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_of_missing_book_is_not_found() {
        let mut backend = MockDataBackend::new();
        backend.expect_update().times(1).returning(|_, _| Ok(Vec::new()));

        let service = BooksService::new(Repository::new(Arc::new(backend)));
        let patch = UpdateBook {
            title: Some("Renamed".to_string()),
            ..UpdateBook::default()
        };

        let err = service.update(Uuid::new_v4(), patch).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_trims_text_fields() {
        let mut backend = MockDataBackend::new();
        backend
            .expect_update()
            .withf(|_, patch| {
                patch["category"] == "Fantasy"
                    && patch["title"] == "Earthsea"
                    && patch.get("author").is_none()
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![json!({
                    "id": "0b5a7c1e-3f0e-4a8e-9c43-1f2d3e4a5b6c",
                    "title": "Earthsea",
                    "author": "Ursula K. Le Guin",
                    "publisher": null,
                    "year": 1968,
                    "category": "Fantasy",
                    "status": "available",
                    "created_at": "2026-10-19T10:00:00Z"
                })])
            });

        let service = BooksService::new(Repository::new(Arc::new(backend)));
        let patch = UpdateBook {
            title: Some(" Earthsea ".to_string()),
            category: Some("Fantasy ".to_string()),
            ..UpdateBook::default()
        };

        let book = service.update(Uuid::new_v4(), patch).await.unwrap();
        assert_eq!(book.category, "Fantasy");
    }

    #[tokio::test]
    async fn test_blank_title_update_is_rejected() {
        let mut backend = MockDataBackend::new();
        backend.expect_update().times(0);

        let service = BooksService::new(Repository::new(Arc::new(backend)));
        let patch = UpdateBook {
            title: Some("   ".to_string()),
            ..UpdateBook::default()
        };

        let err = service.update(Uuid::new_v4(), patch).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_borrowed_book_cannot_be_deleted() {
        let mut backend = MockDataBackend::new();
        backend.expect_select().times(1).returning(|_| {
            Ok(vec![json!({
                "id": "0b5a7c1e-3f0e-4a8e-9c43-1f2d3e4a5b6c",
                "title": "Earthsea",
                "author": "Ursula K. Le Guin",
                "publisher": null,
                "year": 1968,
                "category": "Fantasy",
                "status": "borrowed",
                "created_at": "2026-10-19T10:00:00Z"
            })])
        });
        backend.expect_delete().times(0);

        let service = BooksService::new(Repository::new(Arc::new(backend)));
        let err = service
            .delete("0b5a7c1e-3f0e-4a8e-9c43-1f2d3e4a5b6c".parse().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }
}
