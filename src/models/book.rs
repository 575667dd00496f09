//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, NoneAsEmptyString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::BookStatus;

/// Book row as stored in the `books` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: i32,
    pub category: String,
    pub status: BookStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Book form submitted by the admin dashboard
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    /// Publication year (defaults to the current year)
    #[validate(range(min = 0, max = 9999, message = "Year must be between 0 and 9999"))]
    pub year: Option<i32>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    /// Initial status (defaults to available)
    pub status: Option<BookStatus>,
}

/// Row sent to the backend on insert
#[derive(Debug, Clone, Serialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: i32,
    pub category: String,
    pub status: BookStatus,
}

/// Partial update of a book; absent fields are left untouched
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub publisher: Option<String>,
    #[validate(range(min = 0, max = 9999, message = "Year must be between 0 and 9999"))]
    pub year: Option<i32>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub status: Option<BookStatus>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.year.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }
}

/// Server-side filters for the admin book list
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact category
    pub category: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    /// `available` or `borrowed`; empty means any
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub status: Option<BookStatus>,
}

/// Filters for the public catalog, applied to the fetched list
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Case-insensitive substring of title or author
    pub search: Option<String>,
    /// Exact, case-sensitive category
    pub category: Option<String>,
    /// `available` or `borrowed`; empty means any
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub status: Option<BookStatus>,
}
