//! Public catalog: browse the whole collection with search and filters

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CatalogQuery},
    repository::Repository,
};

/// One page of the public catalog
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPage {
    /// Books that pass the filters, newest first
    pub books: Vec<Book>,
    /// Number of books that pass the filters
    pub total: usize,
    /// Distinct categories of the whole collection, in first-seen order
    pub categories: Vec<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Fetch every book, then narrow the list in memory
    pub async fn browse(&self, query: &CatalogQuery) -> AppResult<CatalogPage> {
        let books = self.repository.books.list(&BookQuery::default()).await?;
        let categories = distinct_categories(&books);
        let books = filter_books(books, query);

        Ok(CatalogPage {
            total: books.len(),
            books,
            categories,
        })
    }

    /// Book details for the catalog
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }
}

fn distinct_categories(books: &[Book]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for book in books {
        if !categories.contains(&book.category) {
            categories.push(book.category.clone());
        }
    }
    categories
}

/// Apply search term, category and status; empty values do not filter
pub fn filter_books(books: Vec<Book>, query: &CatalogQuery) -> Vec<Book> {
    let search = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let category = query.category.as_deref().filter(|c| !c.is_empty());

    books
        .into_iter()
        .filter(|book| {
            search.as_ref().map_or(true, |term| {
                book.title.to_lowercase().contains(term.as_str())
                    || book.author.to_lowercase().contains(term.as_str())
            })
        })
        .filter(|book| category.map_or(true, |c| book.category == c))
        .filter(|book| query.status.map_or(true, |s| book.status == s))
        .collect()
}
