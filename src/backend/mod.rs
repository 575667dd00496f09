//! Access to the hosted backend: row queries and password authentication.
//!
//! [`Query`] mirrors the backend's query builder (`select`, `eq`, `ilike`,
//! `order`, embedded relations). [`DataBackend`] and [`AuthBackend`] are the
//! seams the repository and services talk through; [`rest::RestBackend`]
//! reaches the hosted service over HTTP and [`memory::MemoryBackend`] keeps
//! the tables in process.

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::AppResult,
    models::auth::{AuthUser, Session},
};

pub use memory::MemoryBackend;
pub use rest::RestBackend;

/// Row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// Case-insensitive `LIKE`, `%` matching any run of characters
    Ilike { column: String, pattern: String },
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::Ilike { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Related row pulled into each result through a foreign key
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub table: String,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

/// Table-scoped query, shared by every row operation
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<usize>,
    embeds: Vec<Embed>,
    bearer: Option<String>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
            embeds: Vec::new(),
            bearer: None,
        }
    }

    /// Restrict the returned columns (all columns when never called)
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn ilike(mut self, column: &str, pattern: impl ToString) -> Self {
        self.filters.push(Filter::Ilike {
            column: column.to_string(),
            pattern: pattern.to_string(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn embed(mut self, table: &str, foreign_key: &str, columns: &[&str]) -> Self {
        self.embeds.push(Embed {
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Run the query on behalf of a signed-in user
    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.columns
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Value of the `select` parameter, e.g. `*,books(title,author)`
    pub fn select_clause(&self) -> String {
        let mut parts = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        for embed in &self.embeds {
            parts.push(format!("{}({})", embed.table, embed.columns.join(",")));
        }
        parts.join(",")
    }

    /// URL parameters in the backend's REST dialect
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_clause())];

        for filter in &self.filters {
            let rendered = match filter {
                Filter::Eq { value, .. } => format!("eq.{}", value),
                // `*` is the URL-safe spelling of `%`
                Filter::Ilike { pattern, .. } => format!("ilike.{}", pattern.replace('%', "*")),
            };
            params.push((filter.column().to_string(), rendered));
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

/// Row operations against the backend's tables
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataBackend: Send + Sync {
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>>;
    /// Insert one row or an array of rows; returns the stored rows
    async fn insert(&self, query: &Query, rows: Value) -> AppResult<Vec<Value>>;
    /// Merge `patch` into every matching row; returns the updated rows
    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>>;
    /// Delete matching rows; returns the deleted rows
    async fn delete(&self, query: &Query) -> AppResult<Vec<Value>>;
    async fn ping(&self) -> AppResult<()>;
}

/// Email/password authentication endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
    async fn get_user(&self, access_token: &str) -> AppResult<AuthUser>;
}
