//! Repository layer: typed access to the backend's tables

pub mod books;
pub mod loans;
pub mod members;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    backend::{DataBackend, Query},
    error::{AppError, AppResult},
};

/// Backend handle that stamps every query with the caller's token
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn DataBackend>,
    bearer: Option<Arc<str>>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend, bearer: None }
    }

    /// Start a query on `table`
    pub fn from(&self, table: &str) -> Query {
        let query = Query::table(table);
        match &self.bearer {
            Some(token) => query.bearer(token),
            None => query,
        }
    }

    pub async fn select<T: DeserializeOwned>(&self, query: &Query) -> AppResult<Vec<T>> {
        decode_rows(self.backend.select(query).await?)
    }

    /// Fetch the single row matching `query`
    pub async fn select_one<T: DeserializeOwned>(&self, query: &Query, what: &str) -> AppResult<T> {
        self.select(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
    }

    pub async fn insert_one<T: DeserializeOwned, R: Serialize>(&self, query: &Query, row: &R) -> AppResult<T> {
        let rows = self.backend.insert(query, serde_json::to_value(row)?).await?;
        decode_rows::<T>(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal(format!("Insert into {} returned no row", query.table_name())))
    }

    pub async fn update<T: DeserializeOwned, P: Serialize>(&self, query: &Query, patch: &P) -> AppResult<Vec<T>> {
        decode_rows(self.backend.update(query, serde_json::to_value(patch)?).await?)
    }

    /// Delete matching rows, returning how many went away
    pub async fn delete(&self, query: &Query) -> AppResult<usize> {
        Ok(self.backend.delete(query).await?.len())
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.backend.ping().await
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> AppResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

/// Main repository struct holding the backend handle
#[derive(Clone)]
pub struct Repository {
    pub gateway: Gateway,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository querying with the anonymous key
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self::with_gateway(Gateway::new(backend))
    }

    fn with_gateway(gateway: Gateway) -> Self {
        Self {
            books: books::BooksRepository::new(gateway.clone()),
            members: members::MembersRepository::new(gateway.clone()),
            loans: loans::LoansRepository::new(gateway.clone()),
            gateway,
        }
    }

    /// Same tables, queried on behalf of the holder of `token`
    pub fn with_bearer(&self, token: &str) -> Self {
        Self::with_gateway(Gateway {
            backend: self.gateway.backend.clone(),
            bearer: Some(Arc::from(token)),
        })
    }
}
