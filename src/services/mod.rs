//! Business logic services

pub mod auth;
pub mod books;
pub mod catalog;
pub mod loans;
pub mod members;
pub mod stats;

use std::sync::Arc;

use crate::{backend::AuthBackend, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    repository: Repository,
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository and auth endpoint
    pub fn new(repository: Repository, auth_backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            auth: auth::AuthService::new(auth_backend),
            catalog: catalog::CatalogService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Services whose backend calls carry the signed-in user's token
    pub fn as_user(&self, token: &str) -> Self {
        Self::new(self.repository.with_bearer(token), self.auth.backend())
    }

    /// Check that the backend answers
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.gateway.ping().await
    }
}
