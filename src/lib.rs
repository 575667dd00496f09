//! Athenaeum Library Management Service
//!
//! A REST JSON API for browsing a library catalog and administering its
//! books, members and loans. Tables and authentication live in a hosted
//! backend-as-a-service; this crate forwards queries to it.

use std::sync::Arc;

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use backend::{AuthBackend, DataBackend, MemoryBackend, RestBackend};
use config::BackendMode;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire the configured backend into repositories and services
    pub fn build(config: AppConfig) -> AppResult<Self> {
        let (data, auth): (Arc<dyn DataBackend>, Arc<dyn AuthBackend>) = match config.backend.mode {
            BackendMode::Rest => {
                let backend = Arc::new(RestBackend::new(&config.backend)?);
                (backend.clone() as Arc<dyn DataBackend>, backend as Arc<dyn AuthBackend>)
            }
            BackendMode::Memory => {
                let backend = Arc::new(MemoryBackend::new(
                    &config.backend.seed_users,
                    config.auth.clone(),
                ));
                (backend.clone() as Arc<dyn DataBackend>, backend as Arc<dyn AuthBackend>)
            }
        };

        let repository = repository::Repository::new(data);
        let services = services::Services::new(repository, auth);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
