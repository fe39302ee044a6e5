//! Bookshelf
//!
//! A small REST JSON API for managing a collection of books persisted in a
//! single JSON file.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state over the given store
    pub fn new(config: AppConfig, store: Arc<dyn repository::BookStore>) -> Self {
        let services = services::Services::new(store, &config.storage);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
