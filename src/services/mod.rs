//! Business logic services

pub mod books;

use std::sync::Arc;

use crate::{config::StorageConfig, repository::BookStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn BookStore>, storage_config: &StorageConfig) -> Self {
        Self {
            books: books::BooksService::new(store, storage_config.strict_writes),
        }
    }
}
