//! In-memory book store

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StorageError};
use crate::models::book::Book;

/// Keeps the collection in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn load(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    async fn save(&self, books: &[Book]) -> Result<(), StorageError> {
        *self.books.write().await = books.to_vec();
        Ok(())
    }
}
