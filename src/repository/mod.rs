//! Storage layer for the book collection

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::book::Book;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whole-collection storage.
///
/// `load` never fails: an unreadable collection is reported as empty.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Read the full collection in insertion order
    async fn load(&self) -> Vec<Book>;
    /// Overwrite the full collection
    async fn save(&self, books: &[Book]) -> Result<(), StorageError>;
}
