//! JSON file backed book store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{BookStore, StorageError};
use crate::models::book::Book;

/// Stores the whole collection as a pretty-printed JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BookStore for JsonFileStore {
    async fn load(&self) -> Vec<Book> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Books file {:?} does not exist yet", self.path);
                return Vec::new();
            }
            Err(e) => {
                tracing::error!("Failed to read books file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        if contents.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str(&contents) {
            Ok(books) => books,
            Err(e) => {
                tracing::error!("Failed to parse books file {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    async fn save(&self, books: &[Book]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(books).map_err(|e| {
            tracing::error!("Failed to serialize {} books: {}", books.len(), e);
            e
        })?;
        fs::write(&self.path, json).await.map_err(|e| {
            tracing::error!("Failed to write books file {:?}: {}", self.path, e);
            e
        })?;
        tracing::debug!("Wrote {} books to {:?}", books.len(), self.path);
        Ok(())
    }
}
