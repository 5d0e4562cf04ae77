//! Unified error handling for the library.

use crate::config::ConfigError;
use shelf_engine::BookId;

/// Library error type.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Book not found: {0}")]
    NotFound(BookId),

    #[error("Storage fault: {0}")]
    StorageFault(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid book: {0}")]
    Invalid(#[from] shelf_engine::Error),

    #[error("Catalog search failed: {0}")]
    SearchFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LibraryError {
    /// Whether the underlying storage medium failed.
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, Self::StorageFault(_) | Self::Migration(_))
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
