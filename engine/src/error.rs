//! Error types for the Shelf engine.

use thiserror::Error;

/// All possible errors from the Shelf engine.
///
/// The engine only validates records; storage and network failures live in
/// the library crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingRequiredField(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
