//! Configuration management.

use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://shelf.db";
const DEFAULT_CATALOG_URL: &str = "https://openlibrary.org";

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite connection URL (`sqlite://path` or `sqlite::memory:`)
    pub database_url: String,
    /// Maximum pooled connections for file databases
    pub max_connections: u32,
    /// Base URL of the catalog search service
    pub catalog_base_url: String,
    /// Search text shorter than this returns no results
    pub search_min_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            catalog_base_url: DEFAULT_CATALOG_URL.to_string(),
            search_min_chars: 2,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::UnsupportedDatabaseUrl(database_url));
        }

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidMaxConnections(v))?,
            None => defaults.max_connections,
        };

        let catalog_base_url = lookup("CATALOG_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.catalog_base_url);

        let search_min_chars = match lookup("SEARCH_MIN_CHARS") {
            Some(v) => v.parse::<usize>().map_err(|_| ConfigError::InvalidSearchMinChars(v))?,
            None => defaults.search_min_chars,
        };

        Ok(Self {
            database_url,
            max_connections,
            catalog_base_url,
            search_min_chars,
        })
    }

    /// In-memory database, default everything else.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL must be a sqlite URL, got {0}")]
    UnsupportedDatabaseUrl(String),

    #[error("Invalid DATABASE_MAX_CONNECTIONS value: {0}")]
    InvalidMaxConnections(String),

    #[error("Invalid SEARCH_MIN_CHARS value: {0}")]
    InvalidSearchMinChars(String),
}
