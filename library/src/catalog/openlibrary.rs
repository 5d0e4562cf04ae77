//! Open Library search client.
//!
//! `GET {base}/search.json?title=...` and `?author=...`, answering
//! `{"docs": [...], "num_found": N, "start": 0}`.

use std::time::Duration;

use serde::Deserialize;

use super::{Catalog, CatalogBook};
use crate::config::Config;
use crate::error::{LibraryError, Result};

/// HTTP client for the Open Library search API.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
    #[serde(default, alias = "numFound")]
    num_found: u64,
    #[serde(default)]
    start: u64,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    isbn: Vec<String>,
    key: Option<String>,
    cover_i: Option<i64>,
    first_publish_year: Option<i32>,
}

impl From<SearchDoc> for CatalogBook {
    fn from(doc: SearchDoc) -> Self {
        CatalogBook {
            title: doc.title,
            authors: doc.author_name,
            isbns: doc.isbn,
            key: doc.key,
            cover_id: doc.cover_i,
            first_publish_year: doc.first_publish_year,
        }
    }
}

impl OpenLibraryClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(search_failed)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.catalog_base_url.clone())
    }

    async fn search(&self, field: &str, text: &str) -> Result<Vec<CatalogBook>> {
        let url = format!("{}/search.json", self.base_url);
        tracing::debug!(field, text, "Querying catalog");

        let response = self
            .http
            .get(&url)
            .query(&[(field, text)])
            .send()
            .await
            .map_err(search_failed)?
            .error_for_status()
            .map_err(search_failed)?;

        let body: SearchResponse = response.json().await.map_err(search_failed)?;
        tracing::debug!(
            field,
            num_found = body.num_found,
            start = body.start,
            returned = body.docs.len(),
            "Catalog responded"
        );

        Ok(body.docs.into_iter().map(CatalogBook::from).collect())
    }
}

impl Catalog for OpenLibraryClient {
    async fn search_by_title(&self, text: &str) -> Result<Vec<CatalogBook>> {
        self.search("title", text).await
    }

    async fn search_by_author(&self, text: &str) -> Result<Vec<CatalogBook>> {
        self.search("author", text).await
    }
}

fn search_failed(err: reqwest::Error) -> LibraryError {
    tracing::warn!("Catalog error: {:?}", err);
    LibraryError::SearchFailed(err.to_string())
}
