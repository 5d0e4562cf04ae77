//! External book catalog search.
//!
//! The catalog is only a collaborator: it answers title and author searches
//! with candidate books, and any failure becomes
//! [`LibraryError::SearchFailed`](crate::LibraryError::SearchFailed).

mod openlibrary;

use std::future::Future;

use serde::{Deserialize, Serialize};
use shelf_engine::NewBook;

use crate::error::Result;

pub use openlibrary::OpenLibraryClient;

/// A search hit from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBook {
    pub title: String,
    pub authors: Vec<String>,
    pub isbns: Vec<String>,
    /// Catalog-specific work key
    pub key: Option<String>,
    pub cover_id: Option<i64>,
    pub first_publish_year: Option<i32>,
}

impl CatalogBook {
    /// First listed author.
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// First listed ISBN, or empty.
    pub fn primary_isbn(&self) -> &str {
        self.isbns.first().map_or("", String::as_str)
    }

    /// The record to store when the user adds this hit. New books start
    /// unread.
    pub fn to_new_book(&self) -> shelf_engine::error::Result<NewBook> {
        let book = NewBook::new(
            self.primary_isbn(),
            self.title.clone(),
            self.primary_author().unwrap_or_default(),
        );
        book.validate()?;
        Ok(book)
    }
}

/// A searchable book catalog.
pub trait Catalog: Send + Sync {
    fn search_by_title(&self, text: &str) -> impl Future<Output = Result<Vec<CatalogBook>>> + Send;

    fn search_by_author(&self, text: &str) -> impl Future<Output = Result<Vec<CatalogBook>>> + Send;
}

/// Search by title and by author at once.
///
/// Text shorter than `min_chars` (after trimming) yields no results without
/// contacting the catalog. Otherwise title hits come first, followed by
/// author hits. The two lists are concatenated as-is, so a book matching on
/// both appears twice.
pub async fn search<C: Catalog>(
    catalog: &C,
    text: &str,
    min_chars: usize,
) -> Result<Vec<CatalogBook>> {
    let text = text.trim();
    if text.chars().count() < min_chars {
        return Ok(Vec::new());
    }

    let (mut books, by_author) =
        futures::future::try_join(catalog.search_by_title(text), catalog.search_by_author(text))
            .await?;

    tracing::debug!(
        query = text,
        by_title = books.len(),
        by_author = by_author.len(),
        "Catalog search finished"
    );

    books.extend(by_author);
    Ok(books)
}
