//! Book records tracked by the store.

use crate::{error::Result, BookId, Error};
use serde::{Deserialize, Serialize};

/// A book that has not been stored yet.
///
/// This is what callers hand to the store on insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    /// ISBN, may be empty
    #[serde(default)]
    pub isbn: String,
    /// Title, required
    pub title: String,
    /// Author, required
    pub author: String,
    /// Whether the book has been read
    #[serde(default)]
    pub read: bool,
}

impl NewBook {
    /// Create an unread book.
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            read: false,
        }
    }

    /// Set the read flag.
    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.author)
    }

    /// Attach a store-assigned id.
    pub fn with_id(self, id: BookId) -> Book {
        Book {
            id,
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            read: self.read,
        }
    }
}

/// A stored book.
///
/// Equality is structural: two books are equal only when the id and every
/// field match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier, never reused
    pub id: BookId,
    /// ISBN, may be empty
    pub isbn: String,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// Whether the book has been read
    pub read: bool,
}

impl Book {
    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.author)
    }

    /// Copy of this book with the read flag replaced.
    pub fn with_read(&self, read: bool) -> Self {
        Self {
            read,
            ..self.clone()
        }
    }

    /// Drop the id, e.g. to compare content across stores.
    pub fn without_id(&self) -> NewBook {
        NewBook {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            read: self.read,
        }
    }
}

fn validate_fields(title: &str, author: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::MissingRequiredField("title".into()));
    }
    if author.trim().is_empty() {
        return Err(Error::MissingRequiredField("author".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_book_defaults_to_unread() {
        let book = NewBook::new("9780261103573", "The Fellowship of the Ring", "J.R.R. Tolkien");
        assert!(!book.read);
        assert!(book.validate().is_ok());
    }

    #[test]
    fn with_id_keeps_fields() {
        let book = NewBook::new("", "Dune", "Frank Herbert").read(true).with_id(7);
        assert_eq!(book.id, 7);
        assert_eq!(book.isbn, "");
        assert_eq!(book.title, "Dune");
        assert!(book.read);
    }

    #[test]
    fn blank_title_rejected() {
        let book = NewBook::new("", "   ", "Someone");
        assert_eq!(
            book.validate(),
            Err(Error::MissingRequiredField("title".into()))
        );
    }

    #[test]
    fn blank_author_rejected() {
        let book = NewBook::new("", "Untitled", "").with_id(1);
        assert_eq!(
            book.validate(),
            Err(Error::MissingRequiredField("author".into()))
        );
    }

    #[test]
    fn with_read_changes_only_flag() {
        let book = NewBook::new("1", "Emma", "Jane Austen").with_id(3);
        let read = book.with_read(true);

        assert_eq!(read.id, book.id);
        assert_ne!(read, book);
        assert_eq!(read.without_id(), book.without_id().read(true));
    }

    #[test]
    fn serialization_roundtrip() {
        let book = NewBook::new("123", "Emma", "Jane Austen").with_id(42);
        let json = serde_json::to_string(&book).unwrap();
        let parsed: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(book, parsed);
    }

    #[test]
    fn new_book_missing_optional_fields() {
        let parsed: NewBook =
            serde_json::from_str(r#"{"title": "Emma", "author": "Jane Austen"}"#).unwrap();
        assert_eq!(parsed.isbn, "");
        assert!(!parsed.read);
    }
}
