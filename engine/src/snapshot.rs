//! Immutable query results.
//!
//! A snapshot is the full, ordered result of one query at one point in time.
//! Mutating the store never edits a snapshot; it produces a new one.

use crate::{Book, BookId};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered, immutable list of books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    books: Vec<Book>,
}

impl Snapshot {
    /// Wrap an already ordered list.
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.books.iter()
    }

    /// Book at a position.
    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    /// Position of a book by id.
    pub fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    /// Book by id.
    pub fn find(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn as_slice(&self) -> &[Book] {
        &self.books
    }

    pub fn into_vec(self) -> Vec<Book> {
        self.books
    }
}

impl Index<usize> for Snapshot {
    type Output = Book;

    fn index(&self, index: usize) -> &Book {
        &self.books[index]
    }
}

impl From<Vec<Book>> for Snapshot {
    fn from(books: Vec<Book>) -> Self {
        Self::new(books)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Book;
    type IntoIter = std::slice::Iter<'a, Book>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.iter()
    }
}

impl IntoIterator for Snapshot {
    type Item = Book;
    type IntoIter = std::vec::IntoIter<Book>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewBook;

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![
            NewBook::new("", "Emma", "Jane Austen").with_id(4),
            NewBook::new("", "Dune", "Frank Herbert").with_id(9),
        ])
    }

    #[test]
    fn lookup_by_id() {
        let snapshot = snapshot();
        assert_eq!(snapshot.position(9), Some(1));
        assert_eq!(snapshot.find(4).map(|b| b.title.as_str()), Some("Emma"));
        assert_eq!(snapshot.position(5), None);
        assert_eq!(snapshot[0].id, 4);
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert_eq!(snapshot.get(0), None);
    }

    #[test]
    fn serializes_as_plain_list() {
        let snapshot = snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.starts_with('['));

        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
