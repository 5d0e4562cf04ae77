//! Queries over the book collection.
//!
//! A query is a filter plus an ordering rule. It can be evaluated in memory
//! with [`Query::select`]; the library renders the same query to SQL and the
//! two must agree.

use crate::{Book, Snapshot};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which books a query keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Read,
    Unread,
}

/// How matching books are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// By id, which is the order books were inserted in
    #[default]
    Insertion,
    /// By title (ASCII case-insensitive), then id
    Title,
    /// By author (ASCII case-insensitive), then id
    Author,
}

/// A filter and an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub filter: Filter,
    pub order: Order,
}

impl Query {
    /// Every book, in insertion order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Books marked read.
    pub fn read() -> Self {
        Self {
            filter: Filter::Read,
            order: Order::Insertion,
        }
    }

    /// Books not yet read.
    pub fn unread() -> Self {
        Self {
            filter: Filter::Unread,
            order: Order::Insertion,
        }
    }

    /// Replace the ordering.
    pub fn ordered_by(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Whether a book passes the filter.
    pub fn matches(&self, book: &Book) -> bool {
        match self.filter {
            Filter::All => true,
            Filter::Read => book.read,
            Filter::Unread => !book.read,
        }
    }

    /// Compare two books under this query's ordering.
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let by_key = match self.order {
            Order::Insertion => Ordering::Equal,
            Order::Title => fold_case(&a.title).cmp(&fold_case(&b.title)),
            Order::Author => fold_case(&a.author).cmp(&fold_case(&b.author)),
        };
        by_key.then(a.id.cmp(&b.id))
    }

    /// Evaluate the query against an in-memory list.
    pub fn select<'a>(&self, books: impl IntoIterator<Item = &'a Book>) -> Snapshot {
        let mut matched: Vec<Book> = books
            .into_iter()
            .filter(|b| self.matches(b))
            .cloned()
            .collect();
        matched.sort_by(|a, b| self.compare(a, b));
        Snapshot::new(matched)
    }
}

fn fold_case(s: &str) -> String {
    s.to_ascii_lowercase()
}
