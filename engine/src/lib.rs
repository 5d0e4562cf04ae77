//! # Shelf Engine
//!
//! Pure logic behind a live book list: the records, the queries that select
//! them, the snapshots a query produces, and the reconciliation that turns two
//! snapshots into an incremental edit script.
//!
//! ## Design Principles
//!
//! - **No IO**: persistence and change delivery live in `shelf-library`
//! - **Deterministic**: the same two snapshots always produce the same script
//! - **Stateless diffing**: the caller owns the previously rendered snapshot
//!
//! ## Core Concepts
//!
//! ### Books
//!
//! A [`Book`] has a store-assigned id, an ISBN (possibly empty), a title, an
//! author and a read flag. [`NewBook`] is the same record before the store has
//! assigned an id.
//!
//! ### Queries and Snapshots
//!
//! A [`Query`] is a [`Filter`] plus an [`Order`]. Evaluating it yields a
//! [`Snapshot`], an immutable ordered list of books.
//!
//! ### Reconciliation
//!
//! [`diff`] compares two snapshots by book id and emits an [`EditScript`] of
//! removals, moves, insertions and content updates.
//!
//! ## Quick Start
//!
//! ```rust
//! use shelf_engine::{diff, Edit, NewBook, Query};
//!
//! let dune = NewBook::new("", "Dune", "Frank Herbert").with_id(1);
//! let emma = NewBook::new("", "Emma", "Jane Austen").with_id(2);
//!
//! let before = Query::unread().select(&[dune.clone(), emma.clone()]);
//! let after = Query::unread().select(&[dune.with_read(true), emma]);
//!
//! let script = diff(before.as_slice(), after.as_slice());
//! assert_eq!(script.edits(), &[Edit::Remove { index: 0, id: 1 }]);
//! ```

pub mod error;
pub mod query;
pub mod reconcile;
pub mod record;
pub mod snapshot;

// Re-export main types at crate root
pub use error::Error;
pub use query::{Filter, Order, Query};
pub use reconcile::{diff, Edit, EditScript};
pub use record::{Book, NewBook};
pub use snapshot::Snapshot;

/// Store-assigned book identifier.
pub type BookId = i64;
