//! Shelf Library - a durable, observable personal book collection.
//!
//! The [`Store`] persists books in SQLite and lets any number of readers
//! subscribe to a [`Query`](shelf_engine::Query). Each subscriber receives
//! the full matching list right away and again after every committed change,
//! in commit order. A [`LiveView`] turns those deliveries into edit scripts a
//! list UI can apply directly.
//!
//! ```no_run
//! use shelf_engine::{NewBook, Query};
//! use shelf_library::{LiveView, Store};
//!
//! # async fn run() -> shelf_library::Result<()> {
//! let store = Store::open_in_memory().await?;
//! let mut view = LiveView::new(store.subscribe(Query::unread()).await?);
//!
//! store.insert(NewBook::new("", "Dune", "Frank Herbert")).await?;
//!
//! while let Some(change) = view.next().await {
//!     println!("{}", serde_json::to_string(&change.edits).unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod shelf;
pub mod store;
pub mod view;

pub use catalog::{search, Catalog, CatalogBook, OpenLibraryClient};
pub use config::{Config, ConfigError};
pub use error::{LibraryError, Result};
pub use feed::{ChangeFeed, Subscription, SubscriptionId};
pub use shelf::Shelf;
pub use store::Store;
pub use view::{Change, LiveView};
