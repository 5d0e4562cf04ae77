//! User intents over a store and a catalog.

use std::sync::Arc;

use shelf_engine::{Book, BookId, Query};

use crate::catalog::{self, Catalog, CatalogBook};
use crate::error::Result;
use crate::store::Store;
use crate::view::LiveView;

/// Entry point for a view layer: search the catalog, keep books, watch lists.
#[derive(Debug)]
pub struct Shelf<C> {
    store: Arc<Store>,
    catalog: C,
    search_min_chars: usize,
}

impl<C: Catalog> Shelf<C> {
    pub fn new(store: Arc<Store>, catalog: C, search_min_chars: usize) -> Self {
        Self {
            store,
            catalog,
            search_min_chars,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Search the catalog by title and author.
    pub async fn search(&self, text: &str) -> Result<Vec<CatalogBook>> {
        catalog::search(&self.catalog, text, self.search_min_chars).await
    }

    /// Keep a catalog hit as an unread book.
    pub async fn add(&self, hit: &CatalogBook) -> Result<Book> {
        let book = hit.to_new_book()?;
        self.store.insert(book).await
    }

    pub async fn mark_read(&self, id: BookId, read: bool) -> Result<Book> {
        self.store.set_read(id, read).await
    }

    pub async fn toggle_read(&self, id: BookId) -> Result<Book> {
        self.store.toggle_read(id).await
    }

    pub async fn remove(&self, id: BookId) -> Result<()> {
        self.store.delete(id).await
    }

    /// Subscribe to a query and wrap it for rendering.
    pub async fn watch(&self, query: Query) -> Result<LiveView> {
        let subscription = self.store.subscribe(query).await?;
        Ok(LiveView::new(subscription))
    }
}
