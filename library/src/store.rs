//! Store - the durable, observable book collection.
//!
//! Writes are serialized behind a single async writer lock and run inside a
//! SQLite transaction. Before committing, the store reads the snapshot every
//! subscriber's query now produces through the same transaction; after the
//! commit succeeds those snapshots are handed to the change feed while the
//! writer lock is still held. A failed mutation therefore rolls back and
//! delivers nothing, and subscribers see snapshots in commit order.
//!
//! Each write runs on its own spawned task, so a caller that drops the
//! future midway never leaves a committed change unpublished.
//!
//! Reads go straight to the pool and may run concurrently with each other
//! and with a pending write; SQLite isolation means they see either the state
//! before a commit or after it.

use std::collections::HashMap;
use std::sync::Arc;

use shelf_engine::{Book, BookId, NewBook, Query, Snapshot};
use sqlx::SqliteConnection;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::{self, Pool};
use crate::error::{LibraryError, Result};
use crate::feed::{ChangeFeed, Subscription, SubscriptionId};

/// The book store.
///
/// Construct one explicitly with [`Store::open`] and share it with `Arc`.
#[derive(Debug)]
pub struct Store {
    pool: Pool,
    writer: Arc<Mutex<()>>,
    feed: Arc<ChangeFeed>,
}

impl Store {
    /// Open (creating if needed) the database named in the config and apply
    /// migrations.
    pub async fn open(config: &Config) -> Result<Self> {
        tracing::info!(database_url = %config.database_url, "Opening store");

        let pool = db::create_pool(&config.database_url, config.max_connections).await?;
        db::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            writer: Arc::new(Mutex::new(())),
            feed: ChangeFeed::new_shared(),
        })
    }

    /// Open a private in-memory store.
    pub async fn open_in_memory() -> Result<Self> {
        Self::open(&Config::in_memory()).await
    }

    /// Close every subscription and the underlying pool.
    ///
    /// Later operations fail with [`LibraryError::StorageFault`].
    pub async fn close(&self) {
        let _writer = self.writer.lock().await;
        self.feed.clear();
        self.pool.close().await;
        tracing::info!("Store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// The change feed backing this store's subscriptions.
    pub fn feed(&self) -> &Arc<ChangeFeed> {
        &self.feed
    }

    /// Store a new book and return it with its assigned id.
    pub async fn insert(&self, book: NewBook) -> Result<Book> {
        book.validate()?;
        self.write(Mutation::Insert(book)).await
    }

    /// Replace the stored book that has the same id.
    pub async fn update(&self, book: Book) -> Result<()> {
        book.validate()?;
        self.write(Mutation::Update(book)).await.map(|_| ())
    }

    /// Remove a book.
    pub async fn delete(&self, id: BookId) -> Result<()> {
        self.write(Mutation::Delete(id)).await.map(|_| ())
    }

    /// Set the read flag of a stored book and return the new record.
    pub async fn set_read(&self, id: BookId, read: bool) -> Result<Book> {
        self.write(Mutation::MarkRead(id, Some(read))).await
    }

    /// Flip the read flag of a stored book and return the new record.
    pub async fn toggle_read(&self, id: BookId) -> Result<Book> {
        self.write(Mutation::MarkRead(id, None)).await
    }

    /// Run a mutation on its own task.
    ///
    /// Once the first poll has spawned it, the write commits and publishes
    /// even if the caller stops waiting; only the result is lost.
    async fn write(&self, mutation: Mutation) -> Result<Book> {
        let task = tokio::spawn(commit(
            self.pool.clone(),
            Arc::clone(&self.writer),
            Arc::clone(&self.feed),
            mutation,
        ));

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(LibraryError::StorageFault(sqlx::Error::WorkerCrashed)),
        }
    }

    /// Current books matching a query.
    pub async fn query(&self, query: &Query) -> Result<Snapshot> {
        let mut conn = self.pool.acquire().await?;
        let books = db::select_books(&mut conn, query).await?;
        Ok(Snapshot::new(books))
    }

    /// A single book by id.
    pub async fn get(&self, id: BookId) -> Result<Book> {
        let mut conn = self.pool.acquire().await?;
        db::get_book(&mut conn, id)
            .await?
            .ok_or(LibraryError::NotFound(id))
    }

    /// Number of books matching a query.
    pub async fn count(&self, query: &Query) -> Result<usize> {
        let mut conn = self.pool.acquire().await?;
        let count = db::count_books(&mut conn, query).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Subscribe to a query.
    ///
    /// The current result is queued immediately; every later committed
    /// mutation queues one more snapshot.
    pub async fn subscribe(&self, query: Query) -> Result<Subscription> {
        let _writer = self.writer.lock().await;

        let initial = self.query(&query).await?;
        let (id, receiver) = self.feed.register(query, initial);

        Ok(Subscription::new(id, query, receiver, &self.feed))
    }

    /// Stop delivering to a subscription. Unknown or already removed ids are
    /// ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.feed.unregister(id);
    }
}

/// A write to apply inside one transaction.
#[derive(Debug)]
enum Mutation {
    Insert(NewBook),
    Update(Book),
    Delete(BookId),
    /// Set the read flag, or flip it when `None`.
    MarkRead(BookId, Option<bool>),
}

impl Mutation {
    fn action(&self) -> &'static str {
        match self {
            Mutation::Insert(_) => "inserted",
            Mutation::Update(_) | Mutation::MarkRead(..) => "updated",
            Mutation::Delete(_) => "deleted",
        }
    }

    /// Apply through `conn` and return the book as written, or as it was
    /// before a delete.
    async fn apply(self, conn: &mut SqliteConnection) -> Result<Book> {
        match self {
            Mutation::Insert(book) => {
                let id = db::insert_book(conn, &book).await?;
                Ok(book.with_id(id))
            }
            Mutation::Update(book) => {
                if !db::update_book(conn, &book).await? {
                    return Err(LibraryError::NotFound(book.id));
                }
                Ok(book)
            }
            Mutation::Delete(id) => {
                let book = db::get_book(conn, id)
                    .await?
                    .ok_or(LibraryError::NotFound(id))?;
                db::delete_book(conn, id).await?;
                Ok(book)
            }
            Mutation::MarkRead(id, read) => {
                let current = db::get_book(conn, id)
                    .await?
                    .ok_or(LibraryError::NotFound(id))?;
                let changed = current.with_read(read.unwrap_or(!current.read));
                db::update_book(conn, &changed).await?;
                Ok(changed)
            }
        }
    }
}

/// Apply a mutation under the writer lock, then publish every subscriber's
/// new snapshot once the commit has succeeded.
async fn commit(
    pool: Pool,
    writer: Arc<Mutex<()>>,
    feed: Arc<ChangeFeed>,
    mutation: Mutation,
) -> Result<Book> {
    let _writer = writer.lock_owned().await;
    let action = mutation.action();

    let mut tx = pool.begin().await?;
    let book = mutation.apply(&mut tx).await?;
    let deliveries = subscriber_snapshots(&feed, &mut tx).await?;
    tx.commit().await?;

    tracing::info!(book_id = book.id, read = book.read, "Book {}", action);
    feed.publish(deliveries);

    Ok(book)
}

/// Snapshot for every registered subscriber, reading through the open
/// transaction. Subscribers sharing a query share one read.
async fn subscriber_snapshots(
    feed: &ChangeFeed,
    conn: &mut SqliteConnection,
) -> Result<Vec<(SubscriptionId, Snapshot)>> {
    let subscribers = feed.queries();
    let mut by_query: HashMap<Query, Snapshot> = HashMap::new();
    let mut deliveries = Vec::with_capacity(subscribers.len());

    for (id, query) in subscribers {
        let snapshot = match by_query.get(&query) {
            Some(snapshot) => snapshot.clone(),
            None => {
                let snapshot = Snapshot::new(db::select_books(conn, &query).await?);
                by_query.insert(query, snapshot.clone());
                snapshot
            }
        };
        deliveries.push((id, snapshot));
    }

    Ok(deliveries)
}
