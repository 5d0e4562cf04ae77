//! Subscriber registry.
//!
//! Tracks every live subscription and the query it is bound to, and pushes
//! snapshots into each subscriber's queue.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use shelf_engine::{Query, Snapshot};
use tokio::sync::mpsc;

/// Sender half of a subscriber's snapshot queue.
type SnapshotSender = mpsc::UnboundedSender<Snapshot>;

/// Receiver half of a subscriber's snapshot queue.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<Snapshot>;

/// Unique identifier of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(uuid::Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single registered subscriber.
#[derive(Debug)]
struct Subscriber {
    query: Query,
    sender: SnapshotSender,
}

/// Registry of active subscriptions.
///
/// Thread-safe and shared between the store and subscription handles via `Arc`.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: DashMap<SubscriptionId, Subscriber>,
}

impl ChangeFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Create an empty feed wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a subscriber and queue its first snapshot.
    ///
    /// The caller must hold the store's writer lock so no commit can slip in
    /// between reading `initial` and registering.
    pub(crate) fn register(
        &self,
        query: Query,
        initial: Snapshot,
    ) -> (SubscriptionId, SnapshotReceiver) {
        let id = SubscriptionId::new();
        let (sender, receiver) = mpsc::unbounded_channel();

        // The receiver is alive, so this cannot fail.
        let _ = sender.send(initial);
        self.subscribers.insert(id, Subscriber { query, sender });

        tracing::info!(subscription = %id, ?query, "Subscription registered");

        (id, receiver)
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        match self.subscribers.remove(&id) {
            Some(_) => {
                tracing::info!(subscription = %id, "Subscription unregistered");
                true
            }
            None => false,
        }
    }

    /// Whether a subscription is still registered.
    pub fn is_registered(&self, id: SubscriptionId) -> bool {
        self.subscribers.contains_key(&id)
    }

    /// Every registered subscription with its query.
    pub(crate) fn queries(&self) -> Vec<(SubscriptionId, Query)> {
        self.subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().query))
            .collect()
    }

    /// Queue snapshots for the given subscribers.
    ///
    /// Subscribers that unregistered in the meantime are skipped; subscribers
    /// whose handle is gone are dropped. Returns the number of deliveries.
    pub(crate) fn publish(&self, deliveries: Vec<(SubscriptionId, Snapshot)>) -> usize {
        let mut sent_count = 0;
        let mut closed = Vec::new();

        for (id, snapshot) in deliveries {
            if let Some(subscriber) = self.subscribers.get(&id) {
                if subscriber.sender.send(snapshot).is_ok() {
                    sent_count += 1;
                } else {
                    closed.push(id);
                }
            }
        }

        for id in closed {
            self.unregister(id);
        }

        tracing::debug!(recipients = sent_count, "Published snapshots");

        sent_count
    }

    /// Remove every subscriber.
    pub fn clear(&self) {
        let count = self.subscribers.len();
        self.subscribers.clear();
        tracing::info!(count, "All subscriptions closed");
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
