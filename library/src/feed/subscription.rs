//! Subscription handles.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use shelf_engine::{Query, Snapshot};

use super::{ChangeFeed, SnapshotReceiver, SubscriptionId};

/// A live subscription to one query.
///
/// Receives one snapshot right away and one more after every committed
/// mutation, in commit order. Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    query: Query,
    receiver: SnapshotReceiver,
    feed: Weak<ChangeFeed>,
    closed: bool,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        query: Query,
        receiver: SnapshotReceiver,
        feed: &Arc<ChangeFeed>,
    ) -> Self {
        Self {
            id,
            query,
            receiver,
            feed: Arc::downgrade(feed),
            closed: false,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The query this subscription is bound to.
    pub fn query(&self) -> Query {
        self.query
    }

    /// Whether snapshots can still arrive.
    ///
    /// False after [`unsubscribe`](Self::unsubscribe), after the store
    /// unsubscribed this id, or after the store was closed.
    pub fn is_active(&self) -> bool {
        !self.closed
            && self
                .feed
                .upgrade()
                .is_some_and(|feed| feed.is_registered(self.id))
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the subscription is no longer active; snapshots
    /// still queued at that point are discarded.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        if !self.check_active() {
            return None;
        }
        let snapshot = self.receiver.recv().await?;
        // Unsubscribed while waiting.
        self.check_active().then_some(snapshot)
    }

    /// Take the next snapshot if one is already queued.
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        if !self.check_active() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Stop delivery. Calling it again has no further effect.
    pub fn unsubscribe(&mut self) {
        if self.closed {
            return;
        }
        if let Some(feed) = self.feed.upgrade() {
            feed.unregister(self.id);
        }
        self.discard();
    }

    fn check_active(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if !self.is_active() {
            self.discard();
            return false;
        }
        true
    }

    fn discard(&mut self) {
        self.closed = true;
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}

impl Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Snapshot>> {
        let this = self.get_mut();
        if !this.check_active() {
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(snapshot)) => Poll::Ready(this.check_active().then_some(snapshot)),
            other => other,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
