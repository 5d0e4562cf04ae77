//! Live list views.
//!
//! A [`LiveView`] pairs a subscription with the snapshot it last rendered and
//! turns each new delivery into an edit script against that snapshot.

use shelf_engine::{diff, EditScript, Query, Snapshot};

use crate::feed::Subscription;

/// One delivery, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// The full list to display now
    pub snapshot: Snapshot,
    /// Edits turning the previously rendered list into `snapshot`
    pub edits: EditScript,
}

/// A subscription plus the previously rendered snapshot.
#[derive(Debug)]
pub struct LiveView {
    subscription: Subscription,
    rendered: Snapshot,
}

impl LiveView {
    /// Start from an empty rendered list.
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            rendered: Snapshot::empty(),
        }
    }

    pub fn query(&self) -> Query {
        self.subscription.query()
    }

    /// What the view currently shows.
    pub fn rendered(&self) -> &Snapshot {
        &self.rendered
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Wait for the next delivery and diff it against the rendered list.
    pub async fn next(&mut self) -> Option<Change> {
        let snapshot = self.subscription.recv().await?;
        Some(self.advance(snapshot))
    }

    /// Like [`next`](Self::next) but only if a delivery is already queued.
    pub fn try_next(&mut self) -> Option<Change> {
        let snapshot = self.subscription.try_recv()?;
        Some(self.advance(snapshot))
    }

    /// Stop receiving. Idempotent.
    pub fn close(&mut self) {
        self.subscription.unsubscribe();
    }

    fn advance(&mut self, snapshot: Snapshot) -> Change {
        let edits = diff(self.rendered.as_slice(), snapshot.as_slice());
        self.rendered = snapshot.clone();
        Change { snapshot, edits }
    }
}
