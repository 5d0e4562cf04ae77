//! Change feed: pushes a fresh snapshot to every subscriber after each commit.
//!
//! Each subscription owns an unbounded queue consumed by a single receiver,
//! so a slow consumer lets snapshots pile up in order instead of interleaving.

mod manager;
mod subscription;

pub use manager::{ChangeFeed, SnapshotReceiver, SubscriptionId};
pub use subscription::Subscription;
