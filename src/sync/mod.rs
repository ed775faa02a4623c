//! Client-side state synchronisation: merging fetched data into cached
//! snapshots without churn, and discarding out-of-order responses.

pub mod cache;
pub mod merge;
pub mod reconcile;
pub mod sequence;

pub use cache::{Applied, SnapshotCache};
pub use merge::{merge, merge_snapshot, merge_value, Patch, Snapshot};
pub use reconcile::{reconcile, EntityKey, KeyPolicy, SnapshotList};
pub use sequence::{SequenceTracker, Ticket};
