//! Snapshot cache combining merge, reconciliation and sequencing

use super::merge::{merge_snapshot, Patch, Snapshot};
use super::reconcile::{reconcile_into, remove, EntityKey, KeyPolicy, SnapshotList};
use super::sequence::{SequenceTracker, Ticket};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Result of applying a fetched response
#[derive(Debug, Clone)]
pub enum Applied<T> {
    /// A newer fetch for the same resource was issued; nothing applied
    Stale,
    /// Applied, and the cached value did not change
    Unchanged(T),
    /// Applied, and the cached value is new
    Changed(T),
}

impl<T> Applied<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Applied::Changed(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Applied::Stale => None,
            Applied::Unchanged(v) | Applied::Changed(v) => Some(v),
        }
    }
}

/// Last-known state of fetched entities and lists, keyed by resource
#[derive(Debug, Default)]
pub struct SnapshotCache {
    sequences: SequenceTracker,
    entities: HashMap<String, Snapshot>,
    lists: HashMap<String, SnapshotList>,
    policy: KeyPolicy,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: KeyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Take a ticket before issuing a fetch for `resource`
    pub fn begin(&mut self, resource: &str) -> Ticket {
        self.sequences.issue(resource)
    }

    /// Merge a fetched entity into the cached snapshot
    pub fn apply_entity(&mut self, ticket: &Ticket, incoming: &Value) -> Applied<Snapshot> {
        if !self.sequences.is_current(ticket) {
            debug!(resource = ticket.resource(), seq = ticket.seq(), "Discarding stale response");
            return Applied::Stale;
        }

        let previous = self.entities.get(ticket.resource());
        let Some(merged) = merge_snapshot(previous, &Patch::from(incoming)) else {
            return Applied::Stale;
        };

        if previous.is_some_and(|prev| Arc::ptr_eq(prev, &merged)) {
            return Applied::Unchanged(merged);
        }
        self.entities
            .insert(ticket.resource().to_string(), Arc::clone(&merged));
        Applied::Changed(merged)
    }

    /// Reconcile a fetched page into the cached list
    pub fn apply_list(&mut self, ticket: &Ticket, incoming: &[Value]) -> Applied<SnapshotList> {
        if !self.sequences.is_current(ticket) {
            debug!(resource = ticket.resource(), seq = ticket.seq(), "Discarding stale page");
            return Applied::Stale;
        }

        let previous = self.lists.get(ticket.resource());
        let reconciled = reconcile_into(previous, incoming, &self.policy);

        if previous.is_some_and(|prev| Arc::ptr_eq(prev, &reconciled)) {
            return Applied::Unchanged(reconciled);
        }
        self.lists
            .insert(ticket.resource().to_string(), Arc::clone(&reconciled));
        Applied::Changed(reconciled)
    }

    pub fn entity(&self, resource: &str) -> Option<Snapshot> {
        self.entities.get(resource).cloned()
    }

    pub fn list(&self, resource: &str) -> Option<SnapshotList> {
        self.lists.get(resource).cloned()
    }

    /// Drop an entity from a cached list after an explicit delete
    pub fn remove_from_list(&mut self, resource: &str, key: &EntityKey) -> bool {
        let Some(previous) = self.lists.get(resource) else {
            return false;
        };
        let next = remove(previous, key, &self.policy);
        if Arc::ptr_eq(previous, &next) {
            return false;
        }
        self.lists.insert(resource.to_string(), next);
        true
    }

    /// Forget everything cached for `resource` (entity deleted or watcher gone)
    pub fn discard(&mut self, resource: &str) {
        self.entities.remove(resource);
        self.lists.remove(resource);
        self.sequences.forget(resource);
    }
}
