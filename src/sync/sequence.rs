//! Stale-response protection.
//!
//! Every fetch takes a ticket for its resource before it is issued. Only the
//! response holding the most recent ticket for that resource may be applied;
//! anything older arrived out of order.

use std::collections::HashMap;

/// Proof that a fetch was issued, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    resource: String,
    seq: u64,
}

impl Ticket {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Issues monotonically increasing tickets per resource
#[derive(Debug, Default)]
pub struct SequenceTracker {
    next: u64,
    latest: HashMap<String, u64>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a fetch about to be issued; supersedes earlier tickets
    pub fn issue(&mut self, resource: &str) -> Ticket {
        self.next += 1;
        self.latest.insert(resource.to_string(), self.next);
        Ticket {
            resource: resource.to_string(),
            seq: self.next,
        }
    }

    /// Whether `ticket` is still the newest for its resource
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.resource) == Some(&ticket.seq)
    }

    /// Stop tracking a resource; outstanding tickets become stale
    pub fn forget(&mut self, resource: &str) {
        self.latest.remove(resource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut tracker = SequenceTracker::new();
        let a = tracker.issue("/services/?page=1");
        let b = tracker.issue("/services/?page=1");

        assert!(b.seq() > a.seq());
        assert!(tracker.is_current(&b));
        assert!(!tracker.is_current(&a));
    }

    #[test]
    fn resources_are_independent() {
        let mut tracker = SequenceTracker::new();
        let services = tracker.issue("services");
        let deploys = tracker.issue("deploys");

        assert!(tracker.is_current(&services));
        assert!(tracker.is_current(&deploys));
        assert_eq!(deploys.resource(), "deploys");
    }

    #[test]
    fn forget_invalidates_outstanding() {
        let mut tracker = SequenceTracker::new();
        let ticket = tracker.issue("service:5");
        tracker.forget("service:5");
        assert!(!tracker.is_current(&ticket));
    }
}
