use crate::selection::{CandidateName, ReplicaDescriptor};
use std::collections::HashMap;

/// TopologyTracker is the live set of reachable replication servers, keyed by name. Presence and
/// absence are reported to it; it never decides on its own that a server is gone.
#[derive(Default)]
pub(crate) struct TopologyTracker {
    candidates: HashMap<CandidateName, ReplicaDescriptor>,
}

impl TopologyTracker {
    pub(crate) fn new() -> Self {
        TopologyTracker::default()
    }

    /// Record the latest advertisement of `name`. Returns true if the candidate set changed, i.e.
    /// `name` is new or advertised something different from last time.
    pub(crate) fn upsert(&mut self, name: CandidateName, descriptor: ReplicaDescriptor) -> bool {
        match self.candidates.get(&name) {
            Some(existing) if *existing == descriptor => false,
            _ => {
                self.candidates.insert(name, descriptor);
                true
            }
        }
    }

    /// Returns true if `name` was present.
    pub(crate) fn remove(&mut self, name: &CandidateName) -> bool {
        self.candidates.remove(name).is_some()
    }

    pub(crate) fn get(&self, name: &CandidateName) -> Option<&ReplicaDescriptor> {
        self.candidates.get(name)
    }

    pub(crate) fn contains(&self, name: &CandidateName) -> bool {
        self.candidates.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn candidates(&self) -> &HashMap<CandidateName, ReplicaDescriptor> {
        &self.candidates
    }
}
