use crate::replication::{Csn, ReplicaId, ReplicationState};

/// LocalProgress tracks how far this node has gotten: its own changes plus every change it has
/// applied from other replicas. It has a single owner (the broker's event loop), so selection can
/// borrow a consistent snapshot without any locking.
pub(crate) struct LocalProgress {
    my_replica_id: ReplicaId,
    state: ReplicationState,
}

impl LocalProgress {
    pub(crate) fn new(my_replica_id: ReplicaId, initial_state: ReplicationState) -> Self {
        LocalProgress {
            my_replica_id,
            state: initial_state,
        }
    }

    /// Returns true if `csn` moved our state forward.
    pub(crate) fn record(&mut self, csn: Csn) -> bool {
        self.state.update(csn)
    }

    /// Newest of our own changes.
    pub(crate) fn my_latest(&self) -> Csn {
        self.state.get(self.my_replica_id)
    }

    pub(crate) fn snapshot(&self) -> &ReplicationState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ratchets_forward() {
        let me = ReplicaId::new(1);
        let mut progress = LocalProgress::new(me, ReplicationState::new());
        assert!(progress.my_latest().is_zero());

        assert!(progress.record(Csn::new(3, 0, me)));
        assert!(!progress.record(Csn::new(2, 0, me)));
        assert!(progress.record(Csn::new(9, 0, ReplicaId::new(2))));

        assert_eq!(progress.my_latest(), Csn::new(3, 0, me));
        assert_eq!(progress.snapshot().len(), 2);
    }
}
