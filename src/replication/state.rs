use crate::replication::csn::{Csn, ReplicaId};
use std::collections::BTreeMap;

/// ReplicationState is a vector clock: for every replica it holds the highest `Csn` observed from
/// that replica. A replica that has no entry is treated as if it had the zero `Csn`.
///
/// Entries only ever move forward. There is no way to lower or remove an entry once it exists.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReplicationState {
    // BTreeMap so that iteration (and therefore logging) is stable.
    csns: BTreeMap<ReplicaId, Csn>,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum InvalidStateError {
    #[error("replica id {0} appears more than once")]
    DuplicateReplicaId(ReplicaId),
    #[error("replica id 0 is reserved")]
    ReservedReplicaId,
}

impl ReplicationState {
    pub fn new() -> Self {
        ReplicationState::default()
    }

    /// Build a state out of a list of stamps, one per replica. A list naming the same replica
    /// twice is malformed and is rejected here rather than silently merged.
    pub fn try_from_csns<I>(csns: I) -> Result<Self, InvalidStateError>
    where
        I: IntoIterator<Item = Csn>,
    {
        let mut state = ReplicationState::new();
        for csn in csns {
            let replica_id = csn.replica_id();
            if replica_id.is_reserved() {
                return Err(InvalidStateError::ReservedReplicaId);
            }
            if state.csns.insert(replica_id, csn).is_some() {
                return Err(InvalidStateError::DuplicateReplicaId(replica_id));
            }
        }

        Ok(state)
    }

    /// Returns the stored stamp for `replica_id`, or the zero stamp if nothing is known.
    pub fn get(&self, replica_id: ReplicaId) -> Csn {
        self.csns
            .get(&replica_id)
            .copied()
            .unwrap_or_else(|| Csn::zero(replica_id))
    }

    /// Store `csn` iff it is strictly newer than what we have for its replica.
    ///
    /// CAS: Return true if we mutated state.
    pub fn update(&mut self, csn: Csn) -> bool {
        match self.csns.get_mut(&csn.replica_id()) {
            Some(current) if csn <= *current => false,
            Some(current) => {
                *current = csn;
                true
            }
            None => {
                self.csns.insert(csn.replica_id(), csn);
                true
            }
        }
    }

    /// Signed distance between our stamp and `other`'s stamp for the same replica. Positive means
    /// we have seen more of `replica_id`'s history than `other` has.
    pub fn compare_component(&self, replica_id: ReplicaId, other: &ReplicationState) -> i128 {
        self.get(replica_id).distance(&other.get(replica_id))
    }

    /// How much history from the whole topology this state has ingested: the sum of the
    /// timestamps of every stored stamp.
    pub fn advancement(&self) -> u128 {
        self.csns.values().map(|csn| u128::from(csn.timestamp())).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Csn> {
        self.csns.values()
    }

    pub fn len(&self) -> usize {
        self.csns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.csns.is_empty()
    }
}
