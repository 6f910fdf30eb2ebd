use std::cmp::Ordering;
use std::fmt;

/// ReplicaId identifies the directory server that originated a change. Zero is reserved for
/// "no replica" and is rejected wherever ids enter the crate.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ReplicaId(u32);

impl ReplicaId {
    pub fn new(id: u32) -> Self {
        ReplicaId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn is_reserved(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Csn (change sequence number) stamps exactly one originating write.
///
/// Ordering and equality only look at `(timestamp, sequence)`. The replica id is an identity tag
/// carried along with the stamp, which is why `Csn` values are compared only among stamps of the
/// same replica in practice.
#[derive(Copy, Clone)]
pub struct Csn {
    timestamp: u64,
    sequence: u32,
    replica_id: ReplicaId,
}

impl Csn {
    pub fn new(timestamp: u64, sequence: u32, replica_id: ReplicaId) -> Self {
        Csn {
            timestamp,
            sequence,
            replica_id,
        }
    }

    /// The stamp that stands in for "no change known from `replica_id`".
    pub fn zero(replica_id: ReplicaId) -> Self {
        Self::new(0, 0, replica_id)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    pub fn is_zero(&self) -> bool {
        self.timestamp == 0 && self.sequence == 0
    }

    /// Signed distance `self - other` in the `(timestamp, sequence)` space. The sign always agrees
    /// with `self.cmp(other)`, and the magnitude grows with the amount of history between them.
    pub(crate) fn distance(&self, other: &Csn) -> i128 {
        let timestamps = i128::from(self.timestamp) - i128::from(other.timestamp);
        let sequences = i128::from(self.sequence) - i128::from(other.sequence);

        (timestamps << 32) + sequences
    }
}

impl PartialEq for Csn {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Csn {}

impl PartialOrd for Csn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Csn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl fmt::Debug for Csn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.timestamp, self.sequence, self.replica_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_ignores_replica_id() {
        let a = Csn::new(5, 1, ReplicaId::new(1));
        let b = Csn::new(5, 1, ReplicaId::new(2));
        assert_eq!(a, b);

        let later_sequence = Csn::new(5, 2, ReplicaId::new(1));
        assert!(later_sequence > a);

        let later_timestamp = Csn::new(6, 0, ReplicaId::new(1));
        assert!(later_timestamp > later_sequence);
    }

    #[test]
    fn distance_agrees_with_ordering() {
        let id = ReplicaId::new(7);
        let samples = [
            Csn::zero(id),
            Csn::new(0, u32::MAX, id),
            Csn::new(1, 0, id),
            Csn::new(1, 3, id),
            Csn::new(u64::MAX, u32::MAX, id),
        ];

        for a in samples.iter() {
            for b in samples.iter() {
                let distance = a.distance(b);
                assert_eq!(distance.cmp(&0), a.cmp(b), "{:?} vs {:?}", a, b);
                assert_eq!(distance, -b.distance(a));
            }
        }
    }

    #[test]
    fn zero_csn() {
        let zero = Csn::zero(ReplicaId::new(3));
        assert!(zero.is_zero());
        assert_eq!(zero.replica_id(), ReplicaId::new(3));
        assert!(!Csn::new(0, 1, ReplicaId::new(3)).is_zero());
    }
}
