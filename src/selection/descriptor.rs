use crate::replication::ReplicationState;
use std::convert::TryFrom;
use std::fmt;

/// GroupId is the administrative partition a server belongs to. Valid values are 1..=127.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GroupId(u8);

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("group id {0} is outside of 1..=127")]
pub struct InvalidGroupId(pub u32);

impl GroupId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 127;

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for GroupId {
    type Error = InvalidGroupId;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        if raw < u32::from(Self::MIN) || raw > u32::from(Self::MAX) {
            return Err(InvalidGroupId(raw));
        }

        Ok(GroupId(raw as u8))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque name of a candidate replication server, usually its `host:port`. Names are compared
/// byte-wise, which is the last-resort tie-break of selection.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CandidateName(String);

impl CandidateName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        CandidateName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateName {
    fn from(name: &str) -> Self {
        CandidateName::new(name)
    }
}

/// A snapshot of what one replication server told us about itself. A newer advertisement from
/// the same server produces a new descriptor; descriptors are never edited in place.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplicaDescriptor {
    advertised_state: ReplicationState,
    group_id: GroupId,
    is_local: bool,
}

impl ReplicaDescriptor {
    pub fn new(advertised_state: ReplicationState, group_id: GroupId, is_local: bool) -> Self {
        ReplicaDescriptor {
            advertised_state,
            group_id,
            is_local,
        }
    }

    pub fn advertised_state(&self) -> &ReplicationState {
        &self.advertised_state
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// True when the server runs on the same host/process group as the evaluating node.
    pub fn is_local(&self) -> bool {
        self.is_local
    }
}
