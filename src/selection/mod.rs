//! Picks the replication server a directory node should connect to.
mod descriptor;
mod selector;
mod staleness;

pub use descriptor::CandidateName;
pub use descriptor::GroupId;
pub use descriptor::InvalidGroupId;
pub use descriptor::ReplicaDescriptor;
pub use selector::ReplicaSelector;
pub use selector::Selection;
pub use selector::SelectionInput;
pub use staleness::StalenessPolicy;
pub use staleness::DEFAULT_STALENESS_THRESHOLD;
