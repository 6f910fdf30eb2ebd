mod csn;
mod state;

pub use csn::Csn;
pub use csn::ReplicaId;
pub use state::InvalidStateError;
pub use state::ReplicationState;
