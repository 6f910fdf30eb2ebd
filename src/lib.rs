mod api;
mod broker;
mod replication;
mod selection;
mod topology;

pub use api::try_create_broker;
pub use api::Broker;
pub use api::BrokerConfig;
pub use api::BrokerCreationError;
pub use api::BrokerEvent;
pub use api::BrokerEventListener;
pub use api::BrokerOptions;
pub use api::ConfigChangeResult;
pub use api::ConfigErrorHandler;
pub use api::ConfigPhase;
pub use api::ConnectError;
pub use api::Connector;
pub use api::HelloError;
pub use api::LocalChangeError;
pub use api::ReconfigureError;
pub use api::ResultCode;
pub use broker::BrokerExited;
pub use replication::Csn;
pub use replication::InvalidStateError;
pub use replication::ReplicaId;
pub use replication::ReplicationState;
pub use selection::CandidateName;
pub use selection::GroupId;
pub use selection::InvalidGroupId;
pub use selection::ReplicaDescriptor;
pub use selection::ReplicaSelector;
pub use selection::Selection;
pub use selection::SelectionInput;
pub use selection::StalenessPolicy;
pub use selection::DEFAULT_STALENESS_THRESHOLD;
pub use topology::Advertisement;
pub use topology::AdvertisementError;

