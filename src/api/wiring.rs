use crate::api::client::Broker;
use crate::api::options::{BrokerOptions, BrokerOptionsValidated};
use crate::api::Connector;
use crate::broker::{
    self, ActorClient, BrokerActor, BrokerStateSnapshot, RealClock, RefreshTimerTask, ReplicationBroker,
    ReplicationBrokerConfig,
};
use crate::replication::{Csn, InvalidStateError, ReplicaId, ReplicationState};
use crate::selection::{GroupId, InvalidGroupId};
use std::convert::TryFrom;
use std::sync::Arc;

pub struct BrokerConfig {
    pub my_replica_id: u32,
    pub my_group_id: u32,
    /// Everything this node has already seen, at most one CSN per replica.
    pub initial_state: Vec<Csn>,
    pub connector: Arc<dyn Connector>,
    pub info_logger: slog::Logger,
    pub options: BrokerOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerCreationError {
    #[error("Illegal options for configuring broker: {0:?}")]
    IllegalBrokerOptions(Vec<String>),
    #[error("Replica ID 0 is reserved")]
    ReservedReplicaId,
    #[error(transparent)]
    InvalidGroupId(#[from] InvalidGroupId),
    #[error("Invalid initial state")]
    InvalidInitialState(#[from] InvalidStateError),
}

/// Start a broker on the current tokio runtime. It runs until every handle to it is dropped.
pub fn try_create_broker(config: BrokerConfig) -> Result<Broker, BrokerCreationError> {
    let my_replica_id = ReplicaId::new(config.my_replica_id);
    if my_replica_id.is_reserved() {
        return Err(BrokerCreationError::ReservedReplicaId);
    }
    let my_group_id = GroupId::try_from(config.my_group_id)?;
    let initial_state = ReplicationState::try_from_csns(config.initial_state)?;
    let options =
        BrokerOptionsValidated::try_from(config.options).map_err(BrokerCreationError::IllegalBrokerOptions)?;

    let logger = config.info_logger.new(slog::o!(
        "ReplicaId" => my_replica_id.as_u32(),
        "GroupId" => my_group_id.as_u8(),
    ));

    let (actor_client, actor_queue_rx) = ActorClient::new(options.event_queue_size);
    let (notifier, listener) = broker::state_change_channel(BrokerStateSnapshot::Disconnected { preferred: None });
    let refresh_interval = options.refresh_interval;

    let replication_broker = ReplicationBroker::new(ReplicationBrokerConfig {
        logger: logger.clone(),
        my_replica_id,
        my_group_id,
        initial_state,
        options,
        connector: config.connector,
        actor_client: actor_client.weak(),
        notifier,
        clock: RealClock,
    });

    let broker_actor = BrokerActor::new(logger, actor_queue_rx, replication_broker);
    tokio::spawn(broker_actor.run_event_loop());

    let refresh_timer = RefreshTimerTask::new(refresh_interval, actor_client.weak(), RealClock);
    tokio::spawn(refresh_timer.run());

    Ok(Broker::new(actor_client, listener))
}
