use crate::api::options::BrokerOptions;
use crate::api::{BrokerEventListener, ConfigChangeResult};
use crate::broker::{ActorClient, BrokerExited, BrokerStateChangeListener};
use crate::replication::Csn;
use crate::selection::{CandidateName, ReplicaDescriptor, Selection};
use crate::topology::{Advertisement, AdvertisementError};
use bytes::Bytes;

/// Broker is the application's handle to a running replication broker. Dropping it (and every
/// clone) stops the broker.
#[derive(Clone)]
pub struct Broker {
    actor_client: ActorClient,
    state_change_listener: BrokerStateChangeListener,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconfigureError {
    #[error("Options were not accepted: {0:?}")]
    Unacceptable(Vec<String>),
    #[error(transparent)]
    Exited(#[from] BrokerExited),
}

#[derive(Debug, thiserror::Error)]
pub enum LocalChangeError {
    #[error("Replica ID 0 is reserved")]
    ReservedReplicaId,
    #[error(transparent)]
    Exited(#[from] BrokerExited),
}

#[derive(Debug, thiserror::Error)]
pub enum HelloError {
    #[error("Invalid hello message")]
    InvalidAdvertisement(#[from] AdvertisementError),
    #[error(transparent)]
    Exited(#[from] BrokerExited),
}

impl Broker {
    pub(crate) fn new(actor_client: ActorClient, state_change_listener: BrokerStateChangeListener) -> Self {
        Broker {
            actor_client,
            state_change_listener,
        }
    }

    /// A replication server announced itself, or re-announced with a newer state.
    pub async fn advertise(&self, name: CandidateName, descriptor: ReplicaDescriptor) -> Result<(), BrokerExited> {
        self.actor_client.advertisement(name, descriptor).await
    }

    /// Decode a hello message off the wire and feed it in as an advertisement.
    pub async fn receive_hello(&self, payload: Bytes, is_local: bool) -> Result<(), HelloError> {
        let (name, descriptor) = Advertisement::decode(payload, is_local)?.into_parts();
        self.actor_client.advertisement(name, descriptor).await?;

        Ok(())
    }

    pub async fn candidate_lost(&self, name: CandidateName) -> Result<(), BrokerExited> {
        self.actor_client.candidate_lost(name).await
    }

    /// This node originated or applied `csn`.
    pub async fn record_local_change(&self, csn: Csn) -> Result<(), LocalChangeError> {
        if csn.replica_id().is_reserved() {
            return Err(LocalChangeError::ReservedReplicaId);
        }
        self.actor_client.local_change(csn).await?;

        Ok(())
    }

    /// The transport lost the connection the broker had established to `name`.
    pub async fn connection_lost(&self, name: CandidateName) -> Result<(), BrokerExited> {
        self.actor_client.connection_lost(name).await
    }

    /// Change options of the running broker. Every problem with `options` is reported at once; if
    /// any is unacceptable nothing is applied.
    pub async fn reconfigure(&self, options: BrokerOptions) -> Result<ConfigChangeResult, ReconfigureError> {
        self.actor_client
            .reconfigure(options)
            .await?
            .map_err(ReconfigureError::Unacceptable)
    }

    /// What selection picks right now, regardless of what the broker is connected to.
    pub async fn current_selection(&self) -> Result<Selection, BrokerExited> {
        self.actor_client.current_selection().await
    }

    pub fn events(&self) -> BrokerEventListener {
        BrokerEventListener::new(self.state_change_listener.clone())
    }
}
