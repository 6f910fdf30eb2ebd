mod actor;
mod backoff;
mod broker;
mod state_change_listener;
mod timers;

#[cfg(test)]
mod test_utils;

pub use actor::BrokerExited;

pub(crate) use actor::ActorClient;
pub(crate) use actor::BrokerActor;
pub(crate) use broker::ReplicationBroker;
pub(crate) use broker::ReplicationBrokerConfig;
pub(crate) use state_change_listener::new as state_change_channel;
pub(crate) use state_change_listener::BrokerStateChangeListener;
pub(crate) use state_change_listener::BrokerStateSnapshot;
pub(crate) use timers::RealClock;
pub(crate) use timers::RefreshTimerTask;
