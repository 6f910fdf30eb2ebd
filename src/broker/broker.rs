use crate::api::{
    BrokerOptions, BrokerOptionsValidated, ConfigChangeResult, ConfigErrorHandler, ConfigPhase, ConnectError,
    Connector, ResultCode,
};
use crate::broker::actor::{AttemptId, ConnectOutcome, WeakActorClient};
use crate::broker::backoff::Backoff;
use crate::broker::state_change_listener::{BrokerStateChangeNotifier, BrokerStateSnapshot};
use crate::broker::timers::{self, Clock};
use crate::replication::{Csn, ReplicaId, ReplicationState};
use crate::selection::{
    CandidateName, GroupId, ReplicaDescriptor, ReplicaSelector, Selection, SelectionInput, StalenessPolicy,
};
use crate::topology::{LocalProgress, TopologyTracker};
use std::sync::Arc;

pub(crate) struct ReplicationBrokerConfig<C: Clock> {
    pub logger: slog::Logger,
    pub my_replica_id: ReplicaId,
    pub my_group_id: GroupId,
    pub initial_state: ReplicationState,
    pub options: BrokerOptionsValidated,
    pub connector: Arc<dyn Connector>,
    pub actor_client: WeakActorClient,
    pub notifier: BrokerStateChangeNotifier,
    pub clock: C,
}

/// ReplicationBroker keeps this node attached to the best replication server it knows of. It
/// re-runs selection whenever something relevant happens, but only starts a connection while it
/// has none: once connecting or connected, a better candidate showing up doesn't tear anything down.
pub(crate) struct ReplicationBroker<C: Clock> {
    logger: slog::Logger,
    my_replica_id: ReplicaId,
    my_group_id: GroupId,
    options: BrokerOptionsValidated,
    selector: ReplicaSelector,
    topology: TopologyTracker,
    progress: LocalProgress,
    preferred: Option<CandidateName>,
    state: ConnectionState,
    backoff: Backoff,
    last_attempt: AttemptId,
    connector: Arc<dyn Connector>,
    actor_client: WeakActorClient,
    notifier: BrokerStateChangeNotifier,
    clock: C,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum ConnectionState {
    Disconnected,
    Connecting { name: CandidateName, attempt: AttemptId },
    Connected { name: CandidateName },
    BackingOff { attempt: AttemptId },
}

impl<C: Clock> ReplicationBroker<C> {
    pub(crate) fn new(config: ReplicationBrokerConfig<C>) -> Self {
        let selector = ReplicaSelector::new(StalenessPolicy::new(config.options.staleness_threshold));
        let backoff = Backoff::new(config.options.initial_backoff, config.options.max_backoff);

        ReplicationBroker {
            logger: config.logger,
            my_replica_id: config.my_replica_id,
            my_group_id: config.my_group_id,
            options: config.options,
            selector,
            topology: TopologyTracker::new(),
            progress: LocalProgress::new(config.my_replica_id, config.initial_state),
            preferred: None,
            state: ConnectionState::Disconnected,
            backoff,
            last_attempt: AttemptId::new(0),
            connector: config.connector,
            actor_client: config.actor_client,
            notifier: config.notifier,
            clock: config.clock,
        }
    }

    pub(crate) fn handle_advertisement(&mut self, name: CandidateName, descriptor: ReplicaDescriptor) {
        let is_new = !self.topology.contains(&name);
        if self.topology.upsert(name.clone(), descriptor) {
            slog::debug!(
                self.logger,
                "Candidate {} advertised {} state ({} known)",
                name,
                if is_new { "its first" } else { "a new" },
                self.topology.len()
            );
        }
        self.reselect();
    }

    pub(crate) fn handle_candidate_lost(&mut self, name: CandidateName) {
        if !self.topology.remove(&name) {
            slog::debug!(self.logger, "Lost unknown candidate {}", name);
        }

        match &self.state {
            ConnectionState::Connected { name: connected } if *connected == name => {
                slog::info!(self.logger, "Connected replication server {} left the topology", name);
                self.spawn_disconnect(name);
                self.state = ConnectionState::Disconnected;
            }
            ConnectionState::Connecting { name: connecting, .. } if *connecting == name => {
                // The in-flight outcome turns stale and is cleaned up when it arrives.
                slog::info!(self.logger, "Abandoning connection attempt to {}", name);
                self.state = ConnectionState::Disconnected;
            }
            _ => {}
        }

        self.reselect();
    }

    pub(crate) fn handle_local_change(&mut self, csn: Csn) {
        if self.progress.record(csn) {
            slog::debug!(self.logger, "Local progress advanced, own latest change is {:?}", self.progress.my_latest());
            self.reselect();
        }
    }

    pub(crate) fn handle_connection_lost(&mut self, name: CandidateName) {
        match &self.state {
            ConnectionState::Connected { name: connected } if *connected == name => {
                slog::warn!(self.logger, "Lost connection to {}", name);
                self.back_off();
            }
            state => {
                slog::debug!(self.logger, "Ignoring lost connection to {} while {:?}", name, state);
            }
        }
    }

    pub(crate) fn handle_connect_outcome(&mut self, outcome: ConnectOutcome) {
        let is_current = matches!(
            &self.state,
            ConnectionState::Connecting { name, attempt } if *name == outcome.name && *attempt == outcome.attempt
        );
        if !is_current {
            slog::debug!(
                self.logger,
                "Dropping outcome of stale attempt {:?} to {}",
                outcome.attempt,
                outcome.name
            );
            if outcome.result.is_ok() {
                self.spawn_disconnect(outcome.name);
            }
            return;
        }

        match outcome.result {
            Ok(()) => {
                slog::info!(self.logger, "Connected to replication server {}", outcome.name);
                self.backoff.reset();
                self.state = ConnectionState::Connected { name: outcome.name };
                self.publish();
            }
            Err(e) => {
                slog::warn!(self.logger, "Failed to connect to {}: {}", outcome.name, e);
                self.back_off();
            }
        }
    }

    pub(crate) fn handle_refresh_tick(&mut self) {
        self.reselect();
    }

    pub(crate) fn handle_retry_timer(&mut self, attempt: AttemptId) {
        match &self.state {
            ConnectionState::BackingOff { attempt: current } if *current == attempt => {
                self.state = ConnectionState::Disconnected;
                self.reselect();
            }
            _ => {
                slog::debug!(self.logger, "Ignoring retry timer of stale attempt {:?}", attempt);
            }
        }
    }

    /// Apply a change of options. Anything left unset keeps its current value. The staleness
    /// threshold, backoff bounds and connect timeout change immediately; the rest is fixed for the
    /// lifetime of the broker. Returns every problem if the change can't be accepted as a whole.
    pub(crate) fn handle_reconfigure(&mut self, options: BrokerOptions) -> Result<ConfigChangeResult, Vec<String>> {
        let new_options = self.options.check_change(options)?;
        let mut handler = ConfigErrorHandler::new(ConfigPhase::Apply);

        if new_options.refresh_interval != self.options.refresh_interval {
            handler.report_error_with_admin_action(
                "Refresh interval change requires a broker restart",
                true,
                ResultCode::Success,
                true,
            );
        }
        if new_options.event_queue_size != self.options.event_queue_size {
            handler.report_error_with_admin_action(
                "Event queue size change requires a broker restart",
                true,
                ResultCode::Success,
                true,
            );
        }

        self.selector = ReplicaSelector::new(StalenessPolicy::new(new_options.staleness_threshold));
        self.backoff.set_bounds(new_options.initial_backoff, new_options.max_backoff);
        self.options.staleness_threshold = new_options.staleness_threshold;
        self.options.initial_backoff = new_options.initial_backoff;
        self.options.max_backoff = new_options.max_backoff;
        self.options.connect_timeout = new_options.connect_timeout;

        slog::info!(self.logger, "Applied new options: {:?}", self.options);
        self.reselect();

        Ok(handler.into_change_result())
    }

    pub(crate) fn current_selection(&self) -> Selection {
        self.select()
    }

    fn select(&self) -> Selection {
        self.selector.select(&SelectionInput {
            local_state: self.progress.snapshot(),
            my_replica_id: self.my_replica_id,
            my_group_id: self.my_group_id,
            candidates: self.topology.candidates(),
        })
    }

    fn reselect(&mut self) {
        let preferred = self.select().chosen().cloned();
        if preferred != self.preferred {
            slog::info!(
                self.logger,
                "Preferred replication server changed from {:?} to {:?}",
                self.preferred,
                preferred
            );
            self.preferred = preferred;
        }

        if self.state == ConnectionState::Disconnected {
            if let Some(name) = self.preferred.clone() {
                self.start_connecting(name);
            }
        }

        self.publish();
    }

    fn start_connecting(&mut self, name: CandidateName) {
        let descriptor = match self.topology.get(&name) {
            Some(descriptor) => descriptor.clone(),
            None => {
                slog::error!(self.logger, "Selected candidate {} is missing from topology", name);
                return;
            }
        };
        let actor_client = match self.actor_client.upgrade() {
            Some(client) => client,
            // Event loop is shutting down.
            None => return,
        };

        let attempt = self.next_attempt();
        slog::info!(self.logger, "Connecting to {} (attempt {:?})", name, attempt);
        self.state = ConnectionState::Connecting {
            name: name.clone(),
            attempt,
        };

        let connector = self.connector.clone();
        let connect_timeout = self.options.connect_timeout;
        tokio::spawn(async move {
            let result = match tokio::time::timeout(connect_timeout, connector.connect(&name, &descriptor)).await {
                Ok(result) => result,
                Err(_) => Err(ConnectError::TimedOut),
            };
            let _ = actor_client
                .connect_outcome(ConnectOutcome { name, attempt, result })
                .await;
        });
    }

    fn back_off(&mut self) {
        let delay = self.backoff.next_delay();
        let attempt = self.next_attempt();
        slog::info!(
            self.logger,
            "Backing off for {:?} after {} consecutive failure(s)",
            delay,
            self.backoff.consecutive_failures()
        );

        self.state = ConnectionState::BackingOff { attempt };
        timers::spawn_retry_timer(self.clock.clone(), delay, self.actor_client.clone(), attempt);
        self.publish();
    }

    fn spawn_disconnect(&self, name: CandidateName) {
        let connector = self.connector.clone();
        tokio::spawn(async move {
            connector.disconnect(&name).await;
        });
    }

    fn next_attempt(&mut self) -> AttemptId {
        self.last_attempt = self.last_attempt.next();
        self.last_attempt
    }

    fn publish(&self) {
        let snapshot = match &self.state {
            ConnectionState::Disconnected => BrokerStateSnapshot::Disconnected {
                preferred: self.preferred.clone(),
            },
            ConnectionState::Connecting { name, .. } => BrokerStateSnapshot::Connecting(name.clone()),
            ConnectionState::Connected { name } => BrokerStateSnapshot::Connected(name.clone()),
            ConnectionState::BackingOff { .. } => BrokerStateSnapshot::BackingOff {
                consecutive_failures: self.backoff.consecutive_failures(),
            },
        };
        self.notifier.notify_new_state(snapshot);
    }
}
