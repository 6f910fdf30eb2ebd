use crate::api::{BrokerOptions, ConfigChangeResult, ConnectError};
use crate::broker::broker::ReplicationBroker;
use crate::broker::timers::Clock;
use crate::replication::Csn;
use crate::selection::{CandidateName, ReplicaDescriptor, Selection};
use std::fmt::Debug;
use tokio::sync::{mpsc, oneshot};

/// Identifies one connection attempt (or the backoff that follows a failed one). Outcomes and
/// timers carry the id they were started for, so anything belonging to an attempt the broker has
/// since moved on from is dropped.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct AttemptId(u64);

impl AttemptId {
    pub(crate) fn new(id: u64) -> Self {
        AttemptId(id)
    }

    pub(crate) fn next(&self) -> Self {
        AttemptId(self.0 + 1)
    }
}

#[derive(Debug)]
pub(crate) struct ConnectOutcome {
    pub name: CandidateName,
    pub attempt: AttemptId,
    pub result: Result<(), ConnectError>,
}

#[derive(Debug)]
pub(crate) enum Event {
    // Topology feed: a replication server (re)advertised itself.
    Advertisement(CandidateName, ReplicaDescriptor),
    // Topology feed: a replication server is no longer reachable.
    CandidateLost(CandidateName),
    // The node originated or applied a change.
    LocalChange(Csn),
    // Transport: an established connection dropped.
    ConnectionLost(CandidateName),
    ConnectOutcome(ConnectOutcome),

    RefreshTick,
    RetryTimer(AttemptId),

    Reconfigure(BrokerOptions, Callback<Result<ConfigChangeResult, Vec<String>>>),
    CurrentSelection(Callback<Selection>),
}

#[derive(Debug)]
pub(crate) struct Callback<T: Debug>(oneshot::Sender<T>);

impl<T: Debug> Callback<T> {
    fn send(self, message: T) {
        let _ = self.0.send(message);
    }
}

/// The broker's event loop is no longer running, so the request could not be delivered.
#[derive(Debug, thiserror::Error)]
#[error("Broker event loop has exited")]
pub struct BrokerExited;

#[derive(Clone)]
pub(crate) struct ActorClient {
    sender: mpsc::Sender<Event>,
}

/// Held by background tasks so that they don't keep the event loop alive on their own.
#[derive(Clone)]
pub(crate) struct WeakActorClient {
    sender: mpsc::WeakSender<Event>,
}

impl ActorClient {
    pub(crate) fn new(buffer_size: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(buffer_size);

        (ActorClient { sender: tx }, rx)
    }

    pub(crate) fn weak(&self) -> WeakActorClient {
        WeakActorClient {
            sender: self.sender.downgrade(),
        }
    }

    pub(crate) async fn advertisement(
        &self,
        name: CandidateName,
        descriptor: ReplicaDescriptor,
    ) -> Result<(), BrokerExited> {
        self.send(Event::Advertisement(name, descriptor)).await
    }

    pub(crate) async fn candidate_lost(&self, name: CandidateName) -> Result<(), BrokerExited> {
        self.send(Event::CandidateLost(name)).await
    }

    pub(crate) async fn local_change(&self, csn: Csn) -> Result<(), BrokerExited> {
        self.send(Event::LocalChange(csn)).await
    }

    pub(crate) async fn connection_lost(&self, name: CandidateName) -> Result<(), BrokerExited> {
        self.send(Event::ConnectionLost(name)).await
    }

    pub(crate) async fn connect_outcome(&self, outcome: ConnectOutcome) -> Result<(), BrokerExited> {
        self.send(Event::ConnectOutcome(outcome)).await
    }

    pub(crate) async fn refresh_tick(&self) -> Result<(), BrokerExited> {
        self.send(Event::RefreshTick).await
    }

    pub(crate) async fn retry_timer(&self, attempt: AttemptId) -> Result<(), BrokerExited> {
        self.send(Event::RetryTimer(attempt)).await
    }

    /// The inner error lists why the change was not accepted.
    pub(crate) async fn reconfigure(
        &self,
        options: BrokerOptions,
    ) -> Result<Result<ConfigChangeResult, Vec<String>>, BrokerExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Reconfigure(options, Callback(tx))).await?;

        rx.await.map_err(|_| BrokerExited)
    }

    pub(crate) async fn current_selection(&self) -> Result<Selection, BrokerExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::CurrentSelection(Callback(tx))).await?;

        rx.await.map_err(|_| BrokerExited)
    }

    async fn send(&self, event: Event) -> Result<(), BrokerExited> {
        self.sender.send(event).await.map_err(|_| BrokerExited)
    }
}

impl WeakActorClient {
    pub(crate) fn upgrade(&self) -> Option<ActorClient> {
        self.sender.upgrade().map(|sender| ActorClient { sender })
    }
}

/// BrokerActor runs the broker logic in actor model: one task owns all mutable state and works
/// through events one at a time.
pub(crate) struct BrokerActor<C: Clock> {
    logger: slog::Logger,
    receiver: mpsc::Receiver<Event>,
    broker: ReplicationBroker<C>,
}

impl<C: Clock> BrokerActor<C> {
    pub(crate) fn new(logger: slog::Logger, receiver: mpsc::Receiver<Event>, broker: ReplicationBroker<C>) -> Self {
        BrokerActor {
            logger,
            receiver,
            broker,
        }
    }

    pub(crate) async fn run_event_loop(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }

        slog::info!(self.logger, "Broker event loop exited.");
    }

    // This must NOT be async. Anything slow (connecting, sleeping) is spawned and reports back
    // through the queue.
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Advertisement(name, descriptor) => {
                self.broker.handle_advertisement(name, descriptor);
            }
            Event::CandidateLost(name) => {
                self.broker.handle_candidate_lost(name);
            }
            Event::LocalChange(csn) => {
                self.broker.handle_local_change(csn);
            }
            Event::ConnectionLost(name) => {
                self.broker.handle_connection_lost(name);
            }
            Event::ConnectOutcome(outcome) => {
                self.broker.handle_connect_outcome(outcome);
            }
            Event::RefreshTick => {
                self.broker.handle_refresh_tick();
            }
            Event::RetryTimer(attempt) => {
                self.broker.handle_retry_timer(attempt);
            }
            Event::Reconfigure(options, callback) => {
                let result = self.broker.handle_reconfigure(options);
                callback.send(result);
            }
            Event::CurrentSelection(callback) => {
                callback.send(self.broker.current_selection());
            }
        }
    }
}
