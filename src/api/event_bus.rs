use crate::broker::{BrokerStateChangeListener, BrokerStateSnapshot};
use crate::selection::CandidateName;

/// A change in the broker's connection state.
///
/// Events are not queued: if several changes happen between two calls to `next_event()`, only
/// the most recent one is observed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BrokerEvent {
    /// Not connected. `preferred` is what selection currently picks, if anything.
    Disconnected { preferred: Option<CandidateName> },
    Connecting(CandidateName),
    Connected(CandidateName),
    /// Waiting out a backoff before trying again.
    BackingOff { consecutive_failures: u32 },
}

pub struct BrokerEventListener {
    state_change_listener: BrokerStateChangeListener,
}

impl BrokerEventListener {
    pub(crate) fn new(state_change_listener: BrokerStateChangeListener) -> Self {
        BrokerEventListener { state_change_listener }
    }

    /// `next_event()` waits for the broker's state to change. Returns None once the broker is gone.
    pub async fn next_event(&mut self) -> Option<BrokerEvent> {
        self.state_change_listener.next().await.map(BrokerEvent::from)
    }

    /// The latest state, without waiting.
    pub fn current(&self) -> BrokerEvent {
        BrokerEvent::from(self.state_change_listener.current())
    }
}

// ------- Conversions --------

impl From<BrokerStateSnapshot> for BrokerEvent {
    fn from(snapshot: BrokerStateSnapshot) -> Self {
        match snapshot {
            BrokerStateSnapshot::Disconnected { preferred } => BrokerEvent::Disconnected { preferred },
            BrokerStateSnapshot::Connecting(name) => BrokerEvent::Connecting(name),
            BrokerStateSnapshot::Connected(name) => BrokerEvent::Connected(name),
            BrokerStateSnapshot::BackingOff { consecutive_failures } => {
                BrokerEvent::BackingOff { consecutive_failures }
            }
        }
    }
}
