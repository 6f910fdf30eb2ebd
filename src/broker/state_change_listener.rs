use crate::selection::CandidateName;
use tokio::sync::watch;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum BrokerStateSnapshot {
    Disconnected { preferred: Option<CandidateName> },
    Connecting(CandidateName),
    Connected(CandidateName),
    BackingOff { consecutive_failures: u32 },
}

pub(crate) fn new(initial_state: BrokerStateSnapshot) -> (BrokerStateChangeNotifier, BrokerStateChangeListener) {
    let (snd, rcv) = watch::channel(initial_state);

    (BrokerStateChangeNotifier { snd }, BrokerStateChangeListener { rcv })
}

pub(crate) struct BrokerStateChangeNotifier {
    snd: watch::Sender<BrokerStateSnapshot>,
}

impl BrokerStateChangeNotifier {
    /// Listeners are only woken if the state actually differs from the last published one.
    pub(crate) fn notify_new_state(&self, new_state: BrokerStateSnapshot) {
        self.snd.send_if_modified(|current| {
            if *current == new_state {
                false
            } else {
                *current = new_state;
                true
            }
        });
    }
}

#[derive(Clone)]
pub(crate) struct BrokerStateChangeListener {
    rcv: watch::Receiver<BrokerStateSnapshot>,
}

impl BrokerStateChangeListener {
    /// Waits for the next state change. Returns None once the broker is gone.
    pub(crate) async fn next(&mut self) -> Option<BrokerStateSnapshot> {
        match self.rcv.changed().await {
            Ok(_) => Some(self.rcv.borrow().clone()),
            Err(_) => None,
        }
    }

    pub(crate) fn current(&self) -> BrokerStateSnapshot {
        self.rcv.borrow().clone()
    }
}
