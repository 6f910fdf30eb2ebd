use crate::broker::actor::{AttemptId, ConnectOutcome, Event};
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::mpsc;

struct TestUtilReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T: Debug> TestUtilReceiver<T> {
    fn new(rx: mpsc::Receiver<T>) -> Self {
        TestUtilReceiver { rx }
    }

    async fn recv(&mut self) -> T {
        self.recv_with_sanity_timeout().await.expect("Expected value")
    }

    async fn recv_with_sanity_timeout(&mut self) -> Option<T> {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("Unexpected timeout")
    }

    async fn recv_assert_timeout(&mut self, timeout: Duration) {
        if let Ok(value) = tokio::time::timeout(timeout, self.rx.recv()).await {
            panic!("Expected timeout, got {:?}", value);
        }
    }
}

/// Stands in for the broker's event loop so tests can see exactly what background tasks send.
pub(crate) struct TestUtilActor {
    receiver: TestUtilReceiver<Event>,
    timeout: Duration,
}

impl TestUtilActor {
    pub(crate) fn new(actor_queue_rx: mpsc::Receiver<Event>) -> Self {
        TestUtilActor {
            receiver: TestUtilReceiver::new(actor_queue_rx),
            timeout: Duration::from_millis(10),
        }
    }

    pub(crate) async fn assert_refresh_tick_event(&mut self) {
        match self.receiver.recv().await {
            Event::RefreshTick => {}
            event => panic!("Unexpected event {:?}", event),
        }
    }

    pub(crate) async fn assert_retry_timer_event(&mut self, expected_attempt: AttemptId) {
        match self.receiver.recv().await {
            Event::RetryTimer(attempt) => assert_eq!(attempt, expected_attempt),
            event => panic!("Unexpected event {:?}", event),
        }
    }

    pub(crate) async fn recv_retry_timer_event(&mut self) -> AttemptId {
        match self.receiver.recv().await {
            Event::RetryTimer(attempt) => attempt,
            event => panic!("Unexpected event {:?}", event),
        }
    }

    pub(crate) async fn recv_connect_outcome(&mut self) -> ConnectOutcome {
        match self.receiver.recv().await {
            Event::ConnectOutcome(outcome) => outcome,
            event => panic!("Unexpected event {:?}", event),
        }
    }

    pub(crate) async fn assert_no_event(&mut self) {
        self.receiver.recv_assert_timeout(self.timeout).await;
    }
}
