use crate::broker::actor::{AttemptId, WeakActorClient};
use crate::broker::timers::time::Clock;
use tokio::time::Duration;

/// RefreshTimerTask nudges the broker to re-run selection on a fixed interval, even if no
/// advertisement or local change arrived in between. It lives exactly as long as the broker's
/// event loop: once the actor can no longer be reached, the task exits.
pub(crate) struct RefreshTimerTask<C: Clock> {
    interval: Duration,
    actor_client: WeakActorClient,
    clock: C,
}

impl<C: Clock> RefreshTimerTask<C> {
    pub(crate) fn new(interval: Duration, actor_client: WeakActorClient, clock: C) -> Self {
        RefreshTimerTask {
            interval,
            actor_client,
            clock,
        }
    }

    pub(crate) async fn run(mut self) {
        let mut next_tick = self.clock.now() + self.interval;
        loop {
            self.clock.sleep_until(next_tick).await;

            let actor_client = match self.actor_client.upgrade() {
                Some(client) => client,
                None => return,
            };
            if actor_client.refresh_tick().await.is_err() {
                return;
            }

            next_tick += self.interval;
        }
    }
}

/// Spawn a one-shot timer that tells the broker its backoff for `attempt` is over.
pub(crate) fn spawn_retry_timer<C: Clock>(
    mut clock: C,
    delay: Duration,
    actor_client: WeakActorClient,
    attempt: AttemptId,
) {
    let deadline = clock.now() + delay;
    tokio::spawn(async move {
        clock.sleep_until(deadline).await;
        if let Some(actor_client) = actor_client.upgrade() {
            let _ = actor_client.retry_timer(attempt).await;
        }
    });
}
