use rand::Rng;
use std::cmp;
use tokio::time::Duration;

/// Backoff spaces out reconnect attempts after consecutive failures. The ceiling doubles with
/// every failure, starting at `initial` and never exceeding `max`. The actual delay is drawn
/// uniformly from the upper half of the ceiling so that nodes that lost the same server do not
/// all come back at once.
pub(crate) struct Backoff {
    initial: Duration,
    max: Duration,
    consecutive_failures: u32,
}

impl Backoff {
    pub(crate) fn new(initial: Duration, max: Duration) -> Self {
        Backoff {
            initial,
            max,
            consecutive_failures: 0,
        }
    }

    /// Record one more failure and return how long to wait before the next attempt.
    pub(crate) fn next_delay(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let ceiling = self.ceiling();

        rand::thread_rng().gen_range(ceiling / 2..=ceiling)
    }

    pub(crate) fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub(crate) fn set_bounds(&mut self, initial: Duration, max: Duration) {
        self.initial = initial;
        self.max = max;
    }

    pub(crate) fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn ceiling(&self) -> Duration {
        let exponent = cmp::min(self.consecutive_failures.saturating_sub(1), 31);
        let ceiling = self.initial.checked_mul(1 << exponent).unwrap_or(self.max);

        cmp::min(ceiling, self.max)
    }
}
