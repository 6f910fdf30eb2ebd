mod refresh_timer;
mod time;

pub(crate) use refresh_timer::spawn_retry_timer;
pub(crate) use refresh_timer::RefreshTimerTask;
pub(crate) use time::Clock;
pub(crate) use time::RealClock;

#[cfg(test)]
pub(crate) use time::{mocked_clock, MockClock, MockClockController};
