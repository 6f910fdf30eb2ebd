use crate::api::config_check::{ConfigErrorHandler, ConfigPhase, ResultCode};
use crate::selection::DEFAULT_STALENESS_THRESHOLD;
use std::convert::TryFrom;
use tokio::time::Duration;

/// Tunables of the broker. Anything left as `None` falls back to a default.
#[derive(Clone, Debug, Default)]
pub struct BrokerOptions {
    /// How far (in summed CSN timestamps) a local replication server may trail the most advanced
    /// one and still be preferred.
    pub staleness_threshold: Option<u64>,
    /// How often selection is re-run even if nothing was reported.
    pub refresh_interval: Option<Duration>,
    pub initial_backoff: Option<Duration>,
    pub max_backoff: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub event_queue_size: Option<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct BrokerOptionsValidated {
    pub staleness_threshold: u64,
    pub refresh_interval: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub connect_timeout: Duration,
    pub event_queue_size: usize,
}

impl BrokerOptionsValidated {
    fn with_defaults(options: BrokerOptions) -> Self {
        Self::merged_over(
            &BrokerOptionsValidated {
                staleness_threshold: DEFAULT_STALENESS_THRESHOLD,
                refresh_interval: Duration::from_millis(1000),
                initial_backoff: Duration::from_millis(100),
                max_backoff: Duration::from_secs(30),
                connect_timeout: Duration::from_secs(5),
                event_queue_size: 32,
            },
            options,
        )
    }

    // Fields left as `None` keep the value from `base`.
    fn merged_over(base: &BrokerOptionsValidated, options: BrokerOptions) -> Self {
        BrokerOptionsValidated {
            staleness_threshold: options.staleness_threshold.unwrap_or(base.staleness_threshold),
            refresh_interval: options.refresh_interval.unwrap_or(base.refresh_interval),
            initial_backoff: options.initial_backoff.unwrap_or(base.initial_backoff),
            max_backoff: options.max_backoff.unwrap_or(base.max_backoff),
            connect_timeout: options.connect_timeout.unwrap_or(base.connect_timeout),
            event_queue_size: options.event_queue_size.unwrap_or(base.event_queue_size),
        }
    }

    fn validate(&self, handler: &mut ConfigErrorHandler) {
        if self.refresh_interval == Duration::from_secs(0) {
            handler.report_error(
                "Refresh interval must be greater than zero",
                false,
                ResultCode::ConstraintViolation,
            );
        }
        if self.initial_backoff == Duration::from_secs(0) {
            handler.report_error(
                "Initial backoff must be greater than zero",
                false,
                ResultCode::ConstraintViolation,
            );
        }
        if self.initial_backoff > self.max_backoff {
            handler.report_error(
                "Initial backoff must not exceed maximum backoff",
                false,
                ResultCode::ConstraintViolation,
            );
        }
        if self.connect_timeout == Duration::from_secs(0) {
            handler.report_error(
                "Connect timeout must be greater than zero",
                false,
                ResultCode::ConstraintViolation,
            );
        }
        if self.event_queue_size == 0 {
            handler.report_error(
                "Event queue size must be greater than zero",
                false,
                ResultCode::ConstraintViolation,
            );
        }
    }

    /// Overlay a requested change on the options a broker is currently running with, then check
    /// the result as a whole.
    pub(crate) fn check_change(&self, options: BrokerOptions) -> Result<Self, Vec<String>> {
        Self::merged_over(self, options).checked(ConfigPhase::Acceptable)
    }

    // On failure, returns every reported problem.
    fn checked(self, phase: ConfigPhase) -> Result<Self, Vec<String>> {
        let mut handler = ConfigErrorHandler::new(phase);
        self.validate(&mut handler);

        if handler.is_acceptable() {
            Ok(self)
        } else {
            Err(handler.into_messages())
        }
    }
}

impl TryFrom<BrokerOptions> for BrokerOptionsValidated {
    type Error = Vec<String>;

    fn try_from(options: BrokerOptions) -> Result<Self, Self::Error> {
        Self::with_defaults(options).checked(ConfigPhase::Init)
    }
}
