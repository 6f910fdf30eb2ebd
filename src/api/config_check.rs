/// ConfigPhase names the step of the configuration lifecycle a check runs in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigPhase {
    /// Building a broker from scratch.
    Init,
    /// Deciding whether a proposed change can be accepted at all.
    Acceptable,
    /// Applying an accepted change to a running broker.
    Apply,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResultCode {
    Success,
    ConstraintViolation,
    UnwillingToPerform,
    Other,
}

/// ConfigErrorHandler accumulates configuration problems so that one pass reports every problem
/// instead of stopping at the first. Where a message lands depends on the phase.
#[derive(Debug)]
pub struct ConfigErrorHandler {
    phase: ConfigPhase,
    // Only filled during `Acceptable`.
    unacceptable_reasons: Vec<String>,
    // Filled during `Init` and `Apply`.
    error_messages: Vec<String>,
    result_code: ResultCode,
    is_acceptable: bool,
    is_admin_action_required: bool,
}

/// What applying a configuration change to a running broker resulted in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigChangeResult {
    pub result_code: ResultCode,
    pub admin_action_required: bool,
    pub messages: Vec<String>,
}

impl ConfigErrorHandler {
    pub fn new(phase: ConfigPhase) -> Self {
        ConfigErrorHandler {
            phase,
            unacceptable_reasons: Vec::new(),
            error_messages: Vec::new(),
            result_code: ResultCode::Success,
            is_acceptable: true,
            is_admin_action_required: false,
        }
    }

    /// Report a problem. Acceptability is sticky: once anything is reported as unacceptable, the
    /// whole configuration is. In `Apply`, the first non-success result code wins.
    pub fn report_error<S: Into<String>>(&mut self, error: S, is_acceptable: bool, result_code: ResultCode) {
        self.report(error.into(), is_acceptable, result_code, false);
    }

    /// Like `report_error()`, but also flags whether an administrator has to step in (e.g. a
    /// restart) for the change to fully take effect. The flag only means something in `Apply`.
    pub fn report_error_with_admin_action<S: Into<String>>(
        &mut self,
        error: S,
        is_acceptable: bool,
        result_code: ResultCode,
        is_admin_action_required: bool,
    ) {
        self.report(error.into(), is_acceptable, result_code, is_admin_action_required);
    }

    fn report(&mut self, error: String, is_acceptable: bool, result_code: ResultCode, admin_action: bool) {
        self.is_acceptable &= is_acceptable;

        match self.phase {
            ConfigPhase::Init => {
                self.error_messages.push(error);
            }
            ConfigPhase::Acceptable => {
                self.unacceptable_reasons.push(error);
            }
            ConfigPhase::Apply => {
                self.error_messages.push(error);
                if self.result_code == ResultCode::Success {
                    self.result_code = result_code;
                }
                self.is_admin_action_required |= admin_action;
            }
        }
    }

    pub fn phase(&self) -> ConfigPhase {
        self.phase
    }

    pub fn is_acceptable(&self) -> bool {
        self.is_acceptable
    }

    pub fn result_code(&self) -> ResultCode {
        self.result_code
    }

    pub fn is_admin_action_required(&self) -> bool {
        self.is_admin_action_required
    }

    pub fn unacceptable_reasons(&self) -> &[String] {
        &self.unacceptable_reasons
    }

    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Every reported message regardless of which list it went to.
    pub(crate) fn into_messages(self) -> Vec<String> {
        let mut messages = self.error_messages;
        messages.extend(self.unacceptable_reasons);
        messages
    }

    pub(crate) fn into_change_result(self) -> ConfigChangeResult {
        ConfigChangeResult {
            result_code: self.result_code,
            admin_action_required: self.is_admin_action_required,
            messages: self.error_messages,
        }
    }
}
