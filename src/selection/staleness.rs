/// Default tolerance, in units of the advancement score (sum of CSN timestamps). It is a
/// calibration point rather than a derived constant: deployments whose CSN timestamps are
/// milliseconds will usually want something much larger.
pub const DEFAULT_STALENESS_THRESHOLD: u64 = 5;

/// StalenessPolicy bounds how much freshness a local replication server may give up before its
/// locality stops mattering.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StalenessPolicy {
    threshold: u64,
}

impl StalenessPolicy {
    pub fn new(threshold: u64) -> Self {
        StalenessPolicy { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// True if a local candidate at `local_advancement` is close enough to the most advanced
    /// candidate (`best_advancement`) to be preferred over it.
    pub fn tolerates(&self, best_advancement: u128, local_advancement: u128) -> bool {
        best_advancement.saturating_sub(local_advancement) <= u128::from(self.threshold)
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        StalenessPolicy::new(DEFAULT_STALENESS_THRESHOLD)
    }
}
