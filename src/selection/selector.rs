use crate::replication::{ReplicaId, ReplicationState};
use crate::selection::descriptor::{CandidateName, GroupId, ReplicaDescriptor};
use crate::selection::staleness::StalenessPolicy;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Everything one selection looks at. All of it is borrowed: callers snapshot (or lock) the
/// local state before building the input, and nothing here is mutated.
#[derive(Clone, Copy, Debug)]
pub struct SelectionInput<'a> {
    pub local_state: &'a ReplicationState,
    pub my_replica_id: ReplicaId,
    pub my_group_id: GroupId,
    pub candidates: &'a HashMap<CandidateName, ReplicaDescriptor>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selection {
    Chosen(CandidateName),
    /// Nothing to connect to. Callers should stay disconnected and retry later.
    NoEligibleCandidate,
}

impl Selection {
    pub fn chosen(&self) -> Option<&CandidateName> {
        match self {
            Selection::Chosen(name) => Some(name),
            Selection::NoEligibleCandidate => None,
        }
    }
}

/// ReplicaSelector ranks candidate replication servers. It holds only configuration, so a single
/// instance can be shared and called from any number of threads at once.
///
/// The ranking is lexicographic:
/// 1. Servers in our own group beat servers in other groups.
/// 2. Servers that already have all of our own changes ("caught up") beat servers that don't.
/// 3. Among caught-up servers, the most advanced one wins, except that a local server wins as
///    long as it trails the most advanced one by no more than the staleness threshold.
///    Among late servers, the one missing the fewest of our changes wins, local first on ties.
/// 4. Remaining ties go to the smallest candidate name.
#[derive(Clone, Debug, Default)]
pub struct ReplicaSelector {
    policy: StalenessPolicy,
}

struct Ranked<'a> {
    name: &'a CandidateName,
    is_local: bool,
    // How many of our own changes (as a CSN distance) the candidate has not seen yet.
    missing: u128,
    advancement: u128,
}

impl ReplicaSelector {
    pub fn new(policy: StalenessPolicy) -> Self {
        ReplicaSelector { policy }
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    pub fn select(&self, input: &SelectionInput<'_>) -> Selection {
        let pool = Self::group_pool(input);
        if pool.is_empty() {
            return Selection::NoEligibleCandidate;
        }

        let (caught_up, late): (Vec<Ranked<'_>>, Vec<Ranked<'_>>) = pool
            .into_iter()
            .map(|(name, descriptor)| {
                let missing = input
                    .local_state
                    .compare_component(input.my_replica_id, descriptor.advertised_state())
                    .max(0) as u128;
                Ranked {
                    name,
                    is_local: descriptor.is_local(),
                    missing,
                    advancement: descriptor.advertised_state().advancement(),
                }
            })
            .partition(|ranked| ranked.missing == 0);

        let winner = if caught_up.is_empty() {
            Self::least_missing(&late)
        } else {
            self.most_advanced(&caught_up)
        };

        match winner {
            Some(ranked) => Selection::Chosen(ranked.name.clone()),
            // Unreachable with a non-empty pool, but stay total.
            None => Selection::NoEligibleCandidate,
        }
    }

    /// Our own group if anyone from it is reachable, otherwise everybody else.
    fn group_pool<'a>(input: &SelectionInput<'a>) -> Vec<(&'a CandidateName, &'a ReplicaDescriptor)> {
        let (same_group, other_group): (Vec<_>, Vec<_>) = input
            .candidates
            .iter()
            .partition(|(_, descriptor)| descriptor.group_id() == input.my_group_id);

        if same_group.is_empty() {
            other_group
        } else {
            same_group
        }
    }

    fn most_advanced<'r, 'a>(&self, caught_up: &'r [Ranked<'a>]) -> Option<&'r Ranked<'a>> {
        let best = caught_up.iter().max_by(|a, b| Self::by_advancement(a, b))?;
        let best_local = caught_up
            .iter()
            .filter(|ranked| ranked.is_local)
            .max_by(|a, b| Self::by_advancement(a, b));

        match best_local {
            Some(local) if self.policy.tolerates(best.advancement, local.advancement) => Some(local),
            _ => Some(best),
        }
    }

    fn least_missing<'r, 'a>(late: &'r [Ranked<'a>]) -> Option<&'r Ranked<'a>> {
        late.iter().min_by(|a, b| {
            a.missing
                .cmp(&b.missing)
                // Local sorts first among equals.
                .then_with(|| b.is_local.cmp(&a.is_local))
                .then_with(|| a.name.cmp(b.name))
        })
    }

    // Greater advancement is greater. On equal advancement the smaller name is "greater", so
    // `max_by` lands on it.
    fn by_advancement(a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
        a.advancement
            .cmp(&b.advancement)
            .then_with(|| b.name.cmp(a.name))
    }
}
