use repl_broker::{
    Advertisement, CandidateName, Csn, GroupId, ReplicaDescriptor, ReplicaId, ReplicaSelector, ReplicationState,
    Selection, SelectionInput, StalenessPolicy, DEFAULT_STALENESS_THRESHOLD,
};
use chrono::Utc;
use slog::Drain;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let logger = create_root_logger_for_stdout();
    let my_replica_id = ReplicaId::new(1);
    let my_group_id = GroupId::try_from(1u32)?;

    // We have published two changes of our own and seen up to ts=40 from replica 2.
    let local_state = ReplicationState::try_from_csns(vec![
        Csn::new(12, 1, my_replica_id),
        Csn::new(40, 0, ReplicaId::new(2)),
    ])?;

    let candidates = fake_topology(my_group_id)?;
    for (name, descriptor) in candidates.iter() {
        slog::info!(
            logger,
            "Candidate {} (group {}, local {}) advertises {:?}",
            name,
            descriptor.group_id(),
            descriptor.is_local(),
            descriptor.advertised_state()
        );
    }

    let selector = ReplicaSelector::new(StalenessPolicy::new(DEFAULT_STALENESS_THRESHOLD));
    let selection = selector.select(&SelectionInput {
        local_state: &local_state,
        my_replica_id,
        my_group_id,
        candidates: &candidates,
    });

    match selection {
        Selection::Chosen(name) => slog::info!(logger, "Selected replication server {}", name),
        Selection::NoEligibleCandidate => slog::warn!(logger, "No replication server to connect to"),
    }

    Ok(())
}

// Three servers in our group: one local but a little behind, one remote and most advanced, and one
// remote that hasn't seen our latest change yet. The remote servers arrive as encoded hello messages.
fn fake_topology(group_id: GroupId) -> Result<HashMap<CandidateName, ReplicaDescriptor>, Box<dyn Error>> {
    let mut candidates = HashMap::new();

    let local = ReplicaDescriptor::new(state(12, 1, 37)?, group_id, true);
    candidates.insert(CandidateName::from("localhost:8989"), local);

    for (url, my_csn, their_ts) in vec![("rs-east:8989", (12, 1), 41), ("rs-west:8989", (11, 0), 90)] {
        let hello = Advertisement {
            name: CandidateName::from(url),
            server_id: 0,
            base_dn: "dc=example,dc=com".to_string(),
            window_size: 100,
            generation_id: 1,
            ssl_encryption: true,
            degraded_status_threshold: 5000,
            descriptor: ReplicaDescriptor::new(state(my_csn.0, my_csn.1, their_ts)?, group_id, false),
        }
        .encode()?;

        let (name, descriptor) = Advertisement::decode(hello, false)?.into_parts();
        candidates.insert(name, descriptor);
    }

    Ok(candidates)
}

fn state(my_ts: u64, my_seq: u32, other_ts: u64) -> Result<ReplicationState, Box<dyn Error>> {
    let state = ReplicationState::try_from_csns(vec![
        Csn::new(my_ts, my_seq, ReplicaId::new(1)),
        Csn::new(other_ts, 0, ReplicaId::new(2)),
    ])?;

    Ok(state)
}

fn create_root_logger_for_stdout() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("StartedAt" => Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()))
}
