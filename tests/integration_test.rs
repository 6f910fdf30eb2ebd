use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use repl_broker::{
    Advertisement, BrokerConfig, BrokerCreationError, BrokerEvent, BrokerEventListener, BrokerOptions,
    CandidateName, ConnectError, Connector, Csn, GroupId, LocalChangeError, ReconfigureError, ReplicaDescriptor, ReplicaId,
    ReplicationState, ResultCode, Selection,
};
use slog::Drain;
use std::convert::TryFrom;
use std::error::Error;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};

const ME: u32 = 1;

#[tokio::test]
async fn reconnects_to_best_server_after_connection_loss() -> Result<(), Box<dyn Error>> {
    let connector = Arc::new(InMemoryConnector::default());
    let broker = repl_broker::try_create_broker(config(connector.clone()))?;
    let mut events = broker.events();

    // First server to show up gets the connection.
    broker.advertise(name("rs1:8989"), remote(0, 10)).await?;
    wait_for_event(&mut events, BrokerEvent::Connected(name("rs1:8989"))).await;

    // A better one doesn't steal it.
    broker.advertise(name("rs2:8989"), remote(0, 100)).await?;
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("rs2:8989")));
    assert_eq!(events.current(), BrokerEvent::Connected(name("rs1:8989")));

    // Until the connection drops.
    broker.connection_lost(name("rs1:8989")).await?;
    wait_for_event(&mut events, BrokerEvent::Connected(name("rs2:8989"))).await;

    assert_eq!(connector.connected(), vec![name("rs1:8989"), name("rs2:8989")]);

    Ok(())
}

#[tokio::test]
async fn hello_messages_feed_the_topology() -> Result<(), Box<dyn Error>> {
    let connector = Arc::new(InMemoryConnector::default());
    connector.refuse_all();
    let broker = repl_broker::try_create_broker(config(connector.clone()))?;

    let local = hello("localhost:8989", remote_state(0, 97), true).encode()?;
    let far = hello("rs-far:8989", remote_state(0, 100), false).encode()?;
    broker.receive_hello(far, false).await?;
    broker.receive_hello(local, true).await?;

    // Local one trails by 3, within the default threshold.
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("localhost:8989")));

    // Garbage is rejected without hurting the broker.
    assert!(broker.receive_hello(Bytes::from_static(&[0xFF, 0xFF]), false).await.is_err());
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("localhost:8989")));

    Ok(())
}

#[tokio::test]
async fn local_changes_demote_servers_missing_them() -> Result<(), Box<dyn Error>> {
    let connector = Arc::new(InMemoryConnector::default());
    connector.refuse_all();
    let broker = repl_broker::try_create_broker(config(connector))?;

    broker.advertise(name("rs1:8989"), remote(3, 100)).await?;
    broker.advertise(name("rs2:8989"), remote(4, 50)).await?;
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("rs1:8989")));

    broker.record_local_change(Csn::new(4, 0, ReplicaId::new(ME))).await?;
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("rs2:8989")));

    broker.candidate_lost(name("rs2:8989")).await?;
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("rs1:8989")));

    broker.candidate_lost(name("rs1:8989")).await?;
    assert_eq!(broker.current_selection().await?, Selection::NoEligibleCandidate);

    Ok(())
}

#[tokio::test]
async fn local_change_from_reserved_replica_is_rejected() -> Result<(), Box<dyn Error>> {
    let connector = Arc::new(InMemoryConnector::default());
    connector.refuse_all();
    let broker = repl_broker::try_create_broker(config(connector))?;
    broker.advertise(name("rs1:8989"), remote(0, 100)).await?;

    let result = broker.record_local_change(Csn::new(9, 0, ReplicaId::new(0))).await;

    assert!(matches!(result, Err(LocalChangeError::ReservedReplicaId)));
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("rs1:8989")));

    Ok(())
}

#[tokio::test]
async fn reconfigure() -> Result<(), Box<dyn Error>> {
    let connector = Arc::new(InMemoryConnector::default());
    connector.refuse_all();
    let broker = repl_broker::try_create_broker(config(connector))?;

    let local = ReplicaDescriptor::new(remote_state(0, 96), group(1), true);
    broker.advertise(name("localhost:8989"), local).await?;
    broker.advertise(name("rs-far:8989"), remote(0, 100)).await?;
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("localhost:8989")));

    // Rejected as a whole, nothing applied.
    let result = broker
        .reconfigure(BrokerOptions {
            staleness_threshold: Some(0),
            initial_backoff: Some(Duration::from_secs(0)),
            connect_timeout: Some(Duration::from_secs(0)),
            ..BrokerOptions::default()
        })
        .await;
    match result {
        Err(ReconfigureError::Unacceptable(reasons)) => assert_eq!(reasons.len(), 2),
        other => panic!("Unexpected result {:?}", other),
    }
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("localhost:8989")));

    // Accepted and applied live.
    let result = broker
        .reconfigure(BrokerOptions {
            staleness_threshold: Some(3),
            ..BrokerOptions::default()
        })
        .await?;
    assert_eq!(result.result_code, ResultCode::Success);
    assert!(!result.admin_action_required);
    assert_eq!(broker.current_selection().await?, Selection::Chosen(name("rs-far:8989")));

    Ok(())
}

#[tokio::test]
async fn creation_is_validated() {
    let connector: Arc<dyn Connector> = Arc::new(InMemoryConnector::default());

    let mut bad_group = config(connector.clone());
    bad_group.my_group_id = 128;
    assert!(matches!(
        repl_broker::try_create_broker(bad_group),
        Err(BrokerCreationError::InvalidGroupId(_))
    ));

    let mut bad_replica = config(connector.clone());
    bad_replica.my_replica_id = 0;
    assert!(matches!(
        repl_broker::try_create_broker(bad_replica),
        Err(BrokerCreationError::ReservedReplicaId)
    ));

    let mut duplicate = config(connector.clone());
    duplicate.initial_state = vec![
        Csn::new(1, 0, ReplicaId::new(2)),
        Csn::new(2, 0, ReplicaId::new(2)),
    ];
    assert!(matches!(
        repl_broker::try_create_broker(duplicate),
        Err(BrokerCreationError::InvalidInitialState(_))
    ));

    let mut bad_options = config(connector);
    bad_options.options.max_backoff = Some(Duration::from_millis(1));
    assert!(matches!(
        repl_broker::try_create_broker(bad_options),
        Err(BrokerCreationError::IllegalBrokerOptions(_))
    ));
}

#[tokio::test]
async fn dropping_broker_ends_event_stream() -> Result<(), Box<dyn Error>> {
    let connector = Arc::new(InMemoryConnector::default());
    let broker = repl_broker::try_create_broker(config(connector))?;
    let mut events = broker.events();

    drop(broker);

    let next = tokio::time::timeout(Duration::from_secs(5), events.next_event())
        .await
        .expect("Broker did not shut down");
    assert_eq!(next, None);

    Ok(())
}

// ------- Helpers --------

#[derive(Default)]
struct InMemoryConnector {
    refuse_all: Mutex<bool>,
    connected: Mutex<Vec<CandidateName>>,
}

impl InMemoryConnector {
    fn refuse_all(&self) {
        *self.refuse_all.lock().unwrap() = true;
    }

    fn connected(&self) -> Vec<CandidateName> {
        self.connected.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn connect(&self, candidate: &CandidateName, _: &ReplicaDescriptor) -> Result<(), ConnectError> {
        if *self.refuse_all.lock().unwrap() {
            return Err(ConnectError::Refused);
        }
        self.connected.lock().unwrap().push(candidate.clone());
        Ok(())
    }
}

fn config(connector: Arc<dyn Connector>) -> BrokerConfig {
    BrokerConfig {
        my_replica_id: ME,
        my_group_id: 1,
        initial_state: Vec::new(),
        connector,
        info_logger: create_root_logger_for_stdout(ME),
        options: options(),
    }
}

fn options() -> BrokerOptions {
    BrokerOptions {
        refresh_interval: Some(Duration::from_millis(50)),
        initial_backoff: Some(Duration::from_millis(10)),
        max_backoff: Some(Duration::from_millis(100)),
        ..BrokerOptions::default()
    }
}

fn name(name: &str) -> CandidateName {
    CandidateName::from(name)
}

fn group(id: u32) -> GroupId {
    GroupId::try_from(id).unwrap()
}

// State of a server that has seen `my_ts` of our changes and `other_ts` of replica 2's.
fn remote_state(my_ts: u64, other_ts: u64) -> ReplicationState {
    ReplicationState::try_from_csns(vec![
        Csn::new(my_ts, 0, ReplicaId::new(ME)),
        Csn::new(other_ts, 0, ReplicaId::new(2)),
    ])
    .unwrap()
}

fn remote(my_ts: u64, other_ts: u64) -> ReplicaDescriptor {
    ReplicaDescriptor::new(remote_state(my_ts, other_ts), group(1), false)
}

fn hello(url: &str, state: ReplicationState, is_local: bool) -> Advertisement {
    Advertisement {
        name: name(url),
        server_id: 7,
        base_dn: "dc=example,dc=com".to_string(),
        window_size: 100,
        generation_id: 1,
        ssl_encryption: false,
        degraded_status_threshold: 5000,
        descriptor: ReplicaDescriptor::new(state, group(1), is_local),
    }
}

async fn wait_for_event(events: &mut BrokerEventListener, expected: BrokerEvent) {
    let deadline = Instant::now() + Duration::from_secs(5);

    while events.current() != expected {
        tokio::time::timeout_at(deadline, events.next_event())
            .await
            .unwrap_or_else(|_| panic!("Timeout waiting for {:?}", expected))
            .expect("Expected broker to be alive");
    }
}

#[allow(dead_code)]
fn create_root_logger_for_file(directory_prefix: String, replica_id: u32) -> slog::Logger {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let log_path = format!("{}/broker_{}_{}.log", directory_prefix, replica_id, now);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .unwrap();

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!())
}

fn create_root_logger_for_stdout(replica_id: u32) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("Test" => format!("replica-{}", replica_id)))
}
