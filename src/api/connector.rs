use crate::selection::{CandidateName, ReplicaDescriptor};
use std::error::Error;

/// Connector is the seam to the transport layer. The broker decides *where* to connect; the
/// connector does the actual handshake and then owns the connection. When an established
/// connection later drops, the transport reports it through `Broker::connection_lost()`.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, candidate: &CandidateName, descriptor: &ReplicaDescriptor) -> Result<(), ConnectError>;

    /// Called when the broker no longer wants a connection it got from `connect()`: the server
    /// left the topology, or the connection was made for an attempt that had already been given up on.
    async fn disconnect(&self, _candidate: &CandidateName) {}
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("connection refused")]
    Refused,
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("connection attempt timed out")]
    TimedOut,
    #[error("transport failure")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
}
