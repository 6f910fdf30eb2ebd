use crate::replication::{Csn, InvalidStateError, ReplicaId, ReplicationState};
use crate::selection::{CandidateName, GroupId, InvalidGroupId, ReplicaDescriptor};
use crate::topology::wire::{ProtoCsn, ProtoReplServerHello};
use bytes::{Bytes, BytesMut};
use prost::Message;
use std::convert::TryFrom;

/// Advertisement is a decoded and validated replication server hello message. Only the candidate
/// name and the descriptor matter for selection; the rest is kept for the transport layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Advertisement {
    pub name: CandidateName,
    pub server_id: u32,
    pub base_dn: String,
    pub window_size: u32,
    pub generation_id: u64,
    pub ssl_encryption: bool,
    pub degraded_status_threshold: u32,
    pub descriptor: ReplicaDescriptor,
}

#[derive(Debug, thiserror::Error)]
pub enum AdvertisementError {
    #[error("malformed hello message: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("failed to encode hello message: {0}")]
    Encode(#[from] prost::EncodeError),
    #[error("hello message has no server url")]
    MissingServerUrl,
    #[error(transparent)]
    InvalidGroupId(#[from] InvalidGroupId),
    #[error("invalid advertised state: {0}")]
    InvalidState(#[from] InvalidStateError),
}

impl Advertisement {
    /// Decode a hello message. `is_local` is not on the wire: the caller knows whether the sender
    /// shares our host/process group.
    pub fn decode(bytes: Bytes, is_local: bool) -> Result<Self, AdvertisementError> {
        let proto = ProtoReplServerHello::decode(bytes)?;
        Self::try_from_proto(proto, is_local)
    }

    pub fn encode(&self) -> Result<Bytes, AdvertisementError> {
        let proto = ProtoReplServerHello::from(self);
        let mut buf = BytesMut::with_capacity(proto.encoded_len());
        proto.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    pub fn into_parts(self) -> (CandidateName, ReplicaDescriptor) {
        (self.name, self.descriptor)
    }

    fn try_from_proto(proto: ProtoReplServerHello, is_local: bool) -> Result<Self, AdvertisementError> {
        if proto.server_url.is_empty() {
            return Err(AdvertisementError::MissingServerUrl);
        }

        let group_id = GroupId::try_from(proto.group_id)?;
        let advertised_state = ReplicationState::try_from_csns(proto.server_state.into_iter().map(|proto_csn| {
            Csn::new(
                proto_csn.timestamp,
                proto_csn.sequence,
                ReplicaId::new(proto_csn.replica_id),
            )
        }))?;

        Ok(Advertisement {
            name: CandidateName::new(proto.server_url),
            server_id: proto.server_id,
            base_dn: proto.base_dn,
            window_size: proto.window_size,
            generation_id: proto.generation_id,
            ssl_encryption: proto.ssl_encryption,
            degraded_status_threshold: proto.degraded_status_threshold,
            descriptor: ReplicaDescriptor::new(advertised_state, group_id, is_local),
        })
    }
}

impl From<&Advertisement> for ProtoReplServerHello {
    fn from(advertisement: &Advertisement) -> Self {
        ProtoReplServerHello {
            server_id: advertisement.server_id,
            server_url: advertisement.name.as_str().to_string(),
            base_dn: advertisement.base_dn.clone(),
            window_size: advertisement.window_size,
            server_state: advertisement
                .descriptor
                .advertised_state()
                .iter()
                .map(|csn| ProtoCsn {
                    replica_id: csn.replica_id().as_u32(),
                    timestamp: csn.timestamp(),
                    sequence: csn.sequence(),
                })
                .collect(),
            generation_id: advertisement.generation_id,
            ssl_encryption: advertisement.ssl_encryption,
            group_id: u32::from(advertisement.descriptor.group_id().as_u8()),
            degraded_status_threshold: advertisement.degraded_status_threshold,
        }
    }
}
