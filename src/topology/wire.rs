// Wire format of the replication server hello message. Field tags are part of the protocol; only
// ever add fields.

#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct ProtoCsn {
    #[prost(uint32, tag = "1")]
    pub replica_id: u32,
    #[prost(uint64, tag = "2")]
    pub timestamp: u64,
    #[prost(uint32, tag = "3")]
    pub sequence: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct ProtoReplServerHello {
    #[prost(uint32, tag = "1")]
    pub server_id: u32,
    #[prost(string, tag = "2")]
    pub server_url: String,
    #[prost(string, tag = "3")]
    pub base_dn: String,
    #[prost(uint32, tag = "4")]
    pub window_size: u32,
    #[prost(message, repeated, tag = "5")]
    pub server_state: Vec<ProtoCsn>,
    #[prost(uint64, tag = "6")]
    pub generation_id: u64,
    #[prost(bool, tag = "7")]
    pub ssl_encryption: bool,
    #[prost(uint32, tag = "8")]
    pub group_id: u32,
    #[prost(uint32, tag = "9")]
    pub degraded_status_threshold: u32,
}
