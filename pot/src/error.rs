use strato_register::RegisterError;
use strato_store::StoreError;
use strato_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PotError {
    #[error("missing reporter address")]
    EmptyReporter,

    #[error("no node reports volume")]
    NoNodeVolumes,

    #[error("invalid report epoch {0}")]
    InvalidEpoch(i64),

    #[error("missing report reference hash")]
    EmptyReferenceHash,

    #[error("volume reported for {0} is negative")]
    NegativeVolume(Address),

    #[error("missing node address in volume report")]
    EmptyNodeAddress,

    #[error("{0} is not a registered indexing node")]
    NotSpNode(Address),

    #[error("no volume report for epoch {0}")]
    ReportNotFound(u64),

    #[error("malformed volume report: {0}")]
    Decode(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] RegisterError),
}
