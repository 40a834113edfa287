//! Registry errors.
//!
//! Every variant has a stable numeric [`RegisterError::code`] for clients
//! and a coarse [`ErrorClass`] for callers that only care about the kind of
//! failure. Codes 1 to 34 keep the numbering the network has always used;
//! later codes were added with this implementation.

use strato_bank::BankError;
use strato_store::StoreError;
use strato_types::{Address, NodeKind, NodeStatus, Timestamp};
use thiserror::Error;

/// Coarse failure taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or missing field, caught before any store access.
    Structural,
    /// Duplicate key or address.
    Conflict,
    /// Referenced node or vote pool does not exist.
    NotFound,
    /// Caller is not the recorded owner.
    Authorization,
    /// Wrong denomination or insufficient balance.
    Economic,
    /// Voting rule violated: duplicate, expired, self-vote, ineligible voter.
    Protocol,
    /// Unknown command type.
    Unrecognized,
    /// Storage or bank failure underneath the registry.
    Internal,
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid: {0}")]
    Invalid(String),

    #[error("missing network address")]
    EmptyNetworkAddr,

    #[error("missing owner address")]
    EmptyOwnerAddr,

    #[error("value must be positive")]
    ValueNotPositive,

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("moniker must not be empty")]
    EmptyMoniker,

    #[error("missing resource node address")]
    EmptyResourceNodeAddr,

    #[error("missing indexing node address")]
    EmptyIndexingNodeAddr,

    #[error("invalid coin denomination: expected {expected}, got {found}")]
    BadDenom { expected: String, found: String },

    #[error("{kind} node already exists for this pubkey (network address {address})")]
    DuplicatePubKey { kind: NodeKind, address: Address },

    #[error("{kind} node {address} does not exist")]
    NodeNotFound { kind: NodeKind, address: Address },

    #[error("insufficient balance in {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        owner: Address,
        needed: u128,
        available: u128,
    },

    #[error("node type {0} not supported")]
    InvalidNodeType(u8),

    #[error("missing candidate network address")]
    EmptyCandidateNetworkAddr,

    #[error("missing candidate owner address")]
    EmptyCandidateOwnerAddr,

    #[error("missing voter network address")]
    EmptyVoterNetworkAddr,

    #[error("missing voter owner address")]
    EmptyVoterOwnerAddr,

    #[error("node address {0} should not be the same as the voter address")]
    SameAddr(Address),

    #[error("invalid owner address {given} for {node}")]
    InvalidOwnerAddr { node: Address, given: Address },

    #[error("invalid voter address {0}: no such indexing node")]
    InvalidApproverAddr(Address),

    #[error("invalid voter status for {address}: {status}, suspended={suspended}")]
    InvalidApproverStatus {
        address: Address,
        status: NodeStatus,
        suspended: bool,
    },

    #[error("registration vote pool for {0} does not exist")]
    NoRegistrationVotePoolFound(Address),

    #[error("{voter} already voted for {candidate}")]
    DuplicateVoting { voter: Address, candidate: Address },

    #[error("vote for {candidate} expired at {expiry}")]
    VoteExpired {
        candidate: Address,
        expiry: Timestamp,
    },

    #[error("insufficient balance of bonded pool: need {needed}, have {available}")]
    InsufficientBalanceOfBondedPool { needed: u128, available: u128 },

    #[error("insufficient balance of not bonded pool: need {needed}, have {available}")]
    InsufficientBalanceOfNotBondedPool { needed: u128, available: u128 },

    #[error("unbond amount {requested} must equal the node's tokens {tokens}")]
    InvalidUnbondAmount { requested: u128, tokens: u128 },

    #[error("unsupported public key: {0}")]
    UnsupportedPubKey(String),

    #[error("missing node id")]
    EmptyNodeId,

    #[error("missing public key")]
    EmptyPubKey,

    #[error("invalid genesis token: {0}")]
    InvalidGenesisToken(String),

    #[error("{caller} is not the owner of {node}")]
    Unauthorized { node: Address, caller: Address },

    #[error("node {address} is {status} and cannot be removed")]
    InvalidNodeStatus { address: Address, status: NodeStatus },

    #[error("unrecognized register command type: {0}")]
    UnrecognizedCommand(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("malformed command: {0}")]
    Decode(String),

    #[error("voter owner address {given} does not own {voter}")]
    InvalidVoterOwnerAddr { voter: Address, given: Address },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("bank error: {0}")]
    Bank(#[from] BankError),
}

impl RegisterError {
    pub fn code(&self) -> u32 {
        match self {
            Self::Invalid(_) => 1,
            Self::EmptyNetworkAddr => 2,
            Self::EmptyOwnerAddr => 3,
            Self::ValueNotPositive => 4,
            Self::EmptyDescription => 5,
            Self::EmptyMoniker => 6,
            Self::EmptyResourceNodeAddr => 7,
            Self::EmptyIndexingNodeAddr => 8,
            Self::BadDenom { .. } => 9,
            Self::DuplicatePubKey {
                kind: NodeKind::Resource,
                ..
            } => 10,
            Self::DuplicatePubKey {
                kind: NodeKind::Indexing,
                ..
            } => 11,
            Self::NodeNotFound {
                kind: NodeKind::Resource,
                ..
            } => 12,
            Self::NodeNotFound {
                kind: NodeKind::Indexing,
                ..
            } => 13,
            Self::InsufficientBalance { .. } => 15,
            Self::InvalidNodeType(_) => 16,
            Self::EmptyCandidateNetworkAddr => 17,
            Self::EmptyCandidateOwnerAddr => 18,
            Self::EmptyVoterNetworkAddr => 19,
            Self::EmptyVoterOwnerAddr => 20,
            Self::SameAddr(_) => 21,
            Self::InvalidOwnerAddr { .. } => 22,
            Self::InvalidApproverAddr(_) => 23,
            Self::InvalidApproverStatus { .. } => 24,
            Self::NoRegistrationVotePoolFound(_) => 25,
            Self::DuplicateVoting { .. } => 26,
            Self::VoteExpired { .. } => 27,
            Self::InsufficientBalanceOfBondedPool { .. } => 28,
            Self::InsufficientBalanceOfNotBondedPool { .. } => 29,
            Self::InvalidUnbondAmount { .. } => 30,
            Self::UnsupportedPubKey(_) => 31,
            Self::EmptyNodeId => 32,
            Self::EmptyPubKey => 33,
            Self::InvalidGenesisToken(_) => 34,
            Self::Unauthorized { .. } => 35,
            Self::InvalidNodeStatus { .. } => 36,
            Self::UnrecognizedCommand(_) => 37,
            Self::InvalidParams(_) => 38,
            Self::Decode(_) => 39,
            Self::InvalidVoterOwnerAddr { .. } => 40,
            Self::InvalidQuery(_) => 41,
            Self::Store(_) => 100,
            Self::Bank(_) => 101,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Invalid(_)
            | Self::EmptyNetworkAddr
            | Self::EmptyOwnerAddr
            | Self::ValueNotPositive
            | Self::EmptyDescription
            | Self::EmptyMoniker
            | Self::EmptyResourceNodeAddr
            | Self::EmptyIndexingNodeAddr
            | Self::InvalidNodeType(_)
            | Self::EmptyCandidateNetworkAddr
            | Self::EmptyCandidateOwnerAddr
            | Self::EmptyVoterNetworkAddr
            | Self::EmptyVoterOwnerAddr
            | Self::UnsupportedPubKey(_)
            | Self::EmptyNodeId
            | Self::EmptyPubKey
            | Self::InvalidParams(_)
            | Self::Decode(_)
            | Self::InvalidQuery(_) => ErrorClass::Structural,

            Self::DuplicatePubKey { .. } => ErrorClass::Conflict,

            Self::NodeNotFound { .. } | Self::NoRegistrationVotePoolFound(_) => {
                ErrorClass::NotFound
            }

            Self::Unauthorized { .. } | Self::InvalidOwnerAddr { .. } => {
                ErrorClass::Authorization
            }

            Self::BadDenom { .. }
            | Self::InsufficientBalance { .. }
            | Self::InsufficientBalanceOfBondedPool { .. }
            | Self::InsufficientBalanceOfNotBondedPool { .. }
            | Self::InvalidUnbondAmount { .. }
            | Self::InvalidGenesisToken(_) => ErrorClass::Economic,

            Self::SameAddr(_)
            | Self::InvalidApproverAddr(_)
            | Self::InvalidApproverStatus { .. }
            | Self::InvalidVoterOwnerAddr { .. }
            | Self::DuplicateVoting { .. }
            | Self::VoteExpired { .. }
            | Self::InvalidNodeStatus { .. } => ErrorClass::Protocol,

            Self::UnrecognizedCommand(_) => ErrorClass::Unrecognized,

            Self::Store(_) | Self::Bank(_) => ErrorClass::Internal,
        }
    }
}
