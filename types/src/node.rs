//! Node kinds, service types and lifecycle states.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of registered participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Capacity provider.
    Resource,
    /// Directory/coordination provider, admitted by peer vote.
    Indexing,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Indexing => "indexing",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Services a resource node offers. Bitmask of computation (1), database (2)
/// and storage (4); every non-empty combination is a distinct value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum NodeType {
    Computation = 1,
    Database = 2,
    DatabaseComputation = 3,
    Storage = 4,
    StorageComputation = 5,
    StorageDatabase = 6,
    All = 7,
}

impl NodeType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn provides_storage(self) -> bool {
        self.as_u8() & 4 != 0
    }
}

impl TryFrom<u8> for NodeType {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Computation),
            2 => Ok(Self::Database),
            3 => Ok(Self::DatabaseComputation),
            4 => Ok(Self::Storage),
            5 => Ok(Self::StorageComputation),
            6 => Ok(Self::StorageDatabase),
            7 => Ok(Self::All),
            other => Err(TypesError::InvalidNodeType(other)),
        }
    }
}

impl From<NodeType> for u8 {
    fn from(t: NodeType) -> u8 {
        t.as_u8()
    }
}

/// Lifecycle state of a node record.
///
/// Resource nodes move `Unbonded → Bonding → Bonded → Unbonding`; indexing
/// nodes move `Candidate → Bonded → Unbonding`, or `Candidate → Removed`
/// when their candidacy is rejected or expires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    Unbonded,
    Bonding,
    Candidate,
    Bonded,
    Unbonding,
    Removed,
}

impl NodeStatus {
    /// Whether the node's stake is still escrowed and may be unbonded.
    pub fn is_removable(&self) -> bool {
        matches!(self, Self::Bonding | Self::Candidate | Self::Bonded)
    }

    /// Whether the node's tokens sit in the kind's bonded pool.
    pub fn in_bonded_pool(&self) -> bool {
        matches!(self, Self::Bonded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbonded => "Unbonded",
            Self::Bonding => "Bonding",
            Self::Candidate => "Candidate",
            Self::Bonded => "Bonded",
            Self::Unbonding => "Unbonding",
            Self::Removed => "Removed",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
