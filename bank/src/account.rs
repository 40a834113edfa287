//! Balance-holding account identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use strato_types::{Address, NodeKind};

/// The four module pools that escrow stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PoolId {
    ResourceBonded,
    ResourceNotBonded,
    IndexingBonded,
    IndexingNotBonded,
}

impl PoolId {
    pub const ALL: [PoolId; 4] = [
        PoolId::ResourceBonded,
        PoolId::ResourceNotBonded,
        PoolId::IndexingBonded,
        PoolId::IndexingNotBonded,
    ];

    pub fn bonded(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Resource => Self::ResourceBonded,
            NodeKind::Indexing => Self::IndexingBonded,
        }
    }

    pub fn not_bonded(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Resource => Self::ResourceNotBonded,
            NodeKind::Indexing => Self::IndexingNotBonded,
        }
    }

    pub fn is_bonded(&self) -> bool {
        matches!(self, Self::ResourceBonded | Self::IndexingBonded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceBonded => "resource_bonded_pool",
            Self::ResourceNotBonded => "resource_not_bonded_pool",
            Self::IndexingBonded => "indexing_bonded_pool",
            Self::IndexingNotBonded => "indexing_not_bonded_pool",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::ResourceBonded => 1,
            Self::ResourceNotBonded => 2,
            Self::IndexingBonded => 3,
            Self::IndexingNotBonded => 4,
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either an operator's account or one of the module pools.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountId {
    Owner(Address),
    Pool(PoolId),
}

impl AccountId {
    /// Stable byte form used in storage keys.
    pub fn key_bytes(&self) -> Vec<u8> {
        match self {
            Self::Owner(addr) => {
                let mut out = Vec::with_capacity(1 + addr.as_bytes().len());
                out.push(0x01);
                out.extend_from_slice(addr.as_bytes());
                out
            }
            Self::Pool(pool) => vec![0x02, pool.tag()],
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner(addr) => write!(f, "{}", addr),
            Self::Pool(pool) => write!(f, "{}", pool),
        }
    }
}

impl From<PoolId> for AccountId {
    fn from(pool: PoolId) -> Self {
        Self::Pool(pool)
    }
}
