//! Stored records: nodes, registration vote pools, unbonding entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strato_types::{Address, Description, NodeKind, NodeStatus, NodeType, PubKey, Timestamp};

/// A registered resource or indexing node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Derived from `pub_key`; primary key of the record.
    pub network_address: Address,
    pub pub_key: PubKey,
    pub owner_address: Address,
    pub network_id: String,
    pub description: Description,
    /// Offered services. Only resource nodes carry one.
    pub node_type: Option<NodeType>,
    pub status: NodeStatus,
    /// Escrowed stake, in the bond denomination.
    pub tokens: u128,
    pub suspended: bool,
    pub creation_time: Timestamp,
    /// Set while the node is Unbonding.
    pub unbonding_completion: Option<Timestamp>,
}

impl Node {
    pub fn is_bonded(&self) -> bool {
        self.status == NodeStatus::Bonded
    }

    pub fn is_active(&self) -> bool {
        self.is_bonded() && !self.suspended
    }

    pub fn moniker(&self) -> &str {
        &self.description.moniker
    }
}

/// Open admission vote for one indexing-node candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationVotePool {
    pub candidate_network_address: Address,
    pub candidate_owner_address: Address,
    /// Voter network address → approve (`true`) or reject (`false`).
    pub votes: BTreeMap<Address, bool>,
    pub expiry: Timestamp,
}

impl RegistrationVotePool {
    pub fn new(candidate: Address, owner: Address, expiry: Timestamp) -> Self {
        Self {
            candidate_network_address: candidate,
            candidate_owner_address: owner,
            votes: BTreeMap::new(),
            expiry,
        }
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.votes.contains_key(voter)
    }

    pub fn approvals(&self) -> u64 {
        self.votes.values().filter(|v| **v).count() as u64
    }

    pub fn rejections(&self) -> u64 {
        self.votes.values().filter(|v| !**v).count() as u64
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expiry
    }
}

/// A removal waiting for its completion time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingEntry {
    pub kind: NodeKind,
    pub network_address: Address,
    pub owner_address: Address,
    pub amount: u128,
    pub completion_time: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_counts_and_expiry() {
        let mut pool = RegistrationVotePool::new(
            Address::new([1; 20]),
            Address::new([2; 20]),
            Timestamp::new(100),
        );
        pool.votes.insert(Address::new([3; 20]), true);
        pool.votes.insert(Address::new([4; 20]), false);
        pool.votes.insert(Address::new([5; 20]), true);
        assert_eq!(pool.approvals(), 2);
        assert_eq!(pool.rejections(), 1);
        assert!(pool.has_voted(&Address::new([4; 20])));
        assert!(!pool.is_expired(Timestamp::new(100)));
        assert!(pool.is_expired(Timestamp::new(101)));
    }
}
