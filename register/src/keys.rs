//! Store key layout.
//!
//! | prefix | key | value |
//! |---|---|---|
//! | `0x11` | network address | resource [`Node`](crate::Node) |
//! | `0x12` | network address | indexing [`Node`](crate::Node) |
//! | `0x21` | candidate address | [`RegistrationVotePool`](crate::RegistrationVotePool) |
//! | `0x31` | completion time (BE) · kind · address | [`UnbondingEntry`](crate::UnbondingEntry) |
//! | `0x32` | network address | empty; resource node awaiting settlement |
//! | `0x41` | (none) | [`RegisterParams`](crate::RegisterParams) |

use strato_types::{Address, NodeKind, Timestamp};

pub const RESOURCE_NODE_PREFIX: u8 = 0x11;
pub const INDEXING_NODE_PREFIX: u8 = 0x12;
pub const VOTE_POOL_PREFIX: u8 = 0x21;
pub const UNBONDING_QUEUE_PREFIX: u8 = 0x31;
pub const SETTLEMENT_QUEUE_PREFIX: u8 = 0x32;
pub const PARAMS_KEY: &[u8] = &[0x41];

fn kind_tag(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Resource => 0x01,
        NodeKind::Indexing => 0x02,
    }
}

pub fn node_prefix(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Resource => RESOURCE_NODE_PREFIX,
        NodeKind::Indexing => INDEXING_NODE_PREFIX,
    }
}

fn prefixed(prefix: u8, addr: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + addr.as_bytes().len());
    key.push(prefix);
    key.extend_from_slice(addr.as_bytes());
    key
}

pub fn node_key(kind: NodeKind, addr: &Address) -> Vec<u8> {
    prefixed(node_prefix(kind), addr)
}

pub fn vote_pool_key(candidate: &Address) -> Vec<u8> {
    prefixed(VOTE_POOL_PREFIX, candidate)
}

pub fn settlement_key(addr: &Address) -> Vec<u8> {
    prefixed(SETTLEMENT_QUEUE_PREFIX, addr)
}

pub fn unbonding_key(completion: Timestamp, kind: NodeKind, addr: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + 1 + addr.as_bytes().len());
    key.push(UNBONDING_QUEUE_PREFIX);
    key.extend_from_slice(&completion.to_be_bytes());
    key.push(kind_tag(kind));
    key.extend_from_slice(addr.as_bytes());
    key
}

/// Completion time encoded in an unbonding queue key.
pub fn unbonding_key_time(key: &[u8]) -> Option<Timestamp> {
    let bytes: [u8; 8] = key.get(1..9)?.try_into().ok()?;
    Some(Timestamp::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbonding_keys_sort_by_time() {
        let a = Address::new([0xFF; 20]);
        let b = Address::new([0x00; 20]);
        let early = unbonding_key(Timestamp::new(10), NodeKind::Indexing, &a);
        let late = unbonding_key(Timestamp::new(11), NodeKind::Resource, &b);
        assert!(early < late);
        assert_eq!(unbonding_key_time(&late), Some(Timestamp::new(11)));
    }

    #[test]
    fn node_tables_are_disjoint() {
        let a = Address::new([7; 20]);
        assert_ne!(
            node_key(NodeKind::Resource, &a),
            node_key(NodeKind::Indexing, &a)
        );
        assert_eq!(node_key(NodeKind::Resource, &a).len(), 21);
    }
}
