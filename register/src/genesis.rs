//! Genesis import and export.
//!
//! A genesis document carries the whole registry: nodes in every status,
//! open admission votes and the unbonding queue. Loading it back with
//! [`Keeper::init_genesis`] reproduces the state [`Keeper::export_genesis`]
//! read, provided the four pools are funded with [`GenesisState::pool_balances`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strato_bank::{BalanceMover, PoolId};
use strato_crypto::{address_from_pubkey, validate_node_pubkey};
use strato_store::{decode, encode, KvStore};
use strato_types::{NodeKind, NodeStatus};

use crate::error::RegisterError;
use crate::keeper::Keeper;
use crate::keys;
use crate::node::{Node, RegistrationVotePool, UnbondingEntry};
use crate::params::RegisterParams;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub params: RegisterParams,
    #[serde(default)]
    pub resource_nodes: Vec<Node>,
    #[serde(default)]
    pub indexing_nodes: Vec<Node>,
    /// One per indexing Candidate.
    #[serde(default)]
    pub vote_pools: Vec<RegistrationVotePool>,
    /// One per Unbonding node, in queue order.
    #[serde(default)]
    pub unbondings: Vec<UnbondingEntry>,
}

impl GenesisState {
    /// Checks that need no store: params, node shape, key uniqueness and
    /// agreement between nodes, vote pools and unbonding entries.
    pub fn validate(&self) -> Result<(), RegisterError> {
        self.params.validate()?;
        let mut nodes = BTreeMap::new();
        for (kind, list) in [
            (NodeKind::Resource, &self.resource_nodes),
            (NodeKind::Indexing, &self.indexing_nodes),
        ] {
            for node in list {
                validate_genesis_node(kind, node)?;
                if nodes.insert(node.network_address.clone(), node).is_some() {
                    return Err(RegisterError::DuplicatePubKey {
                        kind,
                        address: node.network_address.clone(),
                    });
                }
            }
        }

        let mut pooled = BTreeSet::new();
        for pool in &self.vote_pools {
            let address = &pool.candidate_network_address;
            match nodes.get(address) {
                Some(node)
                    if node.kind == NodeKind::Indexing
                        && node.status == NodeStatus::Candidate
                        && node.owner_address == pool.candidate_owner_address => {}
                _ => {
                    return Err(RegisterError::Invalid(format!(
                        "vote pool {address} has no matching candidate"
                    )))
                }
            }
            if !pooled.insert(address.clone()) {
                return Err(RegisterError::Invalid(format!(
                    "duplicate vote pool for {address}"
                )));
            }
        }

        let mut queued = BTreeSet::new();
        for entry in &self.unbondings {
            let address = &entry.network_address;
            match nodes.get(address) {
                Some(node)
                    if node.kind == entry.kind
                        && node.status == NodeStatus::Unbonding
                        && node.owner_address == entry.owner_address
                        && node.tokens == entry.amount
                        && node.unbonding_completion == Some(entry.completion_time) => {}
                _ => {
                    return Err(RegisterError::Invalid(format!(
                        "unbonding entry {address} has no matching Unbonding node"
                    )))
                }
            }
            if !queued.insert(address.clone()) {
                return Err(RegisterError::Invalid(format!(
                    "duplicate unbonding entry for {address}"
                )));
            }
        }

        for (address, node) in &nodes {
            if node.status == NodeStatus::Candidate && !pooled.contains(address) {
                return Err(RegisterError::NoRegistrationVotePoolFound(address.clone()));
            }
            if node.status == NodeStatus::Unbonding && !queued.contains(address) {
                return Err(RegisterError::Invalid(format!(
                    "Unbonding node {address} has no unbonding entry"
                )));
            }
        }
        Ok(())
    }

    /// What each pool must hold for these nodes: Bonded stake in the kind's
    /// bonded pool, Bonding, Candidate and Unbonding stake in its not-bonded
    /// pool. Removed tombstones hold nothing.
    pub fn pool_balances(&self) -> Result<Vec<(PoolId, u128)>, RegisterError> {
        let mut sums: BTreeMap<PoolId, u128> = PoolId::ALL.iter().map(|p| (*p, 0)).collect();
        for node in self.resource_nodes.iter().chain(&self.indexing_nodes) {
            let pool = match node.status {
                NodeStatus::Bonded => PoolId::bonded(node.kind),
                NodeStatus::Bonding | NodeStatus::Candidate | NodeStatus::Unbonding => {
                    PoolId::not_bonded(node.kind)
                }
                _ => continue,
            };
            let sum = sums.entry(pool).or_insert(0);
            *sum = sum.checked_add(node.tokens).ok_or_else(|| {
                RegisterError::InvalidGenesisToken(format!("{} sum overflows", pool.as_str()))
            })?;
        }
        Ok(PoolId::ALL.iter().map(|p| (*p, sums[p])).collect())
    }
}

fn validate_genesis_node(kind: NodeKind, node: &Node) -> Result<(), RegisterError> {
    let address = &node.network_address;
    if node.kind != kind {
        return Err(RegisterError::Invalid(format!(
            "{address} listed among {kind} nodes"
        )));
    }
    let status_fits = match node.status {
        NodeStatus::Bonded | NodeStatus::Unbonding | NodeStatus::Removed => true,
        NodeStatus::Bonding => kind == NodeKind::Resource,
        NodeStatus::Candidate => kind == NodeKind::Indexing,
        NodeStatus::Unbonded => false,
    };
    if !status_fits {
        return Err(RegisterError::Invalid(format!(
            "{kind} node {address} cannot be {}",
            node.status
        )));
    }
    if (node.status == NodeStatus::Unbonding) != node.unbonding_completion.is_some() {
        return Err(RegisterError::Invalid(format!(
            "{address} has status {} but unbonding completion {:?}",
            node.status, node.unbonding_completion
        )));
    }
    validate_node_pubkey(&node.pub_key)
        .map_err(|e| RegisterError::UnsupportedPubKey(e.to_string()))?;
    if address_from_pubkey(&node.pub_key) != *address {
        return Err(RegisterError::Invalid(format!(
            "network address {address} does not match its public key"
        )));
    }
    if node.owner_address.is_empty() {
        return Err(RegisterError::EmptyOwnerAddr);
    }
    if !node.description.has_moniker() {
        return Err(RegisterError::EmptyMoniker);
    }
    match (node.status, node.tokens) {
        (NodeStatus::Removed, 0) => {}
        (NodeStatus::Removed, tokens) => {
            return Err(RegisterError::InvalidGenesisToken(format!(
                "removed node {address} still holds {tokens}"
            )))
        }
        (_, 0) => {
            return Err(RegisterError::InvalidGenesisToken(format!(
                "genesis node {address} has no tokens"
            )))
        }
        _ => {}
    }
    if kind == NodeKind::Resource && node.node_type.is_none() {
        return Err(RegisterError::InvalidNodeType(0));
    }
    Ok(())
}

impl<S: KvStore, B: BalanceMover> Keeper<S, B> {
    /// Load `state` into an empty registry.
    ///
    /// Each pool must already hold exactly what
    /// [`GenesisState::pool_balances`] expects.
    pub fn init_genesis(&self, state: &GenesisState) -> Result<(), RegisterError> {
        state.validate()?;
        self.set_params(&state.params)?;

        for (pool, expected) in state.pool_balances()? {
            let actual = self.pool_balance(pool)?;
            if actual != expected {
                return Err(RegisterError::InvalidGenesisToken(format!(
                    "{} holds {actual}, genesis nodes need {expected}",
                    pool.as_str()
                )));
            }
        }

        for node in state.resource_nodes.iter().chain(&state.indexing_nodes) {
            self.set_node(node)?;
            if node.status == NodeStatus::Bonding {
                self.store()
                    .put(&keys::settlement_key(&node.network_address), &[])?;
            }
        }
        for pool in &state.vote_pools {
            self.set_vote_pool(pool)?;
        }
        for entry in &state.unbondings {
            self.store().put(
                &keys::unbonding_key(entry.completion_time, entry.kind, &entry.network_address),
                &encode(entry)?,
            )?;
        }

        tracing::info!(
            resource_nodes = state.resource_nodes.len(),
            indexing_nodes = state.indexing_nodes.len(),
            vote_pools = state.vote_pools.len(),
            unbondings = state.unbondings.len(),
            "register genesis initialized"
        );
        Ok(())
    }

    /// Every record the registry holds, plus the current params.
    pub fn export_genesis(&self) -> Result<GenesisState, RegisterError> {
        Ok(GenesisState {
            params: self.params()?,
            resource_nodes: self.nodes(NodeKind::Resource)?,
            indexing_nodes: self.nodes(NodeKind::Indexing)?,
            vote_pools: self.vote_pools()?,
            unbondings: self.unbonding_entries()?,
        })
    }

    /// The unbonding queue, earliest completion first.
    pub fn unbonding_entries(&self) -> Result<Vec<UnbondingEntry>, RegisterError> {
        self.store()
            .iter_prefix(&[keys::UNBONDING_QUEUE_PREFIX])?
            .into_iter()
            .map(|(_, v)| decode(&v).map_err(RegisterError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strato_bank::{AccountId, StoreBank};
    use strato_nullables::NullStore;
    use strato_types::{Address, Coin, Description, KeyAlgorithm, PubKey, Timestamp};

    fn indexing_node(seed: u8, tokens: u128) -> Node {
        let mut bytes = vec![0x03];
        bytes.extend_from_slice(&[seed; 32]);
        let pub_key = PubKey::new(KeyAlgorithm::Secp256k1, bytes).unwrap();
        Node {
            kind: NodeKind::Indexing,
            network_address: address_from_pubkey(&pub_key),
            pub_key,
            owner_address: Address::new([seed; 20]),
            network_id: format!("sds://i{seed}"),
            description: Description::new(format!("i{seed}")),
            node_type: None,
            status: NodeStatus::Bonded,
            tokens,
            suspended: false,
            creation_time: Timestamp::EPOCH,
            unbonding_completion: None,
        }
    }

    fn keeper_with_pool(amount: u128) -> Keeper<NullStore, StoreBank<NullStore>> {
        let bank = StoreBank::new(NullStore::new());
        bank.mint(
            &AccountId::Pool(PoolId::IndexingBonded),
            &Coin::new("ustos", amount),
        )
        .unwrap();
        Keeper::new(NullStore::new(), bank)
    }

    #[test]
    fn init_then_export_returns_the_same_nodes() {
        let keeper = keeper_with_pool(300);
        let state = GenesisState {
            params: RegisterParams::default(),
            indexing_nodes: vec![indexing_node(1, 100), indexing_node(2, 200)],
            ..GenesisState::default()
        };
        keeper.init_genesis(&state).unwrap();

        let mut exported = keeper.export_genesis().unwrap();
        exported
            .indexing_nodes
            .sort_by_key(|n| n.owner_address.clone());
        assert_eq!(exported, state);
        assert_eq!(keeper.bonded_indexing_count().unwrap(), 2);
    }

    #[test]
    fn pool_mismatch_is_invalid_genesis_token() {
        let keeper = keeper_with_pool(299);
        let state = GenesisState {
            indexing_nodes: vec![indexing_node(1, 100), indexing_node(2, 200)],
            ..GenesisState::default()
        };
        assert!(matches!(
            keeper.init_genesis(&state),
            Err(RegisterError::InvalidGenesisToken(_))
        ));
        assert!(keeper.nodes(NodeKind::Indexing).unwrap().is_empty());
    }

    fn candidate(seed: u8, tokens: u128) -> (Node, RegistrationVotePool) {
        let mut node = indexing_node(seed, tokens);
        node.status = NodeStatus::Candidate;
        let pool = RegistrationVotePool::new(
            node.network_address.clone(),
            node.owner_address.clone(),
            Timestamp::new(500),
        );
        (node, pool)
    }

    #[test]
    fn pool_balances_follow_status() {
        let (cand, pool) = candidate(1, 100);
        let mut removed = indexing_node(3, 0);
        removed.status = NodeStatus::Removed;
        let state = GenesisState {
            indexing_nodes: vec![cand, indexing_node(2, 200), removed],
            vote_pools: vec![pool],
            ..GenesisState::default()
        };
        state.validate().unwrap();
        assert_eq!(
            state.pool_balances().unwrap(),
            vec![
                (PoolId::ResourceBonded, 0),
                (PoolId::ResourceNotBonded, 0),
                (PoolId::IndexingBonded, 200),
                (PoolId::IndexingNotBonded, 100),
            ]
        );
    }

    #[test]
    fn candidate_without_vote_pool_rejected() {
        let (cand, _) = candidate(1, 100);
        let state = GenesisState {
            indexing_nodes: vec![cand],
            ..GenesisState::default()
        };
        assert!(matches!(
            state.validate(),
            Err(RegisterError::NoRegistrationVotePoolFound(_))
        ));
    }

    #[test]
    fn bonding_indexing_node_rejected() {
        let mut node = indexing_node(1, 100);
        node.status = NodeStatus::Bonding;
        let state = GenesisState {
            indexing_nodes: vec![node],
            ..GenesisState::default()
        };
        assert!(matches!(state.validate(), Err(RegisterError::Invalid(_))));
    }

    #[test]
    fn removed_node_holding_tokens_rejected() {
        let mut node = indexing_node(1, 100);
        node.status = NodeStatus::Removed;
        let state = GenesisState {
            indexing_nodes: vec![node],
            ..GenesisState::default()
        };
        assert!(matches!(
            state.validate(),
            Err(RegisterError::InvalidGenesisToken(_))
        ));
    }

    #[test]
    fn unbonding_entry_must_match_its_node() {
        let mut node = indexing_node(1, 100);
        node.status = NodeStatus::Unbonding;
        node.unbonding_completion = Some(Timestamp::new(900));
        let entry = UnbondingEntry {
            kind: NodeKind::Indexing,
            network_address: node.network_address.clone(),
            owner_address: node.owner_address.clone(),
            amount: 100,
            completion_time: Timestamp::new(900),
        };
        let mut state = GenesisState {
            indexing_nodes: vec![node],
            unbondings: vec![entry],
            ..GenesisState::default()
        };
        state.validate().unwrap();

        state.unbondings[0].amount = 99;
        assert!(matches!(state.validate(), Err(RegisterError::Invalid(_))));
        state.unbondings.clear();
        assert!(matches!(state.validate(), Err(RegisterError::Invalid(_))));
    }

    #[test]
    fn duplicate_genesis_node_rejected() {
        let state = GenesisState {
            indexing_nodes: vec![indexing_node(1, 100), indexing_node(1, 100)],
            ..GenesisState::default()
        };
        assert!(matches!(
            state.validate(),
            Err(RegisterError::DuplicatePubKey { .. })
        ));
    }
}
