//! Node lifecycle: registration, removal and metadata updates.

use strato_bank::{AccountId, BalanceMover, PoolId};
use strato_crypto::{address_from_pubkey, validate_node_pubkey};
use strato_store::{encode, KvStore};
use strato_types::{Address, Coin, Description, NodeKind, NodeStatus, NodeType, PubKey, Timestamp};

use crate::context::Context;
use crate::error::RegisterError;
use crate::keeper::Keeper;
use crate::keys;
use crate::node::{Node, RegistrationVotePool, UnbondingEntry};

impl<S: KvStore, B: BalanceMover> Keeper<S, B> {
    /// Shared registration preconditions. Returns the derived network address.
    fn check_registrable(
        &self,
        kind: NodeKind,
        pub_key: &PubKey,
        stake: &Coin,
    ) -> Result<Address, RegisterError> {
        validate_node_pubkey(pub_key).map_err(|e| RegisterError::UnsupportedPubKey(e.to_string()))?;
        let address = address_from_pubkey(pub_key);
        if self.find_live_node(&address)?.is_some() {
            tracing::warn!(%address, %kind, "node already exists for pubkey");
            return Err(RegisterError::DuplicatePubKey { kind, address });
        }
        let denom = self.bond_denom()?;
        if stake.denom != denom {
            return Err(RegisterError::BadDenom {
                expected: denom,
                found: stake.denom.clone(),
            });
        }
        if !stake.is_positive() {
            return Err(RegisterError::ValueNotPositive);
        }
        Ok(address)
    }

    /// Drop any `Removed` tombstone left at `address` by an earlier candidacy.
    fn clear_tombstones(&self, address: &Address) -> Result<(), RegisterError> {
        for kind in [NodeKind::Resource, NodeKind::Indexing] {
            if self
                .get_node(kind, address)?
                .is_some_and(|n| n.status == NodeStatus::Removed)
            {
                self.delete_node(kind, address)?;
            }
        }
        Ok(())
    }

    /// Register a resource node and escrow its stake.
    ///
    /// The stake goes straight to the resource bonded pool, unless
    /// `settlement_delay` is set, in which case the node starts Bonding with
    /// its stake in the not-bonded pool.
    #[allow(clippy::too_many_arguments)]
    pub fn register_resource_node(
        &self,
        ctx: &Context,
        network_id: &str,
        pub_key: &PubKey,
        owner: &Address,
        description: &Description,
        node_type: NodeType,
        stake: &Coin,
    ) -> Result<Node, RegisterError> {
        let address = self.check_registrable(NodeKind::Resource, pub_key, stake)?;
        let params = self.params()?;
        self.clear_tombstones(&address)?;

        let (status, pool) = if params.settlement_delay {
            (NodeStatus::Bonding, PoolId::ResourceNotBonded)
        } else {
            (NodeStatus::Bonded, PoolId::ResourceBonded)
        };
        self.move_stake(
            &AccountId::Owner(owner.clone()),
            &AccountId::Pool(pool),
            stake.amount,
            &stake.denom,
        )?;

        let node = Node {
            kind: NodeKind::Resource,
            network_address: address.clone(),
            pub_key: pub_key.clone(),
            owner_address: owner.clone(),
            network_id: network_id.to_string(),
            description: description.clone(),
            node_type: Some(node_type),
            status,
            tokens: stake.amount,
            suspended: false,
            creation_time: ctx.now(),
            unbonding_completion: None,
        };
        self.set_node(&node)?;
        if status == NodeStatus::Bonding {
            self.store().put(&keys::settlement_key(&address), &[])?;
        }

        tracing::info!(
            %address,
            owner = %owner,
            tokens = stake.amount,
            status = %status,
            "registered resource node"
        );
        Ok(node)
    }

    /// Register an indexing node as a candidate and open its vote pool.
    pub fn register_indexing_node(
        &self,
        ctx: &Context,
        network_id: &str,
        pub_key: &PubKey,
        owner: &Address,
        description: &Description,
        stake: &Coin,
    ) -> Result<Node, RegisterError> {
        let address = self.check_registrable(NodeKind::Indexing, pub_key, stake)?;
        let params = self.params()?;
        self.clear_tombstones(&address)?;

        self.move_stake(
            &AccountId::Owner(owner.clone()),
            &AccountId::Pool(PoolId::IndexingNotBonded),
            stake.amount,
            &stake.denom,
        )?;

        let node = Node {
            kind: NodeKind::Indexing,
            network_address: address.clone(),
            pub_key: pub_key.clone(),
            owner_address: owner.clone(),
            network_id: network_id.to_string(),
            description: description.clone(),
            node_type: None,
            status: NodeStatus::Candidate,
            tokens: stake.amount,
            suspended: false,
            creation_time: ctx.now(),
            unbonding_completion: None,
        };
        self.set_node(&node)?;

        let expiry = ctx.now().plus_secs(params.voting_period_secs);
        self.set_vote_pool(&RegistrationVotePool::new(
            address.clone(),
            owner.clone(),
            expiry,
        ))?;

        tracing::info!(%address, owner = %owner, tokens = stake.amount, %expiry, "registered indexing node candidate");
        Ok(node)
    }

    /// Start unbonding `node`'s whole stake. Returns the completion time.
    ///
    /// Bonded stake moves from the kind's bonded pool to its not-bonded pool;
    /// Bonding and Candidate stake already sits there. A candidate's vote
    /// pool is closed.
    pub fn do_remove_node(
        &self,
        ctx: &Context,
        kind: NodeKind,
        address: &Address,
        amount: u128,
    ) -> Result<Timestamp, RegisterError> {
        let mut node = self.require_node(kind, address)?;
        if !node.status.is_removable() {
            return Err(invalid_status(&node));
        }
        if amount != node.tokens {
            return Err(RegisterError::InvalidUnbondAmount {
                requested: amount,
                tokens: node.tokens,
            });
        }

        let params = self.params()?;
        let denom = params.bond_denom.as_str();
        match node.status {
            NodeStatus::Bonded => {
                self.ensure_pool_covers(PoolId::bonded(kind), amount, denom)?;
                self.move_stake(
                    &AccountId::Pool(PoolId::bonded(kind)),
                    &AccountId::Pool(PoolId::not_bonded(kind)),
                    amount,
                    denom,
                )?;
            }
            NodeStatus::Bonding => {
                self.ensure_pool_covers(PoolId::not_bonded(kind), amount, denom)?;
                self.store().delete(&keys::settlement_key(address))?;
            }
            NodeStatus::Candidate => {
                self.ensure_pool_covers(PoolId::not_bonded(kind), amount, denom)?;
                self.delete_vote_pool(address)?;
            }
            _ => return Err(invalid_status(&node)),
        }

        let completion = ctx.now().plus_secs(params.unbonding_period_secs);
        node.status = NodeStatus::Unbonding;
        node.unbonding_completion = Some(completion);
        self.set_node(&node)?;

        let entry = UnbondingEntry {
            kind,
            network_address: address.clone(),
            owner_address: node.owner_address.clone(),
            amount,
            completion_time: completion,
        };
        self.store().put(
            &keys::unbonding_key(completion, kind, address),
            &encode(&entry)?,
        )?;

        tracing::info!(%address, %kind, amount, %completion, "node unbonding");
        Ok(completion)
    }

    /// Replace a resource node's metadata. Stake and status are untouched.
    pub fn update_resource_node(
        &self,
        network_id: &str,
        description: &Description,
        node_type: NodeType,
        address: &Address,
        owner: &Address,
    ) -> Result<(), RegisterError> {
        let mut node = self.require_owned_live_node(NodeKind::Resource, address, owner)?;
        node.network_id = network_id.to_string();
        node.description = description.clone();
        node.node_type = Some(node_type);
        self.set_node(&node)?;
        tracing::debug!(%address, "updated resource node");
        Ok(())
    }

    /// Replace an indexing node's metadata. Stake and status are untouched.
    pub fn update_indexing_node(
        &self,
        network_id: &str,
        description: &Description,
        address: &Address,
        owner: &Address,
    ) -> Result<(), RegisterError> {
        let mut node = self.require_owned_live_node(NodeKind::Indexing, address, owner)?;
        node.network_id = network_id.to_string();
        node.description = description.clone();
        self.set_node(&node)?;
        tracing::debug!(%address, "updated indexing node");
        Ok(())
    }

    /// The node at `address`, provided it is not a tombstone and `caller`
    /// owns it.
    pub fn require_owned_live_node(
        &self,
        kind: NodeKind,
        address: &Address,
        caller: &Address,
    ) -> Result<Node, RegisterError> {
        let node = match self.get_node(kind, address)? {
            Some(n) if n.status != NodeStatus::Removed => n,
            _ => {
                return Err(RegisterError::NodeNotFound {
                    kind,
                    address: address.clone(),
                })
            }
        };
        if &node.owner_address != caller {
            return Err(RegisterError::Unauthorized {
                node: address.clone(),
                caller: caller.clone(),
            });
        }
        Ok(node)
    }
}

fn invalid_status(node: &Node) -> RegisterError {
    RegisterError::InvalidNodeStatus {
        address: node.network_address.clone(),
        status: node.status,
    }
}
