//! Record access and stake movement.
//!
//! The keeper owns every registry record in the injected store and is the
//! only component that moves stake. Lifecycle operations live in
//! [`crate::registry`], voting in [`crate::vote_pool`] and the end-of-block
//! work in [`crate::sweeps`]; they are all `impl Keeper` blocks.

use std::sync::Arc;

use strato_bank::{AccountId, BalanceMover, BankError, BondDenomProvider, PoolId};
use strato_store::{decode, encode, KvStore};
use strato_types::{Address, Coin, NodeKind, NodeStatus};

use crate::eligibility::{BondedAndActive, VoterEligibilityChecker};
use crate::error::RegisterError;
use crate::keys;
use crate::node::{Node, RegistrationVotePool};
use crate::params::RegisterParams;

pub struct Keeper<S: KvStore, B: BalanceMover> {
    store: S,
    bank: B,
    eligibility: Arc<dyn VoterEligibilityChecker + Send + Sync>,
}

impl<S: KvStore, B: BalanceMover> Keeper<S, B> {
    pub fn new(store: S, bank: B) -> Self {
        Self {
            store,
            bank,
            eligibility: Arc::new(BondedAndActive),
        }
    }

    /// Replace the voter eligibility rule.
    pub fn with_eligibility(
        mut self,
        checker: Arc<dyn VoterEligibilityChecker + Send + Sync>,
    ) -> Self {
        self.eligibility = checker;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub(crate) fn eligibility(&self) -> &(dyn VoterEligibilityChecker + Send + Sync) {
        self.eligibility.as_ref()
    }

    // ── Params ──────────────────────────────────────────────────────────

    /// Stored params, or the defaults before genesis has written any.
    pub fn params(&self) -> Result<RegisterParams, RegisterError> {
        match self.store.get(keys::PARAMS_KEY)? {
            Some(bytes) => Ok(decode(&bytes)?),
            None => Ok(RegisterParams::default()),
        }
    }

    /// Whether genesis has written params yet.
    pub fn has_params(&self) -> Result<bool, RegisterError> {
        Ok(self.store.contains(keys::PARAMS_KEY)?)
    }

    pub fn set_params(&self, params: &RegisterParams) -> Result<(), RegisterError> {
        params.validate()?;
        self.store.put(keys::PARAMS_KEY, &encode(params)?)?;
        Ok(())
    }

    pub fn bond_denom(&self) -> Result<String, RegisterError> {
        Ok(self.params()?.bond_denom().to_string())
    }

    // ── Nodes ───────────────────────────────────────────────────────────

    pub fn get_node(&self, kind: NodeKind, addr: &Address) -> Result<Option<Node>, RegisterError> {
        match self.store.get(&keys::node_key(kind, addr))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`Keeper::get_node`], but absence is [`RegisterError::NodeNotFound`].
    pub fn require_node(&self, kind: NodeKind, addr: &Address) -> Result<Node, RegisterError> {
        self.get_node(kind, addr)?
            .ok_or_else(|| RegisterError::NodeNotFound {
                kind,
                address: addr.clone(),
            })
    }

    pub fn set_node(&self, node: &Node) -> Result<(), RegisterError> {
        self.store
            .put(&keys::node_key(node.kind, &node.network_address), &encode(node)?)?;
        Ok(())
    }

    pub fn delete_node(&self, kind: NodeKind, addr: &Address) -> Result<(), RegisterError> {
        self.store.delete(&keys::node_key(kind, addr))?;
        Ok(())
    }

    /// A live (non-tombstone) record at `addr` in either table.
    pub fn find_live_node(&self, addr: &Address) -> Result<Option<Node>, RegisterError> {
        for kind in [NodeKind::Resource, NodeKind::Indexing] {
            if let Some(node) = self.get_node(kind, addr)? {
                if node.status != NodeStatus::Removed {
                    return Ok(Some(node));
                }
            }
        }
        Ok(None)
    }

    /// Every record of `kind`, in network-address order.
    pub fn nodes(&self, kind: NodeKind) -> Result<Vec<Node>, RegisterError> {
        self.store
            .iter_prefix(&[keys::node_prefix(kind)])?
            .into_iter()
            .map(|(_, v)| decode(&v).map_err(RegisterError::from))
            .collect()
    }

    pub fn bonded_indexing_count(&self) -> Result<u64, RegisterError> {
        Ok(self
            .nodes(NodeKind::Indexing)?
            .iter()
            .filter(|n| n.is_bonded())
            .count() as u64)
    }

    /// Whether `addr` is a registered indexing node, i.e. may report volume.
    pub fn is_sp_node(&self, addr: &Address) -> Result<bool, RegisterError> {
        Ok(self
            .get_node(NodeKind::Indexing, addr)?
            .is_some_and(|n| n.status != NodeStatus::Removed))
    }

    /// Flag a node as suspended or lift the flag. Called by collaborators
    /// outside the registry; suspended indexing nodes may not vote.
    pub fn set_suspended(
        &self,
        kind: NodeKind,
        addr: &Address,
        suspended: bool,
    ) -> Result<(), RegisterError> {
        let mut node = self.require_node(kind, addr)?;
        if node.suspended != suspended {
            node.suspended = suspended;
            self.set_node(&node)?;
            tracing::info!(%addr, kind = %kind, suspended, "node suspension changed");
        }
        Ok(())
    }

    // ── Vote pools ──────────────────────────────────────────────────────

    pub fn get_vote_pool(
        &self,
        candidate: &Address,
    ) -> Result<Option<RegistrationVotePool>, RegisterError> {
        match self.store.get(&keys::vote_pool_key(candidate))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_vote_pool(&self, pool: &RegistrationVotePool) -> Result<(), RegisterError> {
        self.store.put(
            &keys::vote_pool_key(&pool.candidate_network_address),
            &encode(pool)?,
        )?;
        Ok(())
    }

    pub fn delete_vote_pool(&self, candidate: &Address) -> Result<(), RegisterError> {
        self.store.delete(&keys::vote_pool_key(candidate))?;
        Ok(())
    }

    pub fn vote_pools(&self) -> Result<Vec<RegistrationVotePool>, RegisterError> {
        self.store
            .iter_prefix(&[keys::VOTE_POOL_PREFIX])?
            .into_iter()
            .map(|(_, v)| decode(&v).map_err(RegisterError::from))
            .collect()
    }

    // ── Stake ───────────────────────────────────────────────────────────

    pub fn pool_balance(&self, pool: PoolId) -> Result<u128, RegisterError> {
        let denom = self.bond_denom()?;
        Ok(self.bank.balance(&AccountId::Pool(pool), &denom)?)
    }

    /// Move `amount` of the bond denomination, translating bank shortfalls
    /// into the registry's balance errors.
    pub(crate) fn move_stake(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        denom: &str,
    ) -> Result<(), RegisterError> {
        self.bank
            .move_balance(from, to, &Coin::new(denom, amount))
            .map_err(map_bank_error)
    }

    /// Fail early if `pool` cannot cover `amount`.
    pub(crate) fn ensure_pool_covers(
        &self,
        pool: PoolId,
        amount: u128,
        denom: &str,
    ) -> Result<(), RegisterError> {
        let available = self.bank.balance(&AccountId::Pool(pool), denom)?;
        if available < amount {
            return Err(pool_shortfall(pool, amount, available));
        }
        Ok(())
    }
}

fn pool_shortfall(pool: PoolId, needed: u128, available: u128) -> RegisterError {
    if pool.is_bonded() {
        RegisterError::InsufficientBalanceOfBondedPool { needed, available }
    } else {
        RegisterError::InsufficientBalanceOfNotBondedPool { needed, available }
    }
}

fn map_bank_error(err: BankError) -> RegisterError {
    match err {
        BankError::InsufficientFunds {
            account: AccountId::Owner(owner),
            needed,
            available,
        } => RegisterError::InsufficientBalance {
            owner,
            needed,
            available,
        },
        BankError::InsufficientFunds {
            account: AccountId::Pool(pool),
            needed,
            available,
        } => pool_shortfall(pool, needed, available),
        other => RegisterError::Bank(other),
    }
}
