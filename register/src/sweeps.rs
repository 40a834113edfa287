//! End-of-block work: matured unbondings, expired candidacies and pending
//! settlements. The host calls [`Keeper::end_block`] once per block.

use strato_bank::{AccountId, BalanceMover, PoolId};
use strato_store::{decode, KvStore, StoreError};
use strato_types::{Address, NodeKind, NodeStatus};

use crate::context::Context;
use crate::error::RegisterError;
use crate::events::RegisterEvent;
use crate::keeper::Keeper;
use crate::keys;
use crate::node::UnbondingEntry;

impl<S: KvStore, B: BalanceMover> Keeper<S, B> {
    /// Run every sweep, in a fixed order, and return their events.
    pub fn end_block(&self, ctx: &Context) -> Result<Vec<RegisterEvent>, RegisterError> {
        let mut events = self.complete_unbondings(ctx)?;
        events.extend(self.expire_candidates(ctx)?);
        events.extend(self.settle_bonding(ctx)?);
        Ok(events)
    }

    /// Return the stake of every removal whose completion time has passed
    /// and purge the node record.
    pub fn complete_unbondings(&self, ctx: &Context) -> Result<Vec<RegisterEvent>, RegisterError> {
        // Keys sort by completion time, so everything up to `now` is a prefix
        // of the queue.
        let now = ctx.now();
        let mut events = Vec::new();
        let queue = self.store().iter_prefix(&[keys::UNBONDING_QUEUE_PREFIX])?;
        for (key, value) in queue {
            match keys::unbonding_key_time(&key) {
                Some(t) if t <= now => {}
                _ => break,
            }
            let entry: UnbondingEntry = decode(&value)?;
            let denom = self.bond_denom()?;
            self.move_stake(
                &AccountId::Pool(PoolId::not_bonded(entry.kind)),
                &AccountId::Owner(entry.owner_address.clone()),
                entry.amount,
                &denom,
            )?;
            self.delete_node(entry.kind, &entry.network_address)?;
            self.store().delete(&key)?;
            tracing::info!(
                address = %entry.network_address,
                kind = %entry.kind,
                amount = entry.amount,
                "unbonding completed"
            );
            events.push(RegisterEvent::UnbondingCompleted {
                kind: entry.kind,
                network_address: entry.network_address,
                owner_address: entry.owner_address,
                amount: entry.amount,
            });
        }
        Ok(events)
    }

    /// Turn away every candidate whose voting window has closed.
    pub fn expire_candidates(&self, ctx: &Context) -> Result<Vec<RegisterEvent>, RegisterError> {
        let now = ctx.now();
        let mut events = Vec::new();
        for pool in self.vote_pools()? {
            if !pool.is_expired(now) {
                continue;
            }
            let address = pool.candidate_network_address.clone();
            match self.get_node(NodeKind::Indexing, &address)? {
                Some(node) if node.status == NodeStatus::Candidate => {
                    let refunded = self.turn_away_candidate(node)?;
                    tracing::info!(%address, expiry = %pool.expiry, "candidate expired");
                    events.push(RegisterEvent::CandidateExpired {
                        network_address: address,
                        refunded,
                    });
                }
                _ => {
                    tracing::warn!(%address, "dropping vote pool without a candidate");
                    self.delete_vote_pool(&address)?;
                }
            }
        }
        Ok(events)
    }

    /// Move every Bonding resource node's stake into the bonded pool.
    pub fn settle_bonding(&self, _ctx: &Context) -> Result<Vec<RegisterEvent>, RegisterError> {
        let mut events = Vec::new();
        for (key, _) in self.store().iter_prefix(&[keys::SETTLEMENT_QUEUE_PREFIX])? {
            self.store().delete(&key)?;
            let Some(addr_bytes) = key.get(1..) else {
                continue;
            };
            let address = Address::from_slice(addr_bytes)
                .map_err(|e| StoreError::Corruption(format!("settlement key: {e}")))?;
            let Some(mut node) = self.get_node(NodeKind::Resource, &address)? else {
                continue;
            };
            if node.status != NodeStatus::Bonding {
                continue;
            }
            let denom = self.bond_denom()?;
            self.move_stake(
                &AccountId::Pool(PoolId::ResourceNotBonded),
                &AccountId::Pool(PoolId::ResourceBonded),
                node.tokens,
                &denom,
            )?;
            node.status = NodeStatus::Bonded;
            self.set_node(&node)?;
            tracing::info!(%address, tokens = node.tokens, "bonding settled");
            events.push(RegisterEvent::BondingSettled {
                network_address: address,
                tokens: node.tokens,
            });
        }
        Ok(events)
    }
}
