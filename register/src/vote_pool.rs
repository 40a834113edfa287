//! Indexing-node admission voting.
//!
//! A candidate is admitted once approvals reach `admission_quorum` and
//! turned away once rejections reach `rejection_quorum`, both evaluated
//! against the number of Bonded indexing nodes when the vote is cast.

use strato_bank::{AccountId, BalanceMover, PoolId};
use strato_store::KvStore;
use strato_types::{Address, NodeKind, NodeStatus};

use crate::context::Context;
use crate::error::RegisterError;
use crate::keeper::Keeper;
use crate::node::Node;

/// Where a candidacy stands after a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    pub status: NodeStatus,
    /// Stake bonded on admission or refunded on rejection; zero while the
    /// vote is still open.
    pub tokens: u128,
}

impl<S: KvStore, B: BalanceMover> Keeper<S, B> {
    /// Record `voter`'s opinion on `candidate` and finalize the candidacy if
    /// a quorum is reached.
    pub fn handle_registration_vote(
        &self,
        ctx: &Context,
        candidate: &Address,
        candidate_owner: &Address,
        opinion: bool,
        voter: &Address,
        voter_owner: &Address,
    ) -> Result<VoteOutcome, RegisterError> {
        let node = self.require_node(NodeKind::Indexing, candidate)?;
        if &node.owner_address != candidate_owner {
            return Err(RegisterError::InvalidOwnerAddr {
                node: candidate.clone(),
                given: candidate_owner.clone(),
            });
        }

        let voter_node = self
            .get_node(NodeKind::Indexing, voter)?
            .ok_or_else(|| RegisterError::InvalidApproverAddr(voter.clone()))?;
        if !self.eligibility().is_eligible(&voter_node) {
            return Err(RegisterError::InvalidApproverStatus {
                address: voter.clone(),
                status: voter_node.status,
                suspended: voter_node.suspended,
            });
        }
        if &voter_node.owner_address != voter_owner {
            return Err(RegisterError::InvalidVoterOwnerAddr {
                voter: voter.clone(),
                given: voter_owner.clone(),
            });
        }

        let mut pool = self
            .get_vote_pool(candidate)?
            .ok_or_else(|| RegisterError::NoRegistrationVotePoolFound(candidate.clone()))?;
        if pool.is_expired(ctx.now()) {
            return Err(RegisterError::VoteExpired {
                candidate: candidate.clone(),
                expiry: pool.expiry,
            });
        }
        if pool.has_voted(voter) {
            return Err(RegisterError::DuplicateVoting {
                voter: voter.clone(),
                candidate: candidate.clone(),
            });
        }
        if voter == candidate {
            return Err(RegisterError::SameAddr(candidate.clone()));
        }

        pool.votes.insert(voter.clone(), opinion);
        let params = self.params()?;
        let bonded = self.bonded_indexing_count()?;
        let approvals = pool.approvals();
        let rejections = pool.rejections();
        tracing::debug!(
            %candidate,
            %voter,
            opinion,
            approvals,
            rejections,
            bonded,
            "registration vote recorded"
        );

        if approvals >= params.admission_quorum.required(bonded) {
            return Ok(VoteOutcome {
                status: NodeStatus::Bonded,
                tokens: self.admit_candidate(node)?,
            });
        }
        if rejections >= params.rejection_quorum.required(bonded) {
            return Ok(VoteOutcome {
                status: NodeStatus::Removed,
                tokens: self.turn_away_candidate(node)?,
            });
        }

        self.set_vote_pool(&pool)?;
        Ok(VoteOutcome {
            status: NodeStatus::Candidate,
            tokens: 0,
        })
    }

    /// Candidate → Bonded: stake moves from the indexing not-bonded pool to
    /// the bonded pool and the vote pool is closed. Returns the bonded amount.
    pub(crate) fn admit_candidate(&self, mut node: Node) -> Result<u128, RegisterError> {
        let denom = self.bond_denom()?;
        self.move_stake(
            &AccountId::Pool(PoolId::IndexingNotBonded),
            &AccountId::Pool(PoolId::IndexingBonded),
            node.tokens,
            &denom,
        )?;
        node.status = NodeStatus::Bonded;
        self.set_node(&node)?;
        self.delete_vote_pool(&node.network_address)?;
        tracing::info!(address = %node.network_address, tokens = node.tokens, "indexing node admitted");
        Ok(node.tokens)
    }

    /// Candidate → Removed: stake returns to the owner, the vote pool is
    /// closed and the record stays behind as a zero-token tombstone.
    /// Returns the refunded amount.
    pub(crate) fn turn_away_candidate(&self, mut node: Node) -> Result<u128, RegisterError> {
        let denom = self.bond_denom()?;
        let refunded = node.tokens;
        self.move_stake(
            &AccountId::Pool(PoolId::IndexingNotBonded),
            &AccountId::Owner(node.owner_address.clone()),
            refunded,
            &denom,
        )?;
        node.status = NodeStatus::Removed;
        node.tokens = 0;
        self.set_node(&node)?;
        self.delete_vote_pool(&node.network_address)?;
        tracing::info!(address = %node.network_address, refunded, "indexing node candidacy closed");
        Ok(refunded)
    }
}
