//! Who may vote on indexing-node admission.

use crate::node::Node;

/// Decides whether an existing indexing node may cast a registration vote.
pub trait VoterEligibilityChecker {
    fn is_eligible(&self, voter: &Node) -> bool;
}

/// Default rule: the voter must be Bonded and not suspended. Unbonding
/// nodes may not vote.
#[derive(Clone, Copy, Debug, Default)]
pub struct BondedAndActive;

impl VoterEligibilityChecker for BondedAndActive {
    fn is_eligible(&self, voter: &Node) -> bool {
        voter.is_active()
    }
}
