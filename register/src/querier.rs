//! Read-only registry lookups.

use serde::{Deserialize, Serialize};
use strato_bank::{BalanceMover, PoolId};
use strato_store::KvStore;
use strato_types::{Address, NodeKind, NodeStatus};

use crate::error::RegisterError;
use crate::keeper::Keeper;
use crate::node::Node;
use crate::params::RegisterParams;

/// Node list filter. At most one filter applies, in the order moniker,
/// network id, owner. Moniker and network id accept several values
/// separated by `;`; the result is the concatenation of the per-value
/// matches, in the order the values were given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryNodesParams {
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: u32,
    /// Page size; 0 returns every match.
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub owner: Address,
}

fn first_page() -> u32 {
    1
}

impl Default for QueryNodesParams {
    fn default() -> Self {
        Self {
            page: first_page(),
            limit: 0,
            network_id: String::new(),
            moniker: String::new(),
            owner: Address::empty(),
        }
    }
}

impl QueryNodesParams {
    pub fn by_owner(owner: Address, page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            owner,
            ..Self::default()
        }
    }
}

/// Balances of the four staking pools.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalStakes {
    pub resource_bonded: u128,
    pub resource_not_bonded: u128,
    pub indexing_bonded: u128,
    pub indexing_not_bonded: u128,
}

impl TotalStakes {
    pub fn total_bonded(&self) -> u128 {
        self.resource_bonded.saturating_add(self.indexing_bonded)
    }

    pub fn total_not_bonded(&self) -> u128 {
        self.resource_not_bonded
            .saturating_add(self.indexing_not_bonded)
    }
}

/// Where one node's stake currently sits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStake {
    pub kind: NodeKind,
    pub network_address: Address,
    pub owner_address: Address,
    pub status: NodeStatus,
    /// Tokens in the kind's bonded pool.
    pub bonded: u128,
    /// Tokens escrowed in the kind's not-bonded pool: Bonding, Candidate
    /// and Unbonding stake.
    pub not_bonded: u128,
}

impl From<&Node> for NodeStake {
    fn from(node: &Node) -> Self {
        let (bonded, not_bonded) = if node.status.in_bonded_pool() {
            (node.tokens, 0)
        } else {
            (0, node.tokens)
        };
        Self {
            kind: node.kind,
            network_address: node.network_address.clone(),
            owner_address: node.owner_address.clone(),
            status: node.status,
            bonded,
            not_bonded,
        }
    }
}

pub struct Querier<'a, S: KvStore, B: BalanceMover> {
    keeper: &'a Keeper<S, B>,
}

impl<'a, S: KvStore, B: BalanceMover> Querier<'a, S, B> {
    pub fn new(keeper: &'a Keeper<S, B>) -> Self {
        Self { keeper }
    }

    /// Nodes of `kind` matching `params`, one page at a time.
    pub fn nodes(
        &self,
        kind: NodeKind,
        params: &QueryNodesParams,
    ) -> Result<Vec<Node>, RegisterError> {
        let all = self.keeper.nodes(kind)?;
        let matches: Vec<Node> = if !params.moniker.trim().is_empty() {
            select_each(&all, &params.moniker, |n| n.moniker())
        } else if !params.network_id.trim().is_empty() {
            select_each(&all, &params.network_id, |n| n.network_id.as_str())
        } else if !params.owner.is_empty() {
            all.into_iter()
                .filter(|n| n.owner_address == params.owner)
                .collect()
        } else {
            all
        };
        self.paginate(matches, params.page, params.limit)
    }

    pub fn total_stakes(&self) -> Result<TotalStakes, RegisterError> {
        Ok(TotalStakes {
            resource_bonded: self.keeper.pool_balance(PoolId::ResourceBonded)?,
            resource_not_bonded: self.keeper.pool_balance(PoolId::ResourceNotBonded)?,
            indexing_bonded: self.keeper.pool_balance(PoolId::IndexingBonded)?,
            indexing_not_bonded: self.keeper.pool_balance(PoolId::IndexingNotBonded)?,
        })
    }

    /// Stake of every record at `address`, resource table first. Empty when
    /// nothing is registered there.
    pub fn node_stake(&self, address: &Address) -> Result<Vec<NodeStake>, RegisterError> {
        let mut stakes = Vec::new();
        for kind in [NodeKind::Resource, NodeKind::Indexing] {
            if let Some(node) = self.keeper.get_node(kind, address)? {
                stakes.push(NodeStake::from(&node));
            }
        }
        Ok(stakes)
    }

    /// Stake of every node `owner` registered, resource nodes first.
    pub fn stakes_by_owner(
        &self,
        owner: &Address,
        page: u32,
        limit: u32,
    ) -> Result<Vec<NodeStake>, RegisterError> {
        let mut stakes = Vec::new();
        for kind in [NodeKind::Resource, NodeKind::Indexing] {
            stakes.extend(
                self.keeper
                    .nodes(kind)?
                    .iter()
                    .filter(|n| &n.owner_address == owner)
                    .map(NodeStake::from),
            );
        }
        self.paginate(stakes, page, limit)
    }

    pub fn params(&self) -> Result<RegisterParams, RegisterError> {
        self.keeper.params()
    }

    /// Page `page` (1-based) of `items`. A zero `limit` returns everything;
    /// any other limit is capped at `max_entries`.
    fn paginate<T>(&self, items: Vec<T>, page: u32, limit: u32) -> Result<Vec<T>, RegisterError> {
        if page == 0 {
            return Err(RegisterError::InvalidQuery("page must be at least 1".into()));
        }
        if limit == 0 {
            return Ok(items);
        }
        let limit = limit.min(self.keeper.params()?.max_entries) as usize;
        let start = (page as usize - 1).saturating_mul(limit);
        Ok(items.into_iter().skip(start).take(limit).collect())
    }
}

/// Concatenate, for each `;`-separated value in `values`, the nodes whose
/// `field` equals it.
fn select_each<F>(nodes: &[Node], values: &str, field: F) -> Vec<Node>
where
    F: Fn(&Node) -> &str,
{
    values
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .flat_map(|v| {
            nodes
                .iter()
                .filter(|n| field(*n) == v)
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect()
}
