//! Node registry for the Strato storage network.
//!
//! Operators register **resource nodes** (capacity providers) and **indexing
//! nodes** (directory/coordination providers) by escrowing stake. Indexing
//! nodes start as candidates and are admitted by a vote among the indexing
//! nodes that are already bonded.
//!
//! Layering, leaves first:
//! - [`keeper::Keeper`] owns node records, vote pools and the unbonding
//!   queue, and moves stake through an injected [`strato_bank::BalanceMover`].
//! - [`handler::handle_command`] validates a [`msgs::Command`], routes it to
//!   the keeper and returns the resulting [`events::RegisterEvent`]s.
//! - [`app::RegistryApp`] runs every command in a cache branch of the store
//!   and commits only on success, and drives the end-of-block sweeps.
//! - [`querier::Querier`] answers read-only lookups.

pub mod app;
pub mod codec;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod events;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod keys;
pub mod metrics;
pub mod msgs;
pub mod node;
pub mod params;
pub mod querier;
pub mod registry;
pub mod sweeps;
pub mod vote_pool;

pub use app::RegistryApp;
pub use context::Context;
pub use eligibility::{BondedAndActive, VoterEligibilityChecker};
pub use error::{ErrorClass, RegisterError};
pub use events::{EventBus, RegisterEvent};
pub use genesis::GenesisState;
pub use handler::{handle_command, CommandResponse, CommandResult};
pub use keeper::Keeper;
pub use vote_pool::VoteOutcome;
pub use msgs::Command;
pub use node::{Node, RegistrationVotePool, UnbondingEntry};
pub use params::{RegisterParams, Threshold};
pub use querier::{NodeStake, QueryNodesParams, Querier, TotalStakes};
