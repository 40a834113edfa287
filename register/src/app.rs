//! Transactional front end over a backing store.
//!
//! Each command and each end-of-block sweep runs against a [`CacheStore`]
//! branch of the backing store. Registry records and bank balances share
//! the branch, so a failing command leaves neither behind. Events reach
//! subscribers only after the branch is committed.

use std::sync::Arc;
use std::time::Instant;

use strato_bank::StoreBank;
use strato_store::{CacheStore, KvStore};

use crate::codec::decode_command;
use crate::context::Context;
use crate::eligibility::{BondedAndActive, VoterEligibilityChecker};
use crate::error::RegisterError;
use crate::events::{EventBus, RegisterEvent};
use crate::genesis::GenesisState;
use crate::handler::{handle_command, CommandResult};
use crate::keeper::Keeper;
use crate::metrics::RegisterMetrics;
use crate::msgs::Command;

pub struct RegistryApp<S: KvStore> {
    store: S,
    bus: EventBus,
    metrics: RegisterMetrics,
    eligibility: Arc<dyn VoterEligibilityChecker + Send + Sync>,
}

impl<S: KvStore> RegistryApp<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            bus: EventBus::new(),
            metrics: RegisterMetrics::new(),
            eligibility: Arc::new(BondedAndActive),
        }
    }

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

    pub fn metrics(&self) -> &RegisterMetrics {
        &self.metrics
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&RegisterEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Balances on the backing store. Genesis funding mints through this.
    pub fn bank(&self) -> StoreBank<&S> {
        StoreBank::new(&self.store)
    }

    /// A keeper reading and writing the backing store directly. Use it for
    /// queries; mutations should go through [`RegistryApp::deliver`].
    pub fn keeper(&self) -> Keeper<&S, StoreBank<&S>> {
        self.keeper_on(&self.store)
    }

    fn keeper_on<'a, T: KvStore>(&self, store: &'a T) -> Keeper<&'a T, StoreBank<&'a T>> {
        Keeper::new(store, StoreBank::new(store)).with_eligibility(Arc::clone(&self.eligibility))
    }

    /// Decode and apply one wire command.
    pub fn deliver_bytes(&self, ctx: &Context, bytes: &[u8]) -> Result<CommandResult, RegisterError> {
        let cmd = decode_command(bytes).inspect_err(|e| {
            self.metrics.commands_failed.inc();
            tracing::warn!(code = e.code(), error = %e, "rejected undecodable command");
        })?;
        self.deliver(ctx, &cmd)
    }

    /// Apply one command atomically.
    pub fn deliver(&self, ctx: &Context, cmd: &Command) -> Result<CommandResult, RegisterError> {
        let started = Instant::now();
        let branch = CacheStore::new(&self.store);
        let outcome = {
            let keeper = self.keeper_on(&branch);
            handle_command(&keeper, ctx, cmd)
        };

        let result = match outcome.and_then(|result| {
            branch.commit()?;
            Ok(result)
        }) {
            Ok(result) => result,
            Err(e) => {
                self.metrics.commands_failed.inc();
                tracing::warn!(
                    command = cmd.type_name(),
                    height = ctx.block_height,
                    code = e.code(),
                    error = %e,
                    "command rejected"
                );
                return Err(e);
            }
        };

        self.metrics.commands_processed.inc();
        self.metrics
            .command_time_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        self.record(&result.events);
        tracing::debug!(
            command = cmd.type_name(),
            height = ctx.block_height,
            events = result.events.len(),
            "command committed"
        );
        Ok(result)
    }

    /// Run the end-of-block sweeps atomically.
    pub fn end_block(&self, ctx: &Context) -> Result<Vec<RegisterEvent>, RegisterError> {
        let branch = CacheStore::new(&self.store);
        let events = {
            let keeper = self.keeper_on(&branch);
            keeper.end_block(ctx)?
        };
        branch.commit()?;
        self.record(&events);
        if !events.is_empty() {
            tracing::info!(height = ctx.block_height, events = events.len(), "end block sweeps applied");
        }
        Ok(events)
    }

    /// Load genesis atomically. Pool balances must already be funded.
    pub fn init_genesis(&self, state: &GenesisState) -> Result<(), RegisterError> {
        let branch = CacheStore::new(&self.store);
        self.keeper_on(&branch).init_genesis(state)?;
        branch.commit()?;
        self.refresh_gauges();
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState, RegisterError> {
        self.keeper().export_genesis()
    }

    fn record(&self, events: &[RegisterEvent]) {
        for event in events {
            match event {
                RegisterEvent::IndexingNodeRegistrationVote { .. } => {
                    self.metrics.votes_cast.inc()
                }
                RegisterEvent::IndexingNodeAdmitted { .. } => self.metrics.nodes_admitted.inc(),
                RegisterEvent::UnbondingCompleted { .. } => {
                    self.metrics.unbondings_completed.inc()
                }
                _ => {}
            }
            self.bus.emit(event);
        }
        if !events.is_empty() {
            self.refresh_gauges();
        }
    }

    fn refresh_gauges(&self) {
        match self.keeper().bonded_indexing_count() {
            Ok(n) => self
                .metrics
                .bonded_indexing_nodes
                .set(i64::try_from(n).unwrap_or(i64::MAX)),
            Err(e) => tracing::warn!(error = %e, "could not count bonded indexing nodes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::CreateIndexingNode;
    use std::sync::Mutex;
    use strato_bank::{AccountId, BalanceMover};
    use strato_nullables::NullStore;
    use strato_types::{Address, Coin, Description, KeyAlgorithm, PubKey, Timestamp};

    fn owner() -> Address {
        Address::new([0x0A; 20])
    }

    fn create_indexing(seed: u8, amount: u128) -> Command {
        let mut bytes = vec![0x03];
        bytes.extend_from_slice(&[seed; 32]);
        Command::CreateIndexingNode(CreateIndexingNode {
            network_id: format!("sds://i{seed}"),
            pub_key: Some(PubKey::new(KeyAlgorithm::Secp256k1, bytes).unwrap()),
            value: Coin::new("ustos", amount),
            owner_address: owner(),
            description: Description::new(format!("i{seed}")),
        })
    }

    #[test]
    fn failed_command_leaves_store_untouched() {
        let app = RegistryApp::new(NullStore::new());
        app.bank()
            .mint(&AccountId::Owner(owner()), &Coin::new("ustos", 50))
            .unwrap();
        let before = app.store().snapshot();

        let ctx = Context::new(1, Timestamp::new(100));
        let err = app.deliver(&ctx, &create_indexing(1, 80)).unwrap_err();
        assert!(matches!(err, RegisterError::InsufficientBalance { .. }));
        assert_eq!(app.store().snapshot(), before);
        assert_eq!(app.metrics().commands_failed.get(), 1);
    }

    #[test]
    fn events_reach_subscribers_after_commit() {
        let mut app = RegistryApp::new(NullStore::new());
        app.bank()
            .mint(&AccountId::Owner(owner()), &Coin::new("ustos", 500))
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        app.subscribe(Box::new(move |e| {
            sink.lock().unwrap().push(e.event_type());
        }));

        let ctx = Context::new(1, Timestamp::new(100));
        app.deliver(&ctx, &create_indexing(1, 80)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["create_indexing_node"]);
        assert_eq!(
            app.bank()
                .balance(&AccountId::Owner(owner()), "ustos")
                .unwrap(),
            420
        );
        assert_eq!(app.metrics().commands_processed.get(), 1);
    }

    #[test]
    fn store_failure_at_commit_is_reported() {
        let app = RegistryApp::new(NullStore::new());
        app.bank()
            .mint(&AccountId::Owner(owner()), &Coin::new("ustos", 500))
            .unwrap();
        app.store().fail_writes(true);

        let ctx = Context::new(1, Timestamp::new(100));
        let err = app.deliver(&ctx, &create_indexing(1, 80)).unwrap_err();
        assert!(matches!(err, RegisterError::Store(_)));
    }

    #[test]
    fn undecodable_bytes_count_as_failures() {
        let app = RegistryApp::new(NullStore::new());
        let ctx = Context::new(1, Timestamp::new(100));
        assert!(matches!(
            app.deliver_bytes(&ctx, br#"{"type":"bank/MsgSend"}"#),
            Err(RegisterError::UnrecognizedCommand(_))
        ));
        assert_eq!(app.metrics().commands_failed.get(), 1);
    }
}
