//! The daemon's view of one data directory.

use anyhow::{bail, Context as _};
use serde_json::Value;
use strato_bank::{AccountId, StoreBank};
use strato_pot::{handle_volume_report, PotEvent, PotKeeper, ReportRecord, VolumeReport};
use strato_register::codec::command_from_value;
use strato_register::{
    CommandResult, Context, GenesisState, Keeper, Node, NodeStake, QueryNodesParams, Querier,
    RegisterError, RegisterEvent, RegisterParams, RegistryApp, TotalStakes,
};
use strato_store::CacheStore;
use strato_store_lmdb::{LmdbEnvironment, LmdbKvStore};
use strato_types::{Address, Coin, NodeKind};

use crate::config::DaemonConfig;
use crate::genesis_file::GenesisFile;

/// Result of one command in an applied batch.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub index: usize,
    pub command: String,
    pub result: Result<CommandResult, RegisterError>,
}

/// Which node table to query.
#[derive(Clone, Debug)]
pub enum NodeQuery {
    List(NodeKind, QueryNodesParams),
    Stake(Address),
    OwnerStakes {
        owner: Address,
        page: u32,
        limit: u32,
    },
}

pub struct Daemon {
    env: LmdbEnvironment,
    app: RegistryApp<LmdbKvStore>,
}

impl Daemon {
    pub fn open(config: &DaemonConfig) -> anyhow::Result<Self> {
        let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
            .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
        let app = RegistryApp::new(env.kv_store());
        Ok(Self { env, app })
    }

    pub fn app(&self) -> &RegistryApp<LmdbKvStore> {
        &self.app
    }

    pub fn is_initialized(&self) -> anyhow::Result<bool> {
        Ok(self.app.keeper().has_params()?)
    }

    /// Fund the genesis accounts and load the registry state. Refuses a
    /// directory that already holds a registry.
    pub fn init(&self, genesis: &GenesisFile, params: &RegisterParams) -> anyhow::Result<()> {
        if self.is_initialized()? {
            bail!("{} already holds a registry", self.env.path().display());
        }
        let state = genesis.register_state(params);
        state.validate()?;

        let branch = CacheStore::new(self.app.store());
        let bank = StoreBank::new(&branch);
        let denom = &state.params.bond_denom;
        for balance in &genesis.balances {
            bank.mint(
                &AccountId::Owner(balance.address.clone()),
                &Coin::new(denom.clone(), balance.amount),
            )?;
        }
        for (pool, amount) in state.pool_balances()? {
            if amount > 0 {
                bank.mint(&AccountId::Pool(pool), &Coin::new(denom.clone(), amount))?;
            }
        }
        Keeper::new(&branch, StoreBank::new(&branch)).init_genesis(&state)?;
        branch.commit()?;

        tracing::info!(
            path = %self.env.path().display(),
            accounts = genesis.balances.len(),
            resource_nodes = state.resource_nodes.len(),
            indexing_nodes = state.indexing_nodes.len(),
            "genesis loaded"
        );
        Ok(())
    }

    /// Apply each command in its own transaction, then run the end-of-block
    /// sweeps. A rejected command does not stop the batch.
    pub fn apply(
        &self,
        ctx: &Context,
        commands: Vec<Value>,
    ) -> anyhow::Result<(Vec<ApplyOutcome>, Vec<RegisterEvent>)> {
        if !self.is_initialized()? {
            bail!("no registry found; run init first");
        }
        let mut outcomes = Vec::with_capacity(commands.len());
        for (index, value) in commands.into_iter().enumerate() {
            let command = value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("<untyped>")
                .to_string();
            let result =
                command_from_value(value).and_then(|cmd| self.app.deliver(ctx, &cmd));
            outcomes.push(ApplyOutcome {
                index,
                command,
                result,
            });
        }
        let swept = self.app.end_block(ctx)?;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(
            height = ctx.block_height,
            applied = outcomes.len() - failed,
            failed,
            swept = swept.len(),
            "block applied"
        );
        Ok((outcomes, swept))
    }

    /// Record a volume report after checking the reporter against the registry.
    pub fn report(&self, report: &VolumeReport) -> anyhow::Result<PotEvent> {
        let branch = CacheStore::new(self.app.store());
        let event = {
            let registry = Keeper::new(&branch, StoreBank::new(&branch));
            let pot = PotKeeper::new(&branch, &registry);
            handle_volume_report(&pot, report)?
        };
        branch.commit()?;
        Ok(event)
    }

    pub fn volume_report(&self, epoch: u64) -> anyhow::Result<ReportRecord> {
        let registry = self.app.keeper();
        Ok(PotKeeper::new(self.app.store(), &registry).get_volume_report(epoch)?)
    }

    pub fn nodes(&self, query: &NodeQuery) -> anyhow::Result<NodeAnswer> {
        let keeper = self.app.keeper();
        let querier = Querier::new(&keeper);
        Ok(match query {
            NodeQuery::List(kind, params) => NodeAnswer::Nodes(querier.nodes(*kind, params)?),
            NodeQuery::Stake(addr) => NodeAnswer::Stakes(querier.node_stake(addr)?),
            NodeQuery::OwnerStakes { owner, page, limit } => {
                NodeAnswer::Stakes(querier.stakes_by_owner(owner, *page, *limit)?)
            }
        })
    }

    pub fn total_stakes(&self) -> anyhow::Result<TotalStakes> {
        let keeper = self.app.keeper();
        Ok(Querier::new(&keeper).total_stakes()?)
    }

    pub fn params(&self) -> anyhow::Result<RegisterParams> {
        Ok(self.app.keeper().params()?)
    }

    pub fn export_genesis(&self) -> anyhow::Result<GenesisState> {
        Ok(self.app.export_genesis()?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeAnswer {
    Nodes(Vec<Node>),
    Stakes(Vec<NodeStake>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis_file::GenesisBalance;
    use serde_json::json;
    use strato_register::CommandResponse;
    use strato_types::Timestamp;

    fn open(dir: &tempfile::TempDir) -> Daemon {
        let config = DaemonConfig {
            data_dir: dir.path().to_path_buf(),
            map_size: 16 << 20,
            ..DaemonConfig::default()
        };
        Daemon::open(&config).unwrap()
    }

    fn owner() -> Address {
        Address::new([0xA1; 20])
    }

    fn funded() -> GenesisFile {
        GenesisFile {
            balances: vec![GenesisBalance {
                address: owner(),
                amount: 5_000,
            }],
            register: None,
        }
    }

    #[test]
    fn apply_requires_genesis() {
        let dir = tempfile::tempdir().unwrap();
        let daemon = open(&dir);
        let ctx = Context::new(1, Timestamp::new(100));
        assert!(daemon.apply(&ctx, vec![]).is_err());
    }

    #[test]
    fn init_twice_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let daemon = open(&dir);
        daemon.init(&funded(), &RegisterParams::default()).unwrap();
        assert!(daemon.is_initialized().unwrap());
        assert!(daemon.init(&funded(), &RegisterParams::default()).is_err());
    }

    #[test]
    fn batch_continues_past_rejected_command() {
        let dir = tempfile::tempdir().unwrap();
        let daemon = open(&dir);
        daemon.init(&funded(), &RegisterParams::default()).unwrap();

        let pub_key = format!("{}", {
            let mut bytes = vec![0x02];
            bytes.extend_from_slice(&[7; 32]);
            strato_types::PubKey::new(strato_types::KeyAlgorithm::Secp256k1, bytes).unwrap()
        });
        let create = json!({
            "type": "register/MsgCreateResourceNode",
            "network_id": "sds://r7",
            "pub_key": pub_key,
            "value": {"denom": "ustos", "amount": 1000},
            "owner_address": owner().to_string(),
            "description": {"moniker": "r7"},
            "node_type": 4
        });
        let bogus = json!({"type": "register/MsgNothing"});

        let ctx = Context::new(1, Timestamp::new(100));
        let (outcomes, _) = daemon.apply(&ctx, vec![bogus, create]).unwrap();
        assert!(matches!(
            outcomes[0].result,
            Err(RegisterError::UnrecognizedCommand(_))
        ));
        assert!(outcomes[1].result.is_ok(), "{:?}", outcomes[1].result);
        assert_eq!(daemon.total_stakes().unwrap().resource_bonded, 1_000);

        let answer = daemon
            .nodes(&NodeQuery::OwnerStakes {
                owner: owner(),
                page: 1,
                limit: 0,
            })
            .unwrap();
        assert!(matches!(answer, NodeAnswer::Stakes(ref s) if s.len() == 1));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let daemon = open(&dir);
            let mut params = RegisterParams::default();
            params.max_entries = 7;
            daemon.init(&funded(), &params).unwrap();
        }
        let daemon = open(&dir);
        assert_eq!(daemon.params().unwrap().max_entries, 7);
        assert!(daemon.export_genesis().unwrap().resource_nodes.is_empty());
    }

    #[test]
    fn exported_state_initializes_another_directory() {
        let first_dir = tempfile::tempdir().unwrap();
        let first = open(&first_dir);
        first.init(&funded(), &RegisterParams::default()).unwrap();
        let pub_key = {
            let mut bytes = vec![0x02];
            bytes.extend_from_slice(&[9; 32]);
            strato_types::PubKey::new(strato_types::KeyAlgorithm::Secp256k1, bytes).unwrap()
        };
        let create = json!({
            "type": "register/MsgCreateResourceNode",
            "network_id": "sds://r9",
            "pub_key": pub_key.to_string(),
            "value": {"denom": "ustos", "amount": 1000},
            "owner_address": owner().to_string(),
            "description": {"moniker": "r9"},
            "node_type": 4
        });
        let ctx = Context::new(1, Timestamp::new(100));
        let (outcomes, _) = first.apply(&ctx, vec![create]).unwrap();
        let address = match &outcomes[0].result {
            Ok(result) => match &result.response {
                CommandResponse::Created { network_address } => network_address.clone(),
                other => panic!("unexpected response {other:?}"),
            },
            Err(e) => panic!("create failed: {e}"),
        };
        let remove = json!({
            "type": "register/MsgRemoveResourceNode",
            "resource_node_address": address.to_string(),
            "owner_address": owner().to_string()
        });
        let ctx = Context::new(2, Timestamp::new(200));
        let (outcomes, _) = first.apply(&ctx, vec![remove]).unwrap();
        assert!(outcomes[0].result.is_ok(), "{:?}", outcomes[0].result);
        let exported = first.export_genesis().unwrap();
        assert_eq!(exported.unbondings.len(), 1);

        let second_dir = tempfile::tempdir().unwrap();
        let second = open(&second_dir);
        let file = GenesisFile {
            balances: vec![],
            register: Some(exported.clone()),
        };
        second.init(&file, &RegisterParams::default()).unwrap();
        assert_eq!(second.export_genesis().unwrap(), exported);
        assert_eq!(second.total_stakes().unwrap().resource_not_bonded, 1000);
    }
}
