//! Strato registry daemon: entry point for operating a registry data directory.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use serde::Serialize;
use strato_daemon::runner::NodeAnswer;
use strato_daemon::{output, Daemon, DaemonConfig, GenesisFile, NodeQuery};
use strato_pot::VolumeReport;
use strato_register::{CommandResponse, Context, QueryNodesParams};
use strato_types::{Address, NodeKind, Timestamp};
use strato_utils::{format_duration, format_until, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "strato-daemon", about = "Strato node registry daemon")]
struct Cli {
    /// Directory holding the registry store.
    #[arg(long, env = "STRATO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in bytes.
    #[arg(long, env = "STRATO_MAP_SIZE")]
    map_size: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STRATO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STRATO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "STRATO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Fund genesis accounts and load the registry genesis.
    Init {
        /// Genesis JSON document. Omit for an empty registry.
        #[arg(long)]
        genesis: Option<PathBuf>,
    },
    /// Apply a JSON array of commands as one block, then run the sweeps.
    Apply {
        /// File holding the command array.
        #[arg(long)]
        commands: PathBuf,
        /// Block height.
        #[arg(long)]
        height: u64,
        /// Block time in unix seconds; defaults to now.
        #[arg(long)]
        time: Option<u64>,
        /// Print the Prometheus metrics for this run afterwards.
        #[arg(long)]
        metrics: bool,
    },
    /// Record a volume report.
    Report {
        /// File holding the report JSON.
        #[arg(long)]
        file: PathBuf,
    },
    /// Read registry state.
    Query {
        #[command(subcommand)]
        what: Query,
    },
    /// Print the current registry state as genesis JSON.
    ExportGenesis,
}

#[derive(clap::Subcommand)]
enum Query {
    /// Resource nodes matching the filters.
    ResourceNodes(NodeFilter),
    /// Indexing nodes matching the filters.
    IndexingNodes(NodeFilter),
    /// Balances of the four staking pools.
    Stakes,
    /// Stake held by the node(s) at an address.
    NodeStake { address: Address },
    /// Stake of every node an owner registered.
    OwnerStakes {
        owner: Address,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 0)]
        limit: u32,
    },
    /// Current registry params.
    Params,
    /// The volume report stored for an epoch.
    VolumeReport { epoch: u64 },
}

#[derive(clap::Args)]
struct NodeFilter {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Page size; 0 returns every match.
    #[arg(long, default_value_t = 0)]
    limit: u32,
    /// `;`-separated network ids.
    #[arg(long, default_value = "")]
    network_id: String,
    /// `;`-separated monikers.
    #[arg(long, default_value = "")]
    moniker: String,
    #[arg(long)]
    owner: Option<Address>,
}

impl NodeFilter {
    fn into_params(self) -> QueryNodesParams {
        QueryNodesParams {
            page: self.page,
            limit: self.limit,
            network_id: self.network_id,
            moniker: self.moniker,
            owner: self.owner.unwrap_or_else(Address::empty),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(size) = cli.map_size {
        config.map_size = size;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;

    if let Some(path) = &cli.config {
        tracing::info!(config = %path.display(), "loaded config");
    }
    let daemon = Daemon::open(&config)?;

    match cli.command {
        Command::Init { genesis } => {
            let file = match genesis {
                Some(path) => GenesisFile::from_json_file(&path)
                    .with_context(|| format!("reading genesis {}", path.display()))?,
                None => GenesisFile::default(),
            };
            daemon.init(&file, &config.params)?;
            let params = daemon.params()?;
            tracing::info!(
                bond_denom = %params.bond_denom,
                unbonding_period = %format_duration(params.unbonding_period_secs),
                voting_period = %format_duration(params.voting_period_secs),
                "registry initialized"
            );
        }
        Command::Apply {
            commands,
            height,
            time,
            metrics,
        } => {
            let raw = std::fs::read(&commands)
                .with_context(|| format!("reading commands {}", commands.display()))?;
            let batch: Vec<serde_json::Value> =
                serde_json::from_slice(&raw).context("commands file must be a JSON array")?;
            let ctx = Context::new(height, time.map_or_else(Timestamp::now, Timestamp::new));

            let (outcomes, swept) = daemon.apply(&ctx, batch)?;
            for outcome in &outcomes {
                if let Ok(result) = &outcome.result {
                    if let CommandResponse::Removed { completion_time } = result.response {
                        tracing::info!(
                            index = outcome.index,
                            stake_returns_in = %format_until(ctx.now(), completion_time),
                            "node unbonding"
                        );
                    }
                }
            }
            print_json(&serde_json::json!({
                "height": height,
                "results": outcomes.iter().map(output::outcome).collect::<Vec<_>>(),
                "end_block": swept.iter().map(output::event).collect::<Vec<_>>(),
            }))?;
            if metrics {
                print!("{}", daemon.app().metrics().encode_text()?);
            }
        }
        Command::Report { file } => {
            let raw =
                std::fs::read(&file).with_context(|| format!("reading report {}", file.display()))?;
            let report = VolumeReport::from_json(&raw)?;
            let event = daemon.report(&report)?;
            print_json(&output::pot_event(&event))?;
        }
        Command::Query { what } => match what {
            Query::ResourceNodes(filter) => {
                print_answer(daemon.nodes(&NodeQuery::List(NodeKind::Resource, filter.into_params()))?)?
            }
            Query::IndexingNodes(filter) => {
                print_answer(daemon.nodes(&NodeQuery::List(NodeKind::Indexing, filter.into_params()))?)?
            }
            Query::Stakes => {
                let stakes = daemon.total_stakes()?;
                print_json(&serde_json::json!({
                    "pools": stakes,
                    "total_bonded": stakes.total_bonded().to_string(),
                    "total_not_bonded": stakes.total_not_bonded().to_string(),
                }))?;
            }
            Query::NodeStake { address } => print_answer(daemon.nodes(&NodeQuery::Stake(address))?)?,
            Query::OwnerStakes { owner, page, limit } => {
                print_answer(daemon.nodes(&NodeQuery::OwnerStakes { owner, page, limit })?)?
            }
            Query::Params => print_json(&daemon.params()?)?,
            Query::VolumeReport { epoch } => print_json(&daemon.volume_report(epoch)?)?,
        },
        Command::ExportGenesis => print_json(&daemon.export_genesis()?)?,
    }

    Ok(())
}

fn print_answer(answer: NodeAnswer) -> anyhow::Result<()> {
    match answer {
        NodeAnswer::Nodes(nodes) => print_json(&nodes),
        NodeAnswer::Stakes(stakes) => print_json(&stakes),
    }
}
