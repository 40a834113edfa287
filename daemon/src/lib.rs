//! Registry daemon: opens the LMDB store, loads genesis, applies command
//! batches and answers queries. The binary in `main.rs` is a thin clap
//! front end over [`runner::Daemon`].

pub mod config;
pub mod genesis_file;
pub mod output;
pub mod runner;

pub use config::{ConfigError, DaemonConfig};
pub use genesis_file::{GenesisBalance, GenesisFile};
pub use runner::{ApplyOutcome, Daemon, NodeQuery};
