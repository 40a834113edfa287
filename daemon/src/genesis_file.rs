//! On-disk genesis document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strato_register::{GenesisState, RegisterParams};
use strato_types::Address;

/// Starting balance of one owner account, in the bond denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: Address,
    pub amount: u128,
}

/// Owner balances plus the registry genesis. The stake pools are funded
/// from the genesis node tokens, so only owner accounts are listed here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisFile {
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
    /// Absent means an empty registry with the configured params.
    #[serde(default)]
    pub register: Option<GenesisState>,
}

impl GenesisFile {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read(path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// The registry state to load, falling back to `params` when the file
    /// carries none.
    pub fn register_state(&self, params: &RegisterParams) -> GenesisState {
        self.register.clone().unwrap_or_else(|| GenesisState {
            params: params.clone(),
            ..GenesisState::default()
        })
    }
}
