//! Free-form node metadata.

use serde::{Deserialize, Serialize};

/// Operator-supplied description of a node. Only `moniker` is required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub security_contact: String,
    #[serde(default)]
    pub details: String,
}

impl Description {
    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Self::default()
        }
    }

    pub fn has_moniker(&self) -> bool {
        !self.moniker.trim().is_empty()
    }
}
