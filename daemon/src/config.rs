//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strato_register::RegisterParams;
use strato_utils::LogFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid register params: {0}")]
    Params(String),
}

/// Configuration for the registry daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; every field
/// has a default so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Registry params written at genesis.
    #[serde(default)]
    pub params: RegisterParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./strato_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: RegisterParams::default(),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config
            .params
            .validate()
            .map_err(|e| ConfigError::Params(e.to_string()))?;
        if config.map_size == 0 {
            return Err(ConfigError::Parse("map_size must be non-zero".into()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strato_register::Threshold;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.params.bond_denom, "ustos");
    }

    #[test]
    fn file_values_override_defaults() {
        let config = DaemonConfig::from_toml_str(
            r#"
            data_dir = "/var/lib/strato"
            log_format = "json"
            log_level = "debug"

            [params]
            bond_denom = "utest"
            unbonding_period_secs = 60
            settlement_delay = true
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/strato"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.params.bond_denom, "utest");
        assert_eq!(config.params.unbonding_period_secs, 60);
        assert!(config.params.settlement_delay);
        assert_eq!(config.params.voting_period_secs, RegisterParams::default().voting_period_secs);
    }

    #[test]
    fn invalid_params_rejected() {
        let err = DaemonConfig::from_toml_str("[params]\nbond_denom = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Params(_)));

        let err = DaemonConfig::from_toml_str("log_format = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn quorum_accepts_either_form() {
        let config = DaemonConfig::from_toml_str(
            r#"
            [params]
            admission_quorum = { fixed = 2 }
            rejection_quorum = { fraction = { numerator = 1, denominator = 2 } }
            "#,
        )
        .unwrap();
        assert_eq!(config.params.admission_quorum, Threshold::Fixed(2));
        assert_eq!(config.params.rejection_quorum.required(5), 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DaemonConfig::from_toml_file(Path::new("/nonexistent/strato.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/strato.toml"));
    }
}
