//! Registry parameters.

use serde::{Deserialize, Serialize};
use strato_bank::BondDenomProvider;

use crate::error::RegisterError;

const DAY_SECS: u64 = 24 * 60 * 60;

/// Vote count required to finalize a candidacy, given the number of bonded
/// indexing nodes at the time of the vote. Never less than one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// An absolute number of votes.
    Fixed(u32),
    /// `ceil(bonded * numerator / denominator)` votes.
    Fraction { numerator: u32, denominator: u32 },
}

impl Threshold {
    pub const TWO_THIRDS: Threshold = Threshold::Fraction {
        numerator: 2,
        denominator: 3,
    };

    pub fn required(&self, bonded_count: u64) -> u64 {
        let raw = match *self {
            Threshold::Fixed(n) => u64::from(n),
            Threshold::Fraction {
                numerator,
                denominator,
            } => {
                if denominator == 0 {
                    return u64::MAX;
                }
                let num = u128::from(bonded_count) * u128::from(numerator);
                let den = u128::from(denominator);
                u64::try_from(num.div_ceil(den)).unwrap_or(u64::MAX)
            }
        };
        raw.max(1)
    }

    fn validate(&self, name: &str) -> Result<(), RegisterError> {
        match *self {
            Threshold::Fixed(0) => Err(RegisterError::InvalidParams(format!(
                "{name}: fixed threshold must be at least 1"
            ))),
            Threshold::Fraction {
                numerator,
                denominator,
            } if denominator == 0 || numerator == 0 || numerator > denominator => {
                Err(RegisterError::InvalidParams(format!(
                    "{name}: fraction {numerator}/{denominator} must be in (0, 1]"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// All registry parameters, stored alongside the node records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParams {
    /// The single denomination accepted as stake.
    #[serde(default = "default_bond_denom")]
    pub bond_denom: String,

    /// Delay between a removal and the return of the stake.
    #[serde(default = "default_unbonding_period")]
    pub unbonding_period_secs: u64,

    /// How long an indexing-node candidacy stays open for votes.
    #[serde(default = "default_voting_period")]
    pub voting_period_secs: u64,

    /// Approvals needed to admit a candidate.
    #[serde(default = "default_quorum")]
    pub admission_quorum: Threshold,

    /// Rejections needed to turn a candidate away.
    #[serde(default = "default_quorum")]
    pub rejection_quorum: Threshold,

    /// When set, new resource nodes start in Bonding with their stake in the
    /// not-bonded pool and are settled to Bonded at the next end of block.
    #[serde(default)]
    pub settlement_delay: bool,

    /// Upper bound on page size for paged queries.
    #[serde(default = "default_max_entries")]
    pub max_entries: u32,
}

fn default_bond_denom() -> String {
    "ustos".to_string()
}

fn default_unbonding_period() -> u64 {
    21 * DAY_SECS
}

fn default_voting_period() -> u64 {
    7 * DAY_SECS
}

fn default_quorum() -> Threshold {
    Threshold::TWO_THIRDS
}

fn default_max_entries() -> u32 {
    100
}

impl Default for RegisterParams {
    fn default() -> Self {
        Self {
            bond_denom: default_bond_denom(),
            unbonding_period_secs: default_unbonding_period(),
            voting_period_secs: default_voting_period(),
            admission_quorum: default_quorum(),
            rejection_quorum: default_quorum(),
            settlement_delay: false,
            max_entries: default_max_entries(),
        }
    }
}

impl RegisterParams {
    pub fn validate(&self) -> Result<(), RegisterError> {
        if self.bond_denom.trim().is_empty() {
            return Err(RegisterError::InvalidParams("bond_denom is empty".into()));
        }
        if self.unbonding_period_secs == 0 {
            return Err(RegisterError::InvalidParams(
                "unbonding_period_secs must be positive".into(),
            ));
        }
        if self.voting_period_secs == 0 {
            return Err(RegisterError::InvalidParams(
                "voting_period_secs must be positive".into(),
            ));
        }
        if self.max_entries == 0 {
            return Err(RegisterError::InvalidParams(
                "max_entries must be positive".into(),
            ));
        }
        self.admission_quorum.validate("admission_quorum")?;
        self.rejection_quorum.validate("rejection_quorum")?;
        Ok(())
    }
}

impl BondDenomProvider for RegisterParams {
    fn bond_denom(&self) -> &str {
        &self.bond_denom
    }
}
