//! Coin amounts.
//!
//! Amounts are plain non-negative integers (u128) in the smallest unit of the
//! denomination. Stake is only ever accepted in the registry's bond denomination.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Add two coins of the same denomination. `None` on denom mismatch or overflow.
    pub fn checked_add(&self, other: &Coin) -> Option<Coin> {
        if self.denom != other.denom {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Coin::new(self.denom.clone(), amount))
    }

    /// Subtract two coins of the same denomination. `None` on denom mismatch or underflow.
    pub fn checked_sub(&self, other: &Coin) -> Option<Coin> {
        if self.denom != other.denom {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Coin::new(self.denom.clone(), amount))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_requires_same_denom() {
        let a = Coin::new("ustos", 10);
        let b = Coin::new("ustos", 4);
        assert_eq!(a.checked_add(&b), Some(Coin::new("ustos", 14)));
        assert_eq!(a.checked_sub(&b), Some(Coin::new("ustos", 6)));
        assert_eq!(b.checked_sub(&a), None);
        assert_eq!(a.checked_add(&Coin::new("uatom", 1)), None);
    }

    #[test]
    fn display_is_amount_then_denom() {
        assert_eq!(Coin::new("ustos", 1000).to_string(), "1000ustos");
    }
}
