//! Account and pool balance capability.
//!
//! The registry never touches balances directly. Every stake movement goes
//! through [`BalanceMover::move_balance`], which is the single seam where
//! balance conservation is enforced. [`StoreBank`] is the store-backed
//! implementation used by the daemon and the tests.

pub mod account;
pub mod error;
pub mod store_bank;

pub use account::{AccountId, PoolId};
pub use error::BankError;
pub use store_bank::StoreBank;

use strato_types::Coin;

/// Moves coins between owner accounts and module pools.
pub trait BalanceMover {
    /// Transfer `coin` from `from` to `to`. Fails without any change when
    /// `from` holds less than `coin.amount`.
    fn move_balance(&self, from: &AccountId, to: &AccountId, coin: &Coin) -> Result<(), BankError>;

    /// Current balance of `account` in `denom` (zero when never funded).
    fn balance(&self, account: &AccountId, denom: &str) -> Result<u128, BankError>;
}

/// Source of the single denomination accepted as stake.
pub trait BondDenomProvider {
    fn bond_denom(&self) -> &str;
}

impl<T: BalanceMover + ?Sized> BalanceMover for &T {
    fn move_balance(&self, from: &AccountId, to: &AccountId, coin: &Coin) -> Result<(), BankError> {
        (**self).move_balance(from, to, coin)
    }

    fn balance(&self, account: &AccountId, denom: &str) -> Result<u128, BankError> {
        (**self).balance(account, denom)
    }
}

impl<T: BondDenomProvider + ?Sized> BondDenomProvider for &T {
    fn bond_denom(&self) -> &str {
        (**self).bond_denom()
    }
}
