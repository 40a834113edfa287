//! Store-backed balances.
//!
//! Balances are kept as 16-byte big-endian `u128` values under
//! `bank/` + account key + `/` + denom.

use strato_store::{KvStore, StoreError};
use strato_types::Coin;

use crate::{AccountId, BalanceMover, BankError};

const BANK_PREFIX: &[u8] = b"bank/";

pub struct StoreBank<S: KvStore> {
    store: S,
}

impl<S: KvStore> StoreBank<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(account: &AccountId, denom: &str) -> Vec<u8> {
        let account = account.key_bytes();
        let mut key = Vec::with_capacity(BANK_PREFIX.len() + account.len() + 1 + denom.len());
        key.extend_from_slice(BANK_PREFIX);
        key.extend_from_slice(&account);
        key.push(b'/');
        key.extend_from_slice(denom.as_bytes());
        key
    }

    fn read(&self, account: &AccountId, denom: &str) -> Result<u128, BankError> {
        match self.store.get(&Self::key(account, denom))? {
            Some(bytes) => {
                let arr: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Corruption(format!("balance of {} has bad length", account))
                })?;
                Ok(u128::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    fn write(&self, account: &AccountId, denom: &str, amount: u128) -> Result<(), BankError> {
        let key = Self::key(account, denom);
        if amount == 0 {
            self.store.delete(&key)?;
        } else {
            self.store.put(&key, &amount.to_be_bytes())?;
        }
        Ok(())
    }

    /// Credit `coin` to `account` out of nowhere. Used for genesis funding
    /// and tests; never called while executing commands.
    pub fn mint(&self, account: &AccountId, coin: &Coin) -> Result<(), BankError> {
        let current = self.read(account, &coin.denom)?;
        let next = current
            .checked_add(coin.amount)
            .ok_or_else(|| BankError::Overflow(account.clone()))?;
        self.write(account, &coin.denom, next)
    }
}

impl<S: KvStore> BalanceMover for StoreBank<S> {
    fn move_balance(&self, from: &AccountId, to: &AccountId, coin: &Coin) -> Result<(), BankError> {
        if coin.amount == 0 || from == to {
            return Ok(());
        }
        let available = self.read(from, &coin.denom)?;
        if available < coin.amount {
            return Err(BankError::InsufficientFunds {
                account: from.clone(),
                needed: coin.amount,
                available,
            });
        }
        let dest = self.read(to, &coin.denom)?;
        let credited = dest
            .checked_add(coin.amount)
            .ok_or_else(|| BankError::Overflow(to.clone()))?;
        self.write(from, &coin.denom, available - coin.amount)?;
        self.write(to, &coin.denom, credited)?;
        tracing::trace!(%from, %to, amount = coin.amount, denom = %coin.denom, "moved balance");
        Ok(())
    }

    fn balance(&self, account: &AccountId, denom: &str) -> Result<u128, BankError> {
        self.read(account, denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PoolId;
    use strato_nullables::NullStore;
    use strato_types::Address;

    fn owner(b: u8) -> AccountId {
        AccountId::Owner(Address::new([b; 20]))
    }

    #[test]
    fn move_between_owner_and_pool() {
        let store = NullStore::new();
        let bank = StoreBank::new(&store);
        bank.mint(&owner(1), &Coin::new("ustos", 1000)).unwrap();
        let pool = AccountId::Pool(PoolId::ResourceBonded);
        bank.move_balance(&owner(1), &pool, &Coin::new("ustos", 600))
            .unwrap();
        assert_eq!(bank.balance(&owner(1), "ustos").unwrap(), 400);
        assert_eq!(bank.balance(&pool, "ustos").unwrap(), 600);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let store = NullStore::new();
        let bank = StoreBank::new(&store);
        bank.mint(&owner(1), &Coin::new("ustos", 10)).unwrap();
        let err = bank
            .move_balance(&owner(1), &owner(2), &Coin::new("ustos", 11))
            .unwrap_err();
        assert!(matches!(
            err,
            BankError::InsufficientFunds {
                needed: 11,
                available: 10,
                ..
            }
        ));
        assert_eq!(bank.balance(&owner(1), "ustos").unwrap(), 10);
        assert_eq!(bank.balance(&owner(2), "ustos").unwrap(), 0);
    }

    #[test]
    fn denominations_are_separate() {
        let store = NullStore::new();
        let bank = StoreBank::new(&store);
        bank.mint(&owner(1), &Coin::new("uatom", 50)).unwrap();
        assert_eq!(bank.balance(&owner(1), "ustos").unwrap(), 0);
        assert!(bank
            .move_balance(&owner(1), &owner(2), &Coin::new("ustos", 1))
            .is_err());
    }

    #[test]
    fn emptied_balance_removes_key() {
        let store = NullStore::new();
        let bank = StoreBank::new(&store);
        bank.mint(&owner(1), &Coin::new("ustos", 5)).unwrap();
        bank.move_balance(&owner(1), &owner(2), &Coin::new("ustos", 5))
            .unwrap();
        assert_eq!(store.iter_prefix(b"bank/").unwrap().len(), 1);
    }
}
