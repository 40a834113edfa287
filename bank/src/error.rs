use strato_store::StoreError;
use thiserror::Error;

use crate::AccountId;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("balance overflow crediting {0}")]
    Overflow(AccountId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
