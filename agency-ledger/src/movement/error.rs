use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    primitives::{Currency, FinancialAccountId, LedgerMovementId},
    store::StoreError,
};

#[derive(Error, Debug)]
pub enum MovementError {
    #[error("MovementError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("MovementError - NotFound: id '{0}' not found")]
    NotFound(LedgerMovementId),
    #[error("MovementError - AccountMismatch: movement targets '{0}' but was checked against '{1}'")]
    AccountMismatch(FinancialAccountId, FinancialAccountId),
    #[error("MovementError - CurrencyMismatch: account '{account_id}' holds {account_currency}, movement is in {movement_currency}")]
    CurrencyMismatch {
        account_id: FinancialAccountId,
        account_currency: Currency,
        movement_currency: Currency,
    },
    #[error("MovementError - EquivalentMismatch: expected {expected}, supplied {supplied}")]
    EquivalentMismatch { expected: Decimal, supplied: Decimal },
    #[error("MovementError - Overflow: {amount} at rate {rate} does not fit in a decimal")]
    Overflow { amount: Decimal, rate: Decimal },
}
