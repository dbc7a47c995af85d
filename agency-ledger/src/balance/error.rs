use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    primitives::{Currency, FinancialAccountId, LedgerMovementId},
    store::StoreError,
};

#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("BalanceError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("BalanceError - AccountNotFound: id '{0}' not found")]
    AccountNotFound(FinancialAccountId),
    #[error("BalanceError - CurrencyMismatch: account '{account_id}' holds {account_currency}, requested {requested}")]
    CurrencyMismatch {
        account_id: FinancialAccountId,
        account_currency: Currency,
        requested: Currency,
    },
    #[error("BalanceError - NegativeAmount: {0}")]
    NegativeAmount(Decimal),
    #[error("BalanceError - InconsistentMovement: movement '{movement_id}' cannot be applied to account '{account_id}'")]
    InconsistentMovement {
        account_id: FinancialAccountId,
        movement_id: LedgerMovementId,
    },
    #[error("BalanceError - Overflow: balance of account '{0}' does not fit in a decimal")]
    Overflow(FinancialAccountId),
    #[error("Saldo insuficiente en la cuenta '{account_id}': saldo {balance}, monto {amount}, faltan {shortfall}")]
    InsufficientBalance {
        account_id: FinancialAccountId,
        balance: Decimal,
        amount: Decimal,
        shortfall: Decimal,
    },
}
