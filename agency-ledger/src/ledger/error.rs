use serde::Serialize;
use thiserror::Error;

use crate::{
    account::error::AccountError,
    balance::error::BalanceError,
    commission::error::CommissionError,
    debt::error::DebtError,
    exchange_rate::error::ExchangeRateError,
    movement::{error::MovementError, NewLedgerMovementBuilderError},
    operation::error::OperationError,
    payment::error::PaymentError,
    primitives::{Currency, FinancialAccountId, LeadId},
    store::StoreError,
};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("LedgerError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("LedgerError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("LedgerError - Config: {0}")]
    ConfigError(String),
    #[error("LedgerError - AccountError: {0}")]
    AccountError(#[from] AccountError),
    #[error("LedgerError - MovementError: {0}")]
    MovementError(#[from] MovementError),
    #[error("LedgerError - ExchangeRateError: {0}")]
    ExchangeRateError(#[from] ExchangeRateError),
    #[error("LedgerError - BalanceError: {0}")]
    BalanceError(#[from] BalanceError),
    #[error("LedgerError - CommissionError: {0}")]
    CommissionError(#[from] CommissionError),
    #[error("LedgerError - PaymentError: {0}")]
    PaymentError(#[from] PaymentError),
    #[error("LedgerError - OperationError: {0}")]
    OperationError(#[from] OperationError),
    #[error("LedgerError - DebtError: {0}")]
    DebtError(#[from] DebtError),
    #[error("LedgerError - InvalidMovement: {0}")]
    InvalidMovement(#[from] NewLedgerMovementBuilderError),
    #[error("LedgerError - SameAccount: cannot transfer from '{0}' to itself")]
    SameAccount(FinancialAccountId),
    #[error("LedgerError - CurrencyMismatch: account '{account_id}' holds {account_currency}, requested {requested}")]
    CurrencyMismatch {
        account_id: FinancialAccountId,
        account_currency: Currency,
        requested: Currency,
    },
    #[error("LedgerError - NonPositiveAmount: amount must be positive, got {0}")]
    NonPositiveAmount(rust_decimal::Decimal),
    #[error("LedgerError - TransferTargetRequired: account '{0}' has a non-zero balance")]
    TransferTargetRequired(FinancialAccountId),
    #[error("LedgerError - NegativeBalance: account '{0}' has a negative balance of {1}")]
    NegativeBalance(FinancialAccountId, rust_decimal::Decimal),
    #[error("LedgerError - ReattributionMismatch: lead '{lead_id}' had {expected} movements, {moved} were moved")]
    ReattributionMismatch {
        lead_id: LeadId,
        expected: usize,
        moved: u64,
    },
}

/// Coarse classification used by API layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientBalance,
    AlreadyPaid,
    ExchangeRateUnavailable,
    Storage,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        use ErrorKind::*;
        match self {
            LedgerError::Sqlx(_) | LedgerError::Store(_) | LedgerError::ConfigError(_) => Storage,
            LedgerError::AccountError(e) => match e {
                AccountError::Store(_) => Storage,
                AccountError::NotFound(_) => NotFound,
                AccountError::Inactive(_)
                | AccountError::UnknownChartCode(_)
                | AccountError::EmptyName => Validation,
            },
            LedgerError::MovementError(e) => match e {
                MovementError::Store(_) => Storage,
                MovementError::NotFound(_) => NotFound,
                MovementError::AccountMismatch(..)
                | MovementError::CurrencyMismatch { .. }
                | MovementError::EquivalentMismatch { .. }
                | MovementError::Overflow { .. } => Validation,
            },
            LedgerError::ExchangeRateError(e) => exchange_rate_kind(e),
            LedgerError::BalanceError(e) => match e {
                BalanceError::Store(_)
                | BalanceError::InconsistentMovement { .. }
                | BalanceError::Overflow(_) => Storage,
                BalanceError::AccountNotFound(_) => NotFound,
                BalanceError::InsufficientBalance { .. } => InsufficientBalance,
                BalanceError::CurrencyMismatch { .. } | BalanceError::NegativeAmount(_) => {
                    Validation
                }
            },
            LedgerError::CommissionError(e) => match e {
                CommissionError::Store(_) => Storage,
                CommissionError::NotFound(_) => NotFound,
                CommissionError::AlreadyPaid(_) => AlreadyPaid,
            },
            LedgerError::PaymentError(e) => match e {
                PaymentError::Store(_) => Storage,
                PaymentError::NotFound(_) | PaymentError::OperatorPaymentNotFound(_) => NotFound,
                PaymentError::OperatorPaymentAlreadyPaid(_) => AlreadyPaid,
                PaymentError::NotPaid(_)
                | PaymentError::OperatorPaymentMismatch(_)
                | PaymentError::Overflow { .. } => Validation,
            },
            LedgerError::OperationError(e) => match e {
                OperationError::Store(_) => Storage,
                OperationError::NotFound(_) => NotFound,
            },
            LedgerError::DebtError(e) => match e {
                DebtError::Store(_) => Storage,
                DebtError::ExchangeRate(e) => exchange_rate_kind(e),
                DebtError::Overflow(_) => Storage,
            },
            LedgerError::InvalidMovement(_)
            | LedgerError::SameAccount(_)
            | LedgerError::CurrencyMismatch { .. }
            | LedgerError::NonPositiveAmount(_)
            | LedgerError::TransferTargetRequired(_)
            | LedgerError::NegativeBalance(..) => Validation,
            LedgerError::ReattributionMismatch { .. } => Storage,
        }
    }
}

fn exchange_rate_kind(e: &ExchangeRateError) -> ErrorKind {
    match e {
        ExchangeRateError::Store(_) => ErrorKind::Storage,
        ExchangeRateError::NotFound(_) | ExchangeRateError::Unavailable(_) => {
            ErrorKind::ExchangeRateUnavailable
        }
        ExchangeRateError::InvalidRate(_) => ErrorKind::Validation,
    }
}
