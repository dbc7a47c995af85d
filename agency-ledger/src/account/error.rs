use thiserror::Error;

use crate::{primitives::FinancialAccountId, store::StoreError};

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("AccountError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("AccountError - NotFound: id '{0}' not found")]
    NotFound(FinancialAccountId),
    #[error("AccountError - Inactive: account '{0}' is no longer active")]
    Inactive(FinancialAccountId),
    #[error("AccountError - UnknownChartCode: '{0}' is not an active chart of accounts code")]
    UnknownChartCode(String),
    #[error("AccountError - EmptyName")]
    EmptyName,
}
