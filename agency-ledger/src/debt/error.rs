use thiserror::Error;

use crate::{exchange_rate::error::ExchangeRateError, primitives::OperationId, store::StoreError};

#[derive(Error, Debug)]
pub enum DebtError {
    #[error("DebtError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("DebtError - ExchangeRate: {0}")]
    ExchangeRate(#[from] ExchangeRateError),
    #[error("DebtError - Overflow: amounts of operation '{0}' do not fit in a decimal")]
    Overflow(OperationId),
}
