use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ExchangeRateError {
    #[error("ExchangeRateError - Store: {0}")]
    Store(#[from] StoreError),
    #[error("ExchangeRateError - NotFound: no exchange rate stored for {0} nor any earlier date")]
    NotFound(NaiveDate),
    #[error("ExchangeRateError - Unavailable: no exchange rate for {0} and no default configured")]
    Unavailable(NaiveDate),
    #[error("ExchangeRateError - InvalidRate: rate must be positive, got {0}")]
    InvalidRate(Decimal),
}
