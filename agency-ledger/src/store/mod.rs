//! Unit-of-work abstraction over the typed repositories.
//!
//! Every service call opens one op, reads and writes through the repository
//! traits it implements, and commits. An op that is dropped without
//! `commit` leaves nothing behind.
mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use crate::{
    account::AccountRepo, commission::CommissionRepo, exchange_rate::ExchangeRateRepo,
    movement::MovementRepo, operation::OperationRepo, payment::PaymentRepo,
};
pub use error::StoreError;
pub use memory::{MemoryOp, MemoryStore};
pub use postgres::{PgOp, PgStore};

#[async_trait]
pub trait LedgerStore: Clone + Send + Sync + 'static {
    type Op: LedgerOp;

    async fn begin_op(&self) -> Result<Self::Op, StoreError>;
}

#[async_trait]
pub trait LedgerOp:
    AccountRepo + MovementRepo + ExchangeRateRepo + CommissionRepo + PaymentRepo + OperationRepo + Send
{
    /// Timestamp stamped on every record written by this op.
    fn now(&self) -> DateTime<Utc>;

    async fn commit(self) -> Result<(), StoreError>;
}
