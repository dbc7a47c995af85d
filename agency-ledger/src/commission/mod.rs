//! Seller [Commission]s, paid out through [`crate::AgencyLedger::pay_commission`].
mod entity;
pub mod error;
mod repo;

use tracing::instrument;

use crate::{primitives::CommissionId, store::*};

pub use entity::*;
use error::*;
pub use repo::CommissionRepo;

#[derive(Clone)]
pub struct Commissions<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Commissions<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    #[instrument(name = "agency_ledger.commissions.create", skip(self), err)]
    pub async fn create(&self, new_commission: NewCommission) -> Result<Commission, CommissionError> {
        let mut op = self.store.begin_op().await?;
        let commission = new_commission.into_commission(op.now());
        op.insert_commission(&commission).await?;
        op.commit().await?;
        Ok(commission)
    }

    #[instrument(name = "agency_ledger.commissions.find", skip(self), err)]
    pub async fn find(&self, id: CommissionId) -> Result<Commission, CommissionError> {
        let mut op = self.store.begin_op().await?;
        op.find_commission(id)
            .await?
            .ok_or(CommissionError::NotFound(id))
    }

    /// Locks the commission and checks it can still be paid.
    pub(crate) async fn lock_pending_in_op(
        &self,
        op: &mut S::Op,
        id: CommissionId,
    ) -> Result<Commission, CommissionError> {
        let commission = op
            .lock_commission(id)
            .await?
            .ok_or(CommissionError::NotFound(id))?;
        if !commission.is_pending() {
            return Err(CommissionError::AlreadyPaid(id));
        }
        Ok(commission)
    }
}
