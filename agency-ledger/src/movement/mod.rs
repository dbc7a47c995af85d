//! Append-only journal of [LedgerMovement]s.
mod entity;
pub mod error;
mod repo;

use tracing::instrument;

use crate::{
    account::FinancialAccount,
    primitives::{FinancialAccountId, LeadId, LedgerMovementId, OperationId},
    store::*,
};

pub use entity::*;
use error::*;
pub use repo::MovementRepo;

/// Service for recording and reading `LedgerMovement`s.
///
/// Writing goes through [`crate::AgencyLedger::create_movement`] (or one of
/// the orchestrated operations) so that the balance guard and the account
/// lock are always applied; this service only offers the in-op primitive.
#[derive(Clone)]
pub struct Movements<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Movements<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// Validates `new_movement` against its (already locked) account and
    /// appends it.
    pub(crate) async fn create_in_op(
        &self,
        op: &mut S::Op,
        account: &FinancialAccount,
        new_movement: NewLedgerMovement,
    ) -> Result<LedgerMovement, MovementError> {
        new_movement.check_against(account)?;
        let movement = new_movement.into_movement(op.now())?;
        op.insert_movement(&movement).await?;
        tracing::debug!(
            movement_id = %movement.id,
            account_id = %movement.account_id,
            movement_type = %movement.movement_type,
            amount = %movement.amount_original,
            "ledger movement recorded"
        );
        Ok(movement)
    }

    #[instrument(name = "agency_ledger.movements.find", skip(self), err)]
    pub async fn find(&self, id: LedgerMovementId) -> Result<LedgerMovement, MovementError> {
        let mut op = self.store.begin_op().await?;
        op.find_movement(id)
            .await?
            .ok_or(MovementError::NotFound(id))
    }

    #[instrument(name = "agency_ledger.movements.list_for_account", skip(self), err)]
    pub async fn list_for_account(
        &self,
        account_id: FinancialAccountId,
    ) -> Result<Vec<LedgerMovement>, MovementError> {
        let mut op = self.store.begin_op().await?;
        Ok(op.list_movements_for_accounts(&[account_id]).await?)
    }

    #[instrument(name = "agency_ledger.movements.list_for_operation", skip(self), err)]
    pub async fn list_for_operation(
        &self,
        operation_id: OperationId,
    ) -> Result<Vec<LedgerMovement>, MovementError> {
        let mut op = self.store.begin_op().await?;
        Ok(op.list_movements_for_operation(operation_id).await?)
    }

    #[instrument(name = "agency_ledger.movements.list_for_lead", skip(self), err)]
    pub async fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<LedgerMovement>, MovementError> {
        let mut op = self.store.begin_op().await?;
        Ok(op.list_movements_for_lead(lead_id).await?)
    }
}
