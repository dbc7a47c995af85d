//! Customer and operator [Payment]s plus scheduled [OperatorPayment]s.
//!
//! Recording and undoing a payment touches the journal, so both live on
//! [`crate::AgencyLedger`]; this service covers lookups and scheduling.
mod entity;
pub mod error;
mod repo;

use tracing::instrument;

use crate::{
    primitives::{OperationId, OperatorPaymentId, PaymentId},
    store::*,
};

pub use entity::*;
use error::*;
pub use repo::PaymentRepo;

#[derive(Clone)]
pub struct Payments<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Payments<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    #[instrument(name = "agency_ledger.payments.find", skip(self), err)]
    pub async fn find(&self, id: PaymentId) -> Result<Payment, PaymentError> {
        let mut op = self.store.begin_op().await?;
        op.find_payment(id).await?.ok_or(PaymentError::NotFound(id))
    }

    #[instrument(name = "agency_ledger.payments.list_for_operation", skip(self), err)]
    pub async fn list_for_operation(
        &self,
        operation_id: OperationId,
    ) -> Result<Vec<Payment>, PaymentError> {
        let mut op = self.store.begin_op().await?;
        Ok(op.list_payments_for_operations(&[operation_id]).await?)
    }

    #[instrument(name = "agency_ledger.payments.schedule_operator_payment", skip(self), err)]
    pub async fn schedule_operator_payment(
        &self,
        new_operator_payment: NewOperatorPayment,
    ) -> Result<OperatorPayment, PaymentError> {
        let mut op = self.store.begin_op().await?;
        let operator_payment = new_operator_payment.into_operator_payment(op.now());
        op.insert_operator_payment(&operator_payment).await?;
        op.commit().await?;
        Ok(operator_payment)
    }

    #[instrument(name = "agency_ledger.payments.find_operator_payment", skip(self), err)]
    pub async fn find_operator_payment(
        &self,
        id: OperatorPaymentId,
    ) -> Result<OperatorPayment, PaymentError> {
        let mut op = self.store.begin_op().await?;
        op.find_operator_payment(id)
            .await?
            .ok_or(PaymentError::OperatorPaymentNotFound(id))
    }
}
