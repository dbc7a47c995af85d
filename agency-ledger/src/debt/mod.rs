//! Customer debts and operator payables derived from operations and payments.
//!
//! Nothing here is persisted. Every amount is normalised to REFERENCE currency
//! with the exchange rate of the operation's date.
mod entity;
pub mod error;

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;

use crate::{
    exchange_rate::RateCache,
    operation::OperationFilter,
    payment::PaymentDirection,
    primitives::{CustomerId, OperationId, OperatorId},
    store::*,
};

pub use entity::*;
use error::*;

#[derive(Clone)]
pub struct Debts<S: LedgerStore> {
    store: S,
    fallback_exchange_rate: Option<Decimal>,
}

impl<S: LedgerStore> Debts<S> {
    pub(crate) fn new(store: &S, fallback_exchange_rate: Option<Decimal>) -> Self {
        Self {
            store: store.clone(),
            fallback_exchange_rate,
        }
    }

    #[instrument(name = "agency_ledger.debts.customer_debts", skip(self), err)]
    pub async fn customer_debts(
        &self,
        filters: DebtFilters,
    ) -> Result<Vec<CustomerDebt>, DebtError> {
        let filter = OperationFilter {
            agency_id: filters.agency_id,
            customer_id: filters.customer_id,
            operator_id: None,
        };
        let rows = self
            .operation_debts::<CustomerId>(filter, PaymentDirection::Income)
            .await?;
        group_by_party(rows.into_iter().filter_map(
            |(customer_id, debt)| customer_id.map(|id| (id, debt)),
        ))
    }

    #[instrument(name = "agency_ledger.debts.operator_payables", skip(self), err)]
    pub async fn operator_payables(
        &self,
        filters: DebtFilters,
    ) -> Result<Vec<OperatorPayable>, DebtError> {
        let filter = OperationFilter {
            agency_id: filters.agency_id,
            customer_id: None,
            operator_id: filters.operator_id,
        };
        let rows = self
            .operation_debts::<OperatorId>(filter, PaymentDirection::Expense)
            .await?;
        group_by_party(rows.into_iter().filter_map(
            |(operator_id, debt)| operator_id.map(|id| (id, debt)),
        ))
    }

    /// Per-operation debt for one side, tagged with that side's party.
    async fn operation_debts<P>(
        &self,
        filter: OperationFilter,
        direction: PaymentDirection,
    ) -> Result<Vec<(Option<P>, OperationDebt)>, DebtError>
    where
        P: From<uuid::Uuid>,
    {
        let mut op = self.store.begin_op().await?;
        let operations: Vec<_> = op
            .list_operations(&filter)
            .await?
            .into_iter()
            .filter(|operation| operation.status.counts_toward_revenue())
            .collect();
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OperationId> = operations.iter().map(|operation| operation.id).collect();
        let payments = op.list_payments_for_operations(&ids).await?;
        let mut rates = RateCache::new(self.fallback_exchange_rate);

        let mut paid: HashMap<OperationId, Decimal> = HashMap::new();
        for payment in payments
            .iter()
            .filter(|payment| payment.is_paid() && payment.direction == direction)
        {
            let rate = if payment.needs_rate() {
                rates.resolve(&mut op, payment.paid_on).await?.rate
            } else {
                Decimal::ZERO
            };
            let overflow = || DebtError::Overflow(payment.operation_id);
            let amount = payment.reference_amount(|| rate).ok_or_else(overflow)?;
            let sum = paid.entry(payment.operation_id).or_default();
            *sum = sum.checked_add(amount).ok_or_else(overflow)?;
        }

        let mut rows = Vec::with_capacity(operations.len());
        for operation in operations {
            let (amount, currency, party) = match direction {
                PaymentDirection::Income => (
                    operation.sale_amount,
                    operation.sale_currency,
                    operation.customer_id.map(uuid::Uuid::from),
                ),
                PaymentDirection::Expense => (
                    operation.operator_cost,
                    operation.cost_currency,
                    operation.operator_id.map(uuid::Uuid::from),
                ),
            };
            let rate_date = operation.rate_date();
            let exchange_rate = if currency.is_reference() {
                None
            } else {
                Some(rates.resolve(&mut op, rate_date).await?.rate)
            };
            let total = match exchange_rate {
                Some(rate) => currency
                    .to_reference(amount, rate)
                    .ok_or(DebtError::Overflow(operation.id))?,
                None => amount,
            };
            let debt = OperationDebt::new(
                operation.id,
                rate_date,
                exchange_rate,
                total,
                paid.remove(&operation.id).unwrap_or_default(),
            );
            rows.push((party.map(P::from), debt));
        }
        Ok(rows)
    }
}
