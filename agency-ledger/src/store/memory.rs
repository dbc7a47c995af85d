use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{error::StoreError, LedgerOp, LedgerStore};
use crate::{
    account::{AccountRepo, FinancialAccount},
    commission::{Commission, CommissionRepo},
    exchange_rate::{ExchangeRate, ExchangeRateRepo},
    movement::{LedgerMovement, MovementRepo},
    operation::{Operation, OperationFilter, OperationRepo},
    payment::{OperatorPayment, Payment, PaymentRepo},
    primitives::*,
};

#[derive(Clone, Default)]
struct MemoryState {
    accounts: HashMap<FinancialAccountId, FinancialAccount>,
    movements: Vec<LedgerMovement>,
    rates: BTreeMap<NaiveDate, ExchangeRate>,
    commissions: HashMap<CommissionId, Commission>,
    operations: HashMap<OperationId, Operation>,
    payments: HashMap<PaymentId, Payment>,
    operator_payments: HashMap<OperatorPaymentId, OperatorPayment>,
}

/// Process-local store. Ops are fully serialised: one op holds the whole
/// state until it is committed or dropped.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Op = MemoryOp;

    async fn begin_op(&self) -> Result<MemoryOp, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryOp {
            guard,
            staged,
            now: Utc::now(),
        })
    }
}

/// Works on a copy of the state that replaces the shared one on commit.
pub struct MemoryOp {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    now: DateTime<Utc>,
}

#[async_trait]
impl LedgerOp for MemoryOp {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryOp {
            mut guard, staged, ..
        } = self;
        *guard = staged;
        Ok(())
    }
}

#[async_trait]
impl AccountRepo for MemoryOp {
    async fn insert_account(&mut self, account: &FinancialAccount) -> Result<(), StoreError> {
        if self.staged.accounts.contains_key(&account.id) {
            return Err(StoreError::Duplicate(account.id.to_string()));
        }
        self.staged.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account(
        &mut self,
        id: FinancialAccountId,
    ) -> Result<Option<FinancialAccount>, StoreError> {
        Ok(self.staged.accounts.get(&id).cloned())
    }

    async fn find_accounts(
        &mut self,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.staged.accounts.get(id).cloned())
            .collect())
    }

    async fn lock_accounts(
        &mut self,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, StoreError> {
        self.find_accounts(ids).await
    }

    async fn list_accounts_for_agency(
        &mut self,
        agency_id: AgencyId,
        include_inactive: bool,
    ) -> Result<Vec<FinancialAccount>, StoreError> {
        let mut accounts: Vec<_> = self
            .staged
            .accounts
            .values()
            .filter(|account| account.agency_id == agency_id)
            .filter(|account| include_inactive || account.is_active)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn update_account(&mut self, account: &FinancialAccount) -> Result<(), StoreError> {
        if let Some(stored) = self.staged.accounts.get_mut(&account.id) {
            stored.name = account.name.clone();
            stored.chart_account_code = account.chart_account_code.clone();
            stored.is_active = account.is_active;
        }
        Ok(())
    }
}

#[async_trait]
impl MovementRepo for MemoryOp {
    async fn insert_movement(&mut self, movement: &LedgerMovement) -> Result<(), StoreError> {
        if movement.operation_id.is_some() && movement.lead_id.is_some() {
            return Err(StoreError::ConstraintViolation(format!(
                "movement '{}' references both an operation and a lead",
                movement.id
            )));
        }
        self.staged.movements.push(movement.clone());
        Ok(())
    }

    async fn find_movement(
        &mut self,
        id: LedgerMovementId,
    ) -> Result<Option<LedgerMovement>, StoreError> {
        Ok(self
            .staged
            .movements
            .iter()
            .find(|movement| movement.id == id)
            .cloned())
    }

    async fn list_movements_for_accounts(
        &mut self,
        account_ids: &[FinancialAccountId],
    ) -> Result<Vec<LedgerMovement>, StoreError> {
        Ok(self
            .staged
            .movements
            .iter()
            .filter(|movement| account_ids.contains(&movement.account_id))
            .cloned()
            .collect())
    }

    async fn list_movements_for_operation(
        &mut self,
        operation_id: OperationId,
    ) -> Result<Vec<LedgerMovement>, StoreError> {
        Ok(self
            .staged
            .movements
            .iter()
            .filter(|movement| movement.operation_id == Some(operation_id))
            .cloned()
            .collect())
    }

    async fn list_movements_for_lead(
        &mut self,
        lead_id: LeadId,
    ) -> Result<Vec<LedgerMovement>, StoreError> {
        Ok(self
            .staged
            .movements
            .iter()
            .filter(|movement| movement.lead_id == Some(lead_id))
            .cloned()
            .collect())
    }

    async fn reattribute_lead(
        &mut self,
        lead_id: LeadId,
        operation_id: OperationId,
    ) -> Result<u64, StoreError> {
        let mut moved = 0;
        for movement in self
            .staged
            .movements
            .iter_mut()
            .filter(|movement| movement.lead_id == Some(lead_id))
        {
            movement.lead_id = None;
            movement.operation_id = Some(operation_id);
            moved += 1;
        }
        Ok(moved)
    }

    async fn delete_movement(&mut self, id: LedgerMovementId) -> Result<bool, StoreError> {
        let before = self.staged.movements.len();
        self.staged.movements.retain(|movement| movement.id != id);
        Ok(self.staged.movements.len() < before)
    }
}

#[async_trait]
impl ExchangeRateRepo for MemoryOp {
    async fn find_rate_on(
        &mut self,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>, StoreError> {
        Ok(self.staged.rates.get(&date).copied())
    }

    async fn find_latest_rate(&mut self) -> Result<Option<ExchangeRate>, StoreError> {
        Ok(self.staged.rates.values().next_back().copied())
    }

    async fn upsert_rate(&mut self, rate: &ExchangeRate) -> Result<(), StoreError> {
        self.staged.rates.insert(rate.date, *rate);
        Ok(())
    }
}

#[async_trait]
impl CommissionRepo for MemoryOp {
    async fn insert_commission(&mut self, commission: &Commission) -> Result<(), StoreError> {
        if self.staged.commissions.contains_key(&commission.id) {
            return Err(StoreError::Duplicate(commission.id.to_string()));
        }
        self.staged
            .commissions
            .insert(commission.id, commission.clone());
        Ok(())
    }

    async fn find_commission(
        &mut self,
        id: CommissionId,
    ) -> Result<Option<Commission>, StoreError> {
        Ok(self.staged.commissions.get(&id).cloned())
    }

    async fn lock_commission(
        &mut self,
        id: CommissionId,
    ) -> Result<Option<Commission>, StoreError> {
        self.find_commission(id).await
    }

    async fn update_commission(&mut self, commission: &Commission) -> Result<(), StoreError> {
        self.staged
            .commissions
            .insert(commission.id, commission.clone());
        Ok(())
    }
}

#[async_trait]
impl OperationRepo for MemoryOp {
    async fn insert_operation(&mut self, operation: &Operation) -> Result<(), StoreError> {
        if self.staged.operations.contains_key(&operation.id) {
            return Err(StoreError::Duplicate(operation.id.to_string()));
        }
        self.staged
            .operations
            .insert(operation.id, operation.clone());
        Ok(())
    }

    async fn find_operation(
        &mut self,
        id: OperationId,
    ) -> Result<Option<Operation>, StoreError> {
        Ok(self.staged.operations.get(&id).cloned())
    }

    async fn list_operations(
        &mut self,
        filter: &OperationFilter,
    ) -> Result<Vec<Operation>, StoreError> {
        let mut operations: Vec<_> = self
            .staged
            .operations
            .values()
            .filter(|operation| filter.matches(operation))
            .cloned()
            .collect();
        operations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(operations)
    }
}

#[async_trait]
impl PaymentRepo for MemoryOp {
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        if self.staged.payments.contains_key(&payment.id) {
            return Err(StoreError::Duplicate(payment.id.to_string()));
        }
        self.staged.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, StoreError> {
        Ok(self.staged.payments.get(&id).cloned())
    }

    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, StoreError> {
        self.find_payment(id).await
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError> {
        Ok(self.staged.payments.remove(&id).is_some())
    }

    async fn list_payments_for_operations(
        &mut self,
        operation_ids: &[OperationId],
    ) -> Result<Vec<Payment>, StoreError> {
        let mut payments: Vec<_> = self
            .staged
            .payments
            .values()
            .filter(|payment| operation_ids.contains(&payment.operation_id))
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            (a.paid_on, a.created_at, a.id).cmp(&(b.paid_on, b.created_at, b.id))
        });
        Ok(payments)
    }

    async fn insert_operator_payment(
        &mut self,
        operator_payment: &OperatorPayment,
    ) -> Result<(), StoreError> {
        if self
            .staged
            .operator_payments
            .contains_key(&operator_payment.id)
        {
            return Err(StoreError::Duplicate(operator_payment.id.to_string()));
        }
        self.staged
            .operator_payments
            .insert(operator_payment.id, operator_payment.clone());
        Ok(())
    }

    async fn find_operator_payment(
        &mut self,
        id: OperatorPaymentId,
    ) -> Result<Option<OperatorPayment>, StoreError> {
        Ok(self.staged.operator_payments.get(&id).cloned())
    }

    async fn lock_operator_payment(
        &mut self,
        id: OperatorPaymentId,
    ) -> Result<Option<OperatorPayment>, StoreError> {
        self.find_operator_payment(id).await
    }

    async fn update_operator_payment(
        &mut self,
        operator_payment: &OperatorPayment,
    ) -> Result<(), StoreError> {
        if let Some(stored) = self.staged.operator_payments.get_mut(&operator_payment.id) {
            stored.status = operator_payment.status;
            stored.payment_id = operator_payment.payment_id;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn dropped_op_leaves_nothing_behind() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        {
            let mut op = store.begin_op().await.unwrap();
            op.upsert_rate(&ExchangeRate { date, rate: dec!(900) })
                .await
                .unwrap();
        }
        let mut op = store.begin_op().await.unwrap();
        assert!(op.find_rate_on(date).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn committed_op_is_visible() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let mut op = store.begin_op().await.unwrap();
        op.upsert_rate(&ExchangeRate { date, rate: dec!(900) })
            .await
            .unwrap();
        op.commit().await.unwrap();
        let mut op = store.begin_op().await.unwrap();
        assert_eq!(op.find_latest_rate().await.unwrap().map(|r| r.rate), Some(dec!(900)));
    }
}
