use async_trait::async_trait;

use super::entity::*;
use crate::{
    primitives::{OperationId, OperatorPaymentId, PaymentId},
    store::{PgOp, StoreError},
};

#[async_trait]
pub trait PaymentRepo: Send {
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError>;

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, StoreError>;

    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, StoreError>;

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError>;

    async fn list_payments_for_operations(
        &mut self,
        operation_ids: &[OperationId],
    ) -> Result<Vec<Payment>, StoreError>;

    async fn insert_operator_payment(
        &mut self,
        operator_payment: &OperatorPayment,
    ) -> Result<(), StoreError>;

    async fn find_operator_payment(
        &mut self,
        id: OperatorPaymentId,
    ) -> Result<Option<OperatorPayment>, StoreError>;

    async fn lock_operator_payment(
        &mut self,
        id: OperatorPaymentId,
    ) -> Result<Option<OperatorPayment>, StoreError>;

    async fn update_operator_payment(
        &mut self,
        operator_payment: &OperatorPayment,
    ) -> Result<(), StoreError>;
}

const PAYMENT_COLUMNS: &str = r#"id, operation_id, account_id, direction, status, currency, amount,
    exchange_rate, amount_reference, customer_id, operator_id, operator_payment_id, movement_id,
    paid_on, notes, created_at, created_by"#;

const OPERATOR_PAYMENT_COLUMNS: &str =
    "id, operation_id, operator_id, amount, currency, status, payment_id, due_date, created_at";

#[async_trait]
impl PaymentRepo for PgOp {
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO payments
            (id, operation_id, account_id, direction, status, currency, amount, exchange_rate,
             amount_reference, customer_id, operator_id, operator_payment_id, movement_id,
             paid_on, notes, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"#,
        )
        .bind(payment.id)
        .bind(payment.operation_id)
        .bind(payment.account_id)
        .bind(payment.direction)
        .bind(payment.status)
        .bind(payment.currency)
        .bind(payment.amount)
        .bind(payment.exchange_rate)
        .bind(payment.amount_reference)
        .bind(payment.customer_id)
        .bind(payment.operator_id)
        .bind(payment.operator_payment_id)
        .bind(payment.movement_id)
        .bind(payment.paid_on)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .bind(payment.created_by)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, StoreError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(payment)
    }

    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, StoreError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(payment)
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_payments_for_operations(
        &mut self,
        operation_ids: &[OperationId],
    ) -> Result<Vec<Payment>, StoreError> {
        let ids: Vec<uuid::Uuid> = operation_ids.iter().map(uuid::Uuid::from).collect();
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE operation_id = ANY($1)
            ORDER BY paid_on, created_at, id"#
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(payments)
    }

    async fn insert_operator_payment(
        &mut self,
        operator_payment: &OperatorPayment,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO operator_payments
            (id, operation_id, operator_id, amount, currency, status, payment_id, due_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(operator_payment.id)
        .bind(operator_payment.operation_id)
        .bind(operator_payment.operator_id)
        .bind(operator_payment.amount)
        .bind(operator_payment.currency)
        .bind(operator_payment.status)
        .bind(operator_payment.payment_id)
        .bind(operator_payment.due_date)
        .bind(operator_payment.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_operator_payment(
        &mut self,
        id: OperatorPaymentId,
    ) -> Result<Option<OperatorPayment>, StoreError> {
        let operator_payment = sqlx::query_as::<_, OperatorPayment>(&format!(
            "SELECT {OPERATOR_PAYMENT_COLUMNS} FROM operator_payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(operator_payment)
    }

    async fn lock_operator_payment(
        &mut self,
        id: OperatorPaymentId,
    ) -> Result<Option<OperatorPayment>, StoreError> {
        let operator_payment = sqlx::query_as::<_, OperatorPayment>(&format!(
            "SELECT {OPERATOR_PAYMENT_COLUMNS} FROM operator_payments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(operator_payment)
    }

    async fn update_operator_payment(
        &mut self,
        operator_payment: &OperatorPayment,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE operator_payments SET status = $2, payment_id = $3 WHERE id = $1")
            .bind(operator_payment.id)
            .bind(operator_payment.status)
            .bind(operator_payment.payment_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
