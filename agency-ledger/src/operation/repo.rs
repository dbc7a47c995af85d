use async_trait::async_trait;

use super::entity::*;
use crate::{
    primitives::OperationId,
    store::{PgOp, StoreError},
};

#[async_trait]
pub trait OperationRepo: Send {
    async fn insert_operation(&mut self, operation: &Operation) -> Result<(), StoreError>;

    async fn find_operation(
        &mut self,
        id: OperationId,
    ) -> Result<Option<Operation>, StoreError>;

    async fn list_operations(
        &mut self,
        filter: &OperationFilter,
    ) -> Result<Vec<Operation>, StoreError>;
}

const OPERATION_COLUMNS: &str = r#"id, agency_id, customer_id, operator_id, seller_id, lead_id,
    status, sale_amount, sale_currency, operator_cost, cost_currency, departure_date, created_at"#;

#[async_trait]
impl OperationRepo for PgOp {
    async fn insert_operation(&mut self, operation: &Operation) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO operations
            (id, agency_id, customer_id, operator_id, seller_id, lead_id, status, sale_amount,
             sale_currency, operator_cost, cost_currency, departure_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
        )
        .bind(operation.id)
        .bind(operation.agency_id)
        .bind(operation.customer_id)
        .bind(operation.operator_id)
        .bind(operation.seller_id)
        .bind(operation.lead_id)
        .bind(operation.status)
        .bind(operation.sale_amount)
        .bind(operation.sale_currency)
        .bind(operation.operator_cost)
        .bind(operation.cost_currency)
        .bind(operation.departure_date)
        .bind(operation.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_operation(
        &mut self,
        id: OperationId,
    ) -> Result<Option<Operation>, StoreError> {
        let operation = sqlx::query_as::<_, Operation>(&format!(
            "SELECT {OPERATION_COLUMNS} FROM operations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(operation)
    }

    async fn list_operations(
        &mut self,
        filter: &OperationFilter,
    ) -> Result<Vec<Operation>, StoreError> {
        let operations = sqlx::query_as::<_, Operation>(&format!(
            r#"SELECT {OPERATION_COLUMNS} FROM operations
            WHERE ($1::uuid IS NULL OR agency_id = $1)
            AND ($2::uuid IS NULL OR customer_id = $2)
            AND ($3::uuid IS NULL OR operator_id = $3)
            ORDER BY created_at, id"#
        ))
        .bind(filter.agency_id)
        .bind(filter.customer_id)
        .bind(filter.operator_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(operations)
    }
}
