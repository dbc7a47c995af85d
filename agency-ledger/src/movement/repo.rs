use async_trait::async_trait;

use super::entity::*;
use crate::{
    primitives::{FinancialAccountId, LeadId, LedgerMovementId, OperationId},
    store::{PgOp, StoreError},
};

/// Typed persistence for the movement journal.
///
/// There is no general update: the only mutations after insert are
/// [`MovementRepo::reattribute_lead`] and the compensating
/// [`MovementRepo::delete_movement`] used when a payment is undone.
#[async_trait]
pub trait MovementRepo: Send {
    async fn insert_movement(&mut self, movement: &LedgerMovement) -> Result<(), StoreError>;

    async fn find_movement(
        &mut self,
        id: LedgerMovementId,
    ) -> Result<Option<LedgerMovement>, StoreError>;

    /// Every movement of every requested account, oldest first.
    async fn list_movements_for_accounts(
        &mut self,
        account_ids: &[FinancialAccountId],
    ) -> Result<Vec<LedgerMovement>, StoreError>;

    async fn list_movements_for_operation(
        &mut self,
        operation_id: OperationId,
    ) -> Result<Vec<LedgerMovement>, StoreError>;

    /// Movements still attributed to `lead_id`, locked until the op ends.
    async fn list_movements_for_lead(
        &mut self,
        lead_id: LeadId,
    ) -> Result<Vec<LedgerMovement>, StoreError>;

    /// Points every movement of `lead_id` at `operation_id` and clears the
    /// lead. Returns how many rows changed.
    async fn reattribute_lead(
        &mut self,
        lead_id: LeadId,
        operation_id: OperationId,
    ) -> Result<u64, StoreError>;

    async fn delete_movement(&mut self, id: LedgerMovementId) -> Result<bool, StoreError>;
}

const MOVEMENT_COLUMNS: &str = r#"id, type, currency, amount_original, exchange_rate,
    amount_equivalent, account_id, operation_id, lead_id, seller_id, operator_id, notes,
    created_at, created_by"#;

#[async_trait]
impl MovementRepo for PgOp {
    async fn insert_movement(&mut self, movement: &LedgerMovement) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO ledger_movements
            (id, type, currency, amount_original, exchange_rate, amount_equivalent, account_id,
             operation_id, lead_id, seller_id, operator_id, notes, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(movement.id)
        .bind(movement.movement_type)
        .bind(movement.currency)
        .bind(movement.amount_original)
        .bind(movement.exchange_rate)
        .bind(movement.amount_equivalent)
        .bind(movement.account_id)
        .bind(movement.operation_id)
        .bind(movement.lead_id)
        .bind(movement.seller_id)
        .bind(movement.operator_id)
        .bind(&movement.notes)
        .bind(movement.created_at)
        .bind(movement.created_by)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_movement(
        &mut self,
        id: LedgerMovementId,
    ) -> Result<Option<LedgerMovement>, StoreError> {
        let movement = sqlx::query_as::<_, LedgerMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM ledger_movements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(movement)
    }

    async fn list_movements_for_accounts(
        &mut self,
        account_ids: &[FinancialAccountId],
    ) -> Result<Vec<LedgerMovement>, StoreError> {
        let ids: Vec<uuid::Uuid> = account_ids.iter().map(uuid::Uuid::from).collect();
        let movements = sqlx::query_as::<_, LedgerMovement>(&format!(
            r#"SELECT {MOVEMENT_COLUMNS} FROM ledger_movements
            WHERE account_id = ANY($1)
            ORDER BY created_at, id"#
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(movements)
    }

    async fn list_movements_for_operation(
        &mut self,
        operation_id: OperationId,
    ) -> Result<Vec<LedgerMovement>, StoreError> {
        let movements = sqlx::query_as::<_, LedgerMovement>(&format!(
            r#"SELECT {MOVEMENT_COLUMNS} FROM ledger_movements
            WHERE operation_id = $1
            ORDER BY created_at, id"#
        ))
        .bind(operation_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(movements)
    }

    async fn list_movements_for_lead(
        &mut self,
        lead_id: LeadId,
    ) -> Result<Vec<LedgerMovement>, StoreError> {
        let movements = sqlx::query_as::<_, LedgerMovement>(&format!(
            r#"SELECT {MOVEMENT_COLUMNS} FROM ledger_movements
            WHERE lead_id = $1
            ORDER BY created_at, id
            FOR UPDATE"#
        ))
        .bind(lead_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(movements)
    }

    async fn reattribute_lead(
        &mut self,
        lead_id: LeadId,
        operation_id: OperationId,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"UPDATE ledger_movements
            SET operation_id = $2, lead_id = NULL
            WHERE lead_id = $1"#,
        )
        .bind(lead_id)
        .bind(operation_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_movement(&mut self, id: LedgerMovementId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM ledger_movements WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
