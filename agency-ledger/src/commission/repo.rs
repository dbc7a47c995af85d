use async_trait::async_trait;

use super::entity::*;
use crate::{
    primitives::CommissionId,
    store::{PgOp, StoreError},
};

#[async_trait]
pub trait CommissionRepo: Send {
    async fn insert_commission(&mut self, commission: &Commission) -> Result<(), StoreError>;

    async fn find_commission(
        &mut self,
        id: CommissionId,
    ) -> Result<Option<Commission>, StoreError>;

    /// Like `find_commission` but holds the row until the op ends.
    async fn lock_commission(
        &mut self,
        id: CommissionId,
    ) -> Result<Option<Commission>, StoreError>;

    async fn update_commission(&mut self, commission: &Commission) -> Result<(), StoreError>;
}

const COMMISSION_COLUMNS: &str =
    "id, seller_id, operation_id, amount, currency, status, movement_id, paid_at, created_at";

#[async_trait]
impl CommissionRepo for PgOp {
    async fn insert_commission(&mut self, commission: &Commission) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO commissions
            (id, seller_id, operation_id, amount, currency, status, movement_id, paid_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(commission.id)
        .bind(commission.seller_id)
        .bind(commission.operation_id)
        .bind(commission.amount)
        .bind(commission.currency)
        .bind(commission.status)
        .bind(commission.movement_id)
        .bind(commission.paid_at)
        .bind(commission.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_commission(
        &mut self,
        id: CommissionId,
    ) -> Result<Option<Commission>, StoreError> {
        let commission = sqlx::query_as::<_, Commission>(&format!(
            "SELECT {COMMISSION_COLUMNS} FROM commissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(commission)
    }

    async fn lock_commission(
        &mut self,
        id: CommissionId,
    ) -> Result<Option<Commission>, StoreError> {
        let commission = sqlx::query_as::<_, Commission>(&format!(
            "SELECT {COMMISSION_COLUMNS} FROM commissions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(commission)
    }

    async fn update_commission(&mut self, commission: &Commission) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE commissions
            SET status = $2, movement_id = $3, paid_at = $4
            WHERE id = $1"#,
        )
        .bind(commission.id)
        .bind(commission.status)
        .bind(commission.movement_id)
        .bind(commission.paid_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }
}
