use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use super::{error::StoreError, LedgerOp, LedgerStore};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    type Op = PgOp;

    #[instrument(name = "agency_ledger.pg_store.begin_op", skip_all, err)]
    async fn begin_op(&self) -> Result<PgOp, StoreError> {
        let mut tx = self.pool.begin().await?;
        let now: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&mut *tx)
            .await?;
        Ok(PgOp { tx, now })
    }
}

/// One database transaction. Rolled back on drop unless committed.
pub struct PgOp {
    pub(crate) tx: Transaction<'static, Postgres>,
    now: DateTime<Utc>,
}

#[async_trait]
impl LedgerOp for PgOp {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
