use async_trait::async_trait;

use super::entity::*;
use crate::{
    primitives::{AgencyId, FinancialAccountId},
    store::{PgOp, StoreError},
};

/// Typed persistence for [`FinancialAccount`]s.
///
/// `currency` is written once by `insert_account` and never touched by
/// `update_account`.
#[async_trait]
pub trait AccountRepo: Send {
    async fn insert_account(&mut self, account: &FinancialAccount) -> Result<(), StoreError>;

    async fn find_account(
        &mut self,
        id: FinancialAccountId,
    ) -> Result<Option<FinancialAccount>, StoreError>;

    async fn find_accounts(
        &mut self,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, StoreError>;

    /// Loads the accounts and holds them exclusively until the op ends.
    async fn lock_accounts(
        &mut self,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, StoreError>;

    async fn list_accounts_for_agency(
        &mut self,
        agency_id: AgencyId,
        include_inactive: bool,
    ) -> Result<Vec<FinancialAccount>, StoreError>;

    async fn update_account(&mut self, account: &FinancialAccount) -> Result<(), StoreError>;
}

const ACCOUNT_COLUMNS: &str = r#"id, agency_id, name, type, currency, initial_balance,
    chart_account_code, is_active, created_at"#;

#[async_trait]
impl AccountRepo for PgOp {
    async fn insert_account(&mut self, account: &FinancialAccount) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO financial_accounts
            (id, agency_id, name, type, currency, initial_balance, chart_account_code, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(account.id)
        .bind(account.agency_id)
        .bind(&account.name)
        .bind(account.account_type)
        .bind(account.currency)
        .bind(account.initial_balance)
        .bind(&account.chart_account_code)
        .bind(account.is_active)
        .bind(account.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_account(
        &mut self,
        id: FinancialAccountId,
    ) -> Result<Option<FinancialAccount>, StoreError> {
        let account = sqlx::query_as::<_, FinancialAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM financial_accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(account)
    }

    async fn find_accounts(
        &mut self,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, StoreError> {
        let ids: Vec<uuid::Uuid> = ids.iter().map(uuid::Uuid::from).collect();
        let accounts = sqlx::query_as::<_, FinancialAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM financial_accounts WHERE id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(accounts)
    }

    async fn lock_accounts(
        &mut self,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, StoreError> {
        let ids: Vec<uuid::Uuid> = ids.iter().map(uuid::Uuid::from).collect();
        let accounts = sqlx::query_as::<_, FinancialAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM financial_accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(accounts)
    }

    async fn list_accounts_for_agency(
        &mut self,
        agency_id: AgencyId,
        include_inactive: bool,
    ) -> Result<Vec<FinancialAccount>, StoreError> {
        let accounts = sqlx::query_as::<_, FinancialAccount>(&format!(
            r#"SELECT {ACCOUNT_COLUMNS} FROM financial_accounts
            WHERE agency_id = $1 AND (is_active OR $2)
            ORDER BY name, id"#
        ))
        .bind(agency_id)
        .bind(include_inactive)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(accounts)
    }

    async fn update_account(&mut self, account: &FinancialAccount) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE financial_accounts
            SET name = $2, chart_account_code = $3, is_active = $4
            WHERE id = $1"#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.chart_account_code)
        .bind(account.is_active)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }
}
