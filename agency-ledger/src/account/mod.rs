//! [FinancialAccount] holds a single-currency balance for an agency.
mod entity;
pub mod error;
mod repo;

use tracing::instrument;

use crate::{
    chart_of_accounts,
    primitives::{AgencyId, FinancialAccountId},
    store::*,
};

pub use entity::*;
use error::*;
pub use repo::AccountRepo;

/// Service for working with `FinancialAccount` entities.
#[derive(Clone)]
pub struct Accounts<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Accounts<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    #[instrument(name = "agency_ledger.accounts.create", skip(self))]
    pub async fn create(
        &self,
        new_account: NewFinancialAccount,
    ) -> Result<FinancialAccount, AccountError> {
        let mut op = self.store.begin_op().await?;
        let account = self.create_in_op(&mut op, new_account).await?;
        op.commit().await?;
        Ok(account)
    }

    pub async fn create_in_op(
        &self,
        op: &mut S::Op,
        new_account: NewFinancialAccount,
    ) -> Result<FinancialAccount, AccountError> {
        if let Some(code) = new_account.chart_account_code.as_deref() {
            if chart_of_accounts::find_active(code).is_none() {
                return Err(AccountError::UnknownChartCode(code.to_string()));
            }
        }
        let account = new_account.into_account(op.now());
        op.insert_account(&account).await?;
        Ok(account)
    }

    #[instrument(name = "agency_ledger.accounts.find", skip(self), err)]
    pub async fn find(&self, id: FinancialAccountId) -> Result<FinancialAccount, AccountError> {
        let mut op = self.store.begin_op().await?;
        self.find_in_op(&mut op, id).await
    }

    pub async fn find_in_op(
        &self,
        op: &mut S::Op,
        id: FinancialAccountId,
    ) -> Result<FinancialAccount, AccountError> {
        op.find_account(id)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    #[instrument(name = "agency_ledger.accounts.list_for_agency", skip(self), err)]
    pub async fn list_for_agency(
        &self,
        agency_id: AgencyId,
        include_inactive: bool,
    ) -> Result<Vec<FinancialAccount>, AccountError> {
        let mut op = self.store.begin_op().await?;
        Ok(op
            .list_accounts_for_agency(agency_id, include_inactive)
            .await?)
    }

    /// Locks every requested account for the rest of `op`, in id order.
    ///
    /// Fails if any of them does not exist.
    pub(crate) async fn lock_in_op(
        &self,
        op: &mut S::Op,
        ids: &[FinancialAccountId],
    ) -> Result<Vec<FinancialAccount>, AccountError> {
        let mut sorted = ids.to_vec();
        sorted.sort();
        sorted.dedup();
        let locked = op.lock_accounts(&sorted).await?;
        ids.iter()
            .map(|id| {
                locked
                    .iter()
                    .find(|account| account.id == *id)
                    .cloned()
                    .ok_or(AccountError::NotFound(*id))
            })
            .collect()
    }

    /// [`Self::lock_in_op`] for two distinct accounts, returned in argument
    /// order.
    pub(crate) async fn lock_pair_in_op(
        &self,
        op: &mut S::Op,
        first: FinancialAccountId,
        second: FinancialAccountId,
    ) -> Result<(FinancialAccount, FinancialAccount), AccountError> {
        let mut locked = self.lock_in_op(op, &[first, second]).await?.into_iter();
        match (locked.next(), locked.next()) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(AccountError::NotFound(second)),
        }
    }

    #[instrument(name = "agency_ledger.accounts.rename", skip(self), err)]
    pub async fn rename(
        &self,
        id: FinancialAccountId,
        name: impl Into<String> + std::fmt::Debug,
    ) -> Result<FinancialAccount, AccountError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AccountError::EmptyName);
        }
        let mut op = self.store.begin_op().await?;
        let mut account = self
            .lock_in_op(&mut op, &[id])
            .await?
            .pop()
            .ok_or(AccountError::NotFound(id))?;
        account.name = name;
        op.update_account(&account).await?;
        op.commit().await?;
        Ok(account)
    }

    #[instrument(name = "agency_ledger.accounts.assign_chart_code", skip(self), err)]
    pub async fn assign_chart_code(
        &self,
        id: FinancialAccountId,
        code: &str,
    ) -> Result<FinancialAccount, AccountError> {
        if chart_of_accounts::find_active(code).is_none() {
            return Err(AccountError::UnknownChartCode(code.to_string()));
        }
        let mut op = self.store.begin_op().await?;
        let mut account = self
            .lock_in_op(&mut op, &[id])
            .await?
            .pop()
            .ok_or(AccountError::NotFound(id))?;
        account.chart_account_code = Some(code.to_string());
        op.update_account(&account).await?;
        op.commit().await?;
        Ok(account)
    }

    pub(crate) async fn deactivate_in_op(
        &self,
        op: &mut S::Op,
        mut account: FinancialAccount,
    ) -> Result<FinancialAccount, AccountError> {
        account.is_active = false;
        op.update_account(&account).await?;
        Ok(account)
    }
}
