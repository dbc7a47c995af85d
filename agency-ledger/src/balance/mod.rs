//! Point-in-time balances recomputed from the movement journal.
//!
//! balance = initial_balance + Σ signed(movement). REFERENCE accounts sum
//! `amount_original`, LOCAL accounts sum `amount_equivalent`.
pub mod error;
mod guard;

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;

use crate::{
    account::FinancialAccount,
    movement::LedgerMovement,
    primitives::{Currency, FinancialAccountId},
    store::*,
};

use error::*;
pub use guard::*;

pub fn fold_balance<'a>(
    account: &FinancialAccount,
    movements: impl IntoIterator<Item = &'a LedgerMovement>,
) -> Result<Decimal, BalanceError> {
    movements
        .into_iter()
        .try_fold(account.initial_balance, |balance, movement| {
            if movement.account_id != account.id || movement.currency != account.currency {
                return Err(BalanceError::InconsistentMovement {
                    account_id: account.id,
                    movement_id: movement.id,
                });
            }
            balance
                .checked_add(movement.signed_amount(account.currency))
                .ok_or(BalanceError::Overflow(account.id))
        })
}

#[derive(Clone)]
pub struct Balances<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Balances<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    #[instrument(name = "agency_ledger.balances.compute", skip(self), err)]
    pub async fn compute(&self, account_id: FinancialAccountId) -> Result<Decimal, BalanceError> {
        let mut op = self.store.begin_op().await?;
        let account = op
            .find_account(account_id)
            .await?
            .ok_or(BalanceError::AccountNotFound(account_id))?;
        self.compute_in_op(&mut op, &account).await
    }

    pub(crate) async fn compute_in_op(
        &self,
        op: &mut S::Op,
        account: &FinancialAccount,
    ) -> Result<Decimal, BalanceError> {
        let movements = op.list_movements_for_accounts(&[account.id]).await?;
        fold_balance(account, &movements)
    }

    /// Balances of many accounts from a single read of the journal.
    ///
    /// Unknown ids are left out of the result. An account whose movements
    /// cannot be read or folded reports its `initial_balance` instead of
    /// failing the whole batch.
    #[instrument(name = "agency_ledger.balances.compute_batch", skip(self), fields(n_accounts = account_ids.len()), err)]
    pub async fn compute_batch(
        &self,
        account_ids: &[FinancialAccountId],
    ) -> Result<HashMap<FinancialAccountId, Decimal>, BalanceError> {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut op = self.store.begin_op().await?;
        let accounts = op.find_accounts(account_ids).await?;
        let movements = match op.list_movements_for_accounts(account_ids).await {
            Ok(movements) => movements,
            Err(err) => {
                tracing::warn!(error = %err, "could not load movements, reporting initial balances");
                return Ok(accounts
                    .into_iter()
                    .map(|account| (account.id, account.initial_balance))
                    .collect());
            }
        };

        let mut by_account: HashMap<FinancialAccountId, Vec<&LedgerMovement>> = HashMap::new();
        for movement in movements.iter() {
            by_account.entry(movement.account_id).or_default().push(movement);
        }

        let mut balances = HashMap::with_capacity(accounts.len());
        for account in accounts {
            let movements = by_account.remove(&account.id).unwrap_or_default();
            let balance = match fold_balance(&account, movements) {
                Ok(balance) => balance,
                Err(err) => {
                    tracing::warn!(
                        account_id = %account.id,
                        error = %err,
                        "balance computation failed, reporting initial balance"
                    );
                    account.initial_balance
                }
            };
            balances.insert(account.id, balance);
        }
        Ok(balances)
    }

    #[instrument(name = "agency_ledger.balances.validate_sufficient_balance", skip(self), err)]
    pub async fn validate_sufficient_balance(
        &self,
        account_id: FinancialAccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<BalanceCheck, BalanceError> {
        let mut op = self.store.begin_op().await?;
        let account = op
            .find_account(account_id)
            .await?
            .ok_or(BalanceError::AccountNotFound(account_id))?;
        self.check_in_op(&mut op, &account, amount, currency).await
    }

    /// Guard evaluated inside the op that will write the debit; `account`
    /// must already be locked by that op.
    pub(crate) async fn check_in_op(
        &self,
        op: &mut S::Op,
        account: &FinancialAccount,
        amount: Decimal,
        currency: Currency,
    ) -> Result<BalanceCheck, BalanceError> {
        if account.currency != currency {
            return Err(BalanceError::CurrencyMismatch {
                account_id: account.id,
                account_currency: account.currency,
                requested: currency,
            });
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(BalanceError::NegativeAmount(amount));
        }
        let balance = self.compute_in_op(op, account).await?;
        let check = BalanceCheck::evaluate(account.id, balance, amount)?;
        if !check.valid {
            tracing::info!(
                account_id = %account.id,
                %balance,
                %amount,
                shortfall = %check.shortfall,
                "debit rejected by balance guard"
            );
        }
        Ok(check)
    }

    pub(crate) async fn ensure_sufficient_in_op(
        &self,
        op: &mut S::Op,
        account: &FinancialAccount,
        amount: Decimal,
    ) -> Result<(), BalanceError> {
        self.check_in_op(op, account, amount, account.currency)
            .await?
            .ensure()
    }
}
