pub mod config;
pub mod error;
mod transfer;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;

pub use config::*;
pub use error::{ErrorKind, LedgerError};
pub use transfer::*;

use crate::{
    account::{error::AccountError, Accounts, FinancialAccount},
    balance::{BalanceCheck, Balances},
    commission::{Commission, Commissions},
    debt::{CustomerDebt, DebtFilters, Debts, OperatorPayable},
    exchange_rate::{error::ExchangeRateError, ExchangeRates, ResolvedRate},
    movement::{
        LedgerMovement, MovementType, Movements, NewLedgerMovement, NewLedgerMovementBuilderError,
    },
    operation::Operations,
    payment::{error::PaymentError, NewPayment, Payment, PaymentDirection, Payments},
    primitives::*,
    store::*,
};

/// Entry point of the ledger: owns one service per entity and orchestrates
/// every operation that has to write more than one record atomically.
#[derive(Clone)]
pub struct AgencyLedger<S: LedgerStore = PgStore> {
    store: S,
    accounts: Accounts<S>,
    movements: Movements<S>,
    exchange_rates: ExchangeRates<S>,
    balances: Balances<S>,
    commissions: Commissions<S>,
    payments: Payments<S>,
    operations: Operations<S>,
    debts: Debts<S>,
    fallback_exchange_rate: Option<Decimal>,
}

impl AgencyLedger<PgStore> {
    pub async fn init(config: AgencyLedgerConfig) -> Result<Self, LedgerError> {
        let pool = match (config.pool, config.pg_con) {
            (Some(pool), None) => pool,
            (None, Some(pg_con)) => {
                let mut pool_opts = sqlx::postgres::PgPoolOptions::new();
                if let Some(max_connections) = config.max_connections {
                    pool_opts = pool_opts.max_connections(max_connections);
                }
                pool_opts.connect(&pg_con).await?
            }
            _ => {
                return Err(LedgerError::ConfigError(
                    "One of pg_con or pool must be set".to_string(),
                ))
            }
        };
        let store = PgStore::new(&pool);
        if config.exec_migrations {
            store.run_migrations().await?;
        }
        Ok(Self::new(store, config.fallback_exchange_rate))
    }
}

impl<S: LedgerStore> AgencyLedger<S> {
    pub fn new(store: S, fallback_exchange_rate: Option<Decimal>) -> Self {
        Self {
            accounts: Accounts::new(&store),
            movements: Movements::new(&store),
            exchange_rates: ExchangeRates::new(&store),
            balances: Balances::new(&store),
            commissions: Commissions::new(&store),
            payments: Payments::new(&store),
            operations: Operations::new(&store),
            debts: Debts::new(&store, fallback_exchange_rate),
            fallback_exchange_rate,
            store,
        }
    }

    pub fn accounts(&self) -> &Accounts<S> {
        &self.accounts
    }

    pub fn movements(&self) -> &Movements<S> {
        &self.movements
    }

    pub fn exchange_rates(&self) -> &ExchangeRates<S> {
        &self.exchange_rates
    }

    pub fn balances(&self) -> &Balances<S> {
        &self.balances
    }

    pub fn commissions(&self) -> &Commissions<S> {
        &self.commissions
    }

    pub fn payments(&self) -> &Payments<S> {
        &self.payments
    }

    pub fn operations(&self) -> &Operations<S> {
        &self.operations
    }

    pub fn debts(&self) -> &Debts<S> {
        &self.debts
    }

    pub fn fallback_exchange_rate(&self) -> Option<Decimal> {
        self.fallback_exchange_rate
    }

    /// Appends one movement. Debits are only written if the account can
    /// cover them.
    #[instrument(name = "agency_ledger.create_movement", skip(self), err)]
    pub async fn create_movement(
        &self,
        new_movement: NewLedgerMovement,
    ) -> Result<LedgerMovement, LedgerError> {
        let mut op = self.store.begin_op().await?;
        let movement = self.create_movement_in_op(&mut op, new_movement).await?;
        op.commit().await?;
        Ok(movement)
    }

    pub async fn create_movement_in_op(
        &self,
        op: &mut S::Op,
        new_movement: NewLedgerMovement,
    ) -> Result<LedgerMovement, LedgerError> {
        let account = self
            .lock_active_account(op, new_movement.account_id())
            .await?;
        new_movement.check_against(&account)?;
        if new_movement.movement_type().is_debit() {
            let amount = new_movement.balance_amount(account.currency)?;
            self.balances
                .ensure_sufficient_in_op(op, &account, amount)
                .await?;
        }
        Ok(self.movements.create_in_op(op, &account, new_movement).await?)
    }

    pub async fn get_balance(&self, account_id: FinancialAccountId) -> Result<Decimal, LedgerError> {
        Ok(self.balances.compute(account_id).await?)
    }

    pub async fn get_balances_batch(
        &self,
        account_ids: &[FinancialAccountId],
    ) -> Result<HashMap<FinancialAccountId, Decimal>, LedgerError> {
        Ok(self.balances.compute_batch(account_ids).await?)
    }

    pub async fn validate_sufficient_balance(
        &self,
        account_id: FinancialAccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<BalanceCheck, LedgerError> {
        Ok(self
            .balances
            .validate_sufficient_balance(account_id, amount, currency)
            .await?)
    }

    #[instrument(name = "agency_ledger.create_transfer", skip(self), err)]
    pub async fn create_transfer(&self, new_transfer: NewTransfer) -> Result<Transfer, LedgerError> {
        let mut op = self.store.begin_op().await?;
        let transfer = self.create_transfer_in_op(&mut op, new_transfer).await?;
        op.commit().await?;
        Ok(transfer)
    }

    pub async fn create_transfer_in_op(
        &self,
        op: &mut S::Op,
        new_transfer: NewTransfer,
    ) -> Result<Transfer, LedgerError> {
        let NewTransfer {
            from_account_id,
            to_account_id,
            amount,
            currency,
            date,
            notes,
            created_by,
        } = new_transfer;
        if from_account_id == to_account_id {
            return Err(LedgerError::SameAccount(from_account_id));
        }
        let (from, to) = self
            .accounts
            .lock_pair_in_op(op, from_account_id, to_account_id)
            .await?;
        for account in [&from, &to] {
            account.ensure_active()?;
            ensure_currency(account, currency)?;
        }
        let rate = self.rate_in_op(op, currency, date).await?;
        self.transfer_in_op(op, &from, &to, amount, rate, notes, created_by)
            .await
    }

    /// Writes the movement pair of a transfer between two locked accounts
    /// that are already known to share a currency.
    #[allow(clippy::too_many_arguments)]
    async fn transfer_in_op(
        &self,
        op: &mut S::Op,
        from: &FinancialAccount,
        to: &FinancialAccount,
        amount: Decimal,
        rate: Option<ResolvedRate>,
        notes: Option<String>,
        created_by: Option<UserId>,
    ) -> Result<Transfer, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        self.balances
            .ensure_sufficient_in_op(op, from, amount)
            .await?;

        let notes = notes.as_deref();
        let debit = transfer_leg(from, MovementType::Expense, amount, rate, notes, created_by)?;
        let debit = self.movements.create_in_op(op, from, debit).await?;
        let credit = transfer_leg(to, MovementType::Income, amount, rate, notes, created_by)?;
        let credit = self.movements.create_in_op(op, to, credit).await?;
        tracing::info!(
            from_account_id = %from.id,
            to_account_id = %to.id,
            %amount,
            "transfer recorded"
        );
        Ok(Transfer {
            from_account_id: from.id,
            to_account_id: to.id,
            amount,
            currency: from.currency,
            exchange_rate: rate,
            debit,
            credit,
        })
    }

    /// Pays out a pending commission: one COMMISSION movement and the
    /// commission flipped to PAID, atomically.
    ///
    /// `amount` and `currency` describe the payout from `account_id` and are
    /// authoritative. They may differ from the commission's own figures, for
    /// example when a LOCAL commission is settled from a REFERENCE account.
    #[instrument(name = "agency_ledger.pay_commission", skip(self), err)]
    pub async fn pay_commission(
        &self,
        commission_id: CommissionId,
        account_id: FinancialAccountId,
        amount: Decimal,
        currency: Currency,
        date: NaiveDate,
        created_by: Option<UserId>,
    ) -> Result<Commission, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        let mut op = self.store.begin_op().await?;
        let mut commission = self
            .commissions
            .lock_pending_in_op(&mut op, commission_id)
            .await?;
        let account = self.lock_active_account(&mut op, account_id).await?;
        ensure_currency(&account, currency)?;
        if commission.currency != currency || commission.amount != amount {
            tracing::info!(
                commission_id = %commission.id,
                commission_amount = %commission.amount,
                commission_currency = %commission.currency,
                %amount,
                %currency,
                "commission paid out with different figures"
            );
        }
        let rate = self.rate_in_op(&mut op, currency, date).await?;
        self.balances
            .ensure_sufficient_in_op(&mut op, &account, amount)
            .await?;

        let mut builder = NewLedgerMovement::builder();
        builder
            .movement_type(MovementType::Commission)
            .account_id(account.id)
            .currency(currency)
            .amount_original(amount)
            .seller_id(commission.seller_id);
        if let Some(rate) = rate {
            builder.exchange_rate(rate.rate);
        }
        if let Some(operation_id) = commission.operation_id {
            builder.operation_id(operation_id);
        }
        if let Some(created_by) = created_by {
            builder.created_by(created_by);
        }
        let movement = self
            .movements
            .create_in_op(&mut op, &account, builder.build()?)
            .await?;

        commission.mark_paid(movement.id, op.now());
        op.update_commission(&commission).await?;
        op.commit().await?;
        tracing::info!(
            commission_id = %commission.id,
            movement_id = %movement.id,
            "commission paid"
        );
        Ok(commission)
    }

    /// Deactivates an account, first moving any remaining balance to
    /// `transfer_to`.
    #[instrument(name = "agency_ledger.close_account", skip(self), err)]
    pub async fn close_account(
        &self,
        account_id: FinancialAccountId,
        transfer_to: Option<FinancialAccountId>,
        date: NaiveDate,
        created_by: Option<UserId>,
    ) -> Result<FinancialAccount, LedgerError> {
        let mut op = self.store.begin_op().await?;
        let (account, target) = match transfer_to {
            Some(target_id) if target_id == account_id => {
                return Err(LedgerError::SameAccount(account_id))
            }
            Some(target_id) => {
                let (account, target) = self
                    .accounts
                    .lock_pair_in_op(&mut op, account_id, target_id)
                    .await?;
                target.ensure_active()?;
                ensure_currency(&target, account.currency)?;
                (account, Some(target))
            }
            None => (self.lock_account(&mut op, account_id).await?, None),
        };
        account.ensure_active()?;

        let balance = self.balances.compute_in_op(&mut op, &account).await?;
        if balance < -BALANCE_EPSILON {
            return Err(LedgerError::NegativeBalance(account.id, balance));
        }
        if balance > BALANCE_EPSILON {
            let target = target.ok_or(LedgerError::TransferTargetRequired(account.id))?;
            let rate = self.rate_in_op(&mut op, account.currency, date).await?;
            let notes = format!("Cierre de cuenta {}", account.name);
            self.transfer_in_op(
                &mut op,
                &account,
                &target,
                balance,
                rate,
                Some(notes),
                created_by,
            )
            .await?;
        }
        let account = self.accounts.deactivate_in_op(&mut op, account).await?;
        op.commit().await?;
        tracing::info!(account_id = %account.id, %balance, "account closed");
        Ok(account)
    }

    /// Points every movement of `lead_id` at `operation_id` instead.
    /// Returns how many movements were moved.
    #[instrument(name = "agency_ledger.reattribute_lead_to_operation", skip(self), err)]
    pub async fn reattribute_lead_to_operation(
        &self,
        lead_id: LeadId,
        operation_id: OperationId,
    ) -> Result<u64, LedgerError> {
        let mut op = self.store.begin_op().await?;
        self.operations.find_in_op(&mut op, operation_id).await?;
        let expected = op.list_movements_for_lead(lead_id).await?.len();
        let moved = op.reattribute_lead(lead_id, operation_id).await?;
        if moved != expected as u64 {
            return Err(LedgerError::ReattributionMismatch {
                lead_id,
                expected,
                moved,
            });
        }
        op.commit().await?;
        tracing::info!(%lead_id, %operation_id, moved, "lead movements reattributed");
        Ok(moved)
    }

    /// Records a PAID customer or operator payment together with its ledger
    /// movement. Operator payments are guarded and settle the scheduled
    /// operator payment they reference.
    #[instrument(name = "agency_ledger.record_payment", skip(self), err)]
    pub async fn record_payment(&self, mut new_payment: NewPayment) -> Result<Payment, LedgerError> {
        let mut op = self.store.begin_op().await?;
        let operation = self
            .operations
            .find_in_op(&mut op, new_payment.operation_id)
            .await?;
        match new_payment.direction {
            PaymentDirection::Income => {
                new_payment.customer_id = new_payment.customer_id.or(operation.customer_id);
            }
            PaymentDirection::Expense => {
                new_payment.operator_id = new_payment.operator_id.or(operation.operator_id);
            }
        }
        let account = self
            .lock_active_account(&mut op, new_payment.account_id)
            .await?;
        ensure_currency(&account, new_payment.currency)?;

        let mut operator_payment = None;
        if let Some(id) = new_payment.operator_payment_id {
            let scheduled = op
                .lock_operator_payment(id)
                .await?
                .ok_or(PaymentError::OperatorPaymentNotFound(id))?;
            if !scheduled.is_pending() {
                return Err(PaymentError::OperatorPaymentAlreadyPaid(id).into());
            }
            if scheduled.operation_id != operation.id
                || Some(scheduled.operator_id) != new_payment.operator_id
            {
                return Err(PaymentError::OperatorPaymentMismatch(id).into());
            }
            operator_payment = Some(scheduled);
        }

        let rate = match self.rate_in_op(&mut op, Currency::Reference, new_payment.paid_on).await {
            Ok(rate) => rate,
            Err(LedgerError::ExchangeRateError(ExchangeRateError::Unavailable(_)))
                if new_payment.currency == Currency::Local =>
            {
                None
            }
            Err(e) => return Err(e),
        };
        if new_payment.direction == PaymentDirection::Expense {
            self.balances
                .ensure_sufficient_in_op(&mut op, &account, new_payment.amount)
                .await?;
        }

        let mut builder = NewLedgerMovement::builder();
        builder
            .movement_type(new_payment.direction.movement_type())
            .account_id(account.id)
            .currency(new_payment.currency)
            .amount_original(new_payment.amount)
            .operation_id(operation.id);
        if let (Currency::Reference, Some(rate)) = (new_payment.currency, rate) {
            builder.exchange_rate(rate.rate);
        }
        if let Some(operator_id) = new_payment.operator_id {
            builder.operator_id(operator_id);
        }
        if let Some(notes) = new_payment.notes.as_ref() {
            builder.notes(notes.clone());
        }
        if let Some(created_by) = new_payment.created_by {
            builder.created_by(created_by);
        }
        let movement = self
            .movements
            .create_in_op(&mut op, &account, builder.build()?)
            .await?;

        let payment = new_payment.into_payment(rate.map(|r| r.rate), movement.id, op.now())?;
        op.insert_payment(&payment).await?;
        if let Some(mut scheduled) = operator_payment {
            scheduled.settle(payment.id);
            op.update_operator_payment(&scheduled).await?;
        }
        op.commit().await?;
        tracing::info!(
            payment_id = %payment.id,
            operation_id = %payment.operation_id,
            direction = %payment.direction,
            amount = %payment.amount,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Reverses exactly what [`Self::record_payment`] wrote: its movement,
    /// the settlement of the scheduled operator payment and the payment
    /// itself.
    #[instrument(name = "agency_ledger.undo_payment", skip(self), err)]
    pub async fn undo_payment(&self, payment_id: PaymentId) -> Result<Payment, LedgerError> {
        let mut op = self.store.begin_op().await?;
        let payment = op
            .lock_payment(payment_id)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;
        if !payment.is_paid() {
            return Err(PaymentError::NotPaid(payment_id).into());
        }
        let account = self.lock_account(&mut op, payment.account_id).await?;
        let movement = match payment.movement_id {
            Some(movement_id) => op.find_movement(movement_id).await?,
            None => None,
        };
        if let Some(movement) = movement.as_ref().filter(|movement| !movement.is_debit()) {
            let amount = movement.signed_amount(account.currency);
            self.balances
                .ensure_sufficient_in_op(&mut op, &account, amount)
                .await?;
        }

        if let Some(id) = payment.operator_payment_id {
            if let Some(mut scheduled) = op.lock_operator_payment(id).await? {
                if scheduled.payment_id == Some(payment.id) {
                    scheduled.reopen();
                    op.update_operator_payment(&scheduled).await?;
                }
            }
        }
        op.delete_payment(payment.id).await?;
        match movement {
            Some(movement) => {
                op.delete_movement(movement.id).await?;
            }
            None => tracing::warn!(%payment_id, "payment has no movement left to remove"),
        }
        op.commit().await?;
        tracing::info!(%payment_id, "payment undone");
        Ok(payment)
    }

    pub async fn aggregate_customer_debts(
        &self,
        filters: DebtFilters,
    ) -> Result<Vec<CustomerDebt>, LedgerError> {
        Ok(self.debts.customer_debts(filters).await?)
    }

    pub async fn aggregate_operator_payables(
        &self,
        filters: DebtFilters,
    ) -> Result<Vec<OperatorPayable>, LedgerError> {
        Ok(self.debts.operator_payables(filters).await?)
    }

    async fn lock_account(
        &self,
        op: &mut S::Op,
        account_id: FinancialAccountId,
    ) -> Result<FinancialAccount, LedgerError> {
        Ok(self
            .accounts
            .lock_in_op(op, &[account_id])
            .await?
            .pop()
            .ok_or(AccountError::NotFound(account_id))?)
    }

    async fn lock_active_account(
        &self,
        op: &mut S::Op,
        account_id: FinancialAccountId,
    ) -> Result<FinancialAccount, LedgerError> {
        let account = self.lock_account(op, account_id).await?;
        account.ensure_active()?;
        Ok(account)
    }

    /// Rate for movements in `currency`; LOCAL amounts need none.
    async fn rate_in_op(
        &self,
        op: &mut S::Op,
        currency: Currency,
        date: NaiveDate,
    ) -> Result<Option<ResolvedRate>, LedgerError> {
        if !currency.is_reference() {
            return Ok(None);
        }
        Ok(Some(
            self.exchange_rates
                .resolve_or_in_op(op, date, self.fallback_exchange_rate)
                .await?,
        ))
    }
}

fn transfer_leg(
    account: &FinancialAccount,
    movement_type: MovementType,
    amount: Decimal,
    rate: Option<ResolvedRate>,
    notes: Option<&str>,
    created_by: Option<UserId>,
) -> Result<NewLedgerMovement, NewLedgerMovementBuilderError> {
    let mut builder = NewLedgerMovement::builder();
    builder
        .movement_type(movement_type)
        .account_id(account.id)
        .currency(account.currency)
        .amount_original(amount);
    if let Some(rate) = rate {
        builder.exchange_rate(rate.rate);
    }
    if let Some(notes) = notes {
        builder.notes(notes);
    }
    if let Some(created_by) = created_by {
        builder.created_by(created_by);
    }
    builder.build()
}

fn ensure_currency(account: &FinancialAccount, currency: Currency) -> Result<(), LedgerError> {
    if account.currency != currency {
        return Err(LedgerError::CurrencyMismatch {
            account_id: account.id,
            account_currency: account.currency,
            requested: currency,
        });
    }
    Ok(())
}
