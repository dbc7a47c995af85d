use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{exchange_rate::ResolvedRate, movement::LedgerMovement, primitives::*};

/// Request to move money between two accounts of the same currency.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewTransfer {
    #[builder(setter(into))]
    pub(super) from_account_id: FinancialAccountId,
    #[builder(setter(into))]
    pub(super) to_account_id: FinancialAccountId,
    pub(super) amount: Decimal,
    pub(super) currency: Currency,
    /// Date whose exchange rate values the transfer.
    pub(super) date: NaiveDate,
    #[builder(setter(strip_option, into), default)]
    pub(super) notes: Option<String>,
    #[builder(setter(strip_option, into), default)]
    pub(super) created_by: Option<UserId>,
}

impl NewTransfer {
    pub fn builder() -> NewTransferBuilder {
        NewTransferBuilder::default()
    }
}

impl NewTransferBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(format!("Transfer amount must be positive, got {amount}"));
            }
        }
        if let (Some(from), Some(to)) = (self.from_account_id, self.to_account_id) {
            if from == to {
                return Err("Cannot transfer to the same account".to_string());
            }
        }
        Ok(())
    }
}

/// The EXPENSE / INCOME pair written by a transfer.
#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    pub from_account_id: FinancialAccountId,
    pub to_account_id: FinancialAccountId,
    pub amount: Decimal,
    pub currency: Currency,
    pub exchange_rate: Option<ResolvedRate>,
    pub debit: LedgerMovement,
    pub credit: LedgerMovement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_transfer_to_same_account() {
        let account = FinancialAccountId::new();
        let res = NewTransfer::builder()
            .from_account_id(account)
            .to_account_id(account)
            .amount(dec!(10))
            .currency(Currency::Local)
            .date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn rejects_non_positive_amount() {
        let res = NewTransfer::builder()
            .from_account_id(FinancialAccountId::new())
            .to_account_id(FinancialAccountId::new())
            .amount(dec!(0))
            .currency(Currency::Local)
            .date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .build();
        assert!(res.is_err());
    }
}
