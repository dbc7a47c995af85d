use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::*;

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[sqlx(type_name = "FinancialAccountType", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialAccountType {
    Cash,
    Bank,
    Wallet,
    ForeignCurrency,
    Asset,
}

/// A named, single-currency balance-holding account of an agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FinancialAccount {
    pub id: FinancialAccountId,
    pub agency_id: AgencyId,
    pub name: String,
    #[sqlx(rename = "type")]
    pub account_type: FinancialAccountType,
    pub currency: Currency,
    pub initial_balance: Decimal,
    pub chart_account_code: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FinancialAccount {
    pub(crate) fn ensure_active(&self) -> Result<(), super::error::AccountError> {
        if self.is_active {
            Ok(())
        } else {
            Err(super::error::AccountError::Inactive(self.id))
        }
    }
}

/// Representation of a ***new*** financial account.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewFinancialAccount {
    #[builder(setter(into), default = "FinancialAccountId::new()")]
    pub id: FinancialAccountId,
    #[builder(setter(into))]
    pub(super) agency_id: AgencyId,
    #[builder(setter(into))]
    pub(super) name: String,
    pub(super) account_type: FinancialAccountType,
    pub(super) currency: Currency,
    #[builder(default)]
    pub(super) initial_balance: Decimal,
    #[builder(setter(strip_option, into), default)]
    pub(super) chart_account_code: Option<String>,
}

impl NewFinancialAccount {
    pub fn builder() -> NewFinancialAccountBuilder {
        NewFinancialAccountBuilder::default()
    }

    pub(super) fn into_account(self, created_at: chrono::DateTime<chrono::Utc>) -> FinancialAccount {
        FinancialAccount {
            id: self.id,
            agency_id: self.agency_id,
            name: self.name,
            account_type: self.account_type,
            currency: self.currency,
            initial_balance: self.initial_balance,
            chart_account_code: self.chart_account_code,
            is_active: true,
            created_at,
        }
    }
}

impl NewFinancialAccountBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("Account name must not be empty".to_string());
            }
        }
        if let Some(initial_balance) = self.initial_balance {
            if initial_balance.is_sign_negative() && !initial_balance.is_zero() {
                return Err("Initial balance must not be negative".to_string());
            }
        }
        if let (Some(FinancialAccountType::ForeignCurrency), Some(Currency::Local)) =
            (self.account_type, self.currency)
        {
            return Err("Foreign currency accounts must hold the reference currency".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn it_builds() {
        let new_account = NewFinancialAccount::builder()
            .agency_id(AgencyId::new())
            .name("Caja principal")
            .account_type(FinancialAccountType::Cash)
            .currency(Currency::Local)
            .build()
            .unwrap();
        assert_eq!(new_account.name, "Caja principal");
        assert_eq!(new_account.initial_balance, Decimal::ZERO);
        assert_eq!(new_account.chart_account_code, None);
    }

    #[test]
    fn fails_when_mandatory_fields_are_missing() {
        let new_account = NewFinancialAccount::builder().name("Banco").build();
        assert!(new_account.is_err());
    }

    #[test]
    fn rejects_negative_initial_balance() {
        let new_account = NewFinancialAccount::builder()
            .agency_id(AgencyId::new())
            .name("Banco")
            .account_type(FinancialAccountType::Bank)
            .currency(Currency::Local)
            .initial_balance(dec!(-1))
            .build();
        assert!(new_account.is_err());
    }

    #[test]
    fn foreign_currency_accounts_hold_reference_currency() {
        let new_account = NewFinancialAccount::builder()
            .agency_id(AgencyId::new())
            .name("Dolares")
            .account_type(FinancialAccountType::ForeignCurrency)
            .currency(Currency::Local)
            .build();
        assert!(new_account.is_err());
    }
}
