use chrono::{DateTime, Utc};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::MovementError;
use crate::{account::FinancialAccount, primitives::*};

/// Tolerance when comparing a supplied LOCAL equivalent with `original × rate`.
const EQUIVALENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    sqlx::Type,
    strum::Display,
    strum::EnumIter,
)]
#[sqlx(type_name = "MovementType", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Income,
    Expense,
    FxGain,
    FxLoss,
    Commission,
    OperatorPayment,
}

impl MovementType {
    /// Whether the movement takes money out of its account.
    pub fn is_debit(&self) -> bool {
        !matches!(self, MovementType::Income | MovementType::FxGain)
    }

    pub fn apply_sign(&self, amount: Decimal) -> Decimal {
        if self.is_debit() {
            -amount
        } else {
            amount
        }
    }
}

/// One signed entry of the append-only financial journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerMovement {
    pub id: LedgerMovementId,
    #[sqlx(rename = "type")]
    pub movement_type: MovementType,
    pub currency: Currency,
    pub amount_original: Decimal,
    pub exchange_rate: Option<Decimal>,
    /// Always expressed in LOCAL currency.
    pub amount_equivalent: Decimal,
    pub account_id: FinancialAccountId,
    pub operation_id: Option<OperationId>,
    pub lead_id: Option<LeadId>,
    pub seller_id: Option<SellerId>,
    pub operator_id: Option<OperatorId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

impl LedgerMovement {
    /// Contribution of this movement to a balance held in `account_currency`.
    ///
    /// REFERENCE accounts sum `amount_original` so that no rounding drift
    /// from the LOCAL equivalent leaks into them.
    pub fn signed_amount(&self, account_currency: Currency) -> Decimal {
        let amount = match account_currency {
            Currency::Reference => self.amount_original,
            Currency::Local => self.amount_equivalent,
        };
        self.movement_type.apply_sign(amount)
    }

    pub fn is_debit(&self) -> bool {
        self.movement_type.is_debit()
    }
}

/// Representation of a ***new*** ledger movement.
///
/// `amount_equivalent` is derived from `amount_original × exchange_rate` when
/// not supplied; when supplied it has to agree with that product.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewLedgerMovement {
    #[builder(setter(into), default = "LedgerMovementId::new()")]
    pub id: LedgerMovementId,
    pub(crate) movement_type: MovementType,
    #[builder(setter(into))]
    pub(crate) account_id: FinancialAccountId,
    pub(crate) currency: Currency,
    pub(crate) amount_original: Decimal,
    #[builder(setter(strip_option), default)]
    pub(crate) exchange_rate: Option<Decimal>,
    #[builder(setter(strip_option), default)]
    pub(crate) amount_equivalent: Option<Decimal>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) operation_id: Option<OperationId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) lead_id: Option<LeadId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) seller_id: Option<SellerId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) operator_id: Option<OperatorId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) notes: Option<String>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) created_by: Option<UserId>,
}

impl NewLedgerMovement {
    pub fn builder() -> NewLedgerMovementBuilder {
        NewLedgerMovementBuilder::default()
    }

    pub fn movement_type(&self) -> MovementType {
        self.movement_type
    }

    pub fn account_id(&self) -> FinancialAccountId {
        self.account_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount_original(&self) -> Decimal {
        self.amount_original
    }

    /// Amount this movement adds to (or removes from) an account held in
    /// `account_currency`, unsigned.
    pub(crate) fn balance_amount(&self, account_currency: Currency) -> Result<Decimal, MovementError> {
        match (account_currency, self.amount_equivalent) {
            (Currency::Reference, _) => Ok(self.amount_original),
            (Currency::Local, Some(supplied)) => Ok(supplied),
            (Currency::Local, None) => self.local_equivalent(),
        }
    }

    fn local_equivalent(&self) -> Result<Decimal, MovementError> {
        match (self.currency, self.exchange_rate) {
            (Currency::Reference, Some(rate)) => self
                .currency
                .to_local(self.amount_original, rate)
                .ok_or(MovementError::Overflow {
                    amount: self.amount_original,
                    rate,
                }),
            _ => Ok(self.amount_original),
        }
    }

    pub(crate) fn check_against(&self, account: &FinancialAccount) -> Result<(), MovementError> {
        if account.id != self.account_id {
            return Err(MovementError::AccountMismatch(self.account_id, account.id));
        }
        if account.currency != self.currency {
            return Err(MovementError::CurrencyMismatch {
                account_id: account.id,
                account_currency: account.currency,
                movement_currency: self.currency,
            });
        }
        let expected = self.local_equivalent()?;
        if let Some(supplied) = self.amount_equivalent {
            let within_tolerance = supplied
                .checked_sub(expected)
                .is_some_and(|diff| diff.abs() <= EQUIVALENT_TOLERANCE);
            if !within_tolerance {
                return Err(MovementError::EquivalentMismatch { expected, supplied });
            }
        }
        Ok(())
    }

    pub(crate) fn into_movement(
        self,
        created_at: DateTime<Utc>,
    ) -> Result<LedgerMovement, MovementError> {
        let amount_equivalent = match self.amount_equivalent {
            Some(supplied) => supplied,
            None => self.local_equivalent()?,
        };
        Ok(LedgerMovement {
            id: self.id,
            movement_type: self.movement_type,
            currency: self.currency,
            amount_original: self.amount_original,
            exchange_rate: self.exchange_rate,
            amount_equivalent,
            account_id: self.account_id,
            operation_id: self.operation_id,
            lead_id: self.lead_id,
            seller_id: self.seller_id,
            operator_id: self.operator_id,
            notes: self.notes,
            created_at,
            created_by: self.created_by,
        })
    }
}

impl NewLedgerMovementBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(amount) = self.amount_original {
            if amount <= Decimal::ZERO {
                return Err(format!("Movement amount must be positive, got {amount}"));
            }
        }
        let rate = self.exchange_rate.flatten();
        if let Some(rate) = rate {
            if rate <= Decimal::ZERO {
                return Err(format!("Exchange rate must be positive, got {rate}"));
            }
        }
        if let Some(Currency::Reference) = self.currency {
            if rate.is_none() {
                return Err("Exchange rate is required for reference currency movements".to_string());
            }
        }
        if matches!(
            (&self.operation_id, &self.lead_id),
            (Some(Some(_)), Some(Some(_)))
        ) {
            return Err("A movement references either an operation or a lead, not both".to_string());
        }
        Ok(())
    }
}
