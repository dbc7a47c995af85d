use chrono::{DateTime, NaiveDate, Utc};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PaymentError;
use crate::{movement::MovementType, primitives::*};

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[sqlx(type_name = "PaymentDirection", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDirection {
    /// Collected from a customer.
    Income,
    /// Paid to an operator.
    Expense,
}

impl PaymentDirection {
    pub(crate) fn movement_type(&self) -> MovementType {
        match self {
            PaymentDirection::Income => MovementType::Income,
            PaymentDirection::Expense => MovementType::OperatorPayment,
        }
    }
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[sqlx(type_name = "PaymentStatus", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Money collected from a customer or paid to an operator for an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: PaymentId,
    pub operation_id: OperationId,
    pub account_id: FinancialAccountId,
    pub direction: PaymentDirection,
    pub status: PaymentStatus,
    pub currency: Currency,
    pub amount: Decimal,
    pub exchange_rate: Option<Decimal>,
    /// Amount expressed in the reference currency at the time of payment.
    pub amount_reference: Option<Decimal>,
    pub customer_id: Option<CustomerId>,
    pub operator_id: Option<OperatorId>,
    pub operator_payment_id: Option<OperatorPaymentId>,
    pub movement_id: Option<LedgerMovementId>,
    pub paid_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Reference-currency value of the payment, using `fallback_rate` only
    /// when neither the stored reference amount nor the payment's own rate
    /// is available. `None` if the conversion overflows.
    pub fn reference_amount(&self, fallback_rate: impl FnOnce() -> Decimal) -> Option<Decimal> {
        if let Some(amount) = self.amount_reference {
            return Some(amount);
        }
        let rate = match self.currency {
            Currency::Reference => Decimal::ONE,
            Currency::Local => self.exchange_rate.unwrap_or_else(fallback_rate),
        };
        self.currency.to_reference(self.amount, rate)
    }

    pub(crate) fn needs_rate(&self) -> bool {
        self.amount_reference.is_none()
            && self.currency == Currency::Local
            && self.exchange_rate.is_none()
    }
}

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewPayment {
    #[builder(setter(into), default = "PaymentId::new()")]
    pub id: PaymentId,
    #[builder(setter(into))]
    pub(crate) operation_id: OperationId,
    #[builder(setter(into))]
    pub(crate) account_id: FinancialAccountId,
    pub(crate) direction: PaymentDirection,
    pub(crate) currency: Currency,
    pub(crate) amount: Decimal,
    pub(crate) paid_on: NaiveDate,
    #[builder(setter(strip_option, into), default)]
    pub(crate) customer_id: Option<CustomerId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) operator_id: Option<OperatorId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) operator_payment_id: Option<OperatorPaymentId>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) notes: Option<String>,
    #[builder(setter(strip_option, into), default)]
    pub(crate) created_by: Option<UserId>,
}

impl NewPayment {
    pub fn builder() -> NewPaymentBuilder {
        NewPaymentBuilder::default()
    }

    pub(crate) fn into_payment(
        self,
        exchange_rate: Option<Decimal>,
        movement_id: LedgerMovementId,
        created_at: DateTime<Utc>,
    ) -> Result<Payment, PaymentError> {
        let amount_reference = match (self.currency, exchange_rate) {
            (Currency::Reference, _) => Some(self.amount),
            (Currency::Local, Some(rate)) => Some(
                self.currency
                    .to_reference(self.amount, rate)
                    .ok_or(PaymentError::Overflow {
                        amount: self.amount,
                        rate,
                    })?,
            ),
            (Currency::Local, None) => None,
        };
        Ok(Payment {
            id: self.id,
            operation_id: self.operation_id,
            account_id: self.account_id,
            direction: self.direction,
            status: PaymentStatus::Paid,
            currency: self.currency,
            amount: self.amount,
            exchange_rate,
            amount_reference,
            customer_id: self.customer_id,
            operator_id: self.operator_id,
            operator_payment_id: self.operator_payment_id,
            movement_id: Some(movement_id),
            paid_on: self.paid_on,
            notes: self.notes,
            created_at,
            created_by: self.created_by,
        })
    }
}

impl NewPaymentBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(format!("Payment amount must be positive, got {amount}"));
            }
        }
        if let (Some(PaymentDirection::Income), Some(Some(_))) =
            (self.direction, &self.operator_payment_id)
        {
            return Err("Customer payments cannot settle an operator payment".to_string());
        }
        if let (Some(PaymentDirection::Income), Some(Some(_))) = (self.direction, &self.operator_id)
        {
            return Err("Customer payments do not reference an operator".to_string());
        }
        Ok(())
    }
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[sqlx(type_name = "OperatorPaymentStatus", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorPaymentStatus {
    Pending,
    Paid,
}

/// A scheduled obligation towards an operator, settled by an EXPENSE payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OperatorPayment {
    pub id: OperatorPaymentId,
    pub operation_id: OperationId,
    pub operator_id: OperatorId,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: OperatorPaymentStatus,
    pub payment_id: Option<PaymentId>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl OperatorPayment {
    pub fn is_pending(&self) -> bool {
        self.status == OperatorPaymentStatus::Pending
    }

    pub(crate) fn settle(&mut self, payment_id: PaymentId) {
        self.status = OperatorPaymentStatus::Paid;
        self.payment_id = Some(payment_id);
    }

    pub(crate) fn reopen(&mut self) {
        self.status = OperatorPaymentStatus::Pending;
        self.payment_id = None;
    }
}

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewOperatorPayment {
    #[builder(setter(into), default = "OperatorPaymentId::new()")]
    pub id: OperatorPaymentId,
    #[builder(setter(into))]
    pub(super) operation_id: OperationId,
    #[builder(setter(into))]
    pub(super) operator_id: OperatorId,
    pub(super) amount: Decimal,
    pub(super) currency: Currency,
    #[builder(setter(strip_option), default)]
    pub(super) due_date: Option<NaiveDate>,
}

impl NewOperatorPayment {
    pub fn builder() -> NewOperatorPaymentBuilder {
        NewOperatorPaymentBuilder::default()
    }

    pub(super) fn into_operator_payment(self, created_at: DateTime<Utc>) -> OperatorPayment {
        OperatorPayment {
            id: self.id,
            operation_id: self.operation_id,
            operator_id: self.operator_id,
            amount: self.amount,
            currency: self.currency,
            status: OperatorPaymentStatus::Pending,
            payment_id: None,
            due_date: self.due_date,
            created_at,
        }
    }
}

impl NewOperatorPaymentBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.amount {
            Some(amount) if amount <= Decimal::ZERO => {
                Err(format!("Operator payment amount must be positive, got {amount}"))
            }
            _ => Ok(()),
        }
    }
}
