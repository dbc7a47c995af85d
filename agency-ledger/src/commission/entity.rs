use chrono::{DateTime, Utc};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::*;

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[sqlx(type_name = "CommissionStatus", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

/// Commission owed to a seller for an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Commission {
    pub id: CommissionId,
    pub seller_id: SellerId,
    pub operation_id: Option<OperationId>,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: CommissionStatus,
    pub movement_id: Option<LedgerMovementId>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Commission {
    pub fn is_pending(&self) -> bool {
        self.status == CommissionStatus::Pending
    }

    pub(crate) fn mark_paid(&mut self, movement_id: LedgerMovementId, paid_at: DateTime<Utc>) {
        self.status = CommissionStatus::Paid;
        self.movement_id = Some(movement_id);
        self.paid_at = Some(paid_at);
    }
}

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewCommission {
    #[builder(setter(into), default = "CommissionId::new()")]
    pub id: CommissionId,
    #[builder(setter(into))]
    pub(super) seller_id: SellerId,
    #[builder(setter(strip_option, into), default)]
    pub(super) operation_id: Option<OperationId>,
    pub(super) amount: Decimal,
    pub(super) currency: Currency,
}

impl NewCommission {
    pub fn builder() -> NewCommissionBuilder {
        NewCommissionBuilder::default()
    }

    pub(super) fn into_commission(self, created_at: DateTime<Utc>) -> Commission {
        Commission {
            id: self.id,
            seller_id: self.seller_id,
            operation_id: self.operation_id,
            amount: self.amount,
            currency: self.currency,
            status: CommissionStatus::Pending,
            movement_id: None,
            paid_at: None,
            created_at,
        }
    }
}

impl NewCommissionBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.amount {
            Some(amount) if amount <= Decimal::ZERO => {
                Err(format!("Commission amount must be positive, got {amount}"))
            }
            _ => Ok(()),
        }
    }
}
