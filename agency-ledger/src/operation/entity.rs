use chrono::{DateTime, NaiveDate, Utc};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::*;

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[sqlx(type_name = "OperationStatus", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    PreReservation,
    Reserved,
    Confirmed,
    Traveling,
    Traveled,
    Closed,
    Cancelled,
}

impl OperationStatus {
    /// Whether sales in this status are owed by the customer (and costs owed
    /// to the operator).
    pub fn counts_toward_revenue(&self) -> bool {
        !matches!(
            self,
            OperationStatus::PreReservation | OperationStatus::Cancelled
        )
    }
}

/// A sold trip: what the customer owes and what the agency owes the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Operation {
    pub id: OperationId,
    pub agency_id: AgencyId,
    pub customer_id: Option<CustomerId>,
    pub operator_id: Option<OperatorId>,
    pub seller_id: Option<SellerId>,
    pub lead_id: Option<LeadId>,
    pub status: OperationStatus,
    pub sale_amount: Decimal,
    pub sale_currency: Currency,
    pub operator_cost: Decimal,
    pub cost_currency: Currency,
    pub departure_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Operation {
    /// Date whose exchange rate values this operation's amounts.
    pub fn rate_date(&self) -> NaiveDate {
        self.departure_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
    pub agency_id: Option<AgencyId>,
    pub customer_id: Option<CustomerId>,
    pub operator_id: Option<OperatorId>,
}

impl OperationFilter {
    pub(crate) fn matches(&self, operation: &Operation) -> bool {
        self.agency_id.map_or(true, |id| operation.agency_id == id)
            && self
                .customer_id
                .map_or(true, |id| operation.customer_id == Some(id))
            && self
                .operator_id
                .map_or(true, |id| operation.operator_id == Some(id))
    }
}

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewOperation {
    #[builder(setter(into), default = "OperationId::new()")]
    pub id: OperationId,
    #[builder(setter(into))]
    pub(super) agency_id: AgencyId,
    #[builder(setter(strip_option, into), default)]
    pub(super) customer_id: Option<CustomerId>,
    #[builder(setter(strip_option, into), default)]
    pub(super) operator_id: Option<OperatorId>,
    #[builder(setter(strip_option, into), default)]
    pub(super) seller_id: Option<SellerId>,
    #[builder(setter(strip_option, into), default)]
    pub(super) lead_id: Option<LeadId>,
    #[builder(default = "OperationStatus::Reserved")]
    pub(super) status: OperationStatus,
    pub(super) sale_amount: Decimal,
    #[builder(default = "Currency::Reference")]
    pub(super) sale_currency: Currency,
    #[builder(default)]
    pub(super) operator_cost: Decimal,
    #[builder(default = "Currency::Reference")]
    pub(super) cost_currency: Currency,
    #[builder(setter(strip_option), default)]
    pub(super) departure_date: Option<NaiveDate>,
}

impl NewOperation {
    pub fn builder() -> NewOperationBuilder {
        NewOperationBuilder::default()
    }

    pub(super) fn into_operation(self, created_at: DateTime<Utc>) -> Operation {
        Operation {
            id: self.id,
            agency_id: self.agency_id,
            customer_id: self.customer_id,
            operator_id: self.operator_id,
            seller_id: self.seller_id,
            lead_id: self.lead_id,
            status: self.status,
            sale_amount: self.sale_amount,
            sale_currency: self.sale_currency,
            operator_cost: self.operator_cost,
            cost_currency: self.cost_currency,
            departure_date: self.departure_date,
            created_at,
        }
    }
}

impl NewOperationBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(sale_amount) = self.sale_amount {
            if sale_amount.is_sign_negative() && !sale_amount.is_zero() {
                return Err("Sale amount must not be negative".to_string());
            }
        }
        if let Some(cost) = self.operator_cost {
            if cost.is_sign_negative() && !cost.is_zero() {
                return Err("Operator cost must not be negative".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn revenue_statuses() {
        assert!(!OperationStatus::PreReservation.counts_toward_revenue());
        assert!(!OperationStatus::Cancelled.counts_toward_revenue());
        assert!(OperationStatus::Reserved.counts_toward_revenue());
        assert!(OperationStatus::Closed.counts_toward_revenue());
    }

    #[test]
    fn rate_date_prefers_departure() {
        let created_at = DateTime::parse_from_rfc3339("2024-02-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let departure = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let builder = NewOperation::builder()
            .agency_id(AgencyId::new())
            .sale_amount(dec!(1000))
            .clone();
        let without = builder.clone().build().unwrap().into_operation(created_at);
        assert_eq!(without.rate_date(), created_at.date_naive());
        let with = builder
            .clone()
            .departure_date(departure)
            .build()
            .unwrap()
            .into_operation(created_at);
        assert_eq!(with.rate_date(), departure);
    }
}
