use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

crate::entity_id! {
    FinancialAccountId,
    LedgerMovementId,
    CommissionId,
    PaymentId,
    OperatorPaymentId,
    OperationId,
    LeadId,
    SellerId,
    OperatorId,
    CustomerId,
    AgencyId,
    UserId,
}

/// Tolerance applied when checking that a debit keeps a balance non-negative.
pub const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// The two currencies an agency keeps books in.
///
/// `Local` is the operating currency. `Reference` is the foreign currency
/// tracked in parallel; rates are expressed as REFERENCE -> LOCAL multipliers.
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
    strum::EnumString,
)]
#[sqlx(type_name = "Currency", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Currency {
    Local,
    Reference,
}

impl Currency {
    pub fn is_reference(&self) -> bool {
        matches!(self, Currency::Reference)
    }

    /// Expresses `amount` (denominated in `self`) in the reference currency.
    /// `None` when the result does not fit in a decimal.
    pub fn to_reference(&self, amount: Decimal, rate: Decimal) -> Option<Decimal> {
        match self {
            Currency::Reference => Some(amount),
            Currency::Local if rate.is_zero() => Some(Decimal::ZERO),
            Currency::Local => amount.checked_div(rate),
        }
    }

    /// Expresses `amount` (denominated in `self`) in the local currency.
    /// `None` when the result does not fit in a decimal.
    pub fn to_local(&self, amount: Decimal, rate: Decimal) -> Option<Decimal> {
        match self {
            Currency::Reference => amount.checked_mul(rate),
            Currency::Local => Some(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_between_currencies() {
        assert_eq!(Currency::Local.to_reference(dec!(1000), dec!(1000)), Some(dec!(1)));
        assert_eq!(Currency::Reference.to_reference(dec!(50), dec!(1000)), Some(dec!(50)));
        assert_eq!(Currency::Reference.to_local(dec!(50), dec!(1000)), Some(dec!(50000)));
        assert_eq!(Currency::Local.to_local(dec!(50), dec!(1000)), Some(dec!(50)));
        assert_eq!(
            Currency::Local.to_reference(dec!(50), Decimal::ZERO),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn conversion_overflow_is_none() {
        assert_eq!(Currency::Reference.to_local(Decimal::MAX, dec!(1000)), None);
        assert_eq!(Currency::Local.to_reference(Decimal::MAX, dec!(0.001)), None);
    }

    #[test]
    fn parses_currency_names() {
        assert_eq!("reference".parse::<Currency>().unwrap(), Currency::Reference);
        assert_eq!(Currency::Local.to_string(), "LOCAL");
    }

    #[test]
    fn epsilon_is_one_millionth() {
        assert_eq!(BALANCE_EPSILON, dec!(0.000001));
    }
}
