use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::{collections::HashMap, hash::Hash};

use super::error::DebtError;
use crate::primitives::*;

#[derive(Debug, Clone, Default)]
pub struct DebtFilters {
    pub agency_id: Option<AgencyId>,
    pub customer_id: Option<CustomerId>,
    pub operator_id: Option<OperatorId>,
}

/// What one operation still owes, in REFERENCE currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDebt {
    pub operation_id: OperationId,
    pub rate_date: NaiveDate,
    /// Rate used to convert the operation amount, `None` when it was already
    /// in REFERENCE currency.
    pub exchange_rate: Option<Decimal>,
    pub total: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
}

impl OperationDebt {
    pub(super) fn new(
        operation_id: OperationId,
        rate_date: NaiveDate,
        exchange_rate: Option<Decimal>,
        total: Decimal,
        paid: Decimal,
    ) -> Self {
        Self {
            operation_id,
            rate_date,
            exchange_rate,
            total,
            paid,
            outstanding: (total - paid).max(Decimal::ZERO),
        }
    }
}

/// Debt of one party (customer or operator) summed over its operations.
///
/// `total` is the converted sale amount for customers and the converted
/// operator cost for operators. `outstanding` is the sum of the per-operation
/// outstanding amounts, so an overpaid operation never offsets another one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyDebt<P> {
    pub party_id: P,
    pub total: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub operations: Vec<OperationDebt>,
}

pub type CustomerDebt = PartyDebt<CustomerId>;
pub type OperatorPayable = PartyDebt<OperatorId>;

/// Groups per-operation debts by party, drops parties that owe nothing and
/// sorts the rest by outstanding amount, largest first.
pub(super) fn group_by_party<P: Copy + Eq + Hash + Ord>(
    rows: impl IntoIterator<Item = (P, OperationDebt)>,
) -> Result<Vec<PartyDebt<P>>, DebtError> {
    let mut by_party: HashMap<P, PartyDebt<P>> = HashMap::new();
    for (party_id, debt) in rows {
        let entry = by_party.entry(party_id).or_insert_with(|| PartyDebt {
            party_id,
            total: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            outstanding: Decimal::ZERO,
            operations: Vec::new(),
        });
        let operation_id = debt.operation_id;
        let overflow = || DebtError::Overflow(operation_id);
        entry.total = entry.total.checked_add(debt.total).ok_or_else(overflow)?;
        entry.total_paid = entry.total_paid.checked_add(debt.paid).ok_or_else(overflow)?;
        entry.outstanding = entry
            .outstanding
            .checked_add(debt.outstanding)
            .ok_or_else(overflow)?;
        entry.operations.push(debt);
    }
    let mut debts: Vec<_> = by_party
        .into_values()
        .filter(|debt| debt.outstanding > Decimal::ZERO)
        .collect();
    debts.sort_by(|a, b| {
        b.outstanding
            .cmp(&a.outstanding)
            .then(a.party_id.cmp(&b.party_id))
    });
    Ok(debts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn debt(total: Decimal, paid: Decimal) -> OperationDebt {
        OperationDebt::new(
            OperationId::new(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            None,
            total,
            paid,
        )
    }

    #[test]
    fn overpaid_operation_does_not_offset_others() {
        let customer = CustomerId::new();
        let debts = group_by_party([
            (customer, debt(dec!(1000), dec!(1200))),
            (customer, debt(dec!(500), dec!(100))),
        ])
        .unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].outstanding, dec!(400));
        assert_eq!(debts[0].total, dec!(1500));
        assert_eq!(debts[0].total_paid, dec!(1300));
    }

    #[test]
    fn sorted_descending_without_settled_parties() {
        let small = CustomerId::new();
        let large = CustomerId::new();
        let settled = CustomerId::new();
        let debts = group_by_party([
            (small, debt(dec!(100), dec!(0))),
            (settled, debt(dec!(300), dec!(300))),
            (large, debt(dec!(900), dec!(100))),
        ])
        .unwrap();
        let order: Vec<_> = debts.iter().map(|d| d.party_id).collect();
        assert_eq!(order, vec![large, small]);
    }

    #[test]
    fn overflowing_party_total_is_an_error() {
        let customer = CustomerId::new();
        let res = group_by_party([
            (customer, debt(Decimal::MAX, dec!(0))),
            (customer, debt(dec!(1), dec!(0))),
        ]);
        assert!(matches!(res, Err(DebtError::Overflow(_))));
    }
}
