use rust_decimal::Decimal;
use serde::Serialize;

use super::error::BalanceError;
use crate::primitives::{FinancialAccountId, BALANCE_EPSILON};

/// Outcome of checking a proposed debit against an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceCheck {
    pub account_id: FinancialAccountId,
    pub valid: bool,
    pub balance: Decimal,
    pub amount: Decimal,
    /// How much is missing for the debit to go through; zero when valid.
    pub shortfall: Decimal,
}

impl BalanceCheck {
    pub(crate) fn evaluate(
        account_id: FinancialAccountId,
        balance: Decimal,
        amount: Decimal,
    ) -> Result<Self, BalanceError> {
        let remaining = balance
            .checked_sub(amount)
            .ok_or(BalanceError::Overflow(account_id))?;
        let valid = remaining >= -BALANCE_EPSILON;
        Ok(Self {
            account_id,
            valid,
            balance,
            amount,
            shortfall: if valid { Decimal::ZERO } else { -remaining },
        })
    }

    pub fn error(&self) -> Option<BalanceError> {
        if self.valid {
            None
        } else {
            Some(BalanceError::InsufficientBalance {
                account_id: self.account_id,
                balance: self.balance,
                amount: self.amount,
                shortfall: self.shortfall,
            })
        }
    }

    pub fn ensure(&self) -> Result<(), BalanceError> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reports_shortfall() {
        let check = BalanceCheck::evaluate(FinancialAccountId::new(), dec!(100), dec!(150)).unwrap();
        assert!(!check.valid);
        assert_eq!(check.shortfall, dec!(50));
        assert!(matches!(
            check.ensure(),
            Err(BalanceError::InsufficientBalance { shortfall, .. }) if shortfall == dec!(50)
        ));
    }

    #[test]
    fn allows_exact_balance_and_tolerance() {
        let id = FinancialAccountId::new();
        assert!(BalanceCheck::evaluate(id, dec!(100), dec!(100)).unwrap().valid);
        assert!(BalanceCheck::evaluate(id, dec!(100), dec!(100.000001)).unwrap().valid);
        assert!(!BalanceCheck::evaluate(id, dec!(100), dec!(100.000002)).unwrap().valid);
        assert_eq!(
            BalanceCheck::evaluate(id, dec!(100), dec!(40)).unwrap().shortfall,
            Decimal::ZERO
        );
    }

    #[test]
    fn overflowing_debit_is_an_error() {
        let id = FinancialAccountId::new();
        assert!(matches!(
            BalanceCheck::evaluate(id, Decimal::MIN, dec!(1)),
            Err(BalanceError::Overflow(account_id)) if account_id == id
        ));
    }
}
