#![allow(dead_code)]
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use agency_ledger::{account::*, movement::*, store::MemoryStore, *};

pub const RATE: Decimal = dec!(1000);

pub fn init_ledger() -> AgencyLedger<MemoryStore> {
    AgencyLedger::new(MemoryStore::new(), Some(RATE))
}

pub fn init_ledger_without_fallback() -> AgencyLedger<MemoryStore> {
    AgencyLedger::new(MemoryStore::new(), None)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn test_account(currency: Currency, initial_balance: Decimal) -> NewFinancialAccount {
    let account_type = match currency {
        Currency::Local => FinancialAccountType::Bank,
        Currency::Reference => FinancialAccountType::ForeignCurrency,
    };
    NewFinancialAccount::builder()
        .agency_id(AgencyId::new())
        .name(format!("Cuenta {currency}"))
        .account_type(account_type)
        .currency(currency)
        .initial_balance(initial_balance)
        .build()
        .unwrap()
}

pub async fn create_account(
    ledger: &AgencyLedger<MemoryStore>,
    currency: Currency,
    initial_balance: Decimal,
) -> anyhow::Result<FinancialAccount> {
    Ok(ledger
        .accounts()
        .create(test_account(currency, initial_balance))
        .await?)
}

/// Movement of `amount` in the account's own currency. REFERENCE movements
/// carry [RATE].
pub fn movement(
    account: &FinancialAccount,
    movement_type: MovementType,
    amount: Decimal,
) -> NewLedgerMovement {
    let mut builder = NewLedgerMovement::builder();
    builder
        .movement_type(movement_type)
        .account_id(account.id)
        .currency(account.currency)
        .amount_original(amount);
    if account.currency.is_reference() {
        builder.exchange_rate(RATE);
    }
    builder.build().unwrap()
}
