#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

//! Multi-currency financial journal and balance engine for a travel agency
//! back-office.
//!
//! Every money-moving feature (payments, transfers, commissions, operator
//! payables, partner withdrawals) is recorded as an append-only
//! [LedgerMovement](movement::LedgerMovement) against a single-currency
//! [FinancialAccount](account::FinancialAccount). Balances are recomputed on
//! demand and debits are guarded so that no account ever goes negative.

mod id;

pub mod account;
pub mod balance;
pub mod chart_of_accounts;
pub mod commission;
pub mod debt;
pub mod exchange_rate;
mod ledger;
pub mod movement;
pub mod operation;
pub mod payment;
pub mod primitives;
pub mod store;

pub use ledger::*;
pub use primitives::*;
