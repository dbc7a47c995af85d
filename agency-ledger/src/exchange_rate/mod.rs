//! Resolution of the REFERENCE -> LOCAL rate for a date.
//!
//! Tiers: (1) a rate stored for the exact date, (2) the latest rate stored
//! for any date, (3) a caller supplied default. [`ExchangeRates::resolve`]
//! only implements (1) and (2); [`ExchangeRates::resolve_or`] applies (3) at
//! most once on top of it.
mod entity;
pub mod error;
mod repo;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;

use crate::store::*;

pub use entity::*;
use error::*;
pub use repo::ExchangeRateRepo;

#[derive(Clone)]
pub struct ExchangeRates<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> ExchangeRates<S> {
    pub(crate) fn new(store: &S) -> Self {
        Self {
            store: store.clone(),
        }
    }

    #[instrument(name = "agency_ledger.exchange_rates.set", skip(self), err)]
    pub async fn set_rate(
        &self,
        date: NaiveDate,
        rate: Decimal,
    ) -> Result<ExchangeRate, ExchangeRateError> {
        if rate <= Decimal::ZERO {
            return Err(ExchangeRateError::InvalidRate(rate));
        }
        let rate = ExchangeRate { date, rate };
        let mut op = self.store.begin_op().await?;
        op.upsert_rate(&rate).await?;
        op.commit().await?;
        Ok(rate)
    }

    #[instrument(name = "agency_ledger.exchange_rates.find", skip(self), err)]
    pub async fn find(&self, date: NaiveDate) -> Result<Option<ExchangeRate>, ExchangeRateError> {
        let mut op = self.store.begin_op().await?;
        Ok(op.find_rate_on(date).await?)
    }

    #[instrument(name = "agency_ledger.exchange_rates.resolve", skip(self), err)]
    pub async fn resolve(&self, date: NaiveDate) -> Result<ResolvedRate, ExchangeRateError> {
        let mut op = self.store.begin_op().await?;
        self.resolve_in_op(&mut op, date).await
    }

    pub async fn resolve_in_op(
        &self,
        op: &mut S::Op,
        date: NaiveDate,
    ) -> Result<ResolvedRate, ExchangeRateError> {
        let exact = op.find_rate_on(date).await?;
        let latest = if exact.is_none() {
            op.find_latest_rate().await?
        } else {
            None
        };
        let resolved = pick_rate(exact, latest).ok_or(ExchangeRateError::NotFound(date))?;
        log_resolution(date, &resolved);
        Ok(resolved)
    }

    #[instrument(name = "agency_ledger.exchange_rates.resolve_or", skip(self), err)]
    pub async fn resolve_or(
        &self,
        date: NaiveDate,
        default: Option<Decimal>,
    ) -> Result<ResolvedRate, ExchangeRateError> {
        let mut op = self.store.begin_op().await?;
        self.resolve_or_in_op(&mut op, date, default).await
    }

    pub async fn resolve_or_in_op(
        &self,
        op: &mut S::Op,
        date: NaiveDate,
        default: Option<Decimal>,
    ) -> Result<ResolvedRate, ExchangeRateError> {
        match self.resolve_in_op(op, date).await {
            Err(ExchangeRateError::NotFound(_)) => apply_default(date, default),
            res => res,
        }
    }
}

fn apply_default(
    date: NaiveDate,
    default: Option<Decimal>,
) -> Result<ResolvedRate, ExchangeRateError> {
    match default {
        Some(rate) if rate > Decimal::ZERO => {
            let resolved = ResolvedRate::caller_default(rate);
            log_resolution(date, &resolved);
            Ok(resolved)
        }
        Some(rate) => Err(ExchangeRateError::InvalidRate(rate)),
        None => Err(ExchangeRateError::Unavailable(date)),
    }
}

/// Memoising resolver for reports that convert many dated amounts.
///
/// The latest known rate is fetched at most once per cache and every date is
/// looked up at most once.
pub(crate) struct RateCache {
    default: Option<Decimal>,
    latest: Option<Option<ExchangeRate>>,
    exact: HashMap<NaiveDate, Option<ExchangeRate>>,
}

impl RateCache {
    pub(crate) fn new(default: Option<Decimal>) -> Self {
        Self {
            default,
            latest: None,
            exact: HashMap::new(),
        }
    }

    pub(crate) async fn resolve(
        &mut self,
        op: &mut impl ExchangeRateRepo,
        date: NaiveDate,
    ) -> Result<ResolvedRate, ExchangeRateError> {
        let exact = match self.exact.get(&date) {
            Some(cached) => *cached,
            None => {
                let found = op.find_rate_on(date).await?;
                self.exact.insert(date, found);
                found
            }
        };
        let latest = match (exact, self.latest) {
            (Some(_), _) => None,
            (None, Some(latest)) => latest,
            (None, None) => {
                let latest = op.find_latest_rate().await?;
                self.latest = Some(latest);
                latest
            }
        };
        match pick_rate(exact, latest) {
            Some(resolved) => {
                log_resolution(date, &resolved);
                Ok(resolved)
            }
            None => apply_default(date, self.default),
        }
    }
}
