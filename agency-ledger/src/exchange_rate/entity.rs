use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// REFERENCE -> LOCAL multiplier valid for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExchangeRate {
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Which tier of the fallback chain produced a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum RateSource {
    ExactMatch,
    LatestKnown,
    CallerDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub source: RateSource,
    /// Date of the stored rate that was used, `None` for the caller default.
    pub rate_date: Option<NaiveDate>,
}

impl ResolvedRate {
    pub fn caller_default(rate: Decimal) -> Self {
        Self {
            rate,
            source: RateSource::CallerDefault,
            rate_date: None,
        }
    }
}

/// Applies tiers (1) and (2) of the fallback chain.
pub(crate) fn pick_rate(
    exact: Option<ExchangeRate>,
    latest: Option<ExchangeRate>,
) -> Option<ResolvedRate> {
    if let Some(exact) = exact {
        return Some(ResolvedRate {
            rate: exact.rate,
            source: RateSource::ExactMatch,
            rate_date: Some(exact.date),
        });
    }
    latest.map(|latest| ResolvedRate {
        rate: latest.rate,
        source: RateSource::LatestKnown,
        rate_date: Some(latest.date),
    })
}

pub(crate) fn log_resolution(date: NaiveDate, resolved: &ResolvedRate) {
    match resolved.source {
        RateSource::ExactMatch => {
            tracing::debug!(%date, rate = %resolved.rate, "exchange rate resolved by exact date")
        }
        RateSource::LatestKnown => tracing::info!(
            %date,
            rate = %resolved.rate,
            rate_date = ?resolved.rate_date,
            "no exchange rate for date, using latest known rate"
        ),
        RateSource::CallerDefault => tracing::warn!(
            %date,
            rate = %resolved.rate,
            "no exchange rate stored at all, using configured default"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(day: u32, rate: Decimal) -> ExchangeRate {
        ExchangeRate {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            rate,
        }
    }

    #[test]
    fn exact_match_wins_over_latest() {
        let resolved = pick_rate(Some(rate(1, dec!(850))), Some(rate(20, dec!(900)))).unwrap();
        assert_eq!(resolved.rate, dec!(850));
        assert_eq!(resolved.source, RateSource::ExactMatch);
    }

    #[test]
    fn falls_back_to_latest() {
        let resolved = pick_rate(None, Some(rate(20, dec!(900)))).unwrap();
        assert_eq!(resolved.rate, dec!(900));
        assert_eq!(resolved.source, RateSource::LatestKnown);
        assert_eq!(resolved.rate_date, NaiveDate::from_ymd_opt(2024, 3, 20));
    }

    #[test]
    fn nothing_without_rates() {
        assert!(pick_rate(None, None).is_none());
    }
}
