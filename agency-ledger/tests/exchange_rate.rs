mod helpers;

use rust_decimal_macros::dec;

use agency_ledger::exchange_rate::{error::ExchangeRateError, RateSource};

#[tokio::test]
async fn exact_date_wins_over_latest() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let rates = ledger.exchange_rates();
    rates.set_rate(helpers::date(2024, 3, 1), dec!(850)).await?;
    rates.set_rate(helpers::date(2024, 3, 20), dec!(900)).await?;

    let resolved = rates.resolve(helpers::date(2024, 3, 1)).await?;
    assert_eq!(resolved.rate, dec!(850));
    assert_eq!(resolved.source, RateSource::ExactMatch);

    let resolved = rates.resolve(helpers::date(2024, 3, 10)).await?;
    assert_eq!(resolved.rate, dec!(900));
    assert_eq!(resolved.source, RateSource::LatestKnown);
    assert_eq!(resolved.rate_date, Some(helpers::date(2024, 3, 20)));
    Ok(())
}

#[tokio::test]
async fn latest_wins_over_caller_default() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let rates = ledger.exchange_rates();
    rates.set_rate(helpers::date(2024, 1, 15), dec!(820)).await?;

    let resolved = rates
        .resolve_or(helpers::date(2024, 5, 1), Some(dec!(1000)))
        .await?;
    assert_eq!(resolved.rate, dec!(820));
    assert_eq!(resolved.source, RateSource::LatestKnown);
    Ok(())
}

#[tokio::test]
async fn caller_default_applies_when_nothing_is_stored() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let rates = ledger.exchange_rates();
    let date = helpers::date(2024, 5, 1);

    assert!(matches!(
        rates.resolve(date).await,
        Err(ExchangeRateError::NotFound(d)) if d == date
    ));

    let resolved = rates.resolve_or(date, Some(dec!(1000))).await?;
    assert_eq!(resolved.rate, dec!(1000));
    assert_eq!(resolved.source, RateSource::CallerDefault);
    assert_eq!(resolved.rate_date, None);

    assert!(matches!(
        rates.resolve_or(date, None).await,
        Err(ExchangeRateError::Unavailable(_))
    ));
    Ok(())
}

#[tokio::test]
async fn setting_a_rate_replaces_the_previous_one() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let rates = ledger.exchange_rates();
    let date = helpers::date(2024, 6, 3);
    rates.set_rate(date, dec!(900)).await?;
    rates.set_rate(date, dec!(910)).await?;

    let stored = rates.find(date).await?.expect("rate was stored");
    assert_eq!(stored.rate, dec!(910));

    assert!(matches!(
        rates.set_rate(date, dec!(0)).await,
        Err(ExchangeRateError::InvalidRate(_))
    ));
    Ok(())
}
