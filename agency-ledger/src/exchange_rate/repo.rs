use async_trait::async_trait;
use chrono::NaiveDate;

use super::entity::ExchangeRate;
use crate::store::{PgOp, StoreError};

#[async_trait]
pub trait ExchangeRateRepo: Send {
    async fn find_rate_on(&mut self, date: NaiveDate)
        -> Result<Option<ExchangeRate>, StoreError>;

    /// The most recent rate stored for any date.
    async fn find_latest_rate(&mut self) -> Result<Option<ExchangeRate>, StoreError>;

    async fn upsert_rate(&mut self, rate: &ExchangeRate) -> Result<(), StoreError>;
}

#[async_trait]
impl ExchangeRateRepo for PgOp {
    async fn find_rate_on(
        &mut self,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>, StoreError> {
        let rate = sqlx::query_as::<_, ExchangeRate>(
            "SELECT date, rate FROM exchange_rates WHERE date = $1",
        )
        .bind(date)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(rate)
    }

    async fn find_latest_rate(&mut self) -> Result<Option<ExchangeRate>, StoreError> {
        let rate = sqlx::query_as::<_, ExchangeRate>(
            "SELECT date, rate FROM exchange_rates ORDER BY date DESC LIMIT 1",
        )
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(rate)
    }

    async fn upsert_rate(&mut self, rate: &ExchangeRate) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO exchange_rates (date, rate) VALUES ($1, $2)
            ON CONFLICT (date) DO UPDATE SET rate = EXCLUDED.rate"#,
        )
        .bind(rate.date)
        .bind(rate.rate)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }
}
