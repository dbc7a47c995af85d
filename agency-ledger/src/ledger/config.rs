use derive_builder::Builder;
use rust_decimal::Decimal;

#[derive(Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct AgencyLedgerConfig {
    #[builder(setter(into, strip_option), default)]
    pub(super) pg_con: Option<String>,
    #[builder(setter(into, strip_option), default)]
    pub(super) max_connections: Option<u32>,
    #[builder(default)]
    pub(super) exec_migrations: bool,
    #[builder(setter(into, strip_option), default)]
    pub(super) pool: Option<sqlx::PgPool>,
    /// Rate applied when no exchange rate is stored at all.
    #[builder(setter(into, strip_option), default)]
    pub(super) fallback_exchange_rate: Option<Decimal>,
}

impl AgencyLedgerConfig {
    pub fn builder() -> AgencyLedgerConfigBuilder {
        AgencyLedgerConfigBuilder::default()
    }
}

impl AgencyLedgerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match (self.pg_con.as_ref(), self.pool.as_ref()) {
            (None, None) | (Some(None), None) | (None, Some(None)) => {
                return Err("One of pg_con or pool must be set".to_string())
            }
            (Some(_), Some(_)) => return Err("Only one of pg_con or pool must be set".to_string()),
            _ => (),
        }
        if let Some(Some(rate)) = self.fallback_exchange_rate {
            if rate <= Decimal::ZERO {
                return Err(format!("Fallback exchange rate must be positive, got {rate}"));
            }
        }
        Ok(())
    }
}
