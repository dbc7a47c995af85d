use agency_tracing::TracingConfig;
use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use std::path::Path;

use super::db::*;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Rate used when no exchange rate has been stored yet.
    #[serde(default)]
    pub fallback_exchange_rate: Option<Decimal>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

pub struct EnvOverride {
    pub db_con: Option<String>,
}

impl Config {
    pub fn load_config(
        path: Option<impl AsRef<Path>>,
        env_override: EnvOverride,
    ) -> anyhow::Result<Self> {
        let mut config = if let Some(config_path) = path {
            let config_file =
                std::fs::read_to_string(config_path).context("Couldn't read config file")?;
            serde_yaml::from_str(&config_file).context("Couldn't parse config file")?
        } else {
            Config::default()
        };

        config.apply_env_override(env_override);
        if config.db.pg_con.is_empty() {
            anyhow::bail!("No database connection configured, set PG_CON or db.pg_con");
        }
        Ok(config)
    }

    fn apply_env_override(&mut self, EnvOverride { db_con }: EnvOverride) {
        if let Some(db_con) = db_con {
            self.db.pg_con = db_con;
        }
    }
}
