pub mod config;
mod db;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

use agency_ledger::{
    chart_of_accounts, debt::DebtFilters, AgencyId, AgencyLedger, AgencyLedgerConfig, Currency,
    CustomerId, FinancialAccountId, OperatorId,
};

use self::config::{Config, EnvOverride};

#[derive(Parser)]
#[clap(version, long_about = None)]
struct Cli {
    #[clap(short, long, env = "AGENCY_LEDGER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
    #[clap(long, env = "PG_CON")]
    pg_con: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// List the chart of accounts
    Chart,
    /// Current balance of one account
    Balance { account_id: FinancialAccountId },
    /// Current balances of several accounts
    Balances {
        #[clap(required = true)]
        account_ids: Vec<FinancialAccountId>,
    },
    /// Check whether an account can cover a debit
    CheckBalance {
        account_id: FinancialAccountId,
        amount: Decimal,
        #[clap(long, default_value = "LOCAL")]
        currency: Currency,
    },
    /// Exchange rate maintenance
    Rate {
        #[clap(subcommand)]
        command: RateCommand,
    },
    /// Outstanding customer debts and operator payables
    Debts {
        #[clap(subcommand)]
        command: DebtCommand,
    },
}

#[derive(Subcommand)]
enum RateCommand {
    /// Store the REFERENCE -> LOCAL rate for a date
    Set { date: NaiveDate, rate: Decimal },
    /// Resolve the rate applying the fallback chain
    Resolve { date: NaiveDate },
}

#[derive(Subcommand)]
enum DebtCommand {
    Customers {
        #[clap(long)]
        agency_id: Option<AgencyId>,
        #[clap(long)]
        customer_id: Option<CustomerId>,
    },
    Operators {
        #[clap(long)]
        agency_id: Option<AgencyId>,
        #[clap(long)]
        operator_id: Option<OperatorId>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_config(cli.config, EnvOverride { db_con: cli.pg_con })?;

    run_cmd(config, cli.command).await?;

    Ok(())
}

async fn run_cmd(config: Config, command: Command) -> anyhow::Result<()> {
    agency_tracing::init_tracer(config.tracing)?;
    let pool = db::init_pool(&config.db).await?;
    let mut ledger_config = AgencyLedgerConfig::builder();
    ledger_config
        .pool(pool)
        .exec_migrations(matches!(command, Command::Migrate));
    if let Some(rate) = config.ledger.fallback_exchange_rate {
        ledger_config.fallback_exchange_rate(rate);
    }
    let ledger = AgencyLedger::init(ledger_config.build()?).await?;

    let result = execute(&ledger, command).await;
    agency_tracing::shutdown_tracer();
    result
}

async fn execute(ledger: &AgencyLedger, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Migrate => println!("Migrations applied"),
        Command::Chart => print_json(&chart_of_accounts::all())?,
        Command::Balance { account_id } => {
            let balance = ledger.get_balance(account_id).await?;
            print_json(&serde_json::json!({ "account_id": account_id, "balance": balance }))?
        }
        Command::Balances { account_ids } => {
            print_json(&ledger.get_balances_batch(&account_ids).await?)?
        }
        Command::CheckBalance {
            account_id,
            amount,
            currency,
        } => print_json(
            &ledger
                .validate_sufficient_balance(account_id, amount, currency)
                .await?,
        )?,
        Command::Rate { command } => match command {
            RateCommand::Set { date, rate } => {
                print_json(&ledger.exchange_rates().set_rate(date, rate).await?)?
            }
            RateCommand::Resolve { date } => {
                let resolved = ledger
                    .exchange_rates()
                    .resolve_or(date, ledger.fallback_exchange_rate())
                    .await?;
                print_json(&resolved)?
            }
        },
        Command::Debts { command } => match command {
            DebtCommand::Customers {
                agency_id,
                customer_id,
            } => {
                let filters = DebtFilters {
                    agency_id,
                    customer_id,
                    ..Default::default()
                };
                print_json(&ledger.aggregate_customer_debts(filters).await?)?
            }
            DebtCommand::Operators {
                agency_id,
                operator_id,
            } => {
                let filters = DebtFilters {
                    agency_id,
                    operator_id,
                    ..Default::default()
                };
                print_json(&ledger.aggregate_operator_payables(filters).await?)?
            }
        },
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
