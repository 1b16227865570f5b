// SPDX-License-Identifier: AGPL-3.0-or-later

//! CLI for downloading Wise balance statements.
//!
//! Resolves the date range (defaulting to the previous calendar month),
//! downloads one statement per currency, and writes `wise_<CUR>.pdf` files
//! into the output directory. Credentials come from the environment:
//! `WISE_API_KEY` for the bearer token and `WISE_PRIVATE_KEY_PATH` for the
//! SCA signing key.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wise_statements::config::{
    self, default_private_key_path, env_or_default, env_required, API_KEY_ENV, BASE_URL_ENV,
    PRIVATE_KEY_PATH_ENV,
};
use wise_statements::{
    ProfileType, ScaSigner, StatementOutcome, StatementType, WiseClient, WiseConfig, WiseError,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProfileArg {
    Business,
    Personal,
}

impl From<ProfileArg> for ProfileType {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Business => ProfileType::Business,
            ProfileArg::Personal => ProfileType::Personal,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TypeArg {
    Compact,
    Flat,
}

impl From<TypeArg> for StatementType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Compact => StatementType::Compact,
            TypeArg::Flat => StatementType::Flat,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "wise-statements",
    version,
    about = "Download Wise balance statements for each currency"
)]
struct Cli {
    /// Statement period start (YYYY-MM-DD); defaults to the first day of
    /// the previous month
    #[arg(long = "start-date")]
    start_date: Option<NaiveDate>,

    /// Statement period end (YYYY-MM-DD); defaults to the last day of the
    /// previous month
    #[arg(long = "end-date")]
    end_date: Option<NaiveDate>,

    /// Currency to fetch (repeatable)
    #[arg(long = "currency", default_values_t = ["EUR".to_string(), "RON".to_string(), "USD".to_string()])]
    currencies: Vec<String>,

    /// Directory the statement PDFs are written to
    #[arg(long = "output-dir", default_value = "statements")]
    output_dir: PathBuf,

    /// Profile type to resolve on the account
    #[arg(long = "profile-type", value_enum, default_value_t = ProfileArg::Business)]
    profile_type: ProfileArg,

    /// Statement rendering variant
    #[arg(long = "statement-type", value_enum, default_value_t = TypeArg::Compact)]
    statement_type: TypeArg,
}

/// Previous full calendar month relative to `today`.
fn previous_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_of_current = today
        .with_day(1)
        .expect("day 1 exists in every month");
    let end = first_of_current
        .pred_opt()
        .expect("a day precedes the first of any representable month");
    let start = end.with_day(1).expect("day 1 exists in every month");
    (start, end)
}

fn resolve_range(cli: &Cli) -> Result<(NaiveDate, NaiveDate), WiseError> {
    let (default_start, default_end) = previous_month(Utc::now().date_naive());
    let start = cli.start_date.unwrap_or(default_start);
    let end = cli.end_date.unwrap_or(default_end);
    if end < start {
        return Err(WiseError::Config(format!(
            "end date {end} precedes start date {start}"
        )));
    }
    Ok((start, end))
}

async fn run(cli: Cli) -> Result<bool, WiseError> {
    let api_token = env_required(API_KEY_ENV)?;
    let key_path = env_or_default(PRIVATE_KEY_PATH_ENV, default_private_key_path());
    let signer = ScaSigner::from_pem_file(&key_path)?;

    let wise_config = match config::env_optional(BASE_URL_ENV) {
        Some(base_url) => WiseConfig::with_base_url(base_url),
        None => WiseConfig::default(),
    };

    let (start_date, end_date) = resolve_range(&cli)?;
    // Statement intervals cover the full days, millisecond bounds included.
    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let end = end_date
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid time")
        .and_utc();

    info!(%start_date, %end_date, currencies = ?cli.currencies, "generating statements");

    let client = WiseClient::new(wise_config, api_token, signer, cli.profile_type.into())?;
    let results = client
        .generate_statements(&cli.currencies, start, end, cli.statement_type.into())
        .await?;

    std::fs::create_dir_all(&cli.output_dir).map_err(|e| {
        WiseError::Config(format!(
            "cannot create output directory {}: {e}",
            cli.output_dir.display()
        ))
    })?;

    let mut all_ok = true;
    for (currency, outcome) in &results {
        match outcome {
            StatementOutcome::Document(bytes) => {
                let file = cli.output_dir.join(format!("wise_{currency}.pdf"));
                std::fs::write(&file, bytes).map_err(|e| {
                    WiseError::Config(format!("cannot write {}: {e}", file.display()))
                })?;
                info!(%currency, file = %file.display(), "statement written");
            }
            StatementOutcome::NoBalance => {
                warn!(%currency, "no balance for currency, skipped");
            }
            StatementOutcome::Failed { status, detail } => {
                all_ok = false;
                match status {
                    Some(status) => {
                        error!(%currency, %status, detail = %detail, "statement download failed")
                    }
                    None => error!(%currency, detail = %detail, "statement fetch errored"),
                }
            }
            StatementOutcome::Cancelled => {
                all_ok = false;
                warn!(%currency, "statement fetch cancelled");
            }
        }
    }

    Ok(all_ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "statement run aborted");
            ExitCode::FAILURE
        }
    }
}
