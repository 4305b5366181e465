use std::path::PathBuf;

use clap::Parser;
use jiff::civil::Date;

pub mod config;
pub mod error;
pub mod fixer;
pub mod output;
pub mod rebase;

pub use config::Config;
pub use error::{Error, Result};
pub use fixer::{FetchResult, FixerClient};
pub use output::RateRecord;

/// Collect exchange rates from the Fixer.io API and write them to a CSV file.
///
/// Rates are fetched EUR-based (constrained plans fix the base currency) and
/// rebased to USD before writing. The requested currency list must include
/// USD, since the EUR→USD rate drives the rebasing; a response without it
/// fails the run.
#[derive(Debug, Parser)]
pub struct Cli {
    /// Date for historical rates (format: YYYY-MM-DD). Fetches the latest
    /// rates when omitted.
    #[arg(long, value_name = "DATE")]
    pub date: Option<Date>,

    /// Path of the output CSV file. Defaults to exchange_rates_<date>.csv.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Comma-separated currency codes to fetch rates for.
    #[arg(long, value_name = "LIST", conflicts_with = "currencies_file")]
    pub currencies: Option<String>,

    /// File of currency codes, one per line. Defaults to currencies.txt in
    /// the working directory.
    #[arg(long, value_name = "PATH")]
    pub currencies_file: Option<PathBuf>,

    /// HTTP timeout in seconds, applied to connecting and to the whole call.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,
}
