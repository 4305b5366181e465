//! Run configuration, resolved once at startup. Core logic never reads the
//! environment or working directory on its own.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jiff::civil::Date;

use crate::Cli;
use crate::error::{Error, Result};

/// Environment variable holding the Fixer.io API key.
pub const API_KEY_VAR: &str = "FIXER_API_KEY";

/// Currency-list file read when neither `--currencies` nor
/// `--currencies-file` is given.
pub const DEFAULT_CURRENCIES_FILE: &str = "currencies.txt";

// Slightly over one second; the provider allows 5 calls per second.
const RATE_LIMIT_COOLDOWN: Duration = Duration::from_millis(1100);

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Target date for historical rates; `None` fetches the latest.
    pub date: Option<Date>,
    /// Requested currency codes, in output order.
    pub currencies: Vec<String>,
    /// Explicit output path, overriding the date-derived default.
    pub output: Option<PathBuf>,
    pub timeout: Duration,
    /// Wait applied before the single rate-limit retry.
    pub cooldown: Duration,
}

impl Config {
    /// Resolve the full configuration from CLI flags and the environment.
    /// Fails before any network call on a missing API key or an unusable
    /// currency list.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "{API_KEY_VAR} environment variable must be set"
                ))
            })?;

        let currencies =
            resolve_currencies(cli.currencies.as_deref(), cli.currencies_file.as_deref())?;

        Ok(Self {
            api_key,
            date: cli.date,
            currencies,
            output: cli.output.clone(),
            timeout: Duration::from_secs(cli.timeout),
            cooldown: RATE_LIMIT_COOLDOWN,
        })
    }
}

/// Determine the currency list from exactly one source, in precedence order:
/// the `--currencies` flag, the `--currencies-file` flag, or the default
/// `currencies.txt`. Supplying both flags is a configuration error.
pub fn resolve_currencies(inline: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    let currencies = match (inline, file) {
        (Some(_), Some(_)) => {
            return Err(Error::Configuration(
                "--currencies and --currencies-file are mutually exclusive".into(),
            ));
        }
        (Some(list), None) => parse_currency_list(list),
        (None, file) => {
            let path = file.unwrap_or(Path::new(DEFAULT_CURRENCIES_FILE));
            let contents = fs::read_to_string(path).map_err(|e| {
                Error::Configuration(format!(
                    "cannot read currency list {}: {e}",
                    path.display()
                ))
            })?;
            parse_currency_file(&contents)
        }
    };

    if currencies.is_empty() {
        return Err(Error::Configuration("currency list is empty".into()));
    }
    if currencies == ["USD"] {
        return Err(Error::Configuration(
            "currency list contains only USD, no rates to fetch".into(),
        ));
    }
    Ok(currencies)
}

fn parse_currency_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect()
}

/// One code per line; blank lines and `#` comments are skipped.
fn parse_currency_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_uppercase)
        .collect()
}
