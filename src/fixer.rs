//! Blocking client for the Fixer.io exchange-rate API.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use ureq::Agent;

use crate::config::Config;
use crate::error::{Error, Result};

const FIXER_BASE_URL: &str = "https://data.fixer.io/api";

/// Constrained plans report all rates against EUR.
const FIXED_BASE: &str = "EUR";

/// Provider error code for the per-second rate limit.
const RATE_LIMIT_CODE: u32 = 106;

/// EUR-based rates as returned by one successful provider call.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Base currency the raw rates are expressed against.
    pub base: String,
    /// Date the provider reports the rates for.
    pub date: Option<Date>,
    pub rates: HashMap<String, Decimal>,
}

pub struct FixerClient {
    agent: Agent,
    api_key: String,
    cooldown: Duration,
}

impl FixerClient {
    pub fn new(config: &Config) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_connect(Some(config.timeout))
            .timeout_global(Some(config.timeout))
            // Non-2xx statuses are handled as values, not transport errors.
            .http_status_as_error(false)
            .build();

        Self {
            agent: agent_config.into(),
            api_key: config.api_key.clone(),
            cooldown: config.cooldown,
        }
    }

    /// Fetch EUR-based rates for the given symbols, at `date` or latest.
    ///
    /// Waits out the cool-down and retries exactly once when the provider
    /// signals its rate limit. Every attempt, including the retry, consumes
    /// one unit of API quota.
    pub fn fetch_rates(&self, date: Option<Date>, symbols: &[String]) -> Result<FetchResult> {
        let endpoint = match date {
            Some(date) => date.to_string(),
            None => "latest".to_string(),
        };

        with_rate_limit_retry(self.cooldown, || self.request_once(&endpoint, symbols))
    }

    fn request_once(&self, endpoint: &str, symbols: &[String]) -> Result<FetchResult> {
        let mut resp = self
            .agent
            .get(format!("{FIXER_BASE_URL}/{endpoint}"))
            .query("access_key", &self.api_key)
            .query("base", FIXED_BASE)
            .query("symbols", symbols.join(","))
            .call()
            .map_err(|e| Error::FetchFailed(format!("request failed: {e}")))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(Error::RateLimitExceeded);
        }
        if !status.is_success() {
            // Provider errors usually carry a JSON body worth surfacing.
            let detail = resp
                .body_mut()
                .read_json::<Value>()
                .map(|body| body.to_string())
                .unwrap_or_default();
            return Err(Error::FetchFailed(format!(
                "provider returned HTTP {status}: {detail}"
            )));
        }

        resp.body_mut()
            .read_json::<RatesResponse>()
            .map_err(|e| Error::FetchFailed(format!("malformed provider response: {e}")))?
            .into_result(symbols)
    }
}

/// Run `attempt`, and on a rate-limit signal wait out the cool-down and try
/// exactly once more. A second rate-limit signal propagates to the caller.
fn with_rate_limit_retry<T, F>(cooldown: Duration, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    match attempt() {
        Err(Error::RateLimitExceeded) => {
            log::warn!(
                "provider rate limit hit, retrying in {}ms",
                cooldown.as_millis()
            );
            thread::sleep(cooldown);
            attempt()
        }
        outcome => outcome,
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    success: bool,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    date: Option<Date>,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u32,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl RatesResponse {
    /// Map the provider payload onto the fetch contract: `success: false`
    /// with the rate-limit code is retryable, any other failure is fatal,
    /// and a successful payload must cover every requested symbol.
    fn into_result(self, requested: &[String]) -> Result<FetchResult> {
        if !self.success {
            return Err(match self.error {
                Some(err) if err.code == RATE_LIMIT_CODE => Error::RateLimitExceeded,
                Some(err) => Error::FetchFailed(format!(
                    "API error {}: {}",
                    err.code,
                    err.info
                        .or(err.kind)
                        .unwrap_or_else(|| "unknown error".into())
                )),
                None => Error::FetchFailed("provider reported failure without detail".into()),
            });
        }

        for code in requested {
            if !self.rates.contains_key(code) {
                return Err(Error::FetchFailed(format!(
                    "provider response is missing a rate for {code}"
                )));
            }
        }

        Ok(FetchResult {
            base: self.base.unwrap_or_else(|| FIXED_BASE.to_string()),
            date: self.date,
            rates: self.rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use rust_decimal_macros::dec;

    use crate::error::{Error, Result};

    use super::{RatesResponse, with_rate_limit_retry};

    #[test]
    fn retry_waits_out_the_cooldown_then_returns_second_result() {
        let cooldown = Duration::from_millis(50);
        let mut calls = 0;
        let started = Instant::now();

        let result = with_rate_limit_retry(cooldown, || {
            calls += 1;
            if calls == 1 {
                Err(Error::RateLimitExceeded)
            } else {
                Ok(42)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 2);
        assert!(started.elapsed() >= cooldown);
    }

    #[test]
    fn retry_gives_up_after_exactly_two_attempts() {
        let mut calls = 0;

        let result: Result<()> = with_rate_limit_retry(Duration::from_millis(1), || {
            calls += 1;
            Err(Error::RateLimitExceeded)
        });

        assert!(matches!(result, Err(Error::RateLimitExceeded)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn non_rate_limit_errors_are_not_retried() {
        let mut calls = 0;

        let result: Result<()> = with_rate_limit_retry(Duration::from_millis(1), || {
            calls += 1;
            Err(Error::FetchFailed("boom".into()))
        });

        assert!(matches!(result, Err(Error::FetchFailed(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn successful_payload_maps_to_fetch_result() {
        let payload: RatesResponse = serde_json::from_str(
            r#"{"success":true,"base":"EUR","date":"2024-03-01","rates":{"USD":1.08,"GBP":0.86}}"#,
        )
        .unwrap();

        let requested = ["USD".to_string(), "GBP".to_string()];
        let fetched = payload.into_result(&requested).unwrap();

        assert_eq!(fetched.base, "EUR");
        assert_eq!(fetched.rates["USD"], dec!(1.08));
        assert_eq!(fetched.rates["GBP"], dec!(0.86));
    }

    #[test]
    fn rate_limit_error_code_is_retryable() {
        let payload: RatesResponse = serde_json::from_str(
            r#"{"success":false,"error":{"code":106,"type":"rate_limit_reached","info":"too many requests"}}"#,
        )
        .unwrap();

        assert!(matches!(
            payload.into_result(&[]),
            Err(Error::RateLimitExceeded)
        ));
    }

    #[test]
    fn other_provider_errors_carry_code_and_info() {
        let payload: RatesResponse = serde_json::from_str(
            r#"{"success":false,"error":{"code":101,"type":"invalid_access_key","info":"No API Key was specified."}}"#,
        )
        .unwrap();

        match payload.into_result(&[]) {
            Err(Error::FetchFailed(msg)) => {
                assert!(msg.contains("101"));
                assert!(msg.contains("No API Key was specified."));
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_requested_symbol_is_a_fetch_failure() {
        let payload: RatesResponse = serde_json::from_str(
            r#"{"success":true,"base":"EUR","rates":{"USD":1.08}}"#,
        )
        .unwrap();

        let requested = ["USD".to_string(), "GBP".to_string()];
        match payload.into_result(&requested) {
            Err(Error::FetchFailed(msg)) => assert!(msg.contains("GBP")),
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }
}
