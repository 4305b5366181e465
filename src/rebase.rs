//! EUR→USD rebasing arithmetic.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::fixer::FetchResult;

/// Convert EUR-based rates into USD-based rates for the requested
/// currencies, preserving the requested order.
///
/// `usd_rate[c] = rates[c] / rates["USD"]`, with USD itself pinned to
/// exactly 1. USD appears in the output only when explicitly requested.
/// The fetched set must contain a non-zero EUR→USD rate; full precision is
/// kept here, rounding happens at output assembly.
pub fn rebase_to_usd(
    fetched: &FetchResult,
    requested: &[String],
) -> Result<Vec<(String, Decimal)>> {
    let eur_to_usd = match fetched.rates.get("USD") {
        Some(rate) if !rate.is_zero() => *rate,
        _ => return Err(Error::MissingBaseCurrency),
    };

    requested
        .iter()
        .map(|code| {
            if code == "USD" {
                return Ok((code.clone(), Decimal::ONE));
            }
            let raw = fetched.rates.get(code).ok_or_else(|| {
                Error::FetchFailed(format!("provider response is missing a rate for {code}"))
            })?;
            Ok((code.clone(), raw / eur_to_usd))
        })
        .collect()
}
