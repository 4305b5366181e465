//! Rate-record assembly and CSV serialization.

use std::path::{Path, PathBuf};

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::error::Result;

/// One output row: the USD value of a single currency on a given date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRecord {
    pub date: Date,
    pub currency: String,
    #[serde(serialize_with = "four_decimal_places")]
    pub usd_rate: Decimal,
}

// Rates are written with a fixed 4-digit fraction.
fn four_decimal_places<S: Serializer>(
    rate: &Decimal,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{rate:.4}"))
}

/// Build the output rows in the rebased (requested) order, rounding each
/// rate to 4 decimal places.
pub fn assemble_records(date: Date, rebased: &[(String, Decimal)]) -> Vec<RateRecord> {
    rebased
        .iter()
        .map(|(currency, usd_rate)| RateRecord {
            date,
            currency: currency.clone(),
            usd_rate: usd_rate.round_dp(4),
        })
        .collect()
}

/// Default output filename for a run date.
pub fn default_output_path(date: Date) -> PathBuf {
    PathBuf::from(format!("exchange_rates_{date}.csv"))
}

/// Write the records as `date,currency,usd_rate` rows, silently overwriting
/// any existing file at `path`.
pub fn write_csv(path: &Path, records: &[RateRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
