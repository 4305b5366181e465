//! Error types for the rate collector.

use thiserror::Error;

/// Everything that can end a collection run. All variants are fatal: no
/// partial output is written.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider rate limit exceeded")]
    RateLimitExceeded,

    #[error("rate fetch failed: {0}")]
    FetchFailed(String),

    #[error("USD rate missing from provider response, cannot rebase to USD")]
    MissingBaseCurrency,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, Error>;
