//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over quote sources (HTTP JSON APIs, CSV
//! import, synthetic walks) so the runner can swap implementations and tests
//! can run offline.

pub mod coindesk;
pub mod csv_import;
pub mod http;
pub mod nomics;
pub mod synthetic;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use indicated_core::{PricePoint, SourceQuotes};

pub use coindesk::CoindeskProvider;
pub use csv_import::CsvProvider;
pub use http::RetryingClient;
pub use nomics::NomicsProvider;
pub use synthetic::SyntheticProvider;

/// Structured error types for quote fetching.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{provider}: network unreachable: {reason}")]
    NetworkUnreachable { provider: String, reason: String },

    #[error("{provider}: HTTP {status}")]
    HttpStatus { provider: String, status: u16 },

    #[error("{provider}: rate limited (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: String,
        retry_after_secs: u64,
    },

    #[error("{provider}: response format changed: {reason}")]
    ResponseFormatChanged { provider: String, reason: String },

    #[error("{provider}: no API key configured")]
    MissingApiKey { provider: String },

    #[error("{provider}: no quotes between {start} and {end}")]
    NoQuotes {
        provider: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Where a source's quotes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteOrigin {
    Coindesk,
    Nomics,
    CsvImport,
    Synthetic,
}

/// Trait for price providers.
///
/// Implementations return daily quotes for `[start, end]` in any order; the
/// price series merge sorts, validates and aligns them.
pub trait PriceProvider: Send + Sync {
    /// Column name used for this source in the price series.
    fn name(&self) -> &str;

    fn origin(&self) -> QuoteOrigin;

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>, SourceError>;

    /// Fetch and label the quotes for merging.
    fn fetch_quotes(&self, start: NaiveDate, end: NaiveDate) -> Result<SourceQuotes, SourceError> {
        let points = self.fetch(start, end)?;
        if points.is_empty() {
            return Err(SourceError::NoQuotes {
                provider: self.name().to_string(),
                start,
                end,
            });
        }
        Ok(SourceQuotes::new(self.name(), points))
    }
}

/// Keep points inside `[start, end]`.
pub(crate) fn within(points: Vec<PricePoint>, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    points
        .into_iter()
        .filter(|p| p.date >= start && p.date <= end)
        .collect()
}
