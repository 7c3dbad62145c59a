//! Nomics-style exchange-rate history provider.
//!
//! Response shape: `[{"timestamp": "2020-01-01T00:00:00Z", "rate": "7200.17"}, ...]`.
//! Rates arrive as decimal strings; the timestamp's UTC date is the quote date.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use indicated_core::PricePoint;

use super::http::RetryingClient;
use super::{within, PriceProvider, QuoteOrigin, SourceError};

#[derive(Debug, Deserialize)]
struct RateEntry {
    timestamp: String,
    rate: String,
}

pub struct NomicsProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    currency: String,
    http: RetryingClient,
}

impl NomicsProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        currency: impl Into<String>,
        http: RetryingClient,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key,
            currency: currency.into(),
            http,
        }
    }

    fn url(&self, key: &str, start: NaiveDate) -> String {
        format!(
            "{}/v1/exchange-rates/history?key={key}&start={}T00%3A00%3A00Z&currency={}",
            self.base_url.trim_end_matches('/'),
            start.format("%Y-%m-%d"),
            self.currency,
        )
    }

    fn format_error(&self, reason: String) -> SourceError {
        SourceError::ResponseFormatChanged {
            provider: self.name.clone(),
            reason,
        }
    }

    fn parse(&self, entries: Vec<RateEntry>) -> Result<Vec<PricePoint>, SourceError> {
        entries
            .into_iter()
            .map(|entry| {
                let date = DateTime::parse_from_rfc3339(&entry.timestamp)
                    .map_err(|e| self.format_error(format!("bad timestamp '{}': {e}", entry.timestamp)))?
                    .naive_utc()
                    .date();
                let price = entry
                    .rate
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| self.format_error(format!("bad rate '{}': {e}", entry.rate)))?;
                Ok(PricePoint::new(date, price))
            })
            .collect()
    }

    /// Parse a raw JSON body. Exposed for offline tests and fixtures.
    pub fn parse_body(&self, body: &str) -> Result<Vec<PricePoint>, SourceError> {
        let entries: Vec<RateEntry> =
            serde_json::from_str(body).map_err(|e| self.format_error(e.to_string()))?;
        self.parse(entries)
    }
}

impl PriceProvider for NomicsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> QuoteOrigin {
        QuoteOrigin::Nomics
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>, SourceError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SourceError::MissingApiKey {
                provider: self.name.clone(),
            })?;
        let entries: Vec<RateEntry> = self.http.get_json(&self.name, &self.url(key, start))?;
        Ok(within(self.parse(entries)?, start, end))
    }
}
