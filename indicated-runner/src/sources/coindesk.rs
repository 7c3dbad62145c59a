//! Coindesk-style historical close provider.
//!
//! Response shape: `{"bpi": {"YYYY-MM-DD": price, ...}, "disclaimer": ..., "time": ...}`.
//! Only the `bpi` map is read.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use indicated_core::PricePoint;

use super::http::RetryingClient;
use super::{within, PriceProvider, QuoteOrigin, SourceError};

#[derive(Debug, Deserialize)]
struct BpiResponse {
    bpi: BTreeMap<String, f64>,
}

pub struct CoindeskProvider {
    name: String,
    base_url: String,
    http: RetryingClient,
}

impl CoindeskProvider {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http: RetryingClient) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http,
        }
    }

    fn url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/v1/bpi/historical/close.json?start={}&end={}",
            self.base_url.trim_end_matches('/'),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }

    fn parse(&self, body: BpiResponse) -> Result<Vec<PricePoint>, SourceError> {
        body.bpi
            .into_iter()
            .map(|(key, price)| {
                let date = NaiveDate::parse_from_str(&key, "%Y-%m-%d").map_err(|e| {
                    SourceError::ResponseFormatChanged {
                        provider: self.name.clone(),
                        reason: format!("bad date key '{key}': {e}"),
                    }
                })?;
                Ok(PricePoint::new(date, price))
            })
            .collect()
    }

    /// Parse a raw JSON body. Exposed for offline tests and fixtures.
    pub fn parse_body(&self, body: &str) -> Result<Vec<PricePoint>, SourceError> {
        let parsed: BpiResponse =
            serde_json::from_str(body).map_err(|e| SourceError::ResponseFormatChanged {
                provider: self.name.clone(),
                reason: e.to_string(),
            })?;
        self.parse(parsed)
    }
}

impl PriceProvider for CoindeskProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> QuoteOrigin {
        QuoteOrigin::Coindesk
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>, SourceError> {
        let body: BpiResponse = self.http.get_json(&self.name, &self.url(start, end))?;
        Ok(within(self.parse(body)?, start, end))
    }
}
