//! Synthetic quotes for offline runs.
//!
//! A daily random walk seeded from a shared label, so two synthetic sources
//! follow the same market, plus a small per-source spread seeded from the
//! source name. Runs over synthetic data are tagged as such in reports.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use indicated_core::PricePoint;

use super::{PriceProvider, QuoteOrigin, SourceError};

const DEFAULT_START_PRICE: f64 = 10_000.0;
const MAX_DAILY_RETURN: f64 = 0.04;
const MAX_SPREAD: f64 = 0.002;

fn seeded(label: &str) -> StdRng {
    StdRng::from_seed(*blake3::hash(label.as_bytes()).as_bytes())
}

pub struct SyntheticProvider {
    name: String,
    market: String,
    start_price: f64,
}

impl SyntheticProvider {
    pub fn new(name: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            market: market.into(),
            start_price: DEFAULT_START_PRICE,
        }
    }

    pub fn with_start_price(mut self, start_price: f64) -> Self {
        self.start_price = start_price;
        self
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> QuoteOrigin {
        QuoteOrigin::Synthetic
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>, SourceError> {
        let mut market = seeded(&self.market);
        let mut spread = seeded(&self.name);

        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;
        while current <= end {
            let quote = price * (1.0 + spread.gen_range(-MAX_SPREAD..MAX_SPREAD));
            points.push(PricePoint::new(current, quote));
            price *= 1.0 + market.gen_range(-MAX_DAILY_RETURN..MAX_DAILY_RETURN);
            current += chrono::Duration::days(1);
        }
        Ok(points)
    }
}
