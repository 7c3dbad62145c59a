//! Indicator library.
//!
//! Four indicators (MACD, RSI, Bollinger, Ichimoku) built on shared rolling
//! primitives, an EMA and a crossover detector. Each indicator returns its own
//! result struct holding the derived series and the summary signals read by
//! the interpreter.

pub mod bollinger;
pub mod crossover;
pub mod ema;
pub mod ichimoku;
pub mod macd;
pub mod rolling;
pub mod rsi;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use bollinger::{Bollinger, BollingerResult};
pub use ichimoku::{CloudLevel, Ichimoku, IchimokuResult, LeadingSpan};
pub use macd::{Macd, MacdLine, MacdResult};
pub use rsi::{Rsi, RsiResult};

/// The four indicators the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Macd,
    Rsi,
    Bollinger,
    Ichimoku,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::Macd,
        IndicatorKind::Rsi,
        IndicatorKind::Bollinger,
        IndicatorKind::Ichimoku,
    ];

    /// Number of weighted sub-signals the indicator feeds into the score.
    pub fn sub_signals(self) -> usize {
        match self {
            IndicatorKind::Macd | IndicatorKind::Rsi | IndicatorKind::Bollinger => 2,
            IndicatorKind::Ichimoku => 3,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            IndicatorKind::Macd => "macd",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Ichimoku => "ichimoku",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Bollinger => "Bollinger Band",
            IndicatorKind::Ichimoku => "Ichimoku Cloud",
        };
        f.write_str(label)
    }
}

/// Build a price series for tests from two price columns on consecutive days.
#[cfg(test)]
pub fn make_series(a: &[f64], b: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{PriceRow, PriceSeries};
    assert_eq!(a.len(), b.len(), "test columns must have equal length");
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let rows: Vec<PriceRow> = a
        .iter()
        .zip(b)
        .enumerate()
        .map(|(i, (&a, &b))| PriceRow {
            date: base_date + chrono::Duration::days(i as i64),
            a,
            b,
        })
        .collect();
    PriceSeries::from_rows("coindesk", "nomics", &rows).unwrap()
}

/// Same prices in both columns.
#[cfg(test)]
pub fn make_single_series(prices: &[f64]) -> crate::domain::PriceSeries {
    make_series(prices, prices)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
