//! Relative Strength Index (RSI).
//!
//! Simple (not Wilder) averaging of gains and losses over `period`, then a
//! rolling mean over `smoothing` of the raw index:
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Required history: period + smoothing.
//! Edge cases: avg_loss == 0 with gains saturates to 100 (counted, not an
//! error); avg_loss == avg_gain == 0 (a flat window) is undefined (NaN) and
//! reads as neutral.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Momentum, PriceSeries, Source};
use crate::error::EngineError;
use crate::indicator::{DerivedSeries, Indicator, NamedSeries};
use crate::indicators::rolling::{average_series, diff, rolling_mean};
use crate::indicators::IndicatorKind;
use crate::params::RsiParams;

#[derive(Debug, Clone)]
pub struct Rsi {
    params: RsiParams,
    columns: Vec<Source>,
}

impl Rsi {
    pub fn new(params: RsiParams, columns: Vec<Source>) -> Self {
        Self { params, columns }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RsiResult {
    /// Smoothed index per column, keyed by source name.
    #[serde(skip)]
    pub per_column: Vec<(String, Vec<f64>)>,
    /// Per-date average of the smoothed columns.
    #[serde(skip)]
    pub rsi: Vec<f64>,
    pub momentum: Momentum,
    pub latest_rsi: f64,
    /// Window evaluations where zero losses forced the index to 100.
    pub saturated_days: usize,
}

/// Index from average gain and loss over one window.
fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() || (avg_loss == 0.0 && avg_gain == 0.0) {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Raw (unsmoothed) index for one price column, plus the saturation count.
fn raw_index(prices: &[f64], period: usize) -> (Vec<f64>, usize) {
    let changes = diff(prices);
    let gains: Vec<f64> = changes
        .iter()
        .map(|&c| if c.is_nan() { c } else { c.max(0.0) })
        .collect();
    let losses: Vec<f64> = changes
        .iter()
        .map(|&c| if c.is_nan() { c } else { (-c).max(0.0) })
        .collect();

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    let mut saturated = 0;
    let raw = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if l == 0.0 && g > 0.0 {
                saturated += 1;
            }
            relative_strength_index(g, l)
        })
        .collect();
    (raw, saturated)
}

impl Indicator for Rsi {
    type Output = RsiResult;

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi
    }

    fn required_history(&self) -> usize {
        self.params.period + self.params.smoothing
    }

    fn compute(&self, series: &PriceSeries) -> Result<RsiResult, EngineError> {
        self.ensure_history(series)?;
        if self.columns.is_empty() {
            return Err(EngineError::InvalidParams("rsi needs at least one column".into()));
        }

        let mut saturated_days = 0;
        let per_column: Vec<(String, Vec<f64>)> = self
            .columns
            .iter()
            .map(|&source| {
                let (raw, saturated) = raw_index(series.column(source), self.params.period);
                saturated_days += saturated;
                let smoothed = rolling_mean(&raw, self.params.smoothing);
                (series.source_name(source).to_string(), smoothed)
            })
            .collect();

        if saturated_days > 0 {
            debug!(saturated_days, "rsi: zero-loss windows saturated to 100");
        }

        let columns: Vec<Vec<f64>> = per_column.iter().map(|(_, v)| v.clone()).collect();
        let rsi = average_series(&columns);
        let latest_rsi = rsi.last().copied().unwrap_or(f64::NAN);

        let momentum = if latest_rsi > self.params.overbought {
            Momentum::Overbought
        } else if latest_rsi < self.params.oversold {
            Momentum::Oversold
        } else {
            Momentum::Neutral
        };

        Ok(RsiResult {
            per_column,
            rsi,
            momentum,
            latest_rsi,
            saturated_days,
        })
    }
}

impl DerivedSeries for RsiResult {
    fn export_series(&self, out: &mut NamedSeries) {
        for (name, values) in &self.per_column {
            out.insert(format!("rsi_{name}"), values.clone());
        }
        out.insert("rsi", self.rsi.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, make_single_series};

    fn params(period: usize, smoothing: usize) -> RsiParams {
        RsiParams {
            period,
            smoothing,
            ..RsiParams::default()
        }
    }

    #[test]
    fn rsi_all_gains_saturates_to_100() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = make_single_series(&prices);
        let result = Rsi::new(RsiParams::default(), Source::BOTH.to_vec())
            .compute(&series)
            .unwrap();

        assert_approx(result.latest_rsi, 100.0, 1e-9);
        assert_eq!(result.momentum, Momentum::Overbought);
        // Raw index defined from t=14..19 in each of the two columns.
        assert_eq!(result.saturated_days, 12);
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let prices: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        let series = make_single_series(&prices);
        let result = Rsi::new(RsiParams::default(), Source::BOTH.to_vec())
            .compute(&series)
            .unwrap();

        assert_approx(result.latest_rsi, 0.0, 1e-9);
        assert_eq!(result.momentum, Momentum::Oversold);
        assert_eq!(result.saturated_days, 0);
    }

    #[test]
    fn rsi_known_values() {
        // changes: +1, -1, +2
        // period 2: gains [., ., 0.5, 1.0], losses [., ., 0.5, 0.5]
        // raw[2] = 50, raw[3] = 100 - 100/3
        let series = make_single_series(&[1.0, 2.0, 1.0, 3.0]);
        let result = Rsi::new(params(2, 1), vec![Source::A])
            .compute(&series)
            .unwrap();

        assert!(result.rsi[0].is_nan());
        assert!(result.rsi[1].is_nan());
        assert_approx(result.rsi[2], 50.0, 1e-9);
        assert_approx(result.rsi[3], 100.0 - 100.0 / 3.0, 1e-9);
        assert_eq!(result.momentum, Momentum::Neutral);
    }

    #[test]
    fn smoothing_delays_first_value() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 + (i % 3) as f64).collect();
        let series = make_single_series(&prices);
        let result = Rsi::new(params(4, 3), vec![Source::A])
            .compute(&series)
            .unwrap();
        // First raw value at t=4, first smoothed at t=6.
        assert!(result.rsi[5].is_nan());
        assert!(!result.rsi[6].is_nan());
    }

    #[test]
    fn flat_window_is_undefined() {
        let series = make_single_series(&[100.0; 20]);
        let result = Rsi::new(RsiParams::default(), vec![Source::B])
            .compute(&series)
            .unwrap();
        assert!(result.latest_rsi.is_nan());
        assert!(result.rsi.iter().all(|v| v.is_nan()));
        assert_eq!(result.momentum, Momentum::Neutral);
        assert_eq!(result.saturated_days, 0);
    }

    #[test]
    fn columns_are_averaged() {
        let up: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let down: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        let series = make_series(&up, &down);
        let result = Rsi::new(RsiParams::default(), Source::BOTH.to_vec())
            .compute(&series)
            .unwrap();
        assert_approx(result.latest_rsi, 50.0, 1e-9);
        assert_eq!(result.per_column.len(), 2);
    }

    #[test]
    fn rsi_bounds() {
        let prices = [
            100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0, 101.0, 99.0, 130.0, 80.0,
        ];
        let series = make_single_series(&prices);
        let result = Rsi::new(params(3, 2), vec![Source::A])
            .compute(&series)
            .unwrap();
        for (i, &v) in result.rsi.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn short_series_is_insufficient_history() {
        let series = make_single_series(&[100.0; 16]);
        let err = Rsi::new(RsiParams::default(), Source::BOTH.to_vec())
            .compute(&series)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientHistory {
                required: 17,
                available: 16,
                ..
            }
        ));
    }
}
