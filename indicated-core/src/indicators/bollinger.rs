//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Per column:
//! - Middle: SMA(price, period)
//! - Upper: middle + mult * stddev(price, period)
//! - Lower: middle - mult * stddev(price, period)
//!
//! Uses sample stddev (divide by N - 1). Columns are averaged per date.
//! Required history: period + 1 (so the band width has a first difference).

use serde::Serialize;

use crate::domain::{Bounce, PriceSeries, Source, Squeeze};
use crate::error::EngineError;
use crate::indicator::{DerivedSeries, Indicator, NamedSeries};
use crate::indicators::rolling::{average_series, last_defined, nan_mean, rolling_mean, rolling_std};
use crate::indicators::IndicatorKind;
use crate::params::BollingerParams;

/// Relative tolerance below which a mean width change counts as flat.
const SQUEEZE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Bollinger {
    params: BollingerParams,
    columns: Vec<Source>,
}

impl Bollinger {
    pub fn new(params: BollingerParams, columns: Vec<Source>) -> Self {
        Self { params, columns }
    }
}

/// Bands for a single price column.
#[derive(Debug, Clone)]
pub struct Bands {
    pub name: String,
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BollingerResult {
    #[serde(skip)]
    pub per_column: Vec<Bands>,
    #[serde(skip)]
    pub middle: Vec<f64>,
    #[serde(skip)]
    pub upper: Vec<f64>,
    #[serde(skip)]
    pub lower: Vec<f64>,
    /// |upper - lower| per date.
    #[serde(skip)]
    pub width: Vec<f64>,
    /// Latest price of the first evaluated column.
    pub latest_price: f64,
    pub bounce: Bounce,
    pub squeeze: Squeeze,
    /// Mean day-over-day width change over the squeeze lookback.
    pub width_change: Option<f64>,
}

fn bands(prices: &[f64], name: &str, period: usize, multiplier: f64) -> Bands {
    let middle = rolling_mean(prices, period);
    let stddev = rolling_std(prices, period);
    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - multiplier * s)
        .collect();
    Bands {
        name: name.to_string(),
        middle,
        upper,
        lower,
    }
}

/// Which band, if any, the price is hugging.
///
/// Down when price is within `proximity * |price - middle|` of the upper
/// band, Up when within that distance of the lower band. A collapsed band
/// (zero width) or undefined input is never a bounce.
pub fn classify_bounce(price: f64, upper: f64, lower: f64, middle: f64, proximity: f64) -> Bounce {
    if [price, upper, lower, middle].iter().any(|v| v.is_nan()) || upper - lower == 0.0 {
        return Bounce::NearAverage;
    }
    let reach = proximity * (price - middle).abs();
    if (price - upper).abs() <= reach {
        Bounce::Down
    } else if (price - lower).abs() <= reach {
        Bounce::Up
    } else {
        Bounce::NearAverage
    }
}

/// Band-width trend from the mean first difference of the trailing widths.
///
/// Returns the classification and the mean change, if any difference was
/// defined.
pub fn classify_squeeze(width: &[f64], lookback: usize) -> (Squeeze, Option<f64>) {
    let start = width.len().saturating_sub(lookback);
    let tail = &width[start..];
    let changes: Vec<f64> = tail.windows(2).map(|w| w[1] - w[0]).collect();
    let Some(mean_change) = nan_mean(&changes) else {
        return (Squeeze::Neutral, None);
    };

    let scale = last_defined(tail).unwrap_or(0.0).abs();
    let squeeze = if mean_change.abs() <= SQUEEZE_TOLERANCE * scale {
        Squeeze::Neutral
    } else if mean_change > 0.0 {
        Squeeze::Widening
    } else {
        Squeeze::Contracting
    };
    (squeeze, Some(mean_change))
}

impl Indicator for Bollinger {
    type Output = BollingerResult;

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Bollinger
    }

    fn required_history(&self) -> usize {
        self.params.period + 1
    }

    fn compute(&self, series: &PriceSeries) -> Result<BollingerResult, EngineError> {
        self.ensure_history(series)?;
        let Some(&first) = self.columns.first() else {
            return Err(EngineError::InvalidParams(
                "bollinger needs at least one column".into(),
            ));
        };

        let per_column: Vec<Bands> = self
            .columns
            .iter()
            .map(|&source| {
                bands(
                    series.column(source),
                    series.source_name(source),
                    self.params.period,
                    self.params.multiplier,
                )
            })
            .collect();

        let collect = |pick: fn(&Bands) -> &Vec<f64>| -> Vec<Vec<f64>> {
            per_column.iter().map(|b| pick(b).clone()).collect()
        };
        let middle = average_series(&collect(|b| &b.middle));
        let upper = average_series(&collect(|b| &b.upper));
        let lower = average_series(&collect(|b| &b.lower));
        let width: Vec<f64> = upper.iter().zip(&lower).map(|(u, l)| (u - l).abs()).collect();

        let latest_price = series.latest(first).unwrap_or(f64::NAN);
        let last = |v: &[f64]| v.last().copied().unwrap_or(f64::NAN);
        let bounce = classify_bounce(
            latest_price,
            last(&upper),
            last(&lower),
            last(&middle),
            self.params.proximity,
        );
        let (squeeze, width_change) = classify_squeeze(&width, self.params.squeeze_lookback);

        Ok(BollingerResult {
            per_column,
            middle,
            upper,
            lower,
            width,
            latest_price,
            bounce,
            squeeze,
            width_change,
        })
    }
}

impl DerivedSeries for BollingerResult {
    fn export_series(&self, out: &mut NamedSeries) {
        for b in &self.per_column {
            out.insert(format!("bollinger_upper_{}", b.name), b.upper.clone());
            out.insert(format!("bollinger_middle_{}", b.name), b.middle.clone());
            out.insert(format!("bollinger_lower_{}", b.name), b.lower.clone());
        }
        out.insert("bollinger_upper", self.upper.clone());
        out.insert("bollinger_middle", self.middle.clone());
        out.insert("bollinger_lower", self.lower.clone());
        out.insert("bollinger_width", self.width.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, make_single_series, DEFAULT_EPSILON};

    fn compute(series: &PriceSeries, columns: Vec<Source>) -> BollingerResult {
        Bollinger::new(BollingerParams::default(), columns)
            .compute(series)
            .unwrap()
    }

    #[test]
    fn bounce_at_upper_band_is_down() {
        assert_eq!(classify_bounce(110.0, 110.0, 90.0, 100.0, 0.3), Bounce::Down);
    }

    #[test]
    fn bounce_at_lower_band_is_up() {
        assert_eq!(classify_bounce(90.0, 110.0, 90.0, 100.0, 0.3), Bounce::Up);
    }

    #[test]
    fn bounce_at_average_is_neutral() {
        assert_eq!(
            classify_bounce(100.0, 110.0, 90.0, 100.0, 0.3),
            Bounce::NearAverage
        );
    }

    #[test]
    fn bounce_proximity_edges() {
        // |p - ma| = 8, reach = 2.4; upper distance 2 is inside, 3 is not.
        assert_eq!(classify_bounce(108.0, 110.0, 90.0, 100.0, 0.3), Bounce::Down);
        assert_eq!(
            classify_bounce(107.0, 110.0, 90.0, 100.0, 0.3),
            Bounce::NearAverage
        );
        assert_eq!(
            classify_bounce(100.0, 100.0, 100.0, 100.0, 0.3),
            Bounce::NearAverage
        );
        assert_eq!(
            classify_bounce(f64::NAN, 110.0, 90.0, 100.0, 0.3),
            Bounce::NearAverage
        );
    }

    #[test]
    fn bands_known_values() {
        // Window 101..=120: mean 110.5, sample stddev sqrt(35).
        let prices: Vec<f64> = (100..=120).map(f64::from).collect();
        let series = make_single_series(&prices);
        let result = compute(&series, vec![Source::A]);

        let sigma = 35.0_f64.sqrt();
        assert_approx(result.middle[20], 110.5, DEFAULT_EPSILON);
        assert_approx(result.upper[20], 110.5 + 2.0 * sigma, 1e-9);
        assert_approx(result.lower[20], 110.5 - 2.0 * sigma, 1e-9);
        assert!(result.middle[18].is_nan());
        assert_eq!(result.width.len(), series.len());
    }

    #[test]
    fn rising_ramp_hugs_upper_band() {
        // Latest 120: upper 122.33, reach 0.3 * 9.5 = 2.85.
        let prices: Vec<f64> = (100..=120).map(f64::from).collect();
        let series = make_single_series(&prices);
        let result = compute(&series, Source::BOTH.to_vec());
        assert_eq!(result.bounce, Bounce::Down);
        assert_eq!(result.squeeze, Squeeze::Neutral);
    }

    #[test]
    fn falling_ramp_hugs_lower_band() {
        let prices: Vec<f64> = (100..=120).rev().map(f64::from).collect();
        let series = make_single_series(&prices);
        let result = compute(&series, Source::BOTH.to_vec());
        assert_eq!(result.bounce, Bounce::Up);
    }

    #[test]
    fn constant_prices_collapse_bands() {
        let series = make_single_series(&[100.0; 30]);
        let result = compute(&series, Source::BOTH.to_vec());
        assert_approx(result.upper[29], 100.0, DEFAULT_EPSILON);
        assert_approx(result.lower[29], 100.0, DEFAULT_EPSILON);
        assert_eq!(result.bounce, Bounce::NearAverage);
        assert_eq!(result.squeeze, Squeeze::Neutral);
        assert_eq!(result.width_change, Some(0.0));
    }

    #[test]
    fn growing_swings_widen_bands() {
        let prices: Vec<f64> = (0..60)
            .map(|i| {
                let amp = 1.0 + 0.5 * i as f64;
                if i % 2 == 0 { 100.0 + amp } else { 100.0 - amp }
            })
            .collect();
        let series = make_single_series(&prices);
        let result = compute(&series, Source::BOTH.to_vec());
        assert_eq!(result.squeeze, Squeeze::Widening);
        assert!(result.width_change.unwrap() > 0.0);
    }

    #[test]
    fn shrinking_swings_contract_bands() {
        let prices: Vec<f64> = (0..60)
            .map(|i| {
                let amp = 31.0 - 0.5 * i as f64;
                if i % 2 == 0 { 100.0 + amp } else { 100.0 - amp }
            })
            .collect();
        let series = make_single_series(&prices);
        let result = compute(&series, Source::BOTH.to_vec());
        assert_eq!(result.squeeze, Squeeze::Contracting);
        assert!(result.squeeze.breakout_expected());
    }

    #[test]
    fn columns_are_averaged_and_first_column_prices_bounce() {
        let a: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let b: Vec<f64> = (0..25).map(|i| 300.0 + i as f64).collect();
        let series = make_series(&a, &b);
        let result = compute(&series, Source::BOTH.to_vec());

        let avg_middle = (result.per_column[0].middle[24] + result.per_column[1].middle[24]) / 2.0;
        assert_approx(result.middle[24], avg_middle, DEFAULT_EPSILON);
        assert_approx(result.latest_price, 124.0, DEFAULT_EPSILON);
        // Column A sits far below the averaged bands.
        assert_eq!(result.bounce, Bounce::NearAverage);
    }

    #[test]
    fn squeeze_with_too_little_width_history_is_neutral() {
        assert_eq!(classify_squeeze(&[f64::NAN, f64::NAN, 3.0], 20), (Squeeze::Neutral, None));
    }
}
