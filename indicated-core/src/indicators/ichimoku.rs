//! Ichimoku Cloud.
//!
//! The two sources stand in for a high/low pair: whichever has the strictly
//! higher whole-series mean is treated as the high (a tie makes source B the
//! high). The close is the per-date midpoint of the two sources.
//!
//! - Conversion: (max high(n1) + min low(n1)) / 2
//! - Baseline:   (max high(n2) + min low(n2)) / 2
//! - Span A:     (conversion + baseline) / 2
//! - Span B:     (max high(n3) + min low(n3)) / 2
//! - Lagging:    mean(close shifted back n4, n4)
//!
//! Required history: max(n1, n2, n3, 2 * n4) + 1.

use serde::Serialize;

use crate::domain::{CrossoverEvent, PriceSeries, Source};
use crate::error::EngineError;
use crate::indicator::{DerivedSeries, Indicator, NamedSeries};
use crate::indicators::crossover::{crossover_flags, latest_crossover};
use crate::indicators::rolling::{rolling_max, rolling_mean, rolling_min, shift};
use crate::indicators::IndicatorKind;
use crate::params::IchimokuParams;

#[derive(Debug, Clone)]
pub struct Ichimoku {
    params: IchimokuParams,
}

impl Ichimoku {
    pub fn new(params: IchimokuParams) -> Self {
        Self { params }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeadingSpan {
    A,
    B,
}

/// Latest value of a leading span, acting as support or resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloudLevel {
    pub span: LeadingSpan,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IchimokuResult {
    /// Source used as the high proxy.
    pub high: Source,
    #[serde(skip)]
    pub close: Vec<f64>,
    #[serde(skip)]
    pub conversion: Vec<f64>,
    #[serde(skip)]
    pub baseline: Vec<f64>,
    #[serde(skip)]
    pub span_a: Vec<f64>,
    #[serde(skip)]
    pub span_b: Vec<f64>,
    #[serde(skip)]
    pub lagging: Vec<f64>,
    pub latest_close: f64,
    pub support: Vec<CloudLevel>,
    pub resistance: Vec<CloudLevel>,
    /// Latest close-vs-baseline crossover.
    pub kijun: Option<CrossoverEvent>,
    /// Latest lagging-span-vs-close crossover.
    pub chikou: Option<CrossoverEvent>,
}

impl IchimokuResult {
    pub fn kijun_trend(&self) -> Result<CrossoverEvent, EngineError> {
        self.kijun.ok_or(EngineError::NoCrossoverFound {
            indicator: IndicatorKind::Ichimoku,
            line: "close/baseline",
        })
    }

    pub fn chikou_trend(&self) -> Result<CrossoverEvent, EngineError> {
        self.chikou.ok_or(EngineError::NoCrossoverFound {
            indicator: IndicatorKind::Ichimoku,
            line: "lagging/close",
        })
    }
}

/// Source with the strictly higher whole-series mean; ties go to B.
pub fn high_source(series: &PriceSeries) -> Source {
    if series.mean(Source::A) > series.mean(Source::B) {
        Source::A
    } else {
        Source::B
    }
}

fn midline(high: &[f64], low: &[f64], window: usize) -> Vec<f64> {
    rolling_max(high, window)
        .iter()
        .zip(rolling_min(low, window))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

/// Split latest span values into support (at or below close) and resistance.
fn cloud_levels(close: f64, spans: [(LeadingSpan, f64); 2]) -> (Vec<CloudLevel>, Vec<CloudLevel>) {
    let mut support = Vec::new();
    let mut resistance = Vec::new();
    for (span, price) in spans {
        if price.is_nan() || close.is_nan() {
            continue;
        }
        let level = CloudLevel { span, price };
        if close >= price {
            support.push(level);
        } else {
            resistance.push(level);
        }
    }
    (support, resistance)
}

impl Indicator for Ichimoku {
    type Output = IchimokuResult;

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ichimoku
    }

    fn required_history(&self) -> usize {
        let p = &self.params;
        p.conversion
            .max(p.baseline)
            .max(p.span_b)
            .max(2 * p.lagging)
            + 1
    }

    fn compute(&self, series: &PriceSeries) -> Result<IchimokuResult, EngineError> {
        self.ensure_history(series)?;
        let p = &self.params;

        let high_src = high_source(series);
        let high = series.column(high_src);
        let low = series.column(high_src.other());
        let close = series.midpoint();

        let conversion = midline(high, low, p.conversion);
        let baseline = midline(high, low, p.baseline);
        let span_a: Vec<f64> = conversion
            .iter()
            .zip(&baseline)
            .map(|(c, b)| (c + b) / 2.0)
            .collect();
        let span_b = midline(high, low, p.span_b);
        let lagging = rolling_mean(&shift(&close, p.lagging), p.lagging);

        let latest = |v: &[f64]| v.last().copied().unwrap_or(f64::NAN);
        let latest_close = latest(&close);
        let (support, resistance) = cloud_levels(
            latest_close,
            [
                (LeadingSpan::A, latest(&span_a)),
                (LeadingSpan::B, latest(&span_b)),
            ],
        );

        let kijun = latest_crossover(series.dates(), &crossover_flags(&close, &baseline));
        let chikou = latest_crossover(series.dates(), &crossover_flags(&lagging, &close));

        Ok(IchimokuResult {
            high: high_src,
            close,
            conversion,
            baseline,
            span_a,
            span_b,
            lagging,
            latest_close,
            support,
            resistance,
            kijun,
            chikou,
        })
    }
}

impl DerivedSeries for IchimokuResult {
    fn export_series(&self, out: &mut NamedSeries) {
        out.insert("ichimoku_close", self.close.clone());
        out.insert("ichimoku_conversion", self.conversion.clone());
        out.insert("ichimoku_baseline", self.baseline.clone());
        out.insert("ichimoku_span_a", self.span_a.clone());
        out.insert("ichimoku_span_b", self.span_b.clone());
        out.insert("ichimoku_lagging", self.lagging.clone());
    }
}
