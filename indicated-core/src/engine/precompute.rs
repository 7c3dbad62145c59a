//! Indicator evaluation orchestration.
//!
//! History preconditions are checked for every active indicator before any
//! computation starts; the indicators then run in parallel and the results
//! are joined into a `Readings` value before interpretation.

use serde::Serialize;
use tracing::debug;

use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::indicator::{DerivedSeries, Indicator, NamedSeries};
use crate::indicators::{
    Bollinger, BollingerResult, Ichimoku, IchimokuResult, IndicatorKind, Macd, MacdResult, Rsi,
    RsiResult,
};
use crate::params::IndicatorParams;
use crate::scoring::{Interpret, Interpretation, Mode};

/// Results of the indicators active in one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Readings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ichimoku: Option<IchimokuResult>,
}

impl Readings {
    /// Interpret every present result in aggregation order.
    pub fn interpret(&self, mode: Mode) -> Result<Vec<Interpretation>, EngineError> {
        let max_score = mode.max_score();
        let results: [Option<&dyn Interpret>; 4] = [
            self.macd.as_ref().map(|r| r as &dyn Interpret),
            self.rsi.as_ref().map(|r| r as &dyn Interpret),
            self.bollinger.as_ref().map(|r| r as &dyn Interpret),
            self.ichimoku.as_ref().map(|r| r as &dyn Interpret),
        ];
        results
            .into_iter()
            .flatten()
            .map(|r| r.interpret(max_score))
            .collect()
    }

    /// Every derived series, aligned to the price series.
    pub fn named_series(&self) -> NamedSeries {
        let mut out = NamedSeries::new();
        let results: [Option<&dyn DerivedSeries>; 4] = [
            self.macd.as_ref().map(|r| r as &dyn DerivedSeries),
            self.rsi.as_ref().map(|r| r as &dyn DerivedSeries),
            self.bollinger.as_ref().map(|r| r as &dyn DerivedSeries),
            self.ichimoku.as_ref().map(|r| r as &dyn DerivedSeries),
        ];
        for result in results.into_iter().flatten() {
            result.export_series(&mut out);
        }
        out
    }
}

/// The four configured indicators.
struct Suite {
    macd: Macd,
    rsi: Rsi,
    bollinger: Bollinger,
    ichimoku: Ichimoku,
}

impl Suite {
    fn new(params: &IndicatorParams) -> Self {
        Self {
            macd: Macd::new(params.macd, params.columns.clone()),
            rsi: Rsi::new(params.rsi, params.columns.clone()),
            bollinger: Bollinger::new(params.bollinger, params.columns.clone()),
            ichimoku: Ichimoku::new(params.ichimoku),
        }
    }

    fn required_history(&self, kind: IndicatorKind) -> usize {
        match kind {
            IndicatorKind::Macd => self.macd.required_history(),
            IndicatorKind::Rsi => self.rsi.required_history(),
            IndicatorKind::Bollinger => self.bollinger.required_history(),
            IndicatorKind::Ichimoku => self.ichimoku.required_history(),
        }
    }
}

/// Longest history any active indicator needs.
pub fn required_history(params: &IndicatorParams, mode: Mode) -> usize {
    let suite = Suite::new(params);
    mode.active()
        .into_iter()
        .map(|kind| suite.required_history(kind))
        .max()
        .unwrap_or(0)
}

/// Fail on the first active indicator (in aggregation order) whose history
/// requirement the series does not meet.
pub fn check_history(
    series: &PriceSeries,
    params: &IndicatorParams,
    mode: Mode,
) -> Result<(), EngineError> {
    let suite = Suite::new(params);
    for indicator in mode.active() {
        let required = suite.required_history(indicator);
        if series.len() < required {
            return Err(EngineError::InsufficientHistory {
                indicator,
                required,
                available: series.len(),
            });
        }
    }
    Ok(())
}

fn run<I: Indicator>(
    indicator: &I,
    series: &PriceSeries,
    mode: Mode,
) -> Result<Option<I::Output>, EngineError> {
    if !mode.includes(indicator.kind()) {
        return Ok(None);
    }
    let result = indicator.compute(series)?;
    debug!(indicator = %indicator.kind(), observations = series.len(), "indicator evaluated");
    Ok(Some(result))
}

/// Compute every active indicator.
///
/// The indicators share nothing but the read-only series, so they are
/// evaluated with `rayon::join`.
pub fn compute_readings(
    series: &PriceSeries,
    params: &IndicatorParams,
    mode: Mode,
) -> Result<Readings, EngineError> {
    check_history(series, params, mode)?;
    let suite = Suite::new(params);

    let ((macd, rsi), (bollinger, ichimoku)) = rayon::join(
        || {
            rayon::join(
                || run(&suite.macd, series, mode),
                || run(&suite.rsi, series, mode),
            )
        },
        || {
            rayon::join(
                || run(&suite.bollinger, series, mode),
                || run(&suite.ichimoku, series, mode),
            )
        },
    );

    Ok(Readings {
        macd: macd?,
        rsi: rsi?,
        bollinger: bollinger?,
        ichimoku: ichimoku?,
    })
}
