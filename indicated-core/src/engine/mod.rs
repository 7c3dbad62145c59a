//! Engine entry point: price series in, scored assessment out.
//!
//! 1. Validate parameters
//! 2. Check every active indicator's history requirement
//! 3. Compute the active indicators in parallel
//! 4. Interpret and aggregate in fixed order (MACD, RSI, Bollinger, Ichimoku)
//!
//! Any failure aborts the whole run; there is no partial score.

pub mod precompute;

use serde::Serialize;
use tracing::debug;

use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::indicator::NamedSeries;
use crate::params::IndicatorParams;
use crate::scoring::{Assessment, Mode};

pub use precompute::{check_history, compute_readings, required_history, Readings};

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub assessment: Assessment,
    pub readings: Readings,
    /// BLAKE3 fingerprint of the evaluated price series.
    pub dataset_hash: String,
}

impl Evaluation {
    pub fn named_series(&self) -> NamedSeries {
        self.readings.named_series()
    }
}

/// Evaluate `series` in `mode`.
pub fn evaluate(
    series: &PriceSeries,
    mode: Mode,
    params: &IndicatorParams,
) -> Result<Evaluation, EngineError> {
    params.validate()?;
    let date = series
        .latest_date()
        .ok_or_else(|| EngineError::InvalidSeries("price series is empty".into()))?;

    let readings = compute_readings(series, params, mode)?;
    let interpretations = readings.interpret(mode)?;
    let assessment = Assessment::new(date, mode, interpretations);

    debug!(
        %mode,
        score = assessment.score,
        recommendation = %assessment.recommendation,
        "run aggregated"
    );

    Ok(Evaluation {
        assessment,
        readings,
        dataset_hash: series.dataset_hash(),
    })
}
