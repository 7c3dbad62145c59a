//! Moving Average Convergence / Divergence (MACD).
//!
//! Per column: momentum = EMA(fast) - EMA(slow); signal = EMA(signal) of the
//! momentum line. Crossovers of momentum over signal are flagged per date and
//! combined across columns by truncated mean.
//!
//! Required history: slow + signal observations.

use serde::Serialize;

use crate::domain::{CrossoverEvent, PriceSeries, Source, Trend};
use crate::error::EngineError;
use crate::indicator::{DerivedSeries, Indicator, NamedSeries};
use crate::indicators::crossover::{combine_flags, crossover_flags, latest_crossover};
use crate::indicators::ema::ema_of_series;
use crate::indicators::rolling::{average_series, last_defined};
use crate::indicators::IndicatorKind;
use crate::params::MacdParams;

#[derive(Debug, Clone)]
pub struct Macd {
    params: MacdParams,
    columns: Vec<Source>,
}

impl Macd {
    pub fn new(params: MacdParams, columns: Vec<Source>) -> Self {
        Self { params, columns }
    }
}

/// Momentum and signal lines for one price column.
#[derive(Debug, Clone, Serialize)]
pub struct MacdLine {
    pub source: Source,
    pub name: String,
    #[serde(skip)]
    pub momentum: Vec<f64>,
    #[serde(skip)]
    pub signal: Vec<f64>,
    #[serde(skip)]
    pub crossovers: Vec<i8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacdResult {
    pub lines: Vec<MacdLine>,
    /// Combined per-date crossover flags.
    #[serde(skip)]
    pub crossovers: Vec<i8>,
    /// Sign of the latest momentum value (averaged over columns).
    pub uptrend: Trend,
    /// Most recent date with a combined crossover, if any.
    pub crossover: Option<CrossoverEvent>,
}

impl MacdResult {
    /// The latest crossover, or `NoCrossoverFound` if the lines never crossed.
    pub fn latest_crossover(&self) -> Result<CrossoverEvent, EngineError> {
        self.crossover.ok_or(EngineError::NoCrossoverFound {
            indicator: IndicatorKind::Macd,
            line: "momentum/signal",
        })
    }
}

impl Indicator for Macd {
    type Output = MacdResult;

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Macd
    }

    fn required_history(&self) -> usize {
        self.params.slow + self.params.signal
    }

    fn compute(&self, series: &PriceSeries) -> Result<MacdResult, EngineError> {
        self.ensure_history(series)?;
        if self.columns.is_empty() {
            return Err(EngineError::InvalidParams("macd needs at least one column".into()));
        }

        let lines: Vec<MacdLine> = self
            .columns
            .iter()
            .map(|&source| {
                let prices = series.column(source);
                let fast = ema_of_series(prices, self.params.fast);
                let slow = ema_of_series(prices, self.params.slow);
                let momentum: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
                let signal = ema_of_series(&momentum, self.params.signal);
                let crossovers = crossover_flags(&momentum, &signal);
                MacdLine {
                    source,
                    name: series.source_name(source).to_string(),
                    momentum,
                    signal,
                    crossovers,
                }
            })
            .collect();

        let flags: Vec<Vec<i8>> = lines.iter().map(|l| l.crossovers.clone()).collect();
        let crossovers = combine_flags(&flags);

        let momenta: Vec<Vec<f64>> = lines.iter().map(|l| l.momentum.clone()).collect();
        let latest_momentum = last_defined(&average_series(&momenta)).unwrap_or(f64::NAN);
        let uptrend = Trend::from_sign(latest_momentum);

        let crossover = latest_crossover(series.dates(), &crossovers);

        Ok(MacdResult {
            lines,
            crossovers,
            uptrend,
            crossover,
        })
    }
}

impl DerivedSeries for MacdResult {
    fn export_series(&self, out: &mut NamedSeries) {
        for line in &self.lines {
            out.insert(format!("macd_{}", line.name), line.momentum.clone());
            out.insert(format!("macd_signal_{}", line.name), line.signal.clone());
        }
        out.insert(
            "macd_crossover",
            self.crossovers.iter().map(|&f| f64::from(f)).collect(),
        );
    }
}
