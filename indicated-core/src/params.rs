//! Indicator parameters.
//!
//! Every field has a default matching the conventional setting, so a config
//! file only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::domain::Source;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
    /// Rolling-mean window applied to the raw index.
    pub smoothing: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            smoothing: 3,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub multiplier: f64,
    /// Fraction of the price-to-average distance within which price counts
    /// as touching a band.
    pub proximity: f64,
    /// Number of trailing band-width observations used for the squeeze.
    pub squeeze_lookback: usize,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
            proximity: 0.3,
            squeeze_lookback: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    /// Tenkan period.
    pub conversion: usize,
    /// Kijun period.
    pub baseline: usize,
    /// Senkou B period.
    pub span_b: usize,
    /// Chikou period.
    pub lagging: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            conversion: 9,
            baseline: 26,
            span_b: 52,
            lagging: 26,
        }
    }
}

/// Full parameter set for one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    /// Price columns evaluated by MACD, RSI and Bollinger.
    pub columns: Vec<Source>,
    pub macd: MacdParams,
    pub rsi: RsiParams,
    pub bollinger: BollingerParams,
    pub ichimoku: IchimokuParams,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            columns: Source::BOTH.to_vec(),
            macd: MacdParams::default(),
            rsi: RsiParams::default(),
            bollinger: BollingerParams::default(),
            ichimoku: IchimokuParams::default(),
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidParams(msg));

        if self.columns.is_empty() {
            return invalid("at least one price column must be selected".into());
        }

        let m = &self.macd;
        if m.fast == 0 || m.slow == 0 || m.signal == 0 {
            return invalid("macd spans must be >= 1".into());
        }
        if m.fast >= m.slow {
            return invalid(format!(
                "macd fast span ({}) must be shorter than slow span ({})",
                m.fast, m.slow
            ));
        }

        let r = &self.rsi;
        if r.period == 0 || r.smoothing == 0 {
            return invalid("rsi period and smoothing must be >= 1".into());
        }
        if !(0.0..=100.0).contains(&r.oversold)
            || !(0.0..=100.0).contains(&r.overbought)
            || r.oversold >= r.overbought
        {
            return invalid(format!(
                "rsi thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                r.oversold, r.overbought
            ));
        }

        let b = &self.bollinger;
        if b.period < 2 {
            return invalid("bollinger period must be >= 2 for a sample deviation".into());
        }
        if !b.multiplier.is_finite() || b.multiplier <= 0.0 {
            return invalid(format!("bollinger multiplier must be positive, got {}", b.multiplier));
        }
        if !(0.0..=1.0).contains(&b.proximity) {
            return invalid(format!("bollinger proximity must be in [0, 1], got {}", b.proximity));
        }
        if b.squeeze_lookback < 2 {
            return invalid("bollinger squeeze lookback must be >= 2".into());
        }

        let i = &self.ichimoku;
        if i.conversion == 0 || i.baseline == 0 || i.span_b == 0 || i.lagging == 0 {
            return invalid("ichimoku periods must be >= 1".into());
        }

        Ok(())
    }
}
