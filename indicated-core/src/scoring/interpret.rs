//! Signal interpretation: turns an indicator result into classification
//! lines and a weighted score contribution.
//!
//! Every contribution is clipped to `±sub_signals * max_score`, so no single
//! indicator can outweigh its share of the composite.

use serde::Serialize;

use crate::domain::{Bounce, CrossoverDirection, Momentum, Trend};
use crate::error::EngineError;
use crate::indicators::ichimoku::CloudLevel;
use crate::indicators::{BollingerResult, IchimokuResult, IndicatorKind, MacdResult, RsiResult};

/// What one indicator says, in words and in score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub kind: IndicatorKind,
    /// Human-readable classification lines, in print order.
    pub lines: Vec<String>,
    /// Weighted contribution to the composite sum (before scaling by 100).
    pub contribution: f64,
}

/// An indicator result that can be read as a signal.
pub trait Interpret {
    fn kind(&self) -> IndicatorKind;

    /// Classify and weight the result. `max_score` is the per-sub-signal
    /// weight of the active mode.
    fn interpret(&self, max_score: f64) -> Result<Interpretation, EngineError>;
}

fn clipped(kind: IndicatorKind, raw: f64, max_score: f64) -> f64 {
    let limit = kind.sub_signals() as f64 * max_score;
    raw.clamp(-limit, limit)
}

fn direction_word(direction: CrossoverDirection) -> &'static str {
    match direction {
        CrossoverDirection::Bullish => "UP",
        CrossoverDirection::Bearish => "DOWN",
    }
}

fn format_levels(levels: &[CloudLevel]) -> String {
    let prices: Vec<String> = levels.iter().map(|l| format!("{:.2}", l.price)).collect();
    format!("[{}]", prices.join(", "))
}

impl Interpret for MacdResult {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Macd
    }

    fn interpret(&self, max_score: f64) -> Result<Interpretation, EngineError> {
        let crossover = self.latest_crossover()?;
        let trend = match self.uptrend {
            Trend::Up => "UP",
            Trend::Down => "DOWN",
            Trend::Unclear => "UNCLEAR",
        };
        let position = match crossover.direction {
            CrossoverDirection::Bullish => "ABOVE",
            CrossoverDirection::Bearish => "BELOW",
        };
        let raw = f64::from(self.uptrend.value()) * max_score
            + f64::from(crossover.direction.value()) * max_score;

        Ok(Interpretation {
            kind: IndicatorKind::Macd,
            lines: vec![format!(
                "MACD indicates: overall trend is {trend}, MACD crosses {position} Signal line"
            )],
            contribution: clipped(IndicatorKind::Macd, raw, max_score),
        })
    }
}

impl Interpret for RsiResult {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi
    }

    fn interpret(&self, max_score: f64) -> Result<Interpretation, EngineError> {
        let leaning_up = self.latest_rsi >= 50.0;
        let line = match self.momentum {
            Momentum::Neutral if self.latest_rsi.is_nan() => {
                "RSI indicates: NO MOVEMENT in the window".to_string()
            }
            Momentum::Overbought => "RSI indicates: Bitcoin is OVERBOUGHT".to_string(),
            Momentum::Oversold => "RSI indicates: Bitcoin is OVERSOLD".to_string(),
            Momentum::Neutral if leaning_up => "RSI indicates: probably UPTREND".to_string(),
            Momentum::Neutral => "RSI indicates: probably DOWNTREND".to_string(),
        };
        let raw = f64::from(self.momentum.value()) * max_score * 1.5
            + if leaning_up { 0.5 * max_score } else { 0.0 };

        Ok(Interpretation {
            kind: IndicatorKind::Rsi,
            lines: vec![line],
            contribution: clipped(IndicatorKind::Rsi, raw, max_score),
        })
    }
}

impl Interpret for BollingerResult {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Bollinger
    }

    fn interpret(&self, max_score: f64) -> Result<Interpretation, EngineError> {
        let bouncing = match self.bounce {
            Bounce::Up => "UP",
            Bounce::Down => "DOWN",
            Bounce::NearAverage => "CLOSE TO MOVING AVERAGE",
        };
        let breakout_expected = self.squeeze.breakout_expected();
        let breakout = if breakout_expected { "EXPECTED" } else { "UNEXPECTED" };

        let bounce = f64::from(self.bounce.value());
        let raw = match (breakout_expected, self.bounce) {
            (true, Bounce::Up) => bounce * max_score - max_score,
            (true, Bounce::Down) => bounce * max_score + max_score,
            _ => -bounce * max_score,
        };

        Ok(Interpretation {
            kind: IndicatorKind::Bollinger,
            lines: vec![format!(
                "Bollinger Band indicates: probably bouncing {bouncing}, breakout is {breakout}"
            )],
            contribution: clipped(IndicatorKind::Bollinger, raw, max_score),
        })
    }
}

impl Interpret for IchimokuResult {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ichimoku
    }

    fn interpret(&self, max_score: f64) -> Result<Interpretation, EngineError> {
        let kijun = self.kijun_trend()?.direction;
        let chikou = self.chikou_trend()?.direction;

        let mut lines = Vec::with_capacity(4);
        if !self.support.is_empty() {
            lines.push(format!(
                "Predicted lower support price(s) {}",
                format_levels(&self.support)
            ));
        }
        if !self.resistance.is_empty() {
            lines.push(format!(
                "Predicted upper resistant price(s) {}",
                format_levels(&self.resistance)
            ));
        }
        lines.push(format!("Kijun line predicts price going {}", direction_word(kijun)));
        lines.push(format!("Chikou line predicts price going {}", direction_word(chikou)));

        let raw = f64::from(kijun.value()) * max_score
            + f64::from(chikou.value()) * max_score
            + 0.5 * max_score * self.support.len() as f64
            - 0.5 * max_score * self.resistance.len() as f64;

        Ok(Interpretation {
            kind: IndicatorKind::Ichimoku,
            lines,
            contribution: clipped(IndicatorKind::Ichimoku, raw, max_score),
        })
    }
}
