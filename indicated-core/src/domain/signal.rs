//! Categorical signal tags produced by the indicators.
//!
//! Each tag maps to a signed value in {-1, 0, +1}; the interpreter multiplies
//! these values by the per-mode weight.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Overall trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Unclear,
}

impl Trend {
    /// Trend from the sign of a value. Zero and NaN are unclear.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Trend::Up
        } else if value < 0.0 {
            Trend::Down
        } else {
            Trend::Unclear
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Trend::Up => 1,
            Trend::Down => -1,
            Trend::Unclear => 0,
        }
    }
}

/// Overbought / oversold condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Overbought,
    Oversold,
    Neutral,
}

impl Momentum {
    pub fn value(self) -> i8 {
        match self {
            Momentum::Overbought => 1,
            Momentum::Oversold => -1,
            Momentum::Neutral => 0,
        }
    }
}

/// Whether price is hugging one of the volatility bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bounce {
    /// Near the lower band.
    Up,
    /// Near the upper band.
    Down,
    NearAverage,
}

impl Bounce {
    pub fn value(self) -> i8 {
        match self {
            Bounce::Up => 1,
            Bounce::Down => -1,
            Bounce::NearAverage => 0,
        }
    }
}

/// Band-width trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Squeeze {
    /// Bands narrowing; a breakout is expected.
    Contracting,
    Widening,
    Neutral,
}

impl Squeeze {
    pub fn breakout_expected(self) -> bool {
        self == Squeeze::Contracting
    }
}

/// Direction of a line crossing another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverDirection {
    /// The moving line crossed from at-or-below to above.
    Bullish,
    /// The moving line crossed from at-or-above to below.
    Bearish,
}

impl CrossoverDirection {
    pub fn from_flag(flag: i8) -> Option<Self> {
        match flag.signum() {
            1 => Some(CrossoverDirection::Bullish),
            -1 => Some(CrossoverDirection::Bearish),
            _ => None,
        }
    }

    pub fn value(self) -> i8 {
        match self {
            CrossoverDirection::Bullish => 1,
            CrossoverDirection::Bearish => -1,
        }
    }
}

/// A crossover observed at a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub date: NaiveDate,
    /// Position of `date` in the price series.
    pub index: usize,
    pub direction: CrossoverDirection,
}
