//! Score aggregation: invocation modes, the composite score, and the
//! recommendation band it falls in.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::indicators::IndicatorKind;
use crate::scoring::interpret::Interpretation;

/// Which indicators take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Mode {
    All,
    Only(IndicatorKind),
}

impl Mode {
    /// Active indicators, in aggregation order.
    pub fn active(self) -> Vec<IndicatorKind> {
        match self {
            Mode::All => IndicatorKind::ALL.to_vec(),
            Mode::Only(kind) => vec![kind],
        }
    }

    pub fn includes(self, kind: IndicatorKind) -> bool {
        match self {
            Mode::All => true,
            Mode::Only(only) => only == kind,
        }
    }

    /// Weight of a single sub-signal: 1 / (sub-signals of all active indicators).
    pub fn max_score(self) -> f64 {
        let total: usize = self.active().iter().map(|k| k.sub_signals()).sum();
        1.0 / total as f64
    }

    pub fn key(self) -> &'static str {
        match self {
            Mode::All => "all",
            Mode::Only(kind) => kind.key(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Mode::All);
        }
        IndicatorKind::ALL
            .into_iter()
            .find(|k| s.eq_ignore_ascii_case(k.key()))
            .map(Mode::Only)
            .ok_or_else(|| EngineError::InvalidParams(format!("unknown mode '{s}'")))
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.key().to_string()
    }
}

impl TryFrom<String> for Mode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Action band of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    DefinitelyBuy,
    MaybeBuy,
    Hold,
    MaybeSell,
    DefinitelySell,
}

impl Recommendation {
    /// Band lookup on half-open intervals.
    ///
    /// [-100, -70) buy, [-70, -40) maybe buy, [-40, 40) hold, [40, 70) maybe
    /// sell. Everything else falls through to sell, including scores below
    /// -100 and NaN.
    pub fn from_score(score: f64) -> Self {
        if (-100.0..-70.0).contains(&score) {
            Recommendation::DefinitelyBuy
        } else if (-70.0..-40.0).contains(&score) {
            Recommendation::MaybeBuy
        } else if (-40.0..40.0).contains(&score) {
            Recommendation::Hold
        } else if (40.0..70.0).contains(&score) {
            Recommendation::MaybeSell
        } else {
            Recommendation::DefinitelySell
        }
    }

    /// Sentence persisted alongside the score.
    pub fn quote(self) -> &'static str {
        match self {
            Recommendation::DefinitelyBuy => "You DEFINITELY should BUY",
            Recommendation::MaybeBuy => "You MAYBE should BUY",
            Recommendation::Hold => "You DEFINITELY should HOLD",
            Recommendation::MaybeSell => "You MAYBE should SELL",
            Recommendation::DefinitelySell => "You DEFINITELY should SELL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::DefinitelyBuy => "definitely buy",
            Recommendation::MaybeBuy => "maybe buy",
            Recommendation::Hold => "hold",
            Recommendation::MaybeSell => "maybe sell",
            Recommendation::DefinitelySell => "definitely sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round half away from zero to one decimal.
pub fn round_score(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Composite score: the contribution sum scaled to [-100, 100], one decimal.
pub fn composite_score(interpretations: &[Interpretation]) -> f64 {
    let sum: f64 = interpretations.iter().map(|i| i.contribution).sum();
    round_score(sum * 100.0)
}

/// Final outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Latest date of the price series.
    pub date: NaiveDate,
    pub mode: Mode,
    pub score: f64,
    pub recommendation: Recommendation,
    pub interpretations: Vec<Interpretation>,
}

impl Assessment {
    pub fn new(date: NaiveDate, mode: Mode, interpretations: Vec<Interpretation>) -> Self {
        let score = composite_score(&interpretations);
        Self {
            date,
            mode,
            score,
            recommendation: Recommendation::from_score(score),
            interpretations,
        }
    }

    /// All classification lines, in indicator order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.interpretations
            .iter()
            .flat_map(|i| i.lines.iter().map(String::as_str))
    }

    /// Row for the score store. With no prior score the current one doubles
    /// as the past score.
    pub fn to_record(&self, prior: Option<f64>) -> ScoreRecord {
        ScoreRecord {
            date: self.date,
            mode: self.mode,
            current_score: self.score,
            past_score: prior.unwrap_or(self.score),
            quote: self.recommendation.quote().to_string(),
        }
    }
}

/// The persisted score row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub date: NaiveDate,
    pub mode: Mode,
    pub current_score: f64,
    pub past_score: f64,
    pub quote: String,
}
