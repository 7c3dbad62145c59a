//! Engine error types.
//!
//! Every variant names the indicator (or source) and the precondition that
//! failed, so the CLI can print it verbatim. A zero-loss RSI window is not
//! an error: it saturates to 100 inside the RSI computation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::indicators::IndicatorKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{indicator}: insufficient history (need {required} observations, have {available})")]
    InsufficientHistory {
        indicator: IndicatorKind,
        required: usize,
        available: usize,
    },

    #[error("{indicator}: no {line} crossover found anywhere in the series")]
    NoCrossoverFound {
        indicator: IndicatorKind,
        line: &'static str,
    },

    #[error("sources '{source_a}' and '{source_b}' share no dates")]
    MisalignedSeries { source_a: String, source_b: String },

    #[error("source '{name}' returned no quotes")]
    EmptySource { name: String },

    #[error("source '{name}' has an invalid quote {price} on {date}")]
    InvalidQuote {
        name: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    #[error("invalid indicator parameters: {0}")]
    InvalidParams(String),
}

impl EngineError {
    /// True for errors raised while building the price series, before any
    /// indicator has run.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EngineError::MisalignedSeries { .. }
                | EngineError::EmptySource { .. }
                | EngineError::InvalidQuote { .. }
                | EngineError::InvalidSeries(_)
        )
    }
}
