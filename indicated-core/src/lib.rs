//! Indicated Core: price series model, indicator library, signal
//! interpretation and score aggregation.
//!
//! This crate is pure computation:
//! - Domain types (price series, signal tags, crossover events)
//! - Rolling primitives, EMA and crossover detection
//! - MACD, RSI, Bollinger Bands and Ichimoku Cloud
//! - Interpretation of each result into classification lines and a weighted
//!   contribution
//! - Composite score, recommendation band and the persisted score row
//!
//! Fetching, persistence and rendering live in `indicated-runner`.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod indicators;
pub mod params;
pub mod scoring;

pub use domain::{PricePoint, PriceRow, PriceSeries, Source, SourceQuotes};
pub use engine::{evaluate, Evaluation, Readings};
pub use error::EngineError;
pub use indicator::{DerivedSeries, Indicator, NamedSeries};
pub use indicators::IndicatorKind;
pub use params::IndicatorParams;
pub use scoring::{Assessment, Interpretation, Mode, Recommendation, ScoreRecord};
