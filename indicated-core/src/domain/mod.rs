//! Domain types for the indicator engine

pub mod price_series;
pub mod signal;

pub use price_series::{PricePoint, PriceRow, PriceSeries, Source, SourceQuotes};
pub use signal::{Bounce, CrossoverDirection, CrossoverEvent, Momentum, Squeeze, Trend};
