//! Indicator trait and the named-series container handed to chart sinks.
//!
//! Indicators are pure functions: price series in, result struct out. Each
//! result owns its derived series; nothing is written into shared state.

use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::indicators::IndicatorKind;

/// Trait for indicators.
///
/// `compute` must reject a series shorter than `required_history()` with
/// `EngineError::InsufficientHistory` before doing any work.
///
/// # Look-ahead contamination guard
/// No derived value at date t may depend on prices after t.
pub trait Indicator: Send + Sync {
    type Output: Send;

    fn kind(&self) -> IndicatorKind;

    /// Minimum number of observations for every summary signal to be defined.
    fn required_history(&self) -> usize;

    fn compute(&self, series: &PriceSeries) -> Result<Self::Output, EngineError>;

    /// Shared precondition check for `compute` implementations.
    fn ensure_history(&self, series: &PriceSeries) -> Result<(), EngineError> {
        let required = self.required_history();
        if series.len() < required {
            return Err(EngineError::InsufficientHistory {
                indicator: self.kind(),
                required,
                available: series.len(),
            });
        }
        Ok(())
    }
}

/// Results that can expose their derived series by name.
pub trait DerivedSeries {
    fn export_series(&self, out: &mut NamedSeries);
}

/// Ordered collection of named series, all aligned to the price series.
///
/// Undefined entries are `f64::NAN`; [`NamedSeries::get`] never reports them
/// as values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedSeries {
    series: Vec<(String, Vec<f64>)>,
}

impl NamedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named series, replacing any existing series of that name.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        match self.series.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = values,
            None => self.series.push((name, values)),
        }
    }

    /// Defined value of a series at an index. `None` for undefined,
    /// out-of-range, or unknown names.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        self.get_series(name)
            .and_then(|v| v.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
