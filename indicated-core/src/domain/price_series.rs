//! Price series: two independent daily quotes per date, inner-joined.
//!
//! The series is stored column-wise: one date axis plus one price column per
//! source, all of the same length. Dates are unique and strictly increasing.
//! Missing dates are simply absent; nothing is interpolated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EngineError;

/// Which of the two price sources a column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    A,
    B,
}

impl Source {
    pub const BOTH: [Source; 2] = [Source::A, Source::B];

    pub fn other(self) -> Source {
        match self {
            Source::A => Source::B,
            Source::B => Source::A,
        }
    }
}

/// A single dated quote from one source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// The quotes delivered by one source, before alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuotes {
    pub name: String,
    pub points: Vec<PricePoint>,
}

impl SourceQuotes {
    pub fn new(name: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Validate quotes and collapse them onto a date-keyed map.
    ///
    /// A date quoted twice keeps the last quote.
    fn by_date(&self) -> Result<BTreeMap<NaiveDate, f64>, EngineError> {
        if self.points.is_empty() {
            return Err(EngineError::EmptySource {
                name: self.name.clone(),
            });
        }
        let mut map = BTreeMap::new();
        for point in &self.points {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(EngineError::InvalidQuote {
                    name: self.name.clone(),
                    date: point.date,
                    price: point.price,
                });
            }
            map.insert(point.date, point.price);
        }
        Ok(map)
    }
}

/// One merged observation: both quotes for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub a: f64,
    pub b: f64,
}

/// Date-aligned prices from two sources.
///
/// Only constructible through [`PriceSeries::merge`] or
/// [`PriceSeries::from_rows`], both of which enforce the ordering invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    names: [String; 2],
    dates: Vec<NaiveDate>,
    a: Vec<f64>,
    b: Vec<f64>,
}

impl PriceSeries {
    /// Inner-join two sources on date. Only dates quoted by both survive.
    pub fn merge(source_a: &SourceQuotes, source_b: &SourceQuotes) -> Result<Self, EngineError> {
        let a_by_date = source_a.by_date()?;
        let b_by_date = source_b.by_date()?;

        let mut dates = Vec::new();
        let mut a = Vec::new();
        let mut b = Vec::new();
        for (date, price_a) in &a_by_date {
            if let Some(price_b) = b_by_date.get(date) {
                dates.push(*date);
                a.push(*price_a);
                b.push(*price_b);
            }
        }

        if dates.is_empty() {
            return Err(EngineError::MisalignedSeries {
                source_a: source_a.name.clone(),
                source_b: source_b.name.clone(),
            });
        }

        Ok(Self {
            names: [source_a.name.clone(), source_b.name.clone()],
            dates,
            a,
            b,
        })
    }

    /// Build a series from already-aligned rows.
    ///
    /// Rows must be in strictly increasing date order.
    pub fn from_rows(
        name_a: impl Into<String>,
        name_b: impl Into<String>,
        rows: &[PriceRow],
    ) -> Result<Self, EngineError> {
        let names = [name_a.into(), name_b.into()];
        if rows.is_empty() {
            return Err(EngineError::InvalidSeries("no rows".into()));
        }
        for pair in rows.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(EngineError::InvalidSeries(format!(
                    "dates not strictly increasing at {}",
                    pair[1].date
                )));
            }
        }
        for row in rows {
            for (name, price) in [(&names[0], row.a), (&names[1], row.b)] {
                if !price.is_finite() || price <= 0.0 {
                    return Err(EngineError::InvalidQuote {
                        name: name.clone(),
                        date: row.date,
                        price,
                    });
                }
            }
        }

        Ok(Self {
            names,
            dates: rows.iter().map(|r| r.date).collect(),
            a: rows.iter().map(|r| r.a).collect(),
            b: rows.iter().map(|r| r.b).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, source: Source) -> &[f64] {
        match source {
            Source::A => &self.a,
            Source::B => &self.b,
        }
    }

    pub fn source_name(&self, source: Source) -> &str {
        match source {
            Source::A => &self.names[0],
            Source::B => &self.names[1],
        }
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn latest(&self, source: Source) -> Option<f64> {
        self.column(source).last().copied()
    }

    /// Per-date midpoint of the two quotes.
    pub fn midpoint(&self) -> Vec<f64> {
        self.a
            .iter()
            .zip(&self.b)
            .map(|(a, b)| (a + b) / 2.0)
            .collect()
    }

    /// Whole-series mean of one source.
    pub fn mean(&self, source: Source) -> f64 {
        let column = self.column(source);
        column.iter().sum::<f64>() / column.len() as f64
    }

    pub fn rows(&self) -> impl Iterator<Item = PriceRow> + '_ {
        self.dates
            .iter()
            .zip(self.a.iter().zip(&self.b))
            .map(|(date, (a, b))| PriceRow {
                date: *date,
                a: *a,
                b: *b,
            })
    }

    /// BLAKE3 digest over names, dates and prices.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
        }
        for row in self.rows() {
            hasher.update(row.date.to_string().as_bytes());
            hasher.update(&row.a.to_le_bytes());
            hasher.update(&row.b.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn quotes(name: &str, points: &[(u32, f64)]) -> SourceQuotes {
        SourceQuotes::new(
            name,
            points
                .iter()
                .map(|&(d, p)| PricePoint::new(day(d), p))
                .collect(),
        )
    }

    #[test]
    fn merge_keeps_only_shared_dates() {
        let a = quotes("coindesk", &[(1, 100.0), (2, 101.0), (3, 102.0), (5, 104.0)]);
        let b = quotes("nomics", &[(2, 201.0), (3, 202.0), (4, 203.0), (5, 204.0)]);

        let series = PriceSeries::merge(&a, &b).unwrap();

        assert_eq!(series.dates(), &[day(2), day(3), day(5)]);
        assert_eq!(series.column(Source::A), &[101.0, 102.0, 104.0]);
        assert_eq!(series.column(Source::B), &[201.0, 202.0, 204.0]);
        assert_eq!(series.source_name(Source::A), "coindesk");
        assert_eq!(series.source_name(Source::B), "nomics");
    }

    #[test]
    fn merge_sorts_and_keeps_last_duplicate() {
        let a = quotes("a", &[(3, 103.0), (1, 101.0), (3, 113.0)]);
        let b = quotes("b", &[(1, 1.0), (3, 3.0)]);

        let series = PriceSeries::merge(&a, &b).unwrap();

        assert_eq!(series.dates(), &[day(1), day(3)]);
        assert_eq!(series.column(Source::A), &[101.0, 113.0]);
    }

    #[test]
    fn merge_without_overlap_is_misaligned() {
        let a = quotes("a", &[(1, 1.0), (2, 2.0)]);
        let b = quotes("b", &[(3, 3.0)]);
        let err = PriceSeries::merge(&a, &b).unwrap_err();
        assert!(matches!(err, EngineError::MisalignedSeries { .. }));
    }

    #[test]
    fn merge_rejects_empty_and_invalid_sources() {
        let empty = quotes("a", &[]);
        let b = quotes("b", &[(1, 1.0)]);
        assert!(matches!(
            PriceSeries::merge(&empty, &b),
            Err(EngineError::EmptySource { .. })
        ));

        let bad = quotes("a", &[(1, f64::NAN)]);
        assert!(matches!(
            PriceSeries::merge(&bad, &b),
            Err(EngineError::InvalidQuote { .. })
        ));

        let negative = quotes("a", &[(1, -5.0)]);
        assert!(matches!(
            PriceSeries::merge(&negative, &b),
            Err(EngineError::InvalidQuote { .. })
        ));
    }

    #[test]
    fn from_rows_requires_increasing_dates() {
        let rows = [
            PriceRow { date: day(2), a: 1.0, b: 1.0 },
            PriceRow { date: day(2), a: 1.0, b: 1.0 },
        ];
        assert!(matches!(
            PriceSeries::from_rows("a", "b", &rows),
            Err(EngineError::InvalidSeries(_))
        ));
    }

    #[test]
    fn midpoint_and_mean() {
        let rows = [
            PriceRow { date: day(1), a: 10.0, b: 20.0 },
            PriceRow { date: day(2), a: 30.0, b: 40.0 },
        ];
        let series = PriceSeries::from_rows("a", "b", &rows).unwrap();
        assert_eq!(series.midpoint(), vec![15.0, 35.0]);
        assert_eq!(series.mean(Source::A), 20.0);
        assert_eq!(series.mean(Source::B), 30.0);
        assert_eq!(series.latest_date(), Some(day(2)));
        assert_eq!(series.latest(Source::B), Some(40.0));
    }

    #[test]
    fn dataset_hash_is_deterministic_and_content_sensitive() {
        let rows = [
            PriceRow { date: day(1), a: 10.0, b: 20.0 },
            PriceRow { date: day(2), a: 30.0, b: 40.0 },
        ];
        let s1 = PriceSeries::from_rows("a", "b", &rows).unwrap();
        let s2 = PriceSeries::from_rows("a", "b", &rows).unwrap();
        assert_eq!(s1.dataset_hash(), s2.dataset_hash());
        assert_eq!(s1.dataset_hash().len(), 64);

        let mut changed = rows;
        changed[1].b = 41.0;
        let s3 = PriceSeries::from_rows("a", "b", &changed).unwrap();
        assert_ne!(s1.dataset_hash(), s3.dataset_hash());
    }
}
