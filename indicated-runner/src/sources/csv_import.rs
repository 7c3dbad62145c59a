//! CSV import provider.
//!
//! Reads a `date,price` file (header required, dates as `YYYY-MM-DD`).

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use indicated_core::PricePoint;

use super::{within, PriceProvider, QuoteOrigin, SourceError};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    price: f64,
}

pub struct CsvProvider {
    name: String,
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    fn csv_error(&self, source: csv::Error) -> SourceError {
        SourceError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Every row in the file, in file order.
    pub fn read_all(&self) -> Result<Vec<PricePoint>, SourceError> {
        let file = std::fs::File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| self.csv_error(e))?;
            points.push(PricePoint::new(row.date, row.price));
        }
        debug!(provider = %self.name, rows = points.len(), "read csv quotes");
        Ok(points)
    }
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> QuoteOrigin {
        QuoteOrigin::CsvImport
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>, SourceError> {
        Ok(within(self.read_all()?, start, end))
    }
}
