//! Score persistence.
//!
//! The score file holds a single `date,mode,current_score,past_score,quote`
//! row. Updates go through a sibling temp file and a rename, so readers
//! never observe a half-written row.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use indicated_core::{Assessment, ScoreRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("score file {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// The stored row, or `None` when no score has been written yet.
    pub fn load(&self) -> Result<Option<ScoreRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))?;
        reader
            .deserialize::<ScoreRecord>()
            .next()
            .transpose()
            .map_err(|e| self.csv_error(e))
    }

    /// The row that follows `prior` for `assessment`.
    ///
    /// `past_score` carries the previous `current_score` forward only when the
    /// previous row was written by the same mode.
    pub fn next_record(prior: Option<&ScoreRecord>, assessment: &Assessment) -> ScoreRecord {
        let past = prior
            .filter(|record| record.mode == assessment.mode)
            .map(|record| record.current_score);
        assessment.to_record(past)
    }

    /// Replace the stored row with `assessment`.
    pub fn update(&self, assessment: &Assessment) -> Result<ScoreRecord, StoreError> {
        let record = Self::next_record(self.load()?.as_ref(), assessment);
        self.save(&record)?;
        Ok(record)
    }

    /// Replace the stored row with `record`.
    pub fn save(&self, record: &ScoreRecord) -> Result<(), StoreError> {
        self.write(record)?;
        info!(
            path = %self.path.display(),
            mode = %record.mode,
            score = record.current_score,
            past = record.past_score,
            "score persisted"
        );
        Ok(())
    }

    fn write(&self, record: &ScoreRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(record).map_err(|e| self.csv_error(e))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, bytes).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}
