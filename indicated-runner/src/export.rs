//! Run artifacts: derived series as CSV and the assessment as JSON.
//!
//! `series.csv` has a `date` column plus one column per named series, with
//! an empty cell wherever a series is undefined. `report.json` carries the
//! assessment, the readings behind it and the dataset fingerprint.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use indicated_core::{Assessment, Evaluation, Mode, NamedSeries, PriceSeries, Readings};

use crate::sources::QuoteOrigin;

/// Bumped whenever the report layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// One quote source as recorded in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub origin: QuoteOrigin,
}

/// Everything written to `report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub schema_version: u32,
    pub mode: Mode,
    pub assessment: &'a Assessment,
    pub readings: &'a Readings,
    pub dataset_hash: &'a str,
    /// True when any source was synthetic.
    pub synthetic: bool,
    pub sources: &'a [SourceSummary],
}

impl<'a> Report<'a> {
    pub fn new(evaluation: &'a Evaluation, sources: &'a [SourceSummary]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            mode: evaluation.assessment.mode,
            assessment: &evaluation.assessment,
            readings: &evaluation.readings,
            dataset_hash: &evaluation.dataset_hash,
            synthetic: sources.iter().any(|s| s.origin == QuoteOrigin::Synthetic),
            sources,
        }
    }
}

/// Serialize a report to pretty JSON.
pub fn export_report_json(report: &Report<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report to JSON")
}

/// Prices and derived series as CSV, one row per date.
pub fn export_series_csv(series: &PriceSeries, named: &NamedSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date".to_string()];
    header.extend(named.names().map(str::to_string));
    wtr.write_record(&header)?;

    for (i, date) in series.dates().iter().enumerate() {
        let mut row = vec![date.to_string()];
        row.extend(named.iter().map(|(_, values)| match values.get(i) {
            Some(v) if !v.is_nan() => v.to_string(),
            _ => String::new(),
        }));
        wtr.write_record(&row)?;
    }

    let bytes = wtr.into_inner().context("failed to flush series CSV")?;
    String::from_utf8(bytes).context("series CSV is not UTF-8")
}

/// Paths written by [`save_artifacts`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub series_csv: PathBuf,
    pub report_json: PathBuf,
}

/// Write `series.csv` and `report.json` under `<dir>/<mode>/`.
pub fn save_artifacts(
    dir: &Path,
    series: &PriceSeries,
    evaluation: &Evaluation,
    sources: &[SourceSummary],
) -> Result<ArtifactPaths> {
    let out = dir.join(evaluation.assessment.mode.key());
    std::fs::create_dir_all(&out)
        .with_context(|| format!("failed to create {}", out.display()))?;

    let mut named = NamedSeries::new();
    for source in indicated_core::Source::BOTH {
        named.insert(
            format!("price_{}", series.source_name(source)),
            series.column(source).to_vec(),
        );
    }
    for (name, values) in evaluation.named_series().iter() {
        named.insert(name, values.to_vec());
    }

    let paths = ArtifactPaths {
        series_csv: out.join("series.csv"),
        report_json: out.join("report.json"),
    };
    std::fs::write(&paths.series_csv, export_series_csv(series, &named)?)
        .with_context(|| format!("failed to write {}", paths.series_csv.display()))?;

    let report = Report::new(evaluation, sources);
    std::fs::write(&paths.report_json, export_report_json(&report)?)
        .with_context(|| format!("failed to write {}", paths.report_json.display()))?;

    Ok(paths)
}
