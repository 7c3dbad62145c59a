//! Run orchestration: fetch quotes, merge, evaluate each mode, persist.
//!
//! Source B is fetched first; source A is then requested up to B's latest
//! date so both columns end on the same day. Every mode is evaluated and
//! exported before the score row is written, so a failing mode or export
//! leaves the score file untouched.

use std::path::PathBuf;

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use indicated_core::{evaluate, EngineError, Evaluation, Mode, PriceSeries, ScoreRecord};

use crate::config::{AppConfig, ConfigError, SourcesConfig};
use crate::export::{save_artifacts, ArtifactPaths, SourceSummary};
use crate::sources::{
    CoindeskProvider, CsvProvider, NomicsProvider, PriceProvider, RetryingClient, SourceError,
    SyntheticProvider,
};
use crate::store::{ScoreStore, StoreError};

/// Column names of the two quote sources.
pub const SOURCE_A: &str = "coindesk";
pub const SOURCE_B: &str = "nomics";

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("{0}")]
    Engine(#[from] EngineError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("export error: {0:#}")]
    Export(#[from] anyhow::Error),
}

/// Where quotes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceChoice {
    /// The two configured HTTP APIs.
    Network,
    /// Local `date,price` files for source A and source B.
    Csv { a: PathBuf, b: PathBuf },
    /// Seeded random walks, for offline runs.
    Synthetic,
}

/// The pair of providers feeding one run.
pub struct PriceSources {
    pub a: Box<dyn PriceProvider>,
    pub b: Box<dyn PriceProvider>,
}

impl PriceSources {
    pub fn new(a: Box<dyn PriceProvider>, b: Box<dyn PriceProvider>) -> Self {
        Self { a, b }
    }

    pub fn from_config(config: &SourcesConfig, choice: &SourceChoice) -> Result<Self, SourceError> {
        let sources = match choice {
            SourceChoice::Network => {
                let http = RetryingClient::new(
                    config.timeout(),
                    config.max_retries,
                    config.retry_base_delay(),
                )?;
                Self::new(
                    Box::new(CoindeskProvider::new(SOURCE_A, &config.coindesk_url, http.clone())),
                    Box::new(NomicsProvider::new(
                        SOURCE_B,
                        &config.nomics_url,
                        config.nomics_key.clone(),
                        &config.currency,
                        http,
                    )),
                )
            }
            SourceChoice::Csv { a, b } => Self::new(
                Box::new(CsvProvider::new(SOURCE_A, a)),
                Box::new(CsvProvider::new(SOURCE_B, b)),
            ),
            SourceChoice::Synthetic => {
                let market = config.currency.to_lowercase();
                Self::new(
                    Box::new(SyntheticProvider::new(SOURCE_A, &market)),
                    Box::new(SyntheticProvider::new(SOURCE_B, &market)),
                )
            }
        };
        Ok(sources)
    }

    pub fn summaries(&self) -> Vec<SourceSummary> {
        [&self.a, &self.b]
            .into_iter()
            .map(|p| SourceSummary {
                name: p.name().to_string(),
                origin: p.origin(),
            })
            .collect()
    }
}

/// The merged series plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    pub sources: Vec<SourceSummary>,
    pub dataset_hash: String,
}

impl LoadedSeries {
    pub fn is_synthetic(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.origin == crate::sources::QuoteOrigin::Synthetic)
    }
}

/// Fetch both sources over `[start, end]` and inner-join them on date.
pub fn load_series(
    sources: &PriceSources,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<LoadedSeries, RunError> {
    let quotes_b = sources.b.fetch_quotes(start, end)?;
    let b_end = quotes_b
        .points
        .iter()
        .map(|p| p.date)
        .max()
        .unwrap_or(end);
    info!(source = sources.b.name(), quotes = quotes_b.points.len(), %b_end, "fetched");

    let quotes_a = sources.a.fetch_quotes(start, b_end)?;
    info!(source = sources.a.name(), quotes = quotes_a.points.len(), "fetched");

    let series = PriceSeries::merge(&quotes_a, &quotes_b)?;
    let dataset_hash = series.dataset_hash();
    info!(rows = series.len(), hash = %&dataset_hash[..12], "merged price series");

    Ok(LoadedSeries {
        series,
        sources: sources.summaries(),
        dataset_hash,
    })
}

/// Result of one mode within a run.
#[derive(Debug, Clone)]
pub struct ModeOutcome {
    pub evaluation: Evaluation,
    pub record: ScoreRecord,
    pub artifacts: Option<ArtifactPaths>,
}

/// Result of a whole invocation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub loaded: LoadedSeries,
    pub modes: Vec<ModeOutcome>,
}

/// Evaluate `modes` on an already-loaded series, export each one in order,
/// then persist the last mode's score row.
///
/// Each mode's record chains from the one before it, as if every mode had
/// been written in turn; only the final row reaches the single-row store.
pub fn run_loaded(
    config: &AppConfig,
    loaded: LoadedSeries,
    modes: &[Mode],
) -> Result<RunOutcome, RunError> {
    let evaluations: Vec<Result<Evaluation, EngineError>> = modes
        .par_iter()
        .map(|&mode| evaluate(&loaded.series, mode, &config.indicators))
        .collect();
    let evaluations = evaluations.into_iter().collect::<Result<Vec<_>, _>>()?;

    let store = ScoreStore::new(&config.output.score_file);
    let mut prior = store.load()?;
    let mut outcomes: Vec<ModeOutcome> = Vec::with_capacity(evaluations.len());
    for evaluation in evaluations {
        let record = ScoreStore::next_record(prior.as_ref(), &evaluation.assessment);
        prior = Some(record.clone());
        let artifacts = match &config.output.export_dir {
            Some(dir) => Some(save_artifacts(dir, &loaded.series, &evaluation, &loaded.sources)?),
            None => None,
        };
        info!(
            mode = %evaluation.assessment.mode,
            score = evaluation.assessment.score,
            recommendation = %evaluation.assessment.recommendation,
            "mode complete"
        );
        outcomes.push(ModeOutcome {
            evaluation,
            record,
            artifacts,
        });
    }

    if let Some(last) = outcomes.last() {
        store.save(&last.record)?;
    }

    Ok(RunOutcome {
        loaded,
        modes: outcomes,
    })
}

/// Fetch, merge, evaluate and persist. `end` is the last date requested.
pub fn run_modes(
    config: &AppConfig,
    sources: &PriceSources,
    modes: &[Mode],
    end: NaiveDate,
) -> Result<RunOutcome, RunError> {
    let loaded = load_series(sources, config.sources.start, end)?;
    if loaded.is_synthetic() {
        tracing::warn!("running on synthetic quotes; results are not market data");
    }
    run_loaded(config, loaded, modes)
}
