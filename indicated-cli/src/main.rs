//! Indicated CLI: composite Bitcoin indicator.
//!
//! Each selected mode runs in the order all, bollinger, macd, rsi, ichimoku.
//! Quotes come from the configured HTTP APIs unless `--source-a-csv` and
//! `--source-b-csv` or `--synthetic` are given.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use indicated_core::{IndicatorKind, Mode};
use indicated_runner::{
    run_modes, AppConfig, ModeOutcome, PriceSources, RunError, SourceChoice,
};

/// Environment variable consulted when the config has no Nomics key.
const NOMICS_KEY_VAR: &str = "NOMICS_API_KEY";

#[derive(Parser)]
#[command(
    name = "indicated",
    version,
    about = "Bitcoin all-in-one indicator: MACD, RSI, Bollinger Bands and Ichimoku Cloud"
)]
struct Cli {
    /// Use all indicators.
    #[arg(short = 'a', long)]
    all: bool,

    /// Use Bollinger Bands only.
    #[arg(long)]
    bollinger: bool,

    /// Use Ichimoku Cloud only.
    #[arg(long)]
    ichimoku: bool,

    /// Use MACD only.
    #[arg(long)]
    macd: bool,

    /// Use RSI only.
    #[arg(long)]
    rsi: bool,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read source A quotes from a `date,price` CSV file.
    #[arg(long, requires = "source_b_csv")]
    source_a_csv: Option<PathBuf>,

    /// Read source B quotes from a `date,price` CSV file.
    #[arg(long, requires = "source_a_csv")]
    source_b_csv: Option<PathBuf>,

    /// Run on seeded synthetic quotes (offline).
    #[arg(long, conflicts_with_all = ["source_a_csv", "source_b_csv"])]
    synthetic: bool,

    /// Score file to update (overrides the config).
    #[arg(long)]
    score_file: Option<PathBuf>,

    /// Directory for series.csv and report.json (overrides the config).
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

impl Cli {
    fn modes(&self) -> Vec<Mode> {
        [
            (self.all, Mode::All),
            (self.bollinger, Mode::Only(IndicatorKind::Bollinger)),
            (self.macd, Mode::Only(IndicatorKind::Macd)),
            (self.rsi, Mode::Only(IndicatorKind::Rsi)),
            (self.ichimoku, Mode::Only(IndicatorKind::Ichimoku)),
        ]
        .into_iter()
        .filter_map(|(selected, mode)| selected.then_some(mode))
        .collect()
    }

    fn source_choice(&self) -> SourceChoice {
        match (&self.source_a_csv, &self.source_b_csv) {
            (Some(a), Some(b)) => SourceChoice::Csv {
                a: a.clone(),
                b: b.clone(),
            },
            _ if self.synthetic => SourceChoice::Synthetic,
            _ => SourceChoice::Network,
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if config.sources.nomics_key.is_none() {
            config.sources.nomics_key = std::env::var(NOMICS_KEY_VAR).ok();
        }
        if let Some(path) = &self.score_file {
            config.output.score_file = path.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.output.export_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "indicated=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let modes = cli.modes();
    if modes.is_empty() {
        bail!("no indicator selected; pass -a/--all or one of --bollinger, --macd, --rsi, --ichimoku (see --help)");
    }

    let config = cli.load_config()?;
    let sources = PriceSources::from_config(&config.sources, &cli.source_choice())
        .context("failed to set up price sources")?;
    let today = chrono::Utc::now().date_naive();

    let outcome = match run_modes(&config, &sources, &modes, today) {
        Ok(outcome) => outcome,
        Err(RunError::Engine(inner)) if inner.is_input_error() => {
            return Err(anyhow::Error::new(inner).context("price quotes could not be merged"));
        }
        Err(e) => return Err(e.into()),
    };
    if outcome.loaded.is_synthetic() {
        println!("NOTE: synthetic quotes; this is not a market reading.");
    }
    for mode in &outcome.modes {
        print_outcome(mode);
    }
    info!(
        modes = outcome.modes.len(),
        score_file = %config.output.score_file.display(),
        "done"
    );
    Ok(())
}

fn print_outcome(outcome: &ModeOutcome) {
    let assessment = &outcome.evaluation.assessment;
    println!();
    println!("=== {} ({}) ===", assessment.mode, assessment.date);
    for line in assessment.lines() {
        println!("{line}");
    }
    println!(
        "Score: {:.1} (previous {:.1})",
        outcome.record.current_score, outcome.record.past_score
    );
    println!("{}", outcome.record.quote);
    if let Some(paths) = &outcome.artifacts {
        println!("Series saved to: {}", paths.series_csv.display());
        println!("Report saved to: {}", paths.report_json.display());
    }
}
