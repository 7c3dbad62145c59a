//! Indicated Runner: the I/O boundary around `indicated-core`.
//!
//! This crate builds on `indicated-core` to provide:
//! - Price providers (HTTP JSON APIs with retry, CSV import, synthetic walks)
//! - TOML configuration
//! - Score persistence (single-row CSV, atomic replace)
//! - Series and report export
//! - Run orchestration across invocation modes

pub mod config;
pub mod export;
pub mod runner;
pub mod sources;
pub mod store;

pub use config::{AppConfig, ConfigError, OutputConfig, SourcesConfig};
pub use export::{save_artifacts, ArtifactPaths, Report, SourceSummary};
pub use runner::{
    load_series, run_loaded, run_modes, LoadedSeries, ModeOutcome, PriceSources, RunError,
    RunOutcome, SourceChoice,
};
pub use sources::{PriceProvider, QuoteOrigin, SourceError};
pub use store::{ScoreStore, StoreError};
