//! End-to-end runs over local quote files and synthetic quotes.
//!
//! The CSV fixture is the peak path: 40 days up from 100, then 30 days down
//! from 138, with source B one dollar above source A.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use indicated_core::{IndicatorKind, Mode, Recommendation};
use indicated_runner::{
    run_modes, AppConfig, PriceSources, RunError, ScoreStore, SourceChoice,
};

fn day(i: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(i)
}

fn peak() -> Vec<f64> {
    let mut a: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    a.extend((0..30).map(|i| 138.0 - i as f64));
    a
}

fn write_quotes(path: &Path, prices: &[f64], offset: f64) {
    let mut body = String::from("date,price\n");
    for (i, p) in prices.iter().enumerate() {
        body.push_str(&format!("{},{}\n", day(i as i64), p + offset));
    }
    std::fs::write(path, body).unwrap();
}

struct Fixture {
    dir: tempfile::TempDir,
    config: AppConfig,
    sources: PriceSources,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("coindesk.csv");
    let b_path = dir.path().join("nomics.csv");

    // Source A carries one extra day past source B's last quote.
    let mut a = peak();
    a.push(110.0);
    write_quotes(&a_path, &a, 0.0);
    write_quotes(&b_path, &peak(), 1.0);

    let mut config = AppConfig::default();
    config.output.score_file = dir.path().join("data/score.csv");
    config.output.export_dir = Some(dir.path().join("export"));

    let sources = PriceSources::from_config(
        &config.sources,
        &SourceChoice::Csv {
            a: a_path,
            b: b_path,
        },
    )
    .unwrap();

    Fixture {
        dir,
        config,
        sources,
    }
}

#[test]
fn csv_run_scores_and_persists() {
    let fx = fixture();
    let outcome = run_modes(&fx.config, &fx.sources, &[Mode::All], day(365)).unwrap();

    assert_eq!(outcome.loaded.series.len(), 70);
    assert_eq!(outcome.loaded.series.latest_date(), Some(day(69)));
    assert!(!outcome.loaded.is_synthetic());

    let mode = &outcome.modes[0];
    assert_eq!(mode.evaluation.assessment.score, -61.1);
    assert_eq!(mode.evaluation.assessment.recommendation, Recommendation::MaybeBuy);
    assert_eq!(mode.record.past_score, -61.1);

    let stored = ScoreStore::new(&fx.config.output.score_file).load().unwrap().unwrap();
    assert_eq!(stored, mode.record);
    assert_eq!(stored.date, day(69));

    let artifacts = mode.artifacts.as_ref().unwrap();
    assert!(artifacts.series_csv.exists());
    assert!(artifacts.report_json.ends_with("all/report.json"));
}

#[test]
fn repeated_mode_carries_past_score() {
    let fx = fixture();
    run_modes(&fx.config, &fx.sources, &[Mode::All], day(365)).unwrap();
    let outcome = run_modes(
        &fx.config,
        &fx.sources,
        &[Mode::All, Mode::Only(IndicatorKind::Macd)],
        day(365),
    )
    .unwrap();

    let records: Vec<_> = outcome.modes.iter().map(|m| &m.record).collect();
    assert_eq!(records[0].past_score, -61.1);
    assert_eq!(records[1].current_score, -100.0);
    assert_eq!(records[1].past_score, -100.0);

    let stored = ScoreStore::new(&fx.config.output.score_file).load().unwrap().unwrap();
    assert_eq!(stored.mode, Mode::Only(IndicatorKind::Macd));
}

#[test]
fn short_history_fails_without_touching_score_file() {
    let fx = fixture();
    let mut config = fx.config.clone();
    config.sources.start = day(30);

    let err = run_modes(&config, &fx.sources, &[Mode::All], day(365)).unwrap_err();
    assert!(matches!(err, RunError::Engine(_)));
    assert!(err.to_string().contains("insufficient history"));
    assert!(!config.output.score_file.exists());
}

#[test]
fn config_file_drives_run() {
    let fx = fixture();
    let score_file: PathBuf = fx.dir.path().join("from_file.csv");
    let config_path = fx.dir.path().join("indicated.toml");
    std::fs::write(
        &config_path,
        format!(
            "[sources]\nstart = \"2020-01-01\"\n\n[output]\nscore_file = \"{}\"\n\n[indicators.rsi]\nperiod = 14\n",
            score_file.display()
        ),
    )
    .unwrap();

    let config = AppConfig::from_file(&config_path).unwrap();
    assert_eq!(config.output.export_dir, None);
    let outcome = run_modes(
        &config,
        &fx.sources,
        &[Mode::Only(IndicatorKind::Rsi)],
        day(365),
    )
    .unwrap();
    assert_eq!(outcome.modes[0].evaluation.assessment.score, -75.0);
    assert!(outcome.modes[0].artifacts.is_none());
    assert!(score_file.exists());
}

#[test]
fn synthetic_run_is_tagged() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.output.score_file = dir.path().join("score.csv");
    config.output.export_dir = Some(dir.path().join("export"));

    let sources = PriceSources::from_config(&config.sources, &SourceChoice::Synthetic).unwrap();
    let outcome = run_modes(
        &config,
        &sources,
        &[Mode::Only(IndicatorKind::Rsi)],
        day(199),
    )
    .unwrap();

    assert!(outcome.loaded.is_synthetic());
    assert_eq!(outcome.loaded.series.len(), 200);
    let score = outcome.modes[0].evaluation.assessment.score;
    assert!((-100.0..=100.0).contains(&score));

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("export/rsi/report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["synthetic"], true);
    assert_eq!(report["sources"][0]["origin"], "synthetic");
}
