//! Look-ahead contamination tests for the indicator library.
//!
//! No derived value at date t may depend on prices after t.
//!
//! Method: compute on a truncated series (days 0..100) and the full series
//! (days 0..200). Every derived series must agree on days 0..100.

use chrono::NaiveDate;
use indicated_core::indicator::{DerivedSeries, Indicator, NamedSeries};
use indicated_core::indicators::ema::ema_of_series;
use indicated_core::indicators::rolling::{
    diff, rolling_max, rolling_mean, rolling_min, rolling_std, shift,
};
use indicated_core::indicators::{Bollinger, Ichimoku, Macd, Rsi};
use indicated_core::params::{BollingerParams, IchimokuParams, MacdParams, RsiParams};
use indicated_core::{PriceRow, PriceSeries, Source};

/// Deterministic pseudo-random walk. Source B tracks A a little higher, so
/// the Ichimoku high/low assignment is the same for any prefix.
fn make_test_series(n: usize) -> PriceSeries {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut price = 9000.0;
    let rows: Vec<PriceRow> = (0..n)
        .map(|i| {
            let seed = (i as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let change = ((seed >> 33) % 400) as f64 - 200.0;
            price = (price + change).max(1000.0);
            PriceRow {
                date: base_date + chrono::Duration::days(i as i64),
                a: price,
                b: price * 1.002,
            }
        })
        .collect();
    PriceSeries::from_rows("coindesk", "nomics", &rows).unwrap()
}

fn truncate(series: &PriceSeries, len: usize) -> PriceSeries {
    let rows: Vec<PriceRow> = series.rows().take(len).collect();
    PriceSeries::from_rows("coindesk", "nomics", &rows).unwrap()
}

fn assert_prefix_equal(name: &str, truncated: &[f64], full: &[f64]) {
    assert_eq!(truncated.len(), 100, "{name}: truncated length mismatch");
    assert_eq!(full.len(), 200, "{name}: full length mismatch");
    for (t, (&a, &b)) in truncated.iter().zip(full).enumerate() {
        let same = (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-9;
        assert!(same, "{name}: look-ahead at day {t}: truncated={a}, full={b}");
    }
}

fn assert_no_lookahead<I>(indicator: &I)
where
    I: Indicator,
    I::Output: DerivedSeries,
{
    let full = make_test_series(200);
    let truncated = truncate(&full, 100);

    let mut full_out = NamedSeries::new();
    indicator.compute(&full).unwrap().export_series(&mut full_out);
    let mut truncated_out = NamedSeries::new();
    indicator
        .compute(&truncated)
        .unwrap()
        .export_series(&mut truncated_out);

    assert_eq!(full_out.len(), truncated_out.len());
    for (name, values) in truncated_out.iter() {
        let full_values = full_out.get_series(name).unwrap();
        assert_prefix_equal(name, values, full_values);
    }
}

// ── Primitives ──

#[test]
fn rolling_primitives_no_lookahead() {
    let full = make_test_series(200);
    let prices = full.column(Source::A);
    let head = &prices[..100];

    let check = |name: &str, f: &dyn Fn(&[f64]) -> Vec<f64>| {
        assert_prefix_equal(name, &f(head), &f(prices));
    };
    check("rolling_mean", &|v| rolling_mean(v, 20));
    check("rolling_std", &|v| rolling_std(v, 20));
    check("rolling_max", &|v| rolling_max(v, 26));
    check("rolling_min", &|v| rolling_min(v, 26));
    check("diff", &diff);
    check("shift", &|v| shift(v, 26));
    check("ema", &|v| ema_of_series(v, 12));
}

// ── Indicators ──

#[test]
fn macd_no_lookahead() {
    assert_no_lookahead(&Macd::new(MacdParams::default(), Source::BOTH.to_vec()));
}

#[test]
fn rsi_no_lookahead() {
    assert_no_lookahead(&Rsi::new(RsiParams::default(), Source::BOTH.to_vec()));
}

#[test]
fn bollinger_no_lookahead() {
    assert_no_lookahead(&Bollinger::new(BollingerParams::default(), Source::BOTH.to_vec()));
}

#[test]
fn ichimoku_no_lookahead() {
    assert_no_lookahead(&Ichimoku::new(IchimokuParams::default()));
}
