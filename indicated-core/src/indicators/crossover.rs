//! Crossover detection between a moving line and a reference line.
//!
//! Bullish at t: line[t] > reference[t] and line[t-1] <= reference[t-1].
//! Bearish at t: line[t] < reference[t] and line[t-1] >= reference[t-1].
//! Any NaN among the four values means no crossover at t.

use chrono::NaiveDate;

use crate::domain::{CrossoverDirection, CrossoverEvent};

/// Per-date crossover flags: +1 bullish, -1 bearish, 0 otherwise.
pub fn crossover_flags(line: &[f64], reference: &[f64]) -> Vec<i8> {
    let n = line.len().min(reference.len());
    let mut flags = vec![0i8; n];
    for t in 1..n {
        let (cur, cur_ref) = (line[t], reference[t]);
        let (prev, prev_ref) = (line[t - 1], reference[t - 1]);
        if cur.is_nan() || cur_ref.is_nan() || prev.is_nan() || prev_ref.is_nan() {
            continue;
        }
        if cur > cur_ref && prev <= prev_ref {
            flags[t] = 1;
        } else if cur < cur_ref && prev >= prev_ref {
            flags[t] = -1;
        }
    }
    flags
}

/// Combine flags from several columns: per-date mean truncated toward zero.
///
/// Columns that disagree collapse to 0; only a unanimous crossover survives.
pub fn combine_flags(columns: &[Vec<i8>]) -> Vec<i8> {
    let Some(first) = columns.first() else {
        return Vec::new();
    };
    let count = columns.len() as i32;
    (0..first.len())
        .map(|t| {
            let sum: i32 = columns.iter().map(|c| i32::from(c[t])).sum();
            // Integer division truncates toward zero.
            (sum / count) as i8
        })
        .collect()
}

/// The most recent nonzero flag, if any crossover ever occurred.
pub fn latest_crossover(dates: &[NaiveDate], flags: &[i8]) -> Option<CrossoverEvent> {
    flags
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, &flag)| {
            let direction = CrossoverDirection::from_flag(flag)?;
            Some(CrossoverEvent {
                date: *dates.get(index)?,
                index,
                direction,
            })
        })
}
