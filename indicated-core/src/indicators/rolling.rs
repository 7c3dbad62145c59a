//! Rolling-window primitives over `f64` slices.
//!
//! Output has the input's length. A window value is defined only once `window`
//! observations have accumulated and none of them is NaN; otherwise it is NaN.
//! Each window is evaluated independently, so a value never depends on
//! anything outside its own window.

/// Apply `f` to every full, NaN-free trailing window.
fn rolling_apply(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(slice);
    }
    result
}

/// Simple moving average.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Undefined for `window < 2`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; values.len()];
    }
    rolling_apply(values, window, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// First difference; index 0 is undefined.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        result[i] = values[i] - values[i - 1];
    }
    result
}

/// Move values `periods` positions later; the first `periods` become NaN.
pub fn shift(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if periods < n {
        result[periods..].copy_from_slice(&values[..n - periods]);
    }
    result
}

/// Per-date average across equally long series.
///
/// NaN in any input makes that date NaN.
pub fn average_series(series: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = series.first() else {
        return Vec::new();
    };
    let count = series.len() as f64;
    (0..first.len())
        .map(|i| series.iter().map(|s| s[i]).sum::<f64>() / count)
        .collect()
}

/// Mean of the defined values, or `None` if there are none.
pub fn nan_mean(values: &[f64]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

/// Latest element, if defined.
pub fn last_defined(values: &[f64]) -> Option<f64> {
    values.last().copied().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_basic() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        assert_eq!(result.len(), 7);
        for v in &result[..4] {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_nan_propagation() {
        let result = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_window_longer_than_input() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert!(rolling_max(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_std_is_sample_deviation() {
        // 2, 4, 4, 4, 5, 5, 7, 9: mean 5, sum of squares 32, sample var 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&values, 8);
        assert_approx(result[7], (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
        assert!(rolling_std(&values, 1).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_std_constant_is_zero() {
        let result = rolling_std(&[5.0; 4], 3);
        assert_approx(result[2], 0.0, DEFAULT_EPSILON);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_extremes() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0];
        let max = rolling_max(&values, 3);
        let min = rolling_min(&values, 3);
        assert_eq!(&max[2..], &[4.0, 4.0, 5.0, 9.0, 9.0]);
        assert_eq!(&min[2..], &[1.0, 1.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn diff_and_shift() {
        let d = diff(&[1.0, 3.0, 6.0]);
        assert!(d[0].is_nan());
        assert_eq!(&d[1..], &[2.0, 3.0]);

        let s = shift(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(s[0].is_nan() && s[1].is_nan());
        assert_eq!(&s[2..], &[1.0, 2.0]);

        assert!(shift(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn average_and_nan_mean() {
        let avg = average_series(&[vec![1.0, f64::NAN], vec![3.0, 4.0]]);
        assert_eq!(avg[0], 2.0);
        assert!(avg[1].is_nan());

        assert_eq!(nan_mean(&[f64::NAN, 1.0, 3.0]), Some(2.0));
        assert_eq!(nan_mean(&[f64::NAN]), None);
        assert_eq!(last_defined(&[1.0, f64::NAN]), None);
        assert_eq!(last_defined(&[f64::NAN, 2.0]), Some(2.0));
    }
}
