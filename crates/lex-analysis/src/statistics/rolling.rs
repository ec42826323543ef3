//! Trailing rolling-window statistics and change-point detection.
//!
//! A window ending at index `i` covers `i + 1 - window ..= i`. It produces a
//! value only when it is full and contains no missing observation, so the
//! first `window - 1` indices never carry a statistic.

/// Change points found in a series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePoints {
    pub indices: Vec<usize>,
    /// Raw observation at each flagged index.
    pub magnitudes: Vec<f64>,
}

/// Trailing rolling mean; NaN where the window is incomplete.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<f64> {
    rolling(values, window, super::mean)
}

/// Trailing rolling sample standard deviation; NaN where the window is incomplete.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<f64> {
    rolling(values, window, super::sample_std)
}

fn rolling(values: &[Option<f64>], window: usize, stat: fn(&[f64]) -> f64) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            let complete: Option<Vec<f64>> = slice.iter().copied().collect();
            complete.map_or(f64::NAN, |w| stat(&w))
        })
        .collect()
}

/// Flag indices whose value deviates from the trailing rolling mean by more
/// than `threshold` rolling standard deviations.
///
/// The window includes the point itself, which bounds the attainable deviation
/// at `(window - 1) / sqrt(window)` standard deviations: about 1.79 for a
/// window of 5.
pub fn detect_change_points(
    values: &[Option<f64>],
    window: usize,
    threshold: f64,
) -> ChangePoints {
    let means = rolling_mean(values, window);
    let stds = rolling_std(values, window);

    let mut result = ChangePoints::default();
    for (i, value) in values.iter().enumerate() {
        let Some(x) = value else { continue };
        if (x - means[i]).abs() > threshold * stds[i] {
            result.indices.push(i);
            result.magnitudes.push(*x);
        }
    }
    result
}
