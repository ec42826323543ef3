//! Descriptive statistics over `f64` slices.
//!
//! Conventions follow the usual dataframe semantics: undefined results are
//! NaN rather than errors (mean of nothing, std of a single value), and the
//! callers decide how to present them.

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1). NaN for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Median. NaN for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile(&sorted, 0.5)
}

/// Bias-adjusted Fisher-Pearson skewness (G1).
///
/// NaN for fewer than three values; 0.0 when every value is identical.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }

    let nf = n as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;

    // Relative tolerance: rounding noise in a constant column must not read as skew
    if m2 <= f64::EPSILON * m.abs().max(1.0).powi(2) {
        return 0.0;
    }

    let g1 = m3 / m2.powf(1.5);
    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1
}

/// Quantile of an already sorted slice with linear interpolation.
///
/// `q` is clamped to `[0, 1]`. NaN for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// IQR outlier fences `(Q1 - k·IQR, Q3 + k·IQR)`. `None` for an empty slice.
pub fn iqr_bounds(values: &[f64], k: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - k * iqr, q3 + k * iqr))
}

/// Mean of successive differences over adjacent observed pairs.
///
/// A difference is only taken when both neighbours are present. NaN when no
/// such pair exists.
pub fn mean_difference(values: &[Option<f64>]) -> f64 {
    let diffs: Vec<f64> = values
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(prev), Some(next)) => Some(next - prev),
            _ => None,
        })
        .collect();
    mean(&diffs)
}
