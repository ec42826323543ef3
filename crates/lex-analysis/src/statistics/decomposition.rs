//! Additive seasonal decomposition by moving averages.
//!
//! `x = trend + seasonal + residual`, where the trend is a centered moving
//! average over one period (a 2×MA for even periods), the seasonal component
//! is the per-phase mean of the detrended series centred to zero, and the
//! residual is what remains.

use super::{StatsError, StatsResult};
use crate::error::FailureKind;

/// Components of an additive decomposition.
///
/// Entries where a component is undefined (the trend edges, phases with no
/// detrended observation) are NaN until [`Decomposition::dropna`] is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl Decomposition {
    /// Drop the NaN padding from every component independently.
    pub fn dropna(self) -> Self {
        Self {
            trend: super::drop_nan(&self.trend),
            seasonal: super::drop_nan(&self.seasonal),
            residual: super::drop_nan(&self.residual),
        }
    }
}

/// Decompose a series with the given seasonal period.
///
/// Fails with `missing_values` when any observation is absent, with
/// `non_finite_values` on infinities, and with `insufficient_data` for fewer
/// than three observations or a period below two. A filter wider than the
/// series is accepted; the trend is then undefined everywhere.
pub fn seasonal_decompose(values: &[Option<f64>], period: usize) -> StatsResult<Decomposition> {
    let n = values.len();
    if n < 3 {
        return Err(StatsError::insufficient_data(3, n, "seasonal decomposition"));
    }
    if period < 2 {
        return Err(StatsError::new(
            FailureKind::InsufficientData,
            format!("seasonal period must be at least 2, got {period}"),
        ));
    }

    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(StatsError::new(
            FailureKind::MissingValues,
            format!("seasonal decomposition does not support missing values ({missing} found)"),
        ));
    }

    let x: Vec<f64> = values.iter().flatten().copied().collect();
    if x.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::new(
            FailureKind::NonFiniteValues,
            "seasonal decomposition requires finite values",
        ));
    }

    let trend = centered_moving_average(&x, period);
    let detrended: Vec<f64> = x.iter().zip(&trend).map(|(v, t)| v - t).collect();

    let mut phase_means: Vec<f64> = (0..period)
        .map(|phase| nanmean(detrended.iter().skip(phase).step_by(period).copied()))
        .collect();
    let centre = nanmean(phase_means.iter().copied());
    if centre.is_finite() {
        for m in &mut phase_means {
            *m -= centre;
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();
    let residual: Vec<f64> = detrended
        .iter()
        .zip(&seasonal)
        .map(|(d, s)| d - s)
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
    })
}

/// Centered moving average with NaN where the window does not fit.
///
/// Odd periods use `period` equal weights; even periods use the 2×MA filter
/// `[0.5, 1, ..., 1, 0.5] / period`, so the filter length is always odd.
fn centered_moving_average(x: &[f64], period: usize) -> Vec<f64> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let p = period as f64;
        let mut w = vec![1.0 / p; period + 1];
        w[0] = 0.5 / p;
        w[period] = 0.5 / p;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    let n = x.len();
    let half = (weights.len() - 1) / 2;
    let mut trend = vec![f64::NAN; n];
    if weights.len() > n {
        return trend;
    }

    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        *slot = weights
            .iter()
            .zip(&x[i - half..=i + half])
            .map(|(w, v)| w * v)
            .sum();
    }
    trend
}

fn nanmean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_linear_series_trend_follows_line() {
        let x: Vec<f64> = (0..10).map(|i| 10.0 + 2.0 * i as f64).collect();
        let result = seasonal_decompose(&some(&x), 7).unwrap().dropna();

        // Window of 7 leaves indices 3..=6 defined
        assert_eq!(result.trend.len(), 4);
        for (i, t) in result.trend.iter().enumerate() {
            assert!((t - x[i + 3]).abs() < 1e-9);
        }
        assert!(result.residual.iter().all(|r| r.abs() < 1e-9));
        assert!(result.seasonal.iter().all(|s| s.abs() < 1e-9));
    }

    #[test]
    fn test_even_period_recovers_pattern() {
        let pattern = [1.0, 2.0, 3.0, 4.0];
        let x: Vec<f64> = pattern.iter().copied().cycle().take(12).collect();
        let result = seasonal_decompose(&some(&x), 4).unwrap();

        assert!(result.trend[..2].iter().all(|t| t.is_nan()));
        assert!(result.trend[10..].iter().all(|t| t.is_nan()));
        for t in &result.trend[2..10] {
            assert!((t - 2.5).abs() < 1e-9);
        }

        let expected = [-1.5, -0.5, 0.5, 1.5];
        for (i, s) in result.seasonal.iter().enumerate() {
            assert!((s - expected[i % 4]).abs() < 1e-9);
        }

        let dropped = result.dropna();
        assert_eq!(dropped.trend.len(), 8);
        assert_eq!(dropped.seasonal.len(), 12);
        assert!(dropped.residual.iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn test_constant_series_has_zero_components() {
        let x = vec![5.0; 20];
        let result = seasonal_decompose(&some(&x), 7).unwrap().dropna();
        assert!(result.trend.iter().all(|t| (t - 5.0).abs() < 1e-9));
        assert!(result.seasonal.iter().all(|s| s.abs() < 1e-9));
        assert!(result.residual.iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn test_filter_wider_than_series_yields_empty_components() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let result = seasonal_decompose(&some(&x), 4).unwrap().dropna();
        assert!(result.trend.is_empty());
        assert!(result.residual.is_empty());
    }

    #[test]
    fn test_too_few_observations() {
        let err = seasonal_decompose(&some(&[1.0, 2.0]), 2).unwrap_err();
        assert_eq!(err.kind, FailureKind::InsufficientData);
    }

    #[test]
    fn test_missing_values_rejected() {
        let values = [Some(1.0), None, Some(3.0), Some(4.0)];
        let err = seasonal_decompose(&values, 2).unwrap_err();
        assert_eq!(err.kind, FailureKind::MissingValues);
    }

    #[test]
    fn test_infinite_values_rejected() {
        let err = seasonal_decompose(&some(&[1.0, f64::INFINITY, 3.0]), 2).unwrap_err();
        assert_eq!(err.kind, FailureKind::NonFiniteValues);
    }
}
