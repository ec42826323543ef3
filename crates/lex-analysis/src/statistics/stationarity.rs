//! Augmented Dickey-Fuller unit-root test.
//!
//! Constant-only regression with the lag order chosen by AIC, MacKinnon (1994)
//! approximate p-values and MacKinnon (2010) finite-sample critical values.
//! Least squares is solved through the normal equations; candidate models
//! whose design matrix is singular are skipped during lag selection.

use indexmap::IndexMap;
use statrs::distribution::{ContinuousCDF, Normal};

use super::{StatsError, StatsResult};
use crate::error::FailureKind;

// MacKinnon (1994) surface for the constant-only model with one variable
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) response surface: c0 + c1/n + c2/n^2 + c3/n^3
const CRITICAL_SURFACE: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.040]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Relative pivot size below which the normal equations are treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Relative residual size below which a fit is treated as exact.
const PERFECT_FIT_TOLERANCE: f64 = 1e-14;

/// Result of [`adfuller`].
#[derive(Debug, Clone, PartialEq)]
pub struct AdfOutcome {
    /// Test statistic; `None` when it is undefined (constant series, exact fit).
    pub statistic: Option<f64>,
    pub p_value: f64,
    pub used_lag: usize,
    pub n_obs: usize,
    pub critical_values: IndexMap<String, f64>,
}

/// Run the ADF test on a complete series (missing values already removed).
///
/// Requires at least four observations. A constant series is reported with
/// p-value 0 and no statistic.
pub fn adfuller(x: &[f64]) -> StatsResult<AdfOutcome> {
    let n = x.len();
    let max_lag = default_max_lag(n)
        .ok_or_else(|| StatsError::insufficient_data(4, n, "stationarity test"))?;

    if x.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::new(
            FailureKind::NonFiniteValues,
            "stationarity test requires finite values",
        ));
    }

    if x.iter().all(|v| *v == x[0]) {
        let n_obs = n - 1;
        return Ok(AdfOutcome {
            statistic: None,
            p_value: 0.0,
            used_lag: 0,
            n_obs,
            critical_values: mackinnon_critical_values(n_obs),
        });
    }

    let xdiff: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let used_lag = select_lag_by_aic(x, &xdiff, max_lag)?;

    // Refit on the rows available for the chosen lag, level term first
    let (design, response) = lagged_design(x, &xdiff, used_lag, false);
    let n_obs = response.len();
    if n_obs <= used_lag + 2 {
        return Err(StatsError::insufficient_data(
            used_lag + 3,
            n_obs,
            "stationarity regression",
        ));
    }

    let fit = ols(&design, &response).ok_or_else(|| {
        StatsError::new(
            FailureKind::SingularMatrix,
            "stationarity regression design matrix is singular",
        )
    })?;

    // An exact fit leaves the statistic undefined and the p-value NaN, so the
    // series is reported non-stationary. Least-squares libraries that keep the
    // round-off t-value instead report p near 0 or 1 depending on its sign.
    let statistic = fit.t_value(0).filter(|t| t.is_finite());
    let p_value = statistic.map_or(f64::NAN, mackinnon_p_value);

    Ok(AdfOutcome {
        statistic,
        p_value,
        used_lag,
        n_obs,
        critical_values: mackinnon_critical_values(n_obs),
    })
}

/// MacKinnon approximate p-value for the constant-only ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let poly = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };

    Normal::new(0.0, 1.0)
        .map(|dist| dist.cdf(poly))
        .unwrap_or(f64::NAN)
}

/// Finite-sample critical values at 1%, 5% and 10% for `n_obs` observations.
pub fn mackinnon_critical_values(n_obs: usize) -> IndexMap<String, f64> {
    let inv = if n_obs == 0 { 0.0 } else { 1.0 / n_obs as f64 };
    CRITICAL_SURFACE
        .iter()
        .map(|(label, coefs)| (label.to_string(), polyval(coefs, inv)))
        .collect()
}

/// `⌈12·(n/100)^¼⌉` capped at `n/2 - 2`; `None` when the cap is negative.
fn default_max_lag(n: usize) -> Option<usize> {
    let cap = (n / 2) as i64 - 2;
    if cap < 0 {
        return None;
    }
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as i64;
    Some(schwert.min(cap) as usize)
}

/// Pick the number of lagged differences minimising AIC.
///
/// Every candidate is fitted on the same rows (those available at `max_lag`).
/// Ties keep the smaller lag.
fn select_lag_by_aic(x: &[f64], xdiff: &[f64], max_lag: usize) -> StatsResult<usize> {
    let (full, response) = lagged_design(x, xdiff, max_lag, true);
    let nobs = response.len() as f64;

    let mut best: Option<(f64, usize)> = None;
    // Constant and level are always included; lags are appended one at a time
    for lag in 0..=max_lag {
        let k = lag + 2;
        let design: Vec<Vec<f64>> = full.iter().map(|row| row[..k].to_vec()).collect();
        let Some(fit) = ols(&design, &response) else {
            tracing::debug!(lag, "Skipping singular ADF candidate");
            continue;
        };

        let aic = if fit.is_perfect() {
            f64::NEG_INFINITY
        } else {
            nobs * ((2.0 * std::f64::consts::PI).ln() + (fit.ssr / nobs).ln() + 1.0)
                + 2.0 * k as f64
        };

        if best.is_none_or(|(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }

    best.map(|(_, lag)| lag).ok_or_else(|| {
        StatsError::new(
            FailureKind::SingularMatrix,
            "every candidate lag order produced a singular design matrix",
        )
    })
}

/// Build the ADF regression for `lags` lagged differences.
///
/// Row `t` runs over `lags..xdiff.len()`; the response is `xdiff[t]` and the
/// regressors are the level `x[t]`, then `xdiff[t-1] .. xdiff[t-lags]`. The
/// constant goes first when `const_first`, otherwise last.
fn lagged_design(
    x: &[f64],
    xdiff: &[f64],
    lags: usize,
    const_first: bool,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut design = Vec::with_capacity(xdiff.len().saturating_sub(lags));
    let mut response = Vec::with_capacity(design.capacity());

    for t in lags..xdiff.len() {
        let mut row = Vec::with_capacity(lags + 2);
        if const_first {
            row.push(1.0);
        }
        row.push(x[t]);
        row.extend((1..=lags).map(|j| xdiff[t - j]));
        if !const_first {
            row.push(1.0);
        }
        design.push(row);
        response.push(xdiff[t]);
    }

    (design, response)
}

/// Least-squares fit with the pieces needed for t-values and AIC.
struct OlsFit {
    params: Vec<f64>,
    xtx_inv: Vec<Vec<f64>>,
    ssr: f64,
    response_ss: f64,
    nobs: usize,
}

impl OlsFit {
    fn is_perfect(&self) -> bool {
        self.ssr <= PERFECT_FIT_TOLERANCE * self.response_ss
    }

    fn t_value(&self, index: usize) -> Option<f64> {
        let k = self.params.len();
        if self.nobs <= k || self.is_perfect() {
            return None;
        }
        let scale = self.ssr / (self.nobs - k) as f64;
        let se = (scale * self.xtx_inv[index][index]).sqrt();
        Some(self.params[index] / se)
    }
}

/// Ordinary least squares via the normal equations. `None` if `X'X` is singular.
fn ols(design: &[Vec<f64>], response: &[f64]) -> Option<OlsFit> {
    let k = design.first()?.len();
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    for (row, y) in design.iter().zip(response) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let xtx_inv = invert(xtx)?;
    let params: Vec<f64> = xtx_inv
        .iter()
        .map(|inv_row| inv_row.iter().zip(&xty).map(|(a, b)| a * b).sum())
        .collect();

    let ssr = design
        .iter()
        .zip(response)
        .map(|(row, y)| {
            let fitted: f64 = row.iter().zip(&params).map(|(a, b)| a * b).sum();
            (y - fitted).powi(2)
        })
        .sum();

    Some(OlsFit {
        params,
        xtx_inv,
        ssr,
        response_ss: response.iter().map(|y| y * y).sum(),
        nobs: response.len(),
    })
}

/// Gauss-Jordan inversion with partial pivoting.
fn invert(mut a: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let k = a.len();
    let scale = (0..k).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    let mut inv: Vec<Vec<f64>> = (0..k)
        .map(|i| (0..k).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..k {
        let pivot_row = (col..k).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            return None;
        }
        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot = a[col][col];
        for j in 0..k {
            a[col][j] /= pivot;
            inv[col][j] /= pivot;
        }

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Some(inv)
}

/// Evaluate `Σ coefs[i] · x^i`.
fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic uniform noise in [-0.5, 0.5).
    fn noise(len: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5
            })
            .collect()
    }

    // ==================== p-value / critical value tests ====================

    #[test]
    fn test_p_value_bounds() {
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-20.0), 0.0);
    }

    #[test]
    fn test_p_value_near_one_percent_critical_value() {
        // The asymptotic 1% critical value should map to p ≈ 0.01
        let p = mackinnon_p_value(-3.43035);
        assert!((p - 0.01).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_p_value_monotonic() {
        let p_low = mackinnon_p_value(-4.0);
        let p_mid = mackinnon_p_value(-2.0);
        let p_high = mackinnon_p_value(0.5);
        assert!(p_low < p_mid && p_mid < p_high);
    }

    #[test]
    fn test_critical_values_for_100_observations() {
        let cv = mackinnon_critical_values(100);
        let labels: Vec<&str> = cv.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["1%", "5%", "10%"]);
        assert!((cv["1%"] - (-3.4975)).abs() < 1e-3);
        assert!(cv["1%"] < cv["5%"] && cv["5%"] < cv["10%"]);
    }

    #[test]
    fn test_default_max_lag() {
        assert_eq!(default_max_lag(3), None);
        assert_eq!(default_max_lag(4), Some(0));
        assert_eq!(default_max_lag(10), Some(3));
        assert_eq!(default_max_lag(100), Some(12));
    }

    // ==================== OLS tests ====================

    #[test]
    fn test_ols_recovers_line() {
        let design: Vec<Vec<f64>> = (0..5).map(|i| vec![1.0, i as f64]).collect();
        let response = vec![1.0, 3.0, 5.0, 7.0, 9.0];
        let fit = ols(&design, &response).unwrap();
        assert!((fit.params[0] - 1.0).abs() < 1e-9);
        assert!((fit.params[1] - 2.0).abs() < 1e-9);
        assert!(fit.is_perfect());
    }

    #[test]
    fn test_ols_detects_collinearity() {
        let design: Vec<Vec<f64>> = (0..5).map(|i| vec![1.0, 2.0, i as f64]).collect();
        let response = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(ols(&design, &response).is_none());
    }

    // ==================== adfuller tests ====================

    #[test]
    fn test_white_noise_is_stationary() {
        let x = noise(200, 42);
        let result = adfuller(&x).unwrap();
        let stat = result.statistic.unwrap();
        assert!(stat < result.critical_values["5%"], "stat = {stat}");
        assert!(result.p_value < 0.05);
        assert_eq!(result.n_obs, x.len() - 1 - result.used_lag);
    }

    #[test]
    fn test_constant_series() {
        let result = adfuller(&[5.0; 20]).unwrap();
        assert_eq!(result.statistic, None);
        assert_eq!(result.p_value, 0.0);
        assert_eq!(result.critical_values.len(), 3);
    }

    #[test]
    fn test_exact_linear_trend_has_no_statistic() {
        let x: Vec<f64> = (0..10).map(|i| 10.0 + 2.0 * i as f64).collect();
        let result = adfuller(&x).unwrap();
        assert_eq!(result.statistic, None);
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_too_short_series() {
        let err = adfuller(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind, FailureKind::InsufficientData);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = adfuller(&[1.0, f64::NAN, 3.0, 4.0, 5.0]).unwrap_err();
        assert_eq!(err.kind, FailureKind::NonFiniteValues);
    }
}
