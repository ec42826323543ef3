//! Numeric routines behind the analysis strategies.
//!
//! Everything here works on plain slices so it can be tested without building
//! DataFrames:
//! - Descriptive statistics (mean, median, sample std, skew, quantiles)
//! - Additive seasonal decomposition
//! - Augmented Dickey-Fuller stationarity test
//! - Rolling-window change-point detection
//! - Pairwise Pearson correlation

mod correlation;
mod decomposition;
mod descriptive;
mod rolling;
mod stationarity;

pub use correlation::{correlation_matrix, pearson};
pub use decomposition::{Decomposition, seasonal_decompose};
pub use descriptive::{
    iqr_bounds, mean, mean_difference, median, quantile, sample_std, skewness,
};
pub use rolling::{ChangePoints, detect_change_points, rolling_mean, rolling_std};
pub use stationarity::{AdfOutcome, adfuller, mackinnon_critical_values, mackinnon_p_value};

use crate::error::FailureKind;
use thiserror::Error;

/// Failure of a single statistical computation.
///
/// Carries no column name; the analyzer attaches it when converting to
/// [`AnalysisError`](crate::error::AnalysisError).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct StatsError {
    pub kind: FailureKind,
    pub reason: String,
}

impl StatsError {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(needed: usize, got: usize, what: &str) -> Self {
        Self::new(
            FailureKind::InsufficientData,
            format!("{what} requires at least {needed} observations, got {got}"),
        )
    }
}

pub type StatsResult<T> = std::result::Result<T, StatsError>;

/// Drop NaN entries, keeping order.
pub(crate) fn drop_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}
