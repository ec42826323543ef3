//! Configuration types for the statistical analyzer.
//!
//! This module provides configuration options using the builder pattern.
//! Defaults: seasonal period cap of 7, change-point window of 5 with a 2σ
//! threshold, 5% significance for the stationarity test, 1.5×IQR outlier fences.

use serde::{Deserialize, Serialize};

/// Default cap on the seasonal decomposition period.
pub const DEFAULT_MAX_SEASONAL_PERIOD: usize = 7;

/// Default rolling window for change-point detection.
pub const DEFAULT_CHANGE_POINT_WINDOW: usize = 5;

/// Default number of rolling standard deviations that marks a change point.
pub const DEFAULT_CHANGE_POINT_THRESHOLD: f64 = 2.0;

/// Default p-value threshold for the stationarity test.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default IQR multiplier for outlier fences.
pub const DEFAULT_OUTLIER_IQR_MULTIPLIER: f64 = 1.5;

/// What to do when the computation for a single column fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FailurePolicy {
    /// Abort the whole analysis call; no partial results are returned.
    #[default]
    AbortOnError,
    /// Omit the failing column and record it in the report's `skipped_columns`.
    SkipFailedColumns,
}

/// Configuration for [`StatisticalAnalyzer`](crate::analyzer::StatisticalAnalyzer).
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::config::{AnalysisConfig, FailurePolicy};
///
/// let config = AnalysisConfig::builder()
///     .change_point_threshold(1.5)
///     .failure_policy(FailurePolicy::SkipFailedColumns)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on the seasonal period; the period used is `min(rows, max_seasonal_period)`.
    /// Default: 7
    pub max_seasonal_period: usize,

    /// Rolling window length for change-point detection.
    /// Default: 5
    pub change_point_window: usize,

    /// A point is a change point when it deviates from the rolling mean by more
    /// than this many rolling standard deviations.
    /// Default: 2.0
    pub change_point_threshold: f64,

    /// A series is reported stationary when the ADF p-value is below this level.
    /// Default: 0.05
    pub significance_level: f64,

    /// Multiplier applied to the IQR for the outlier fences in the quality report.
    /// Default: 1.5
    pub outlier_iqr_multiplier: f64,

    /// Behavior when a per-column computation fails.
    /// Default: AbortOnError
    pub failure_policy: FailurePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_seasonal_period: DEFAULT_MAX_SEASONAL_PERIOD,
            change_point_window: DEFAULT_CHANGE_POINT_WINDOW,
            change_point_threshold: DEFAULT_CHANGE_POINT_THRESHOLD,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            outlier_iqr_multiplier: DEFAULT_OUTLIER_IQR_MULTIPLIER,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_seasonal_period < 2 {
            return Err(ConfigValidationError::InvalidSeasonalPeriod(
                self.max_seasonal_period,
            ));
        }

        if self.change_point_window < 2 {
            return Err(ConfigValidationError::InvalidWindow(self.change_point_window));
        }

        if !(self.change_point_threshold.is_finite() && self.change_point_threshold > 0.0) {
            return Err(ConfigValidationError::InvalidPositive {
                field: "change_point_threshold".to_string(),
                value: self.change_point_threshold,
            });
        }

        if !(self.outlier_iqr_multiplier.is_finite() && self.outlier_iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidPositive {
                field: "outlier_iqr_multiplier".to_string(),
                value: self.outlier_iqr_multiplier,
            });
        }

        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ConfigValidationError::InvalidSignificanceLevel(
                self.significance_level,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid max seasonal period: {0} (must be at least 2)")]
    InvalidSeasonalPeriod(usize),

    #[error("Invalid change point window: {0} (must be at least 2)")]
    InvalidWindow(usize),

    #[error("Invalid value for '{field}': {value} (must be a positive number)")]
    InvalidPositive { field: String, value: f64 },

    #[error("Invalid significance level: {0} (must be between 0.0 and 1.0, exclusive)")]
    InvalidSignificanceLevel(f64),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    max_seasonal_period: Option<usize>,
    change_point_window: Option<usize>,
    change_point_threshold: Option<f64>,
    significance_level: Option<f64>,
    outlier_iqr_multiplier: Option<f64>,
    failure_policy: Option<FailurePolicy>,
}

impl AnalysisConfigBuilder {
    /// Set the cap on the seasonal decomposition period.
    pub fn max_seasonal_period(mut self, period: usize) -> Self {
        self.max_seasonal_period = Some(period);
        self
    }

    /// Set the rolling window used for change-point detection.
    pub fn change_point_window(mut self, window: usize) -> Self {
        self.change_point_window = Some(window);
        self
    }

    /// Set how many rolling standard deviations mark a change point.
    ///
    /// With the default window of 5 a point that is part of its own window can
    /// deviate from the window mean by at most 4/√5 ≈ 1.79 sample standard
    /// deviations, so thresholds at or above that never fire.
    pub fn change_point_threshold(mut self, threshold: f64) -> Self {
        self.change_point_threshold = Some(threshold);
        self
    }

    /// Set the p-value threshold for the stationarity test.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = Some(alpha);
        self
    }

    /// Set the IQR multiplier for outlier fences.
    pub fn outlier_iqr_multiplier(mut self, k: f64) -> Self {
        self.outlier_iqr_multiplier = Some(k);
        self
    }

    /// Set the per-column failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            max_seasonal_period: self
                .max_seasonal_period
                .unwrap_or(DEFAULT_MAX_SEASONAL_PERIOD),
            change_point_window: self
                .change_point_window
                .unwrap_or(DEFAULT_CHANGE_POINT_WINDOW),
            change_point_threshold: self
                .change_point_threshold
                .unwrap_or(DEFAULT_CHANGE_POINT_THRESHOLD),
            significance_level: self
                .significance_level
                .unwrap_or(DEFAULT_SIGNIFICANCE_LEVEL),
            outlier_iqr_multiplier: self
                .outlier_iqr_multiplier
                .unwrap_or(DEFAULT_OUTLIER_IQR_MULTIPLIER),
            failure_policy: self.failure_policy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_seasonal_period, 7);
        assert_eq!(config.change_point_window, 5);
        assert_eq!(config.change_point_threshold, 2.0);
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.outlier_iqr_multiplier, 1.5);
        assert_eq!(config.failure_policy, FailurePolicy::AbortOnError);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .max_seasonal_period(12)
            .change_point_window(7)
            .change_point_threshold(1.5)
            .significance_level(0.01)
            .outlier_iqr_multiplier(3.0)
            .failure_policy(FailurePolicy::SkipFailedColumns)
            .build()
            .unwrap();

        assert_eq!(config.max_seasonal_period, 12);
        assert_eq!(config.change_point_window, 7);
        assert_eq!(config.change_point_threshold, 1.5);
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.outlier_iqr_multiplier, 3.0);
        assert_eq!(config.failure_policy, FailurePolicy::SkipFailedColumns);
    }

    #[test]
    fn test_validation_invalid_period() {
        let result = AnalysisConfig::builder().max_seasonal_period(1).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSeasonalPeriod(1)
        ));
    }

    #[test]
    fn test_validation_invalid_window() {
        let result = AnalysisConfig::builder().change_point_window(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidWindow(0)
        ));
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = AnalysisConfig::builder()
            .change_point_threshold(-1.0)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPositive { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_significance() {
        let result = AnalysisConfig::builder().significance_level(1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSignificanceLevel(_)
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "max_seasonal_period": 4,
            "change_point_window": 3,
            "change_point_threshold": 1.2,
            "significance_level": 0.1,
            "outlier_iqr_multiplier": 2.0,
            "failure_policy": "SkipFailedColumns"
        }"#;

        let config: AnalysisConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(config.max_seasonal_period, 4);
        assert_eq!(config.change_point_window, 3);
        assert_eq!(config.failure_policy, FailurePolicy::SkipFailedColumns);
        assert!(config.validate().is_ok());
    }
}
