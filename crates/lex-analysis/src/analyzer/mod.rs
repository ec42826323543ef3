//! Statistical analysis orchestration.
//!
//! [`StatisticalAnalyzer`] validates the request, classifies the dataset once
//! and dispatches to one strategy:
//! - time series when any datetime column exists
//! - numerical when any numeric column exists
//! - categorical otherwise
//!
//! The data quality report is attached to every result.

mod categorical;
mod numerical;
mod time_series;

use polars::prelude::*;
use tracing::{info, warn};

use crate::classifier::ColumnClassifier;
use crate::config::{AnalysisConfig, FailurePolicy};
use crate::error::{AnalysisError, FailureKind, Result};
use crate::quality::DataQualityAssessor;
use crate::statistics::StatsError;
use crate::types::{AnalysisReport, AnalysisResult, SkippedColumn};
use crate::utils::series_to_f64;

/// Runs the analysis strategy matching a dataset's classification.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::StatisticalAnalyzer;
///
/// let analyzer = StatisticalAnalyzer::default();
/// let report = analyzer.analyze(&df, "How are sales trending?")?;
/// println!("{}", report.result.kind());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatisticalAnalyzer {
    config: AnalysisConfig,
}

impl StatisticalAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a dataset in the context of a natural-language query.
    ///
    /// The query is only checked for content here; it is carried for
    /// downstream narrative generation.
    pub fn analyze(&self, df: &DataFrame, query: &str) -> Result<AnalysisReport> {
        if query.trim().is_empty() {
            return Err(AnalysisError::validation("query must not be empty"));
        }
        self.config.validate()?;
        if df.width() == 0 {
            return Err(AnalysisError::validation("dataset has no columns"));
        }
        if df.height() == 0 {
            return Err(AnalysisError::validation("dataset has no rows"));
        }

        let classification = ColumnClassifier::classify_with_confidence(df)?;
        info!(
            "Classified dataset as {} ({} datetime, {} numeric, {} categorical)",
            classification.shape,
            classification.datetime_columns.len(),
            classification.numeric_columns.len(),
            classification.categorical_columns.len()
        );

        let mut runner = ColumnRunner::new(self.config.failure_policy);
        let result = if classification.has_datetime() {
            info!("Running time-series analysis");
            AnalysisResult::TimeSeries(time_series::analyze(
                df,
                &classification,
                &self.config,
                &mut runner,
            )?)
        } else if classification.has_numeric() {
            info!("Running numerical analysis");
            AnalysisResult::Numerical(numerical::analyze(df, &classification, &mut runner)?)
        } else {
            info!("Running categorical analysis");
            AnalysisResult::Categorical(categorical::analyze(df, &classification, &mut runner)?)
        };

        let data_quality =
            DataQualityAssessor::assess_with_multiplier(df, self.config.outlier_iqr_multiplier);

        if !runner.skipped.is_empty() {
            warn!("Skipped {} column(s) that failed analysis", runner.skipped.len());
        }

        Ok(AnalysisReport {
            result,
            data_quality,
            classification,
            skipped_columns: runner.skipped,
        })
    }
}

/// Applies the failure policy to per-column computations.
pub(crate) struct ColumnRunner {
    policy: FailurePolicy,
    skipped: Vec<SkippedColumn>,
}

impl ColumnRunner {
    fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            skipped: Vec::new(),
        }
    }

    /// Run one column's computation.
    ///
    /// `Ok(None)` means the column failed and was skipped. Errors that are not
    /// column failures always propagate.
    pub(crate) fn run<T>(
        &mut self,
        column: &str,
        compute: impl FnOnce() -> Result<T>,
    ) -> Result<Option<T>> {
        match compute() {
            Ok(value) => Ok(Some(value)),
            Err(e)
                if self.policy == FailurePolicy::SkipFailedColumns
                    && e.failure_kind().is_some() =>
            {
                warn!("Skipping column '{}': {}", column, e);
                self.skipped.push(SkippedColumn {
                    column: column.to_string(),
                    code: e.error_code().to_string(),
                    message: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Read a column as `f64` values, attributing read errors to the column.
pub(crate) fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    df.column(name)
        .and_then(|c| series_to_f64(c.as_materialized_series()))
        .map_err(|e| column_access_error(name, e))
}

pub(crate) fn column_access_error(name: &str, error: PolarsError) -> AnalysisError {
    AnalysisError::failure(
        name,
        StatsError::new(FailureKind::ColumnAccess, error.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_rejected() {
        let df = df!["v" => [1, 2, 3]].unwrap();
        let err = StatisticalAnalyzer::default().analyze(&df, "   ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_zero_rows_rejected() {
        let df = df!["v" => Vec::<f64>::new()].unwrap();
        let err = StatisticalAnalyzer::default()
            .analyze(&df, "summary")
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            change_point_window: 1,
            ..Default::default()
        };
        let df = df!["v" => [1, 2, 3]].unwrap();
        let err = StatisticalAnalyzer::new(config)
            .analyze(&df, "summary")
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_runner_abort_propagates() {
        let mut runner = ColumnRunner::new(FailurePolicy::AbortOnError);
        let result: Result<Option<()>> = runner.run("v", || {
            Err(AnalysisError::failure(
                "v",
                StatsError::new(FailureKind::InsufficientData, "too short"),
            ))
        });
        assert!(result.is_err());
        assert!(runner.skipped.is_empty());
    }

    #[test]
    fn test_runner_skip_records_column() {
        let mut runner = ColumnRunner::new(FailurePolicy::SkipFailedColumns);
        let result: Result<Option<()>> = runner.run("v", || {
            Err(AnalysisError::failure(
                "v",
                StatsError::new(FailureKind::MissingValues, "gaps"),
            ))
        });
        assert!(matches!(result, Ok(None)));
        assert_eq!(runner.skipped.len(), 1);
        assert_eq!(runner.skipped[0].column, "v");
        assert_eq!(runner.skipped[0].code, "ANALYSIS_FAILURE");
    }

    #[test]
    fn test_runner_skip_does_not_swallow_validation() {
        let mut runner = ColumnRunner::new(FailurePolicy::SkipFailedColumns);
        let result: Result<Option<()>> =
            runner.run("v", || Err(AnalysisError::validation("bad")));
        assert!(result.is_err());
    }
}
