//! Dataset Classification and Statistical Analysis Library
//!
//! Classifies a tabular dataset by the semantic types of its columns, assesses
//! its quality and runs the statistical analysis that fits its shape. Built on
//! Polars; every operation borrows the `DataFrame` immutably and keeps no state
//! between calls.
//!
//! # Overview
//!
//! - **Classification**: datetime / numeric / categorical column sets and a
//!   dataset shape (time series, numerical, categorical, mixed, empty)
//! - **Data Quality**: completeness, uniqueness and validity per column
//! - **Time-Series Analysis**: trend, additive decomposition, ADF stationarity
//!   and rolling change points for every numeric column
//! - **Numerical Analysis**: mean, median, std, skew and Pearson correlations
//! - **Categorical Analysis**: ordered frequency tables
//! - **Narratives**: optional prose over the results via a pluggable provider
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_analysis::{AnalysisConfig, FailurePolicy, StatisticalAnalyzer};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("sales.csv".into()))?
//!     .finish()?;
//!
//! // Defaults: abort on the first failing column
//! let report = lex_analysis::analyze(&df, "How are sales trending?")?;
//! println!("{} analysis, shape {}", report.result.kind(), report.classification.shape);
//!
//! // Keep going past columns that cannot be analyzed
//! let config = AnalysisConfig::builder()
//!     .failure_policy(FailurePolicy::SkipFailedColumns)
//!     .build()?;
//! let report = StatisticalAnalyzer::new(config).analyze(&df, "How are sales trending?")?;
//! for skipped in &report.skipped_columns {
//!     println!("skipped {}: {}", skipped.column, skipped.message);
//! }
//! ```
//!
//! # Errors
//!
//! Every fallible operation returns [`AnalysisError`], which carries a stable
//! [`error_code`](AnalysisError::error_code) and, for per-column failures, a
//! [`FailureKind`] tag.

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod narrative;
pub mod quality;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analyzer::StatisticalAnalyzer;
pub use classifier::{ColumnClassifier, has_regular_intervals};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, FailurePolicy};
pub use error::{AnalysisError, FailureKind, ResultExt};
pub use narrative::{DatasetSummary, NarrativeProvider, TemplateNarrator};
pub use quality::DataQualityAssessor;
pub use types::{
    AnalysisReport, AnalysisResult, CategoricalAnalysis, ChangePointResult, ColumnClassification,
    ColumnType, CorrelationMatrix, DataQualityReport, DatasetShape, FrequencyTable,
    NumericalAnalysis, NumericalStats, SkippedColumn, StationarityResult, TimeSeriesAnalysis,
    TrendAnalysis, TrendComponents, TrendDirection,
};

use polars::prelude::DataFrame;

/// Classify the columns of a dataset and label its shape.
pub fn classify(df: &DataFrame) -> error::Result<ColumnClassification> {
    ColumnClassifier::classify(df)
}

/// Classify and attach a confidence score for the shape label.
pub fn classify_with_confidence(df: &DataFrame) -> error::Result<ColumnClassification> {
    ColumnClassifier::classify_with_confidence(df)
}

/// Assess completeness, uniqueness and validity with default settings.
pub fn assess_quality(df: &DataFrame) -> DataQualityReport {
    DataQualityAssessor::assess(df)
}

/// Analyze a dataset with the default configuration.
pub fn analyze(df: &DataFrame, query: &str) -> error::Result<AnalysisReport> {
    StatisticalAnalyzer::default().analyze(df, query)
}

// Analyses may be handed to worker threads by callers
static_assertions::assert_impl_all!(AnalysisReport: Send, Sync);
static_assertions::assert_impl_all!(StatisticalAnalyzer: Send, Sync);
static_assertions::assert_impl_all!(AnalysisError: Send, Sync);
