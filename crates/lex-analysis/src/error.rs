//! Error types for dataset classification and statistical analysis.
//!
//! Two caller-facing failure kinds exist:
//!
//! - [`AnalysisError::Validation`]: the request itself is malformed (no columns,
//!   no rows to analyze, blank query). The caller can correct it.
//! - [`AnalysisError::AnalysisFailure`]: a per-column statistical computation
//!   could not be carried out. It carries a stable [`FailureKind`] tag so callers
//!   can branch on the cause without matching on message text.
//!
//! Errors are serializable as `{ "code", "message" }` so they can be handed
//! to a web layer or a frontend unchanged.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::statistics::StatsError;

/// Stable tag describing why a per-column computation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Fewer observations than the computation needs.
    InsufficientData,
    /// The column contains missing values the computation cannot handle.
    MissingValues,
    /// A regression design matrix was singular.
    SingularMatrix,
    /// The column contains NaN or infinite values.
    NonFiniteValues,
    /// The column could not be read or converted.
    ColumnAccess,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::MissingValues => "missing_values",
            Self::SingularMatrix => "singular_matrix",
            Self::NonFiniteValues => "non_finite_values",
            Self::ColumnAccess => "column_access",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for classification and analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The dataset or query is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A statistical computation on one column failed.
    #[error("Analysis failed for column '{column}' ({kind}): {reason}")]
    AnalysisFailure {
        column: String,
        kind: FailureKind,
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Attribute a statistics failure to a column.
    pub fn failure(column: impl Into<String>, error: StatsError) -> Self {
        Self::AnalysisFailure {
            column: column.into(),
            kind: error.kind,
            reason: error.reason,
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for caller-side handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AnalysisFailure { .. } => "ANALYSIS_FAILURE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The failure tag, if this is (or wraps) an analysis failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::AnalysisFailure { kind, .. } => Some(*kind),
            Self::WithContext { source, .. } => source.failure_kind(),
            _ => None,
        }
    }

    /// Check if the caller can fix this by changing the request.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::validation("dataset has no columns").error_code(),
            "VALIDATION_ERROR"
        );
        let failure = AnalysisError::failure(
            "value",
            StatsError::new(FailureKind::InsufficientData, "need 3 points"),
        );
        assert_eq!(failure.error_code(), "ANALYSIS_FAILURE");
        assert_eq!(failure.failure_kind(), Some(FailureKind::InsufficientData));
    }

    #[test]
    fn test_is_validation() {
        assert!(AnalysisError::validation("empty query").is_validation());
        assert!(
            AnalysisError::from(ConfigValidationError::InvalidWindow(1)).is_validation()
        );
        let failure = AnalysisError::failure(
            "x",
            StatsError::new(FailureKind::ColumnAccess, "cannot cast"),
        );
        assert!(!failure.is_validation());
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::failure(
            "sales",
            StatsError::new(FailureKind::MissingValues, "column has 2 missing values"),
        );
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("ANALYSIS_FAILURE"));
        assert!(json.contains("sales"));
        assert!(json.contains("missing_values"));
    }

    #[test]
    fn test_with_context_preserves_code_and_kind() {
        let error = AnalysisError::failure(
            "sales",
            StatsError::new(FailureKind::SingularMatrix, "design matrix is singular"),
        )
        .with_context("During time-series analysis");
        assert!(error.to_string().contains("During time-series analysis"));
        assert_eq!(error.error_code(), "ANALYSIS_FAILURE");
        assert_eq!(error.failure_kind(), Some(FailureKind::SingularMatrix));
    }

    #[test]
    fn test_failure_kind_tags_are_stable() {
        assert_eq!(FailureKind::InsufficientData.to_string(), "insufficient_data");
        assert_eq!(
            serde_json::to_string(&FailureKind::ColumnAccess).unwrap(),
            "\"column_access\""
        );
    }
}
