use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Classification Types
// ============================================================================

/// Semantic type recognized for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Datetime,
    Numeric,
    Categorical,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic category of a whole dataset, derived from its column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetShape {
    TimeSeries,
    Numerical,
    Categorical,
    Mixed,
    Empty,
}

impl DatasetShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeSeries => "time_series",
            Self::Numerical => "numerical",
            Self::Categorical => "categorical",
            Self::Mixed => "mixed",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for DatasetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column sets and shape label for a dataset.
///
/// The three column lists are disjoint and keep the dataset's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub datetime_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub shape: DatasetShape,
    /// Confidence in the shape label (0-100), only present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ColumnClassification {
    /// Number of classified columns.
    pub fn total_columns(&self) -> usize {
        self.datetime_columns.len() + self.numeric_columns.len() + self.categorical_columns.len()
    }

    /// Look up the recognized type of a column.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        if self.datetime_columns.iter().any(|c| c == name) {
            Some(ColumnType::Datetime)
        } else if self.numeric_columns.iter().any(|c| c == name) {
            Some(ColumnType::Numeric)
        } else if self.categorical_columns.iter().any(|c| c == name) {
            Some(ColumnType::Categorical)
        } else {
            None
        }
    }

    pub fn has_datetime(&self) -> bool {
        !self.datetime_columns.is_empty()
    }

    pub fn has_numeric(&self) -> bool {
        !self.numeric_columns.is_empty()
    }
}

// ============================================================================
// Data Quality Types
// ============================================================================

/// Missing-value counts and rates per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completeness {
    pub missing_values_count: IndexMap<String, usize>,
    pub missing_percentage: IndexMap<String, f64>,
}

/// Distinct-value statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessStats {
    /// Distinct non-missing values.
    pub unique_count: usize,
    pub duplicate_percentage: f64,
}

/// IQR outlier fences and the share of values outside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub count: usize,
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Validity rates for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityStats {
    pub zeros_percentage: f64,
    /// Only present for numeric columns.
    pub negative_percentage: Option<f64>,
    /// Only present for numeric columns with at least one value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierSummary>,
}

/// Completeness, uniqueness and validity of every column in a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub row_count: usize,
    pub column_count: usize,
    /// Rows that exactly repeat an earlier row.
    pub duplicate_row_count: usize,
    /// Percentage of non-missing cells over the whole dataset.
    pub completeness_score: f64,
    pub completeness: Completeness,
    pub uniqueness: IndexMap<String, UniquenessStats>,
    pub validity: IndexMap<String, ValidityStats>,
}

// ============================================================================
// Time-Series Types
// ============================================================================

/// Direction of a series, from the sign of its mean first difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

/// Additive decomposition components with the undefined padding removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendComponents {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub trend: TrendDirection,
    /// |mean first difference| / std, or 0.0 when std is zero or undefined.
    pub trend_strength: f64,
    pub trend_components: TrendComponents,
}

/// Augmented Dickey-Fuller test outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityResult {
    pub is_stationary: bool,
    pub p_value: f64,
    /// `None` for constant series or a degenerate regression.
    pub adf_statistic: Option<f64>,
    pub used_lag: usize,
    pub n_obs: usize,
    /// Keyed by "1%", "5%" and "10%".
    pub critical_values: IndexMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangePointResult {
    pub significant_changes: Vec<usize>,
    pub change_magnitude: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesAnalysis {
    /// The first datetime column, used as the time axis.
    pub date_column: String,
    /// Whether successive timestamps share a single interval.
    pub regular_intervals: bool,
    pub trends: IndexMap<String, TrendAnalysis>,
    pub stationarity: IndexMap<String, StationarityResult>,
    pub change_points: IndexMap<String, ChangePointResult>,
}

// ============================================================================
// Numerical & Categorical Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub skew: f64,
}

/// Pairwise Pearson correlations. Cells without a defined value are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalAnalysis {
    pub statistics: IndexMap<String, NumericalStats>,
    /// Present only when there are at least two numeric columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
}

/// Value -> count, ordered by descending count then first appearance.
pub type FrequencyTable = IndexMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalAnalysis {
    pub frequencies: IndexMap<String, FrequencyTable>,
}

// ============================================================================
// Analysis Result
// ============================================================================

/// Shape-specific analysis, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisResult {
    TimeSeries(TimeSeriesAnalysis),
    Numerical(NumericalAnalysis),
    Categorical(CategoricalAnalysis),
}

impl AnalysisResult {
    /// The `type` discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimeSeries(_) => "time_series",
            Self::Numerical(_) => "numerical",
            Self::Categorical(_) => "categorical",
        }
    }

    pub fn as_time_series(&self) -> Option<&TimeSeriesAnalysis> {
        match self {
            Self::TimeSeries(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_numerical(&self) -> Option<&NumericalAnalysis> {
        match self {
            Self::Numerical(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalAnalysis> {
        match self {
            Self::Categorical(c) => Some(c),
            _ => None,
        }
    }
}

/// A column left out of the result under the skip-failed-columns policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedColumn {
    pub column: String,
    pub code: String,
    pub message: String,
}

/// Full output of one `analyze` call.
///
/// Serializes flat: the `type` tag and the shape-specific fields sit next to
/// `data_quality` and `classification`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub data_quality: DataQualityReport,
    pub classification: ColumnClassification,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_columns: Vec<SkippedColumn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification() -> ColumnClassification {
        ColumnClassification {
            datetime_columns: vec!["date".to_string()],
            numeric_columns: vec!["value".to_string()],
            categorical_columns: vec!["region".to_string()],
            shape: DatasetShape::TimeSeries,
            confidence: None,
        }
    }

    #[test]
    fn test_column_type_lookup() {
        let c = classification();
        assert_eq!(c.column_type("date"), Some(ColumnType::Datetime));
        assert_eq!(c.column_type("value"), Some(ColumnType::Numeric));
        assert_eq!(c.column_type("region"), Some(ColumnType::Categorical));
        assert_eq!(c.column_type("missing"), None);
        assert_eq!(c.total_columns(), 3);
    }

    #[test]
    fn test_confidence_omitted_when_absent() {
        let json = serde_json::to_value(classification()).unwrap();
        assert!(json.get("confidence").is_none());
        assert_eq!(json["shape"], "time_series");
    }

    #[test]
    fn test_analysis_result_is_tagged() {
        let result = AnalysisResult::Categorical(CategoricalAnalysis {
            frequencies: IndexMap::new(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "categorical");
        assert_eq!(result.kind(), "categorical");
    }

    #[test]
    fn test_report_flattens_result() {
        let report = AnalysisReport {
            result: AnalysisResult::Numerical(NumericalAnalysis {
                statistics: IndexMap::new(),
                correlations: None,
            }),
            data_quality: DataQualityReport::default(),
            classification: classification(),
            skipped_columns: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "numerical");
        assert!(json.get("statistics").is_some());
        assert!(json.get("data_quality").is_some());
        assert!(json.get("correlations").is_none());
        assert!(json.get("skipped_columns").is_none());
    }

    #[test]
    fn test_correlation_lookup() {
        let matrix = CorrelationMatrix {
            columns: vec!["a".to_string(), "b".to_string()],
            values: vec![vec![Some(1.0), Some(0.5)], vec![Some(0.5), Some(1.0)]],
        };
        assert_eq!(matrix.get("a", "b"), Some(0.5));
        assert_eq!(matrix.get("a", "c"), None);
    }
}
