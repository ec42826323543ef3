//! Column classification.
//!
//! Assigns every column to exactly one of datetime, numeric or categorical and
//! derives the dataset shape from those sets. The same classification drives
//! both the shape label and the analysis strategy.

mod type_inference;

use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::{ColumnClassification, ColumnType, DatasetShape};
use crate::utils::series_to_timestamps;

use type_inference::recognize_column_type;

/// Classifies dataset columns and labels the dataset shape.
pub struct ColumnClassifier;

impl ColumnClassifier {
    /// Classify every column of the dataset.
    ///
    /// Fails with a validation error when the dataset has no columns.
    pub fn classify(df: &DataFrame) -> Result<ColumnClassification> {
        if df.width() == 0 {
            return Err(AnalysisError::validation("dataset has no columns"));
        }

        let mut datetime_columns = Vec::new();
        let mut numeric_columns = Vec::new();
        let mut categorical_columns = Vec::new();

        for column in df.get_columns() {
            let name = column.name().to_string();
            let column_type = recognize_column_type(column.as_materialized_series())
                .context(format!("Failed to classify column '{name}'"))?;

            debug!(column = %name, column_type = %column_type, "Classified column");
            match column_type {
                ColumnType::Datetime => datetime_columns.push(name),
                ColumnType::Numeric => numeric_columns.push(name),
                ColumnType::Categorical => categorical_columns.push(name),
            }
        }

        let shape = derive_shape(
            df.height(),
            datetime_columns.len(),
            numeric_columns.len(),
            categorical_columns.len(),
        );

        Ok(ColumnClassification {
            datetime_columns,
            numeric_columns,
            categorical_columns,
            shape,
            confidence: None,
        })
    }

    /// Classify and attach a confidence score (0-100, two decimals).
    pub fn classify_with_confidence(df: &DataFrame) -> Result<ColumnClassification> {
        let mut classification = Self::classify(df)?;
        classification.confidence = Some(shape_confidence(&classification));
        Ok(classification)
    }
}

fn derive_shape(rows: usize, datetime: usize, numeric: usize, categorical: usize) -> DatasetShape {
    let total = datetime + numeric + categorical;
    if rows == 0 {
        DatasetShape::Empty
    } else if datetime > 0 && numeric > 0 {
        DatasetShape::TimeSeries
    } else if numeric == total {
        DatasetShape::Numerical
    } else if categorical == total {
        DatasetShape::Categorical
    } else {
        DatasetShape::Mixed
    }
}

/// Confidence in the shape label.
///
/// Time series: share of datetime and numeric columns, halved. Uniform shapes
/// score 100. Mixed: share of the most common column type.
fn shape_confidence(classification: &ColumnClassification) -> f64 {
    let total = classification.total_columns();
    if total == 0 {
        return 0.0;
    }

    let datetime = classification.datetime_columns.len();
    let numeric = classification.numeric_columns.len();
    let categorical = classification.categorical_columns.len();

    let raw = match classification.shape {
        DatasetShape::Empty => 0.0,
        DatasetShape::TimeSeries => (datetime + numeric) as f64 / (2 * total) as f64 * 100.0,
        DatasetShape::Numerical | DatasetShape::Categorical => 100.0,
        DatasetShape::Mixed => {
            let dominant = numeric.max(categorical).max(datetime);
            dominant as f64 / total as f64 * 100.0
        }
    };

    (raw * 100.0).round() / 100.0
}

/// Whether the first datetime column advances in equal steps.
///
/// Successive differences are taken between adjacent rows where both values
/// are present. At most one distinct difference means regular; a column with
/// no such pair counts as regular. Returns `false` when there is no datetime
/// column or it cannot be read.
pub fn has_regular_intervals(df: &DataFrame, classification: &ColumnClassification) -> bool {
    let Some(date_column) = classification.datetime_columns.first() else {
        return false;
    };

    let timestamps = match df
        .column(date_column)
        .and_then(|c| series_to_timestamps(c.as_materialized_series()))
    {
        Ok(ts) => ts,
        Err(e) => {
            warn!(column = %date_column, error = %e, "Could not read datetime column");
            return false;
        }
    };

    let intervals: HashSet<i64> = timestamps
        .windows(2)
        .filter_map(|w| Some(w[1]? - w[0]?))
        .collect();

    debug!(column = %date_column, distinct_intervals = intervals.len(), "Checked interval regularity");
    intervals.len() <= 1
}
