//! Compact, serializable digest of an analysis for narrative generation.

use indexmap::IndexMap;
use polars::prelude::*;
use serde::Serialize;

use crate::types::{
    AnalysisReport, AnalysisResult, CategoricalAnalysis, ColumnType, DataQualityReport,
    DatasetShape, NumericalAnalysis, TimeSeriesAnalysis, TrendDirection,
};

/// What a narrative provider needs to know about one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub shape: DatasetShape,
    /// The analysis strategy that ran (`time_series`, `numerical`, `categorical`).
    pub analysis_type: String,
    pub row_count: usize,
    pub column_count: usize,
    pub datetime_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    /// Physical dtype of every column, in dataset order.
    pub column_dtypes: IndexMap<String, String>,
    /// Recognized semantic type of every classified column.
    pub column_types: IndexMap<String, ColumnType>,
    pub completeness_score: f64,
    /// One-line findings, most specific first.
    pub highlights: Vec<String>,
}

impl DatasetSummary {
    pub fn from_report(df: &DataFrame, report: &AnalysisReport) -> Self {
        let classification = &report.classification;

        let column_dtypes = df
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.dtype().to_string()))
            .collect();

        let column_types = df
            .get_columns()
            .iter()
            .filter_map(|c| {
                let name = c.name().to_string();
                classification.column_type(&name).map(|t| (name, t))
            })
            .collect();

        let mut highlights = match &report.result {
            AnalysisResult::TimeSeries(ts) => time_series_highlights(ts),
            AnalysisResult::Numerical(num) => numerical_highlights(num),
            AnalysisResult::Categorical(cat) => categorical_highlights(cat),
        };
        highlights.extend(quality_highlights(&report.data_quality));
        highlights.extend(report.skipped_columns.iter().map(|skipped| {
            format!("'{}' was left out: {}", skipped.column, skipped.message)
        }));

        Self {
            shape: classification.shape,
            analysis_type: report.result.kind().to_string(),
            row_count: report.data_quality.row_count,
            column_count: report.data_quality.column_count,
            datetime_columns: classification.datetime_columns.clone(),
            numeric_columns: classification.numeric_columns.clone(),
            categorical_columns: classification.categorical_columns.clone(),
            column_dtypes,
            column_types,
            completeness_score: report.data_quality.completeness_score,
            highlights,
        }
    }

    /// Plain-text rendering used as LLM prompt context.
    pub fn to_prompt_context(&self) -> String {
        let mut context = format!(
            "Data Summary:\n\
            - Shape: {}\n\
            - Analysis: {}\n\
            - Rows: {}\n\
            - Columns: {}\n\
            - Completeness: {:.1}%\n",
            self.shape, self.analysis_type, self.row_count, self.column_count, self.completeness_score
        );

        context.push_str("\nColumn Types:\n");
        for (name, dtype) in &self.column_dtypes {
            match self.column_types.get(name) {
                Some(column_type) => {
                    context.push_str(&format!("- {name}: {dtype} ({column_type})\n"))
                }
                None => context.push_str(&format!("- {name}: {dtype}\n")),
            }
        }

        if !self.highlights.is_empty() {
            context.push_str("\nFindings:\n");
            for highlight in &self.highlights {
                context.push_str(&format!("- {highlight}\n"));
            }
        }

        context
    }
}

fn time_series_highlights(ts: &TimeSeriesAnalysis) -> Vec<String> {
    let mut highlights = vec![format!(
        "'{}' is the time axis with {} intervals",
        ts.date_column,
        if ts.regular_intervals { "regular" } else { "irregular" }
    )];

    for (column, trend) in &ts.trends {
        let direction = match trend.trend {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        };
        highlights.push(format!(
            "'{column}' is {direction} (strength {:.2}, mean {:.2}, std {:.2})",
            trend.trend_strength, trend.mean, trend.std
        ));
    }

    for (column, stationarity) in &ts.stationarity {
        let verdict = if stationarity.is_stationary {
            "stationary"
        } else {
            "non-stationary"
        };
        highlights.push(format!(
            "'{column}' is {verdict} (ADF p-value {:.3})",
            stationarity.p_value
        ));
    }

    for (column, change_points) in &ts.change_points {
        if !change_points.significant_changes.is_empty() {
            highlights.push(format!(
                "'{column}' has {} change point(s) at rows {:?}",
                change_points.significant_changes.len(),
                change_points.significant_changes
            ));
        }
    }

    highlights
}

fn numerical_highlights(num: &NumericalAnalysis) -> Vec<String> {
    let mut highlights: Vec<String> = num
        .statistics
        .iter()
        .map(|(column, s)| {
            format!(
                "'{column}': mean {:.2}, median {:.2}, std {:.2}, skew {:.2}",
                s.mean, s.median, s.std, s.skew
            )
        })
        .collect();

    if let Some(matrix) = &num.correlations {
        let mut strongest: Option<(usize, usize, f64)> = None;
        for (i, row) in matrix.values.iter().enumerate() {
            for (j, cell) in row.iter().enumerate().skip(i + 1) {
                if let Some(r) = cell
                    && strongest.is_none_or(|(_, _, best)| r.abs() > best.abs())
                {
                    strongest = Some((i, j, *r));
                }
            }
        }

        if let Some((i, j, r)) = strongest {
            highlights.push(format!(
                "Strongest correlation: '{}' and '{}' (r = {:.2})",
                matrix.columns[i], matrix.columns[j], r
            ));
        }
    }

    highlights
}

fn categorical_highlights(cat: &CategoricalAnalysis) -> Vec<String> {
    cat.frequencies
        .iter()
        .filter_map(|(column, table)| {
            let (top, count) = table.first()?;
            let total: usize = table.values().sum();
            Some(format!(
                "'{column}': {} distinct value(s), most frequent '{top}' ({count} of {total})",
                table.len()
            ))
        })
        .collect()
}

fn quality_highlights(quality: &DataQualityReport) -> Vec<String> {
    let mut highlights: Vec<String> = quality
        .completeness
        .missing_percentage
        .iter()
        .filter(|(_, pct)| **pct > 0.0)
        .map(|(column, pct)| format!("'{column}' is missing {pct:.1}% of values"))
        .collect();

    if quality.duplicate_row_count > 0 {
        highlights.push(format!(
            "{} duplicate row(s) found",
            quality.duplicate_row_count
        ));
    }

    highlights
}
