use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::DEFAULT_OUTLIER_IQR_MULTIPLIER;
use crate::statistics::iqr_bounds;
use crate::types::{DataQualityReport, OutlierSummary, UniquenessStats, ValidityStats};
use crate::utils::{is_numeric_dtype, missing_count, percentage, present_values, series_to_f64};

pub struct DataQualityAssessor;

impl DataQualityAssessor {
    /// Assess a dataset with the default 1.5×IQR outlier fences.
    pub fn assess(df: &DataFrame) -> DataQualityReport {
        Self::assess_with_multiplier(df, DEFAULT_OUTLIER_IQR_MULTIPLIER)
    }

    /// Assess a dataset with custom outlier fences.
    ///
    /// All percentages are taken over the full row count, so a dataset without
    /// rows reports zeros throughout.
    pub fn assess_with_multiplier(df: &DataFrame, iqr_multiplier: f64) -> DataQualityReport {
        let rows = df.height();
        let mut report = DataQualityReport {
            row_count: rows,
            column_count: df.width(),
            duplicate_row_count: Self::count_duplicate_rows(df),
            ..Default::default()
        };

        let mut total_missing = 0usize;
        for column in df.get_columns() {
            let name = column.name().to_string();
            let series = column.as_materialized_series();

            let missing = missing_count(series);
            total_missing += missing;
            report
                .completeness
                .missing_values_count
                .insert(name.clone(), missing);
            report
                .completeness
                .missing_percentage
                .insert(name.clone(), percentage(missing, rows));

            report
                .uniqueness
                .insert(name.clone(), Self::uniqueness(&name, series, rows));
            report
                .validity
                .insert(name.clone(), Self::validity(&name, series, rows, iqr_multiplier));
        }

        let cells = rows * df.width();
        report.completeness_score = if cells == 0 {
            0.0
        } else {
            100.0 - percentage(total_missing, cells)
        };

        debug!(
            rows,
            columns = report.column_count,
            completeness = report.completeness_score,
            "Assessed data quality"
        );
        report
    }

    fn count_duplicate_rows(df: &DataFrame) -> usize {
        if df.height() == 0 || df.width() == 0 {
            return 0;
        }

        match df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None) {
            Ok(unique) => df.height() - unique.height(),
            Err(e) => {
                warn!(error = %e, "Could not count duplicate rows");
                0
            }
        }
    }

    fn uniqueness(name: &str, series: &Series, rows: usize) -> UniquenessStats {
        let unique_count = if is_numeric_dtype(series.dtype()) {
            // NaN counts as missing, not as a distinct value
            series_to_f64(series)
                .map(|values| {
                    let mut present = present_values(&values);
                    present.sort_by(|a, b| a.total_cmp(b));
                    present.dedup();
                    present.len()
                })
                .map_err(|e| e.to_string())
        } else {
            series.drop_nulls().n_unique().map_err(|e| e.to_string())
        }
        .unwrap_or_else(|e| {
            warn!(column = name, error = %e, "Could not count distinct values");
            0
        });

        UniquenessStats {
            unique_count,
            duplicate_percentage: percentage(rows.saturating_sub(unique_count), rows),
        }
    }

    fn validity(name: &str, series: &Series, rows: usize, iqr_multiplier: f64) -> ValidityStats {
        if !is_numeric_dtype(series.dtype()) {
            return ValidityStats {
                zeros_percentage: 0.0,
                negative_percentage: None,
                outliers: None,
            };
        }

        let values = match series_to_f64(series) {
            Ok(values) => present_values(&values),
            Err(e) => {
                warn!(column = name, error = %e, "Could not read numeric column");
                Vec::new()
            }
        };

        let zeros = values.iter().filter(|v| **v == 0.0).count();
        let negatives = values.iter().filter(|v| **v < 0.0).count();

        let outliers = iqr_bounds(&values, iqr_multiplier).map(|(lower, upper)| {
            let count = values.iter().filter(|v| **v < lower || **v > upper).count();
            OutlierSummary {
                count,
                percentage: percentage(count, rows),
                lower_bound: lower,
                upper_bound: upper,
            }
        });

        ValidityStats {
            zeros_percentage: percentage(zeros, rows),
            negative_percentage: Some(percentage(negatives, rows)),
            outliers,
        }
    }
}
