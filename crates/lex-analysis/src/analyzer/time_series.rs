//! Time-series strategy: trend, decomposition, stationarity and change points
//! for every numeric column.

use indexmap::IndexMap;
use polars::prelude::*;
use tracing::debug;

use super::{ColumnRunner, numeric_column};
use crate::classifier::has_regular_intervals;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::statistics::{
    Decomposition, adfuller, detect_change_points, mean, mean_difference, sample_std,
    seasonal_decompose,
};
use crate::types::{
    ChangePointResult, ColumnClassification, StationarityResult, TimeSeriesAnalysis,
    TrendAnalysis, TrendComponents, TrendDirection,
};
use crate::utils::present_values;

struct ColumnSeries {
    trend: TrendAnalysis,
    stationarity: StationarityResult,
    change_points: ChangePointResult,
}

pub(super) fn analyze(
    df: &DataFrame,
    classification: &ColumnClassification,
    config: &AnalysisConfig,
    runner: &mut ColumnRunner,
) -> Result<TimeSeriesAnalysis> {
    let date_column = classification
        .datetime_columns
        .first()
        .cloned()
        .ok_or_else(|| AnalysisError::validation("time-series analysis needs a datetime column"))?;

    let mut analysis = TimeSeriesAnalysis {
        regular_intervals: has_regular_intervals(df, classification),
        date_column,
        trends: IndexMap::new(),
        stationarity: IndexMap::new(),
        change_points: IndexMap::new(),
    };

    for column in &classification.numeric_columns {
        let Some(series) = runner.run(column, || analyze_column(df, column, config))? else {
            continue;
        };
        analysis.trends.insert(column.clone(), series.trend);
        analysis.stationarity.insert(column.clone(), series.stationarity);
        analysis.change_points.insert(column.clone(), series.change_points);
    }

    Ok(analysis)
}

fn analyze_column(df: &DataFrame, column: &str, config: &AnalysisConfig) -> Result<ColumnSeries> {
    let values = numeric_column(df, column)?;
    let present = present_values(&values);

    let period = values.len().min(config.max_seasonal_period);
    let components = seasonal_decompose(&values, period)
        .map_err(|e| AnalysisError::failure(column, e))?
        .dropna();

    let trend = trend_analysis(&values, &present, components);

    let adf = adfuller(&present).map_err(|e| AnalysisError::failure(column, e))?;
    let stationarity = StationarityResult {
        // NaN p-values compare false, so undefined statistics are never stationary
        is_stationary: adf.p_value < config.significance_level,
        p_value: adf.p_value,
        adf_statistic: adf.statistic,
        used_lag: adf.used_lag,
        n_obs: adf.n_obs,
        critical_values: adf.critical_values,
    };

    let found = detect_change_points(
        &values,
        config.change_point_window,
        config.change_point_threshold,
    );

    debug!(
        "Column '{}': trend {:?}, p-value {:.4}, {} change point(s)",
        column,
        trend.trend,
        stationarity.p_value,
        found.indices.len()
    );

    Ok(ColumnSeries {
        trend,
        stationarity,
        change_points: ChangePointResult {
            significant_changes: found.indices,
            change_magnitude: found.magnitudes,
        },
    })
}

fn trend_analysis(
    values: &[Option<f64>],
    present: &[f64],
    components: Decomposition,
) -> TrendAnalysis {
    let mean = mean(present);
    let std = sample_std(present);
    let mean_diff = mean_difference(values);

    let trend = if mean_diff > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    // A flat or single-valued column has no meaningful strength
    let trend_strength = if std == 0.0 || !std.is_finite() {
        0.0
    } else {
        (mean_diff / std).abs()
    };

    TrendAnalysis {
        mean,
        std,
        trend,
        trend_strength,
        trend_components: TrendComponents {
            trend: components.trend,
            seasonal: components.seasonal,
            residual: components.residual,
        },
    }
}
