//! Numerical strategy: descriptive statistics per numeric column and the
//! pairwise correlation matrix.

use indexmap::IndexMap;
use polars::prelude::*;

use super::{ColumnRunner, numeric_column};
use crate::error::Result;
use crate::statistics::{correlation_matrix, mean, median, sample_std, skewness};
use crate::types::{ColumnClassification, CorrelationMatrix, NumericalAnalysis, NumericalStats};
use crate::utils::present_values;

pub(super) fn analyze(
    df: &DataFrame,
    classification: &ColumnClassification,
    runner: &mut ColumnRunner,
) -> Result<NumericalAnalysis> {
    let mut statistics = IndexMap::new();
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for column in &classification.numeric_columns {
        let Some(column_values) = runner.run(column, || numeric_column(df, column))? else {
            continue;
        };

        statistics.insert(column.clone(), describe(&present_values(&column_values)));
        columns.push(column.clone());
        values.push(column_values);
    }

    let correlations = (columns.len() >= 2).then(|| CorrelationMatrix {
        values: correlation_matrix(&values),
        columns,
    });

    Ok(NumericalAnalysis {
        statistics,
        correlations,
    })
}

fn describe(present: &[f64]) -> NumericalStats {
    NumericalStats {
        mean: mean(present),
        median: median(present),
        std: sample_std(present),
        skew: skewness(present),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let stats = describe(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert_eq!(stats.mean, 22.0);
        assert_eq!(stats.median, 3.0);
        assert!(stats.std > 0.0);
        assert!(stats.skew > 0.0);
    }

    #[test]
    fn test_describe_single_value() {
        let stats = describe(&[7.0]);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.median, 7.0);
        assert!(stats.std.is_nan());
        assert!(stats.skew.is_nan());
    }
}
