//! Categorical strategy: a frequency table per categorical column.

use indexmap::IndexMap;
use polars::prelude::*;

use super::{ColumnRunner, column_access_error};
use crate::error::Result;
use crate::types::{CategoricalAnalysis, ColumnClassification, FrequencyTable};
use crate::utils::series_to_strings;

pub(super) fn analyze(
    df: &DataFrame,
    classification: &ColumnClassification,
    runner: &mut ColumnRunner,
) -> Result<CategoricalAnalysis> {
    let mut frequencies = IndexMap::new();

    for column in &classification.categorical_columns {
        let table = runner.run(column, || {
            df.column(column)
                .and_then(|c| series_to_strings(c.as_materialized_series()))
                .map(|values| frequency_table(&values))
                .map_err(|e| column_access_error(column, e))
        })?;

        if let Some(table) = table {
            frequencies.insert(column.clone(), table);
        }
    }

    Ok(CategoricalAnalysis { frequencies })
}

/// Count non-missing values; descending count, ties by first appearance.
fn frequency_table(values: &[Option<String>]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for value in values.iter().flatten() {
        *table.entry(value.clone()).or_insert(0) += 1;
    }
    // Stable sort keeps first-appearance order among equal counts
    table.sort_by(|_, a, _, b| b.cmp(a));
    table
}
