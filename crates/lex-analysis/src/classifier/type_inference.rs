//! Per-column type recognition.

use polars::prelude::*;

use crate::types::ColumnType;
use crate::utils::{is_datetime_dtype, is_datetime_string, is_numeric_dtype, is_string_dtype};

/// Recognize the semantic type of one column.
///
/// Native temporal dtypes are datetime. Text columns are datetime when they
/// have at least one value and every non-missing value parses as a date.
/// Integer and float dtypes are numeric; everything else (booleans, free
/// text, nested types) is categorical.
pub(crate) fn recognize_column_type(series: &Series) -> PolarsResult<ColumnType> {
    let dtype = series.dtype();

    if is_datetime_dtype(dtype) {
        return Ok(ColumnType::Datetime);
    }

    if is_string_dtype(dtype) && is_date_text_column(series)? {
        return Ok(ColumnType::Datetime);
    }

    if is_numeric_dtype(dtype) {
        return Ok(ColumnType::Numeric);
    }

    Ok(ColumnType::Categorical)
}

fn is_date_text_column(series: &Series) -> PolarsResult<bool> {
    let text = series.cast(&DataType::String)?;
    let mut seen_any = false;

    for value in text.str()?.into_iter().flatten() {
        if !is_datetime_string(value) {
            return Ok(false);
        }
        seen_any = true;
    }

    Ok(seen_any)
}
