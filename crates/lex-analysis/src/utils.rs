//! Shared utilities for reading polars columns into plain Rust values.
//!
//! Statistical routines in this crate work on slices; these helpers are the
//! single place where a `Series` is turned into `f64`s, strings or timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
///
/// `Int128` is included since `dtype-full` enables it. Unsigned 128-bit
/// integers and decimals are left out and classify as categorical.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Int128
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_string_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

// =============================================================================
// Date/Time Parsing Utilities
// =============================================================================

// Cheap shape checks before handing a value to chrono
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: ISO"),
    ]
});

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a string as a date or datetime.
///
/// Accepts ISO dates, slash/dash separated dates, date-times with a space or
/// `T` separator and RFC 3339 timestamps. Bare numbers are rejected so numeric
/// identifiers and epoch values are never mistaken for dates.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::utils::parse_datetime_str;
///
/// assert!(parse_datetime_str("2024-01-15").is_some());
/// assert!(parse_datetime_str("2024-01-15T10:30:00Z").is_some());
/// assert!(parse_datetime_str("20240115").is_none());
/// ```
pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Check if a string is a parseable date/time.
pub fn is_datetime_string(s: &str) -> bool {
    parse_datetime_str(s).is_some()
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Read a numeric series as `f64`, keeping missing values as `None`.
///
/// Float NaN is treated as missing, matching how the analysis counts gaps.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read any series as strings, keeping missing values as `None`.
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    let values = str_series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Read a temporal or date-like text series as comparable integer timestamps.
///
/// Native temporal columns yield their physical representation (days for
/// `Date`, the column's time unit for `Datetime`, nanoseconds for `Time`);
/// text columns are parsed and yield seconds since the epoch.
pub fn series_to_timestamps(series: &Series) -> PolarsResult<Vec<Option<i64>>> {
    if is_datetime_dtype(series.dtype()) {
        let physical = series.cast(&DataType::Int64)?;
        return Ok(physical.i64()?.into_iter().collect());
    }

    Ok(series_to_strings(series)?
        .into_iter()
        .map(|v| {
            v.and_then(|s| parse_datetime_str(&s))
                .map(|dt| dt.and_utc().timestamp())
        })
        .collect())
}

/// Count the missing entries in a series (nulls, plus NaN for float columns).
pub fn missing_count(series: &Series) -> usize {
    match series.dtype() {
        DataType::Float32 | DataType::Float64 => series_to_f64(series)
            .map(|values| values.iter().filter(|v| v.is_none()).count())
            .unwrap_or_else(|_| series.null_count()),
        _ => series.null_count(),
    }
}

/// Drop missing values, keeping observation order.
pub fn present_values(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Percentage helper that returns 0.0 for an empty denominator.
#[inline]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Int128));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_is_datetime_dtype() {
        assert!(is_datetime_dtype(&DataType::Date));
        assert!(is_datetime_dtype(&DataType::Datetime(
            TimeUnit::Milliseconds,
            None
        )));
        assert!(!is_datetime_dtype(&DataType::String));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(is_datetime_string("2024-01-15"));
        assert!(is_datetime_string("2024/01/15"));
        assert!(is_datetime_string("01/15/2024"));
        assert!(is_datetime_string("2024-01-15 10:30:00"));
        assert!(is_datetime_string("2024-01-15T10:30:00"));
        assert!(is_datetime_string("2024-01-15T10:30:00Z"));
        assert!(is_datetime_string("  2024-01-15  "));
    }

    #[test]
    fn test_parse_datetime_rejects_non_dates() {
        assert!(!is_datetime_string("20240115"));
        assert!(!is_datetime_string("42"));
        assert!(!is_datetime_string("hello"));
        assert!(!is_datetime_string(""));
        assert!(!is_datetime_string("2024-13-45"));
    }

    #[test]
    fn test_series_to_f64_keeps_missing() {
        let series = Series::new("v".into(), &[Some(1i64), None, Some(3)]);
        let values = series_to_f64(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_series_to_f64_treats_nan_as_missing() {
        let series = Series::new("v".into(), &[1.0f64, f64::NAN, 3.0]);
        let values = series_to_f64(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(missing_count(&series), 1);
    }

    #[test]
    fn test_series_to_timestamps_from_strings() {
        let series = Series::new("d".into(), &[Some("2024-01-01"), None, Some("2024-01-02")]);
        let ts = series_to_timestamps(&series).unwrap();
        assert_eq!(ts[1], None);
        assert_eq!(ts[2].unwrap() - ts[0].unwrap(), 86_400);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(5, 20), 25.0);
    }
}
