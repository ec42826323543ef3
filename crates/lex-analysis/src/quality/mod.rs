//! Data quality assessment.
//!
//! Reports per-column completeness, uniqueness and validity alongside
//! dataset-level counts. Assessment never fails; unreadable columns are
//! logged and reported with neutral values.

mod assessor;

pub use assessor::DataQualityAssessor;
