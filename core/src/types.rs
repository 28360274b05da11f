//! Shared primitive types used across the entire pipeline.

use chrono::NaiveDate;

/// Stable officer identity. Assigned upstream, never reissued.
pub type TaxId = i64;

/// CCRB complaint identifier. One complaint fans out to many allegation rows.
pub type ComplaintId = i64;

/// Court docket / index number of a lawsuit.
pub type DocketNumber = String;

/// The canonical run identifier.
pub type RunId = String;

/// Calendar date. All windowing is done at day granularity.
pub type Date = NaiveDate;

/// ISO format used for every stored or imported date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
