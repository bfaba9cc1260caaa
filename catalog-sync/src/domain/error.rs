//! Data quality issues found in a catalog snapshot.
//!
//! These never fail a decode. They are reported so that a broken bundled
//! catalog or a bad remote publish shows up in logs and tests.

/// A data quality problem in a decoded catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogIssue {
    /// The catalog contains no stations at all
    #[error("catalog has no stations")]
    Empty,

    /// The same id is used by more than one station
    #[error("duplicate station id: {0}")]
    DuplicateId(String),
}
