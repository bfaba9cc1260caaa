//! Domain types for the station catalog.
//!
//! A `Catalog` is an immutable, versioned snapshot of `StationRecord`s held
//! in canonical order. Code that receives a `Catalog` can rely on that order
//! without re-sorting.

mod catalog;
mod error;
mod station;

pub use catalog::{Catalog, canonical_order};
pub use error::CatalogIssue;
pub use station::StationRecord;
