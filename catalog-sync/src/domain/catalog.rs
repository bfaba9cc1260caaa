//! Versioned station catalogs.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Deserialize;

use super::error::CatalogIssue;
use super::station::StationRecord;

/// Wire form of a catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    version: String,
    last_updated: String,
    stations: Vec<StationRecord>,
}

/// Canonical station order: ascending by name, case-sensitive, ties by id.
///
/// Names compare by Unicode scalar value, so `"Zebra"` sorts before
/// `"apple"`. Every listing in the crate goes through this ordering.
pub fn canonical_order(a: &StationRecord, b: &StationRecord) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// An immutable, versioned snapshot of the station list.
///
/// Stations are always held in canonical order. Versions are opaque:
/// two catalogs are "different" exactly when their version strings differ.
///
/// # Examples
///
/// ```
/// use catalog_sync::domain::{Catalog, StationRecord};
///
/// let catalog = Catalog::new(
///     "1.0",
///     "2025-01-15",
///     vec![
///         StationRecord::new("b", "eldoradio", "https://b"),
///         StationRecord::new("a", "Radio ARA", "https://a").disabled(),
///         StationRecord::new("c", "Eldoradio", "https://c"),
///     ],
/// );
///
/// let names: Vec<_> = catalog.stations().iter().map(|s| s.name.as_str()).collect();
/// assert_eq!(names, ["Eldoradio", "Radio ARA", "eldoradio"]);
/// assert_eq!(catalog.selectable().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    version: String,
    last_updated: String,
    stations: Vec<StationRecord>,
}

impl Catalog {
    /// Build a catalog, putting the stations in canonical order.
    pub fn new(
        version: impl Into<String>,
        last_updated: impl Into<String>,
        mut stations: Vec<StationRecord>,
    ) -> Self {
        stations.sort_by(canonical_order);
        Self {
            version: version.into(),
            last_updated: last_updated.into(),
            stations,
        }
    }

    /// Decode a catalog document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let doc: CatalogDocument = serde_json::from_slice(bytes)?;
        Ok(Self::new(doc.version, doc.last_updated, doc.stations))
    }

    /// The catalog version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Source timestamp, for display only.
    pub fn last_updated(&self) -> &str {
        &self.last_updated
    }

    /// All stations in canonical order, disabled ones included.
    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations a listener may pick, in canonical order.
    pub fn selectable(&self) -> impl Iterator<Item = &StationRecord> {
        self.stations.iter().filter(|s| s.is_enabled)
    }

    /// Number of enabled stations.
    pub fn enabled_count(&self) -> usize {
        self.selectable().count()
    }

    /// First enabled station in canonical order.
    pub fn first_enabled(&self) -> Option<&StationRecord> {
        self.selectable().next()
    }

    /// Look up any station by id, including disabled ones.
    pub fn station(&self, id: &str) -> Option<&StationRecord> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Look up a station by id, only if it is enabled.
    pub fn enabled_station(&self, id: &str) -> Option<&StationRecord> {
        self.station(id).filter(|s| s.is_enabled)
    }

    /// Stream URL of an enabled station.
    pub fn stream_url(&self, id: &str) -> Option<&str> {
        self.enabled_station(id).map(|s| s.stream_url.as_str())
    }

    /// Check the snapshot for data quality issues.
    ///
    /// Returns an empty list for a healthy catalog.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        if self.stations.is_empty() {
            issues.push(CatalogIssue::Empty);
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.id.as_str()) && reported.insert(station.id.as_str()) {
                issues.push(CatalogIssue::DuplicateId(station.id.clone()));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(
            "1.1",
            "2025-02-01",
            vec![
                StationRecord::new("rtl", "RTL Radio", "https://rtl"),
                StationRecord::new("ara", "Radio ARA", "https://ara").disabled(),
                StationRecord::new("eldo", "Eldoradio", "https://eldo"),
                StationRecord::new("rgl", "Radio Gutt Laun", "https://rgl"),
            ],
        )
    }

    #[test]
    fn decode_document() {
        let json = br#"{
            "version": "1.0",
            "last_updated": "2025-01-15",
            "stations": [
                {"id": "b", "name": "B", "streamURL": "https://b"},
                {"id": "a", "name": "A", "streamURL": "https://a", "isEnabled": false}
            ]
        }"#;

        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.version(), "1.0");
        assert_eq!(catalog.last_updated(), "2025-01-15");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.stations()[0].id, "a");
        assert_eq!(catalog.enabled_count(), 1);
    }

    #[test]
    fn missing_last_updated_is_rejected() {
        let json = br#"{"version": "2", "stations": []}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("last_updated"));

        let empty = Catalog::from_json(br#"{"version": "2", "last_updated": "", "stations": []}"#)
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn missing_version_is_rejected() {
        let json = br#"{"stations": []}"#;
        assert!(Catalog::from_json(json).is_err());
    }

    #[test]
    fn canonical_order_is_case_sensitive() {
        let catalog = Catalog::new(
            "1",
            "",
            vec![
                StationRecord::new("1", "apple", "https://1"),
                StationRecord::new("2", "Zebra", "https://2"),
                StationRecord::new("3", "Apple", "https://3"),
            ],
        );

        let names: Vec<_> = catalog.stations().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Apple", "Zebra", "apple"]);
    }

    #[test]
    fn equal_names_ordered_by_id() {
        let catalog = Catalog::new(
            "1",
            "",
            vec![
                StationRecord::new("z", "Same", "https://z"),
                StationRecord::new("a", "Same", "https://a"),
            ],
        );
        assert_eq!(catalog.stations()[0].id, "a");
        assert_eq!(catalog.stations()[1].id, "z");
    }

    #[test]
    fn selectable_skips_disabled() {
        let catalog = sample();
        let ids: Vec<_> = catalog.selectable().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["eldo", "rtl", "rgl"]);
        assert_eq!(catalog.first_enabled().map(|s| s.id.as_str()), Some("eldo"));
    }

    #[test]
    fn disabled_station_stays_addressable() {
        let catalog = sample();
        assert!(catalog.station("ara").is_some());
        assert!(catalog.enabled_station("ara").is_none());
        assert_eq!(catalog.stream_url("ara"), None);
        assert_eq!(catalog.stream_url("rgl"), Some("https://rgl"));
        assert!(catalog.station("unknown").is_none());
    }

    #[test]
    fn validate_healthy_catalog() {
        assert!(sample().validate().is_empty());
    }

    #[test]
    fn validate_reports_empty_and_duplicates() {
        let empty = Catalog::new("1", "", Vec::new());
        assert_eq!(empty.validate(), vec![CatalogIssue::Empty]);

        let dupes = Catalog::new(
            "1",
            "",
            vec![
                StationRecord::new("x", "One", "https://1"),
                StationRecord::new("x", "Two", "https://2"),
                StationRecord::new("x", "Three", "https://3"),
            ],
        );
        assert_eq!(
            dupes.validate(),
            vec![CatalogIssue::DuplicateId("x".into())]
        );
    }

    #[test]
    fn shipped_bundled_catalog_is_healthy() {
        let bytes = include_bytes!("../../data/stations.json");
        let catalog = Catalog::from_json(bytes).unwrap();

        assert!(!catalog.is_empty());
        assert!(catalog.validate().is_empty(), "{:?}", catalog.validate());
        assert!(catalog.enabled_station("rgl").is_some());
    }
}
