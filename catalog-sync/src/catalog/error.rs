//! Catalog sync error types.

use std::time::Duration;

/// Errors raised while loading, fetching or selecting from the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog shipped with the build is missing or corrupt
    #[error("bundled catalog unavailable ({location}): {message}")]
    MissingBundledResource { location: String, message: String },

    /// Transport failure or non-success HTTP status
    #[error("network unavailable: {0}")]
    NetworkUnavailable(#[source] reqwest::Error),

    /// The remote did not answer within the request timeout
    #[error("remote catalog request timed out after {}s", .0.as_secs_f32())]
    NetworkTimeout(Duration),

    /// The remote answered with a body that is not a catalog document
    #[error("malformed remote catalog: {message}")]
    MalformedCatalog { message: String },

    /// The catalog has no enabled stations to choose from
    #[error("no enabled stations in catalog version {version}")]
    NoStationsAvailable { version: String },

    /// No station with this id exists in the catalog
    #[error("station not found: {0}")]
    StationNotFound(String),

    /// The station exists but is disabled
    #[error("station is disabled: {0}")]
    StationDisabled(String),

    /// Local cache or preferences I/O failed
    #[error("cache error: {message}")]
    Cache { message: String },
}

impl CatalogError {
    /// Whether this error came from talking to the remote source.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CatalogError::NetworkUnavailable(_)
                | CatalogError::NetworkTimeout(_)
                | CatalogError::MalformedCatalog { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CatalogError::MissingBundledResource {
            location: "embedded".into(),
            message: "expected value at line 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "bundled catalog unavailable (embedded): expected value at line 1"
        );

        let err = CatalogError::NetworkTimeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "remote catalog request timed out after 10s");

        let err = CatalogError::NoStationsAvailable {
            version: "1.2".into(),
        };
        assert_eq!(err.to_string(), "no enabled stations in catalog version 1.2");

        let err = CatalogError::MalformedCatalog {
            message: "missing field `version`".into(),
        };
        assert!(err.to_string().contains("missing field `version`"));
    }

    #[test]
    fn remote_classification() {
        assert!(CatalogError::NetworkTimeout(Duration::from_secs(1)).is_remote());
        assert!(
            CatalogError::MalformedCatalog {
                message: String::new()
            }
            .is_remote()
        );
        assert!(!CatalogError::StationNotFound("x".into()).is_remote());
        assert!(
            !CatalogError::NoStationsAvailable {
                version: "1".into()
            }
            .is_remote()
        );
    }
}
