//! Station records.

use serde::{Deserialize, Deserializer, Serialize};

/// One radio station's playable and display metadata.
///
/// Field names on the wire follow the remote catalog document
/// (`streamURL`, `logoImageName`, `websiteURL`, `isEnabled`).
///
/// # Examples
///
/// ```
/// use catalog_sync::domain::StationRecord;
///
/// let json = r#"{"id": "rgl", "name": "Radio Gutt Laun", "streamURL": "https://example.lu/rgl"}"#;
/// let station: StationRecord = serde_json::from_str(json).unwrap();
///
/// // A missing `isEnabled` means the station is enabled.
/// assert!(station.is_enabled);
/// assert_eq!(station.logo_asset_name, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Stable identifier, unique within a catalog snapshot.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Playable stream endpoint.
    #[serde(rename = "streamURL")]
    pub stream_url: String,

    /// Name of a logo asset bundled with the app.
    #[serde(
        rename = "logoImageName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub logo_asset_name: Option<String>,

    /// Station homepage.
    #[serde(rename = "websiteURL", default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    /// Disabled stations stay addressable but are never selectable.
    #[serde(
        rename = "isEnabled",
        default = "enabled_by_default",
        deserialize_with = "null_as_enabled"
    )]
    pub is_enabled: bool,
}

impl StationRecord {
    /// Create an enabled station with no logo or website.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stream_url: stream_url.into(),
            logo_asset_name: None,
            website_url: None,
            is_enabled: true,
        }
    }

    /// Set the bundled logo asset name.
    pub fn with_logo(mut self, asset: impl Into<String>) -> Self {
        self.logo_asset_name = Some(asset.into());
        self
    }

    /// Set the website URL.
    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.website_url = Some(url.into());
        self
    }

    /// Mark the station as disabled.
    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

fn enabled_by_default() -> bool {
    true
}

/// `"isEnabled": null` is treated the same as an absent field.
fn null_as_enabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}
