//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::geo::{Coordinate, DEFAULT_REGION_SPAN};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name attached to new drops
    pub owner: Option<String>,
    /// Position reported by the fixed location provider
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Master switch for location services
    pub location_enabled: Option<bool>,
    /// Override for the drop store directory
    pub data_dir: Option<String>,
    /// Map span in decimal degrees
    pub map_span: Option<f64>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            owner: Some(String::new()),
            latitude: None,
            longitude: None,
            location_enabled: Some(true),
            data_dir: None,
            map_span: Some(DEFAULT_REGION_SPAN),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            owner: other.owner.or(self.owner),
            latitude: other.latitude.or(self.latitude),
            longitude: other.longitude.or(self.longitude),
            location_enabled: other.location_enabled.or(self.location_enabled),
            data_dir: other.data_dir.or(self.data_dir),
            map_span: other.map_span.or(self.map_span),
        }
    }

    pub fn owner_or_default(&self) -> &str {
        self.owner.as_deref().unwrap_or("")
    }

    /// The configured position, when both halves are present
    pub fn fixed_position(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }

    pub fn location_enabled_or_default(&self) -> bool {
        self.location_enabled.unwrap_or(true)
    }

    pub fn map_span_or_default(&self) -> f64 {
        self.map_span.unwrap_or(DEFAULT_REGION_SPAN)
    }
}
