//! The audio drop record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::geo::Coordinate;

/// A recorded clip anchored to a geographic position.
///
/// Immutable once created: the store constructs one after the clip's audio
/// has been copied into place, and nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioDrop {
    pub id: Uuid,
    pub coordinate: Coordinate,
    pub audio_filename: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub notes: String,
}

impl AudioDrop {
    /// Display name for the drop's author, falling back for anonymous drops
    pub fn title(&self) -> &str {
        if self.owner.is_empty() {
            "Someone"
        } else {
            &self.owner
        }
    }

    /// Distance from a reference position in meters
    pub fn distance_from(&self, position: &Coordinate) -> f64 {
        self.coordinate.distance_m(position)
    }

    /// Short identifier used in listings
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_drop(owner: &str) -> AudioDrop {
        AudioDrop {
            id: Uuid::new_v4(),
            coordinate: Coordinate::new(37.3349, -122.00902),
            audio_filename: "sample.flac".to_string(),
            owner: owner.to_string(),
            created_at: Utc::now(),
            notes: "a note".to_string(),
        }
    }

    #[test]
    fn title_uses_owner_when_present() {
        assert_eq!(sample_drop("Alice").title(), "Alice");
    }

    #[test]
    fn title_falls_back_for_anonymous_drops() {
        assert_eq!(sample_drop("").title(), "Someone");
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(sample_drop("Alice").short_id().len(), 8);
    }

    #[test]
    fn distance_from_drop_position_is_zero() {
        let drop = sample_drop("Alice");
        let at = Coordinate::new(37.3349, -122.00902);
        assert!(drop.distance_from(&at) < 1e-6);
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let drop = sample_drop("Alice");
        let json = serde_json::to_string_pretty(&drop).unwrap();
        let back: AudioDrop = serde_json::from_str(&json).unwrap();
        assert_eq!(drop, back);
    }

    #[test]
    fn timestamp_round_trips_through_json() {
        let drop = sample_drop("Alice");
        let json = serde_json::to_string(&drop).unwrap();
        let back: AudioDrop = serde_json::from_str(&json).unwrap();
        assert_eq!(drop.created_at, back.created_at);
    }
}
