//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod drop;
pub mod error;
pub mod geo;
pub mod session;
pub mod status;

// Re-export common types
pub use config::AppConfig;
pub use drop::AudioDrop;
pub use error::ConfigError;
pub use geo::{Coordinate, DistanceFilter, Region};
pub use session::{InvalidStateTransition, RecorderSession, SessionState};
pub use status::{Status, StatusIcon};
