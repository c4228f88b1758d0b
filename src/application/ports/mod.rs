//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod location;
pub mod player;
pub mod recorder;
pub mod store;

// Re-export common types
pub use config::ConfigStore;
pub use location::{AuthorizationStatus, LocationProvider};
pub use player::{ClipPlayer, PlaybackError};
pub use recorder::{CaptureError, ClipRecorder};
pub use store::{DropStore, StoreError};
