//! Application layer - Use cases and port interfaces
//!
//! Contains the core coordination logic and trait definitions
//! for external system interactions.

pub mod coordinator;
pub mod ports;

// Re-export the use case surface
pub use coordinator::{Command, DropCoordinator, ViewState};
