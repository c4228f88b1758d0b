//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio devices, the filesystem, and the
//! configured location source.

pub mod config;
pub mod location;
pub mod playback;
pub mod recording;
pub mod store;

// Re-export adapters
pub use config::XdgConfigStore;
pub use location::FixedLocationProvider;
pub use playback::RodioClipPlayer;
pub use recording::CpalClipRecorder;
pub use store::FsDropStore;
