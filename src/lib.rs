//! GeoDrop - location-tagged audio drops
//!
//! This crate records short audio clips from the microphone, tags each one
//! with the position it was recorded at, and stores them locally for later
//! discovery and playback.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core value objects (coordinates, drops, statuses) and errors
//! - **Application**: The drop coordinator and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, filesystem)
//! - **CLI**: Command-line interface and argument parsing

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
