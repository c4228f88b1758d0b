//! Playback infrastructure module
//!
//! Clip playback through the default output device using rodio.

mod rodio_player;

pub use rodio_player::RodioClipPlayer;
