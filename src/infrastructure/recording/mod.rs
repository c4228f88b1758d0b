//! Recording infrastructure module
//!
//! Cross-platform clip capture using cpal, finalized as FLAC files.

mod cpal_recorder;
mod flac;

pub use cpal_recorder::CpalClipRecorder;
pub use flac::{encode_to_flac, CLIP_SAMPLE_RATE};
