//! User-facing status value object

use std::fmt;

use crate::domain::geo::Coordinate;

/// Semantic icon accompanying a status message.
///
/// Presentation layers map these to whatever glyphs they have; the domain
/// only records the meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Waveform,
    RecordingMic,
    MicOff,
    Location,
    LocationSearch,
    LocationOff,
    Pin,
    Play,
    Warning,
}

impl StatusIcon {
    /// Terminal glyph for the icon
    pub const fn glyph(&self) -> &'static str {
        match self {
            Self::Waveform => "~",
            Self::RecordingMic => "●",
            Self::MicOff => "⊘",
            Self::Location => "◎",
            Self::LocationSearch => "…",
            Self::LocationOff => "⊗",
            Self::Pin => "▼",
            Self::Play => "▶",
            Self::Warning => "!",
        }
    }
}

/// A short human-readable status plus its icon.
///
/// Every error and every milestone the coordinator can hit is converted
/// into one of these; nothing is ever surfaced as a crash.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub message: String,
    pub icon: StatusIcon,
}

impl Status {
    fn new(message: impl Into<String>, icon: StatusIcon) -> Self {
        Self {
            message: message.into(),
            icon,
        }
    }

    pub fn initializing() -> Self {
        Self::new("Initializing...", StatusIcon::Waveform)
    }

    pub fn requesting_location() -> Self {
        Self::new("Requesting location access", StatusIcon::Location)
    }

    pub fn location_denied() -> Self {
        Self::new("Location access denied", StatusIcon::LocationOff)
    }

    pub fn searching_for_location() -> Self {
        Self::new("Searching for your location", StatusIcon::LocationSearch)
    }

    pub fn listening_near(position: Coordinate) -> Self {
        Self::new(format!("Listening near {}", position), StatusIcon::Location)
    }

    pub fn ready() -> Self {
        Self::new("Ready to drop audio", StatusIcon::Waveform)
    }

    pub fn waiting_for_location() -> Self {
        Self::new(
            "Waiting for your location before recording",
            StatusIcon::LocationSearch,
        )
    }

    pub fn microphone_denied() -> Self {
        Self::new("Microphone access denied", StatusIcon::MicOff)
    }

    pub fn recording() -> Self {
        Self::new("Recording in progress", StatusIcon::RecordingMic)
    }

    pub fn record_start_failed() -> Self {
        Self::new("Unable to start recording", StatusIcon::Warning)
    }

    pub fn recording_failed() -> Self {
        Self::new("Recording failed", StatusIcon::Warning)
    }

    pub fn missing_location() -> Self {
        Self::new("Missing location for drop", StatusIcon::LocationOff)
    }

    pub fn dropped() -> Self {
        Self::new("Audio dropped!", StatusIcon::Pin)
    }

    pub fn save_failed() -> Self {
        Self::new("Could not save audio drop", StatusIcon::Warning)
    }

    pub fn playing(title: &str) -> Self {
        Self::new(format!("Playing {}'s drop", title), StatusIcon::Play)
    }

    pub fn playback_failed() -> Self {
        Self::new("Playback failed", StatusIcon::Warning)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::initializing()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon.glyph(), self.message)
    }
}
