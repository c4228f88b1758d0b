//! Recorder session state machine

use std::fmt;
use thiserror::Error;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Permissions not yet resolved
    #[default]
    Initializing,
    /// Permissions resolved, no capture in flight
    Ready,
    /// A capture is in flight
    Recording,
}

impl SessionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Recording => "recording",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: &'static str,
}

/// Recorder session entity.
///
/// State machine:
///   INITIALIZING -> READY (activate)
///   READY -> RECORDING (start_recording)
///   RECORDING -> READY (finish_recording)
///
/// Save success and save failure are both reported through the status, not
/// as distinct states: either way the session returns to READY.
#[derive(Debug, Default)]
pub struct RecorderSession {
    state: SessionState,
}

impl RecorderSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Initializing,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Transition from INITIALIZING to READY once permissions are resolved
    pub fn activate(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Initializing {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "activate",
            });
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Transition from READY to RECORDING
    pub fn start_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Ready {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start recording",
            });
        }
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Transition from RECORDING back to READY, whatever the save outcome
    pub fn finish_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Recording {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "finish recording",
            });
        }
        self.state = SessionState::Ready;
        Ok(())
    }
}
