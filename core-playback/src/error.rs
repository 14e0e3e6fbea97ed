//! # Playback Error Types
//!
//! Errors surfaced by the player and recorder modules, plus the payload shape
//! the application layer receives for each of them.

use bridge_traits::{BridgeError, SessionId};
use core_runtime::events::EventSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during player and recorder operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Operation referenced an identifier with no live session.
    #[error("{kind:?} session {session} not found")]
    SessionNotFound {
        kind: EventSource,
        session: SessionId,
    },

    /// `prepare` was called with an absent or unusable path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A bridge configuration object did not match the expected shape.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Seek Continuation Errors
    // ========================================================================
    /// A newer seek or stop took over the pending seek slot.
    #[error("Seek superseded by a newer request")]
    SeekSuperseded,

    /// The session was stopped before the pending seek finished.
    #[error("Stopped before seek operation could finish")]
    SeekInterrupted,

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The engine reported a failure asynchronously.
    #[error("Media engine error {code}: {message}")]
    Engine { code: i32, message: String },

    /// An engine call was rejected synchronously.
    #[error("Engine call {operation} failed: {message}")]
    EngineCall {
        operation: &'static str,
        message: String,
    },

    /// The session's engine handle has already been released.
    #[error("Engine handle for session {0} already released")]
    HandleReleased(SessionId),

    // ========================================================================
    // Completion Errors
    // ========================================================================
    /// The engine did not confirm the operation within the configured bound.
    #[error("{operation} on session {session} timed out")]
    Timeout {
        operation: &'static str,
        session: SessionId,
    },

    /// The session was torn down while the operation was outstanding.
    #[error("{operation} on session {session} abandoned")]
    Abandoned {
        operation: &'static str,
        session: SessionId,
    },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    pub(crate) fn player_not_found(session: SessionId) -> Self {
        PlaybackError::SessionNotFound {
            kind: EventSource::Player,
            session,
        }
    }

    pub(crate) fn recorder_not_found(session: SessionId) -> Self {
        PlaybackError::SessionNotFound {
            kind: EventSource::Recorder,
            session,
        }
    }

    pub(crate) fn engine_call(operation: &'static str, err: BridgeError) -> Self {
        PlaybackError::EngineCall {
            operation,
            message: err.to_string(),
        }
    }

    /// Returns `true` for failures caused by a pre-empted seek continuation.
    pub fn is_seek_preempted(&self) -> bool {
        matches!(
            self,
            PlaybackError::SeekSuperseded | PlaybackError::SeekInterrupted
        )
    }

    /// Payload delivered to the application layer for this error.
    pub fn payload(&self) -> ErrorPayload {
        match self {
            PlaybackError::SessionNotFound {
                kind: EventSource::Player,
                ..
            } => ErrorPayload::new("not found player", "not found media player"),
            PlaybackError::SessionNotFound {
                kind: EventSource::Recorder,
                session,
            } => ErrorPayload::new("notfound", format!("{} not found.", session)),
            PlaybackError::InvalidPath(reason) => ErrorPayload::new("invalidpath", reason.clone()),
            PlaybackError::InvalidConfig(reason) => {
                ErrorPayload::new("invalidconfig", reason.clone())
            }
            PlaybackError::SeekSuperseded => ErrorPayload::code("seekfail"),
            PlaybackError::SeekInterrupted => ErrorPayload::new(
                "seekfail",
                "stopped before seek operation could finish",
            ),
            PlaybackError::Engine { message, .. } => {
                ErrorPayload::new(message.clone(), "media engine error")
            }
            PlaybackError::EngineCall { operation, message } => ErrorPayload::new(
                "player function err",
                format!("player call {} function err:{}", operation, message),
            ),
            other => ErrorPayload::new("player function err", other.to_string()),
        }
    }
}

/// `{err, message}` shape the application layer receives for failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub err: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorPayload {
    fn new(err: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            err: err.into(),
            message: Some(message.into()),
        }
    }

    fn code(err: impl Into<String>) -> Self {
        Self {
            err: err.into(),
            message: None,
        }
    }
}

impl From<&PlaybackError> for ErrorPayload {
    fn from(err: &PlaybackError) -> Self {
        err.payload()
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_payload_depends_on_module() {
        let player = PlaybackError::player_not_found(SessionId::new(4)).payload();
        assert_eq!(player.err, "not found player");
        assert_eq!(player.message.as_deref(), Some("not found media player"));

        let recorder = PlaybackError::recorder_not_found(SessionId::new(4)).payload();
        assert_eq!(recorder.err, "notfound");
        assert_eq!(recorder.message.as_deref(), Some("4 not found."));
    }

    #[test]
    fn seek_failures_share_wire_code() {
        assert_eq!(PlaybackError::SeekSuperseded.payload().err, "seekfail");
        assert_eq!(PlaybackError::SeekInterrupted.payload().err, "seekfail");
        assert!(PlaybackError::SeekInterrupted.is_seek_preempted());
        assert!(!PlaybackError::InvalidPath(String::new()).is_seek_preempted());
    }

    #[test]
    fn superseded_payload_omits_message() {
        let json = serde_json::to_value(PlaybackError::SeekSuperseded.payload()).unwrap();
        assert_eq!(json, serde_json::json!({ "err": "seekfail" }));
    }

    #[test]
    fn engine_call_payload_names_operation() {
        let err = PlaybackError::engine_call(
            "play",
            BridgeError::OperationFailed("state not allowed".into()),
        );
        let payload = ErrorPayload::from(&err);
        assert_eq!(payload.err, "player function err");
        assert!(payload.message.unwrap().contains("play function err"));
    }
}
