//! # Event Normalizer
//!
//! Translates what happens to a session into the closed event vocabulary the
//! application layer subscribes to. Engine callbacks differ between hosts; the
//! events below do not.
//!
//! | Event | Player message | Trigger |
//! |-------|----------------|---------|
//! | `pause` | `player paused` | `pause` call |
//! | `pause` | `Playback paused due to background` | background sweep |
//! | `error` | `media engine error` (`err` = engine message) | engine `error` |
//! | `seeked` | `seek completed` | engine `seekDone` |
//! | `ended` | `play completed` | state `completed` |
//! | `looped` | `media playback looped` | `endOfStream` while looping |
//! | `forcePause` | `lost audio focus, playback paused` | `audioInterrupt` |
//!
//! Recorders emit `info` for every engine state change and on destroy, and
//! `error` for engine failures.

use bridge_traits::{RecorderNotification, RecorderState, SessionId, StateChangeReason};
use core_runtime::events::{EventData, EventName, RecorderInfo, SessionEvent};

/// Everything a player session can announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Paused,
    BackgroundPaused,
    EngineError { message: String },
    Seeked,
    Ended,
    Looped,
    ForcePause,
}

impl PlayerEvent {
    pub fn name(&self) -> EventName {
        match self {
            PlayerEvent::Paused | PlayerEvent::BackgroundPaused => EventName::Pause,
            PlayerEvent::EngineError { .. } => EventName::Error,
            PlayerEvent::Seeked => EventName::Seeked,
            PlayerEvent::Ended => EventName::Ended,
            PlayerEvent::Looped => EventName::Looped,
            PlayerEvent::ForcePause => EventName::ForcePause,
        }
    }

    pub fn data(&self) -> EventData {
        match self {
            PlayerEvent::Paused => EventData::message("player paused"),
            PlayerEvent::BackgroundPaused => {
                EventData::message("Playback paused due to background")
            }
            PlayerEvent::EngineError { message } => {
                EventData::message("media engine error").with_err(message.clone())
            }
            PlayerEvent::Seeked => EventData::message("seek completed"),
            PlayerEvent::Ended => EventData::message("play completed"),
            PlayerEvent::Looped => EventData::message("media playback looped"),
            PlayerEvent::ForcePause => EventData::message("lost audio focus, playback paused"),
        }
    }

    pub fn into_session_event(self, session: SessionId) -> SessionEvent {
        SessionEvent::player(session, self.name(), self.data())
    }
}

/// Everything a recorder session can announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    StateChanged {
        state: RecorderState,
        reason: StateChangeReason,
    },
    EngineError { message: String },
    Destroyed,
}

impl RecorderEvent {
    /// Map an engine notification to the event it produces.
    pub fn from_notification(notification: &RecorderNotification) -> Self {
        match notification {
            RecorderNotification::StateChange { state, reason } => RecorderEvent::StateChanged {
                state: *state,
                reason: *reason,
            },
            RecorderNotification::Error { message, .. } => RecorderEvent::EngineError {
                message: message.clone(),
            },
        }
    }

    pub fn name(&self) -> EventName {
        match self {
            RecorderEvent::StateChanged { .. } | RecorderEvent::Destroyed => EventName::Info,
            RecorderEvent::EngineError { .. } => EventName::Error,
        }
    }

    pub fn data(&self) -> EventData {
        match self {
            RecorderEvent::StateChanged { state, reason } => EventData::default().with_info(
                RecorderInfo {
                    what: state.as_str().to_string(),
                    extra: reason.code(),
                },
            ),
            RecorderEvent::EngineError { message } => {
                EventData::message("media recorder error").with_err(message.clone())
            }
            RecorderEvent::Destroyed => EventData::message("Destroyed recorder"),
        }
    }

    pub fn into_session_event(self, session: SessionId) -> SessionEvent {
        SessionEvent::recorder(session, self.name(), self.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn player_events_use_closed_vocabulary() {
        let cases = [
            (PlayerEvent::Paused, "pause"),
            (PlayerEvent::BackgroundPaused, "pause"),
            (
                PlayerEvent::EngineError {
                    message: "x".into(),
                },
                "error",
            ),
            (PlayerEvent::Seeked, "seeked"),
            (PlayerEvent::Ended, "ended"),
            (PlayerEvent::Looped, "looped"),
            (PlayerEvent::ForcePause, "forcePause"),
        ];
        for (event, name) in cases {
            assert_eq!(event.name().as_str(), name);
        }
    }

    #[test]
    fn ended_event_wire_shape() {
        let event = PlayerEvent::Ended.into_session_event(SessionId::new(3));
        assert_eq!(event.channel(), "RCTAudioPlayerEvent:3");
        assert_eq!(
            serde_json::to_value(event.to_wire()).unwrap(),
            json!({ "event": "ended", "data": { "message": "play completed" } })
        );
    }

    #[test]
    fn engine_error_carries_engine_message() {
        let data = PlayerEvent::EngineError {
            message: "IO error".into(),
        }
        .data();
        assert_eq!(data.err.as_deref(), Some("IO error"));
        assert_eq!(data.message.as_deref(), Some("media engine error"));
    }

    #[test]
    fn recorder_state_change_becomes_info() {
        let event = RecorderEvent::from_notification(&RecorderNotification::StateChange {
            state: RecorderState::Started,
            reason: StateChangeReason::Background,
        })
        .into_session_event(SessionId::new(9));

        assert_eq!(event.channel(), "RCTAudioRecorderEvent:9");
        assert_eq!(
            serde_json::to_value(event.to_wire()).unwrap(),
            json!({ "event": "info", "data": { "info": { "what": "started", "extra": 2 } } })
        );
    }

    #[test]
    fn recorder_destroy_and_error_payloads() {
        assert_eq!(
            RecorderEvent::Destroyed.data().message.as_deref(),
            Some("Destroyed recorder")
        );
        let error = RecorderEvent::from_notification(&RecorderNotification::Error {
            code: 5400103,
            message: "mic busy".into(),
        });
        assert_eq!(error.name(), EventName::Error);
        assert_eq!(error.data().err.as_deref(), Some("mic busy"));
    }
}
