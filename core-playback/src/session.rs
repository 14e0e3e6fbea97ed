//! Per-session records owned by the registry.

use crate::completion::Continuation;
use crate::config::PlayConfig;
use crate::error::PlaybackError;
use bridge_traits::{EngineState, PlayerHandle, RecorderHandle, RecorderState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Transient playback info, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInfo {
    pub duration: u64,
    pub position: u64,
}

/// Occupant of the single seek continuation slot.
#[derive(Debug)]
pub enum PendingSeek {
    Seek(Continuation<PlayInfo>),
    /// A non-destroying stop waits for its rewind to finish.
    Stop(Continuation<Option<PlayInfo>>),
}

impl PendingSeek {
    pub fn resolve(self, info: PlayInfo) {
        match self {
            PendingSeek::Seek(continuation) => continuation.resolve(info),
            PendingSeek::Stop(continuation) => continuation.resolve(Some(info)),
        }
    }

    pub fn fail(self, err: PlaybackError) {
        match self {
            PendingSeek::Seek(continuation) => continuation.fail(err),
            PendingSeek::Stop(continuation) => continuation.fail(err),
        }
    }
}

/// One player session.
pub struct PlayerSession {
    pub(crate) handle: Option<Box<dyn PlayerHandle>>,
    pub(crate) generation: u64,
    pub(crate) state: EngineState,
    pub(crate) config: PlayConfig,
    pub(crate) info: PlayInfo,
    pub(crate) pending_seek: Option<PendingSeek>,
    pub(crate) ready: Option<Continuation<()>>,
}

impl PlayerSession {
    pub(crate) fn new(
        handle: Box<dyn PlayerHandle>,
        generation: u64,
        config: PlayConfig,
        ready: Continuation<()>,
    ) -> Self {
        Self {
            handle: Some(handle),
            generation,
            state: EngineState::Idle,
            config,
            info: PlayInfo::default(),
            pending_seek: None,
            ready: Some(ready),
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            config: self.config.clone(),
            info: self.info,
            has_pending_seek: self.pending_seek.is_some(),
            handle_live: self.handle.is_some(),
        }
    }
}

impl fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSession")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("info", &self.info)
            .field("pending_seek", &self.pending_seek)
            .field("handle_live", &self.handle.is_some())
            .finish()
    }
}

/// Read-only view of a player session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub state: EngineState,
    pub config: PlayConfig,
    pub info: PlayInfo,
    pub has_pending_seek: bool,
    pub handle_live: bool,
}

/// One recorder session.
pub struct RecorderSession {
    pub(crate) handle: Option<Box<dyn RecorderHandle>>,
    pub(crate) generation: u64,
    pub(crate) state: RecorderState,
    pub(crate) output: PathBuf,
    pub(crate) ready: Option<Continuation<PathBuf>>,
}

impl RecorderSession {
    pub(crate) fn new(
        handle: Box<dyn RecorderHandle>,
        generation: u64,
        output: PathBuf,
        ready: Continuation<PathBuf>,
    ) -> Self {
        Self {
            handle: Some(handle),
            generation,
            state: RecorderState::Idle,
            output,
            ready: Some(ready),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn output(&self) -> &std::path::Path {
        &self.output
    }
}

impl fmt::Debug for RecorderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecorderSession")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("output", &self.output)
            .field("handle_live", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::pair;
    use bridge_traits::SessionId;

    #[tokio::test]
    async fn pending_stop_resolves_with_info() {
        let (continuation, completion) = pair(SessionId::new(1), "stop", None);
        PendingSeek::Stop(continuation).resolve(PlayInfo {
            duration: 10,
            position: 0,
        });
        assert_eq!(
            completion.wait().await.unwrap(),
            Some(PlayInfo {
                duration: 10,
                position: 0
            })
        );
    }

    #[test]
    fn play_info_serializes_flat() {
        let value = serde_json::to_value(PlayInfo {
            duration: 5000,
            position: 1200,
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({ "duration": 5000, "position": 1200 }));
    }
}
