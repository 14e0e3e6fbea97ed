//! Playback bridge traits and the notification vocabulary of native players.
//!
//! These abstractions allow the core playback module to drive a host media
//! engine (AVPlayer, MediaPlayer, AVAudioPlayer, ...) without knowing which
//! one it is. Control calls only *request* a change; the engine confirms every
//! transition later through an [`EngineNotification`] sent on the
//! [`NotificationSink`] it received when the handle was created.

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
    recorder::{RecorderHandle, RecorderNotification},
    session::NotificationSink,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Media source attached to a player handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote stream, handed to the engine verbatim.
    Url(String),
    /// Local file. Engines that only accept descriptors open it themselves.
    File(PathBuf),
}

impl MediaSource {
    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Url(_))
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Url(url) => write!(f, "{}", url),
            MediaSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Engine-reported player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Initialized,
    Prepared,
    Playing,
    Paused,
    Completed,
    Stopped,
    Released,
    Error,
}

impl EngineState {
    /// Wire name used by native engines.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Initialized => "initialized",
            EngineState::Prepared => "prepared",
            EngineState::Playing => "playing",
            EngineState::Paused => "paused",
            EngineState::Completed => "completed",
            EngineState::Stopped => "stopped",
            EngineState::Released => "released",
            EngineState::Error => "error",
        }
    }

    /// Parse an engine state name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "idle" => EngineState::Idle,
            "initialized" => EngineState::Initialized,
            "prepared" => EngineState::Prepared,
            "playing" => EngineState::Playing,
            "paused" => EngineState::Paused,
            "completed" => EngineState::Completed,
            "stopped" => EngineState::Stopped,
            "released" => EngineState::Released,
            "error" => EngineState::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the engine changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateChangeReason {
    /// Triggered by an application call.
    #[default]
    User,
    /// Triggered by the system (focus loss, route change, ...).
    Background,
}

impl StateChangeReason {
    /// Numeric code used by engines that report reasons as integers.
    pub fn code(&self) -> i32 {
        match self {
            StateChangeReason::User => 1,
            StateChangeReason::Background => 2,
        }
    }
}

/// Asynchronous callbacks a player handle delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    StateChange {
        state: EngineState,
        reason: StateChangeReason,
    },
    Error {
        code: i32,
        message: String,
    },
    SeekDone {
        time_ms: u64,
    },
    DurationUpdate {
        duration_ms: u64,
    },
    TimeUpdate {
        time_ms: u64,
    },
    /// The engine lost exclusive ownership of the output.
    AudioInterrupt {
        reason: String,
    },
    EndOfStream,
}

impl EngineNotification {
    /// Shorthand for a user-initiated state change.
    pub fn state(state: EngineState) -> Self {
        EngineNotification::StateChange {
            state,
            reason: StateChangeReason::User,
        }
    }

    /// Callback name as the engine reports it, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EngineNotification::StateChange { .. } => "stateChange",
            EngineNotification::Error { .. } => "error",
            EngineNotification::SeekDone { .. } => "seekDone",
            EngineNotification::DurationUpdate { .. } => "durationUpdate",
            EngineNotification::TimeUpdate { .. } => "timeUpdate",
            EngineNotification::AudioInterrupt { .. } => "audioInterrupt",
            EngineNotification::EndOfStream => "endOfStream",
        }
    }
}

/// Factory for native player and recorder handles.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaEngine: PlatformSendSync {
    /// Create a player handle that reports through `sink`.
    async fn create_player(
        &self,
        sink: NotificationSink<EngineNotification>,
    ) -> Result<Box<dyn PlayerHandle>>;

    /// Create a recorder handle that reports through `sink`.
    async fn create_recorder(
        &self,
        sink: NotificationSink<RecorderNotification>,
    ) -> Result<Box<dyn RecorderHandle>>;
}

/// Native player instance.
///
/// Every call only requests a change. The resulting state arrives later as an
/// [`EngineNotification::StateChange`].
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait PlayerHandle: PlatformSend {
    /// Attach the media source. Engines answer with `initialized`.
    async fn set_source(&mut self, source: MediaSource) -> Result<()>;

    async fn prepare(&mut self) -> Result<()>;

    async fn play(&mut self) -> Result<()>;

    async fn pause(&mut self) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    /// Seek to an absolute position. Completion is reported by `SeekDone`.
    async fn seek(&mut self, position_ms: u64) -> Result<()>;

    /// Return the handle to `idle`.
    async fn reset(&mut self) -> Result<()>;

    /// Destroy the native instance. The handle is unusable afterwards.
    async fn release(&mut self) -> Result<()>;

    /// Volume is normalized to `0.0..=1.0`.
    async fn set_volume(&mut self, volume: f32) -> Result<()>;

    async fn set_speed(&mut self, speed: f32) -> Result<()>;

    async fn set_looping(&mut self, looping: bool) -> Result<()>;
}
