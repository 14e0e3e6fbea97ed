//! Recorder bridge traits.
//!
//! Mirrors the playback side: a [`RecorderHandle`] accepts control requests and
//! the engine reports state changes through a [`RecorderNotification`] sink.

use crate::{error::Result, platform::PlatformSend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use crate::playback::StateChangeReason;

/// Engine-reported recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Prepared,
    Started,
    Paused,
    Stopped,
    Released,
    Error,
}

impl RecorderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecorderState::Idle => "idle",
            RecorderState::Prepared => "prepared",
            RecorderState::Started => "started",
            RecorderState::Paused => "paused",
            RecorderState::Stopped => "stopped",
            RecorderState::Released => "released",
            RecorderState::Error => "error",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous callbacks a recorder handle delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderNotification {
    StateChange {
        state: RecorderState,
        reason: StateChangeReason,
    },
    Error {
        code: i32,
        message: String,
    },
}

/// Encoder used for captured audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderCodec {
    #[default]
    Aac,
}

/// Container written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// MPEG-4 audio (`.m4a`).
    #[default]
    M4a,
}

/// Capture input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSourceType {
    #[default]
    Microphone,
}

/// Encoding parameters handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderProfile {
    /// Bits per second.
    pub audio_bitrate: u32,
    pub audio_channels: u16,
    /// Hertz.
    pub audio_sample_rate: u32,
    pub audio_codec: RecorderCodec,
    pub file_format: ContainerFormat,
}

/// Everything a recorder needs for `prepare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    pub source: AudioSourceType,
    pub profile: RecorderProfile,
    /// Destination file.
    pub output: PathBuf,
}

/// Native recorder instance.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait RecorderHandle: PlatformSend {
    async fn prepare(&mut self, config: RecorderConfig) -> Result<()>;

    async fn start(&mut self) -> Result<()>;

    async fn pause(&mut self) -> Result<()>;

    async fn resume(&mut self) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    async fn reset(&mut self) -> Result<()>;

    async fn release(&mut self) -> Result<()>;
}
