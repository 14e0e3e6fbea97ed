//! # Session Configuration
//!
//! Partial configuration records sent by the application layer.

use crate::error::{PlaybackError, Result};
use bridge_traits::{
    AudioSourceType, ContainerFormat, RecorderCodec, RecorderConfig, RecorderProfile,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Player configuration. Every field is optional; absent fields leave the
/// previous value in place when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayConfig {
    /// Output volume, `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,

    /// Stereo pan, `-1.0..=1.0`. Stored only; no engine applies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f32>,

    /// Keep the device awake while playing. Stored only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_lock: Option<bool>,

    /// Expected duration hint in milliseconds. Stored only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub looping: Option<bool>,

    /// Playback rate multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    /// Tear the session down on completion and on stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_destroy: Option<bool>,

    /// Exempt the session from the background pause sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continues_to_play_in_background: Option<bool>,
}

impl PlayConfig {
    /// Parse a configuration object as sent over the JS bridge.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PlaybackError::InvalidConfig(e.to_string()))
    }

    /// Overwrite fields present in `update`; keep the rest.
    pub fn merge(&mut self, update: &PlayConfig) {
        fn take<T: Copy>(slot: &mut Option<T>, update: Option<T>) {
            if update.is_some() {
                *slot = update;
            }
        }

        take(&mut self.volume, update.volume);
        take(&mut self.pan, update.pan);
        take(&mut self.wake_lock, update.wake_lock);
        take(&mut self.duration, update.duration);
        take(&mut self.looping, update.looping);
        take(&mut self.speed, update.speed);
        take(&mut self.auto_destroy, update.auto_destroy);
        take(
            &mut self.continues_to_play_in_background,
            update.continues_to_play_in_background,
        );
    }

    pub fn is_looping(&self) -> bool {
        self.looping.unwrap_or(false)
    }

    pub fn is_auto_destroy(&self) -> bool {
        self.auto_destroy.unwrap_or(false)
    }

    pub fn continues_in_background(&self) -> bool {
        self.continues_to_play_in_background.unwrap_or(false)
    }
}

/// Default encoder bitrate in bits per second.
pub const DEFAULT_AUDIO_BITRATE: u32 = 48_000;
/// Default channel count.
pub const DEFAULT_AUDIO_CHANNELS: u16 = 2;
/// Default sample rate in hertz.
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Recorder options sent with `prepare`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

impl RecorderOptions {
    /// Encoding profile with defaults filled in. Always AAC in MPEG-4 audio.
    pub fn profile(&self) -> RecorderProfile {
        RecorderProfile {
            audio_bitrate: self.bit_rate.unwrap_or(DEFAULT_AUDIO_BITRATE),
            audio_channels: self.channels.unwrap_or(DEFAULT_AUDIO_CHANNELS),
            audio_sample_rate: self.sample_rate.unwrap_or(DEFAULT_AUDIO_SAMPLE_RATE),
            audio_codec: RecorderCodec::Aac,
            file_format: ContainerFormat::M4a,
        }
    }

    /// Full engine configuration capturing from the microphone into `output`.
    pub fn recorder_config(&self, output: PathBuf) -> RecorderConfig {
        RecorderConfig {
            source: AudioSourceType::Microphone,
            profile: self.profile(),
            output,
        }
    }
}
