//! # Playback & Recording Session Core
//!
//! Per-session state machines that drive host media engines and turn their
//! callbacks into a uniform event stream.
//!
//! ## Overview
//!
//! This crate handles:
//! - Player sessions: prepare, play, pause, stop, seek, config, destroy
//! - Recorder sessions: prepare, record, pause, stop, destroy
//! - Guarded transitions (auto-prepare, reset-then-release, auto-destroy)
//! - Latest-wins seek continuations
//! - The background pause sweep
//!
//! Decoding, mixing and device I/O stay with the host engine behind
//! [`bridge_traits::MediaEngine`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlayConfig, PlayerModule};
//! use core_runtime::events::EventBus;
//!
//! let (mut player, mut notifications) = PlayerModule::new(engine, "/data/storage/el2/base/files", EventBus::default());
//! let ready = player.prepare(SessionId::new(1), "clip.mp3", PlayConfig::default()).await?;
//!
//! // Somewhere else, feed engine callbacks back in:
//! while let Some(n) = notifications.recv().await {
//!     player.handle_notification(n).await;
//! }
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod player;
pub mod recorder;
pub mod registry;
pub mod session;
pub mod source;
pub mod state_machine;

pub use completion::Completion;
pub use config::{PlayConfig, RecorderOptions};
pub use error::{ErrorPayload, PlaybackError, Result};
pub use normalizer::{PlayerEvent, RecorderEvent};
pub use player::PlayerModule;
pub use recorder::RecorderModule;
pub use session::{PlayInfo, PlayerSnapshot};
pub use source::SourceResolver;
