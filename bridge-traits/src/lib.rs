//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the audio toolkit core and the
//! native media stack of each host. The core never decodes, mixes or touches
//! audio devices; it drives handles created by a [`MediaEngine`] and listens
//! to the notifications those handles send back.
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaEngine`](playback::MediaEngine) - Creates player and recorder handles
//! - [`PlayerHandle`](playback::PlayerHandle) - Native player control surface
//! - [`RecorderHandle`](recorder::RecorderHandle) - Native recorder control surface
//!
//! ### Platform Integration
//! - [`LifecycleObserver`](background::LifecycleObserver) - App foreground/background transitions
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Notifications
//!
//! Engines report asynchronously through a
//! [`NotificationSink`](session::NotificationSink) bound to one session. All
//! sinks of a module share a single queue, so notifications for a session are
//! observed in the order the engine produced them.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert native failures (e.g. a
//! `BusinessError` code and message) into `BridgeError::OperationFailed`.
//!
//! ## Thread Safety
//!
//! Engines and observers require `Send + Sync` on native targets; handles
//! require `Send`. On `wasm32` these bounds are lifted (see [`platform`]).

pub mod background;
pub mod error;
pub mod logging;
pub mod platform;
pub mod playback;
pub mod recorder;
pub mod session;

pub use error::BridgeError;

// Re-export commonly used types
pub use background::{LifecycleChangeStream, LifecycleObserver, LifecycleState};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    EngineNotification, EngineState, MediaEngine, MediaSource, PlayerHandle, StateChangeReason,
};
pub use recorder::{
    AudioSourceType, ContainerFormat, RecorderCodec, RecorderConfig, RecorderHandle,
    RecorderNotification, RecorderProfile, RecorderState,
};
pub use session::{
    NotificationHub, NotificationReceiver, NotificationSink, SessionId, SessionNotification,
};
