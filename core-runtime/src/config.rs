//! # Toolkit Configuration Module
//!
//! Provides configuration management for the audio toolkit core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ToolkitConfig` holding the host bridges and policy knobs the player and
//! recorder modules need. It enforces fail-fast validation so a missing bridge
//! is reported before any session is created.
//!
//! ## Required Dependencies
//!
//! - `MediaEngine` - creates native player and recorder handles
//! - App storage directory - base for relative media paths (desktop default
//!   available with the `desktop-shims` feature)
//!
//! ## Optional Dependencies
//!
//! - `LifecycleObserver` - drives the background-pause policy
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ToolkitConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = ToolkitConfig::builder()
//!     .media_engine(Arc::new(MyEngine::new()))
//!     .app_storage_dir("/data/storage/el2/base/files")
//!     .operation_timeout(Duration::from_secs(10))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::ToolkitConfig;
//!
//! // No media engine: fails with an actionable message
//! let config = ToolkitConfig::builder()
//!     .app_storage_dir("/tmp/files")
//!     .build()
//!     .expect("Should fail - missing media engine");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{LifecycleObserver, MediaEngine};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for the per-subscriber event buffer.
const MAX_EVENT_BUFFER_SIZE: usize = 65_536;

/// Configuration for the audio toolkit core.
///
/// Use [`ToolkitConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ToolkitConfig {
    /// Native engine that creates player and recorder handles (required)
    pub media_engine: Arc<dyn MediaEngine>,

    /// Application private storage; relative media paths resolve against it
    pub app_storage_dir: PathBuf,

    /// App lifecycle observer (optional)
    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,

    /// Per-subscriber event buffer
    pub event_buffer_size: usize,

    /// Bound on how long prepare/seek/stop completions wait for the engine.
    /// `None` waits indefinitely.
    pub operation_timeout: Option<Duration>,

    /// Pause sessions without background permission when the app backgrounds
    pub background_pause: bool,
}

impl std::fmt::Debug for ToolkitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitConfig")
            .field("media_engine", &"MediaEngine { ... }")
            .field("app_storage_dir", &self.app_storage_dir)
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .field("operation_timeout", &self.operation_timeout)
            .field("background_pause", &self.background_pause)
            .finish()
    }
}

impl ToolkitConfig {
    /// Creates a new builder for constructing a `ToolkitConfig`.
    pub fn builder() -> ToolkitConfigBuilder {
        ToolkitConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - App storage directory is not empty
    /// - Event buffer size is within `1..=65536`
    /// - Operation timeout, when set, is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.app_storage_dir.as_os_str().is_empty() {
            return Err(Error::Config(
                "App storage directory cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        if self.operation_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Operation timeout must be non-zero. Use None to wait indefinitely.".to_string(),
            ));
        }

        Ok(())
    }
}

fn media_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaEngine".to_string(),
        message: "A MediaEngine implementation is required to create player and recorder \
                 handles. HarmonyOS: wrap AVPlayer/AVRecorder. Android: wrap MediaPlayer/\
                 MediaRecorder. iOS: wrap AVAudioPlayer/AVAudioRecorder."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_app_storage_dir() -> Result<PathBuf> {
    bridge_desktop::default_app_storage_dir().map_err(Error::StorageDir)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_app_storage_dir() -> Result<PathBuf> {
    Err(Error::CapabilityMissing {
        capability: "AppStorageDir".to_string(),
        message: "An app storage directory is required to resolve relative media paths. \
                 Desktop: enable the 'desktop-shims' feature for a default. \
                 Mobile: pass the ability context's files directory."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_lifecycle_observer() -> Option<Arc<dyn LifecycleObserver>> {
    Some(Arc::new(bridge_desktop::DesktopLifecycleObserver::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_lifecycle_observer() -> Option<Arc<dyn LifecycleObserver>> {
    None
}

/// Builder for constructing [`ToolkitConfig`] instances.
#[derive(Default)]
pub struct ToolkitConfigBuilder {
    media_engine: Option<Arc<dyn MediaEngine>>,
    app_storage_dir: Option<PathBuf>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
    event_buffer_size: Option<usize>,
    operation_timeout: Option<Duration>,
    background_pause: Option<bool>,
}

impl ToolkitConfigBuilder {
    /// Sets the native media engine.
    pub fn media_engine(mut self, engine: Arc<dyn MediaEngine>) -> Self {
        self.media_engine = Some(engine);
        self
    }

    /// Sets the application private storage directory.
    pub fn app_storage_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.app_storage_dir = Some(path.into());
        self
    }

    /// Sets the lifecycle observer driving the background-pause policy.
    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Sets the per-subscriber event buffer size (default 100).
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Bounds how long completions wait for engine notifications.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Enables or disables pausing on background (default enabled).
    pub fn background_pause(mut self, enabled: bool) -> Self {
        self.background_pause = Some(enabled);
        self
    }

    /// Builds the final `ToolkitConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when no media engine is set, or no storage
    ///   directory is set and no platform default exists
    /// - `Config` when a value fails validation
    pub fn build(self) -> Result<ToolkitConfig> {
        let media_engine = self.media_engine.ok_or_else(media_engine_missing_error)?;

        let app_storage_dir = match self.app_storage_dir {
            Some(dir) => dir,
            None => provide_default_app_storage_dir()?,
        };

        let config = ToolkitConfig {
            media_engine,
            app_storage_dir,
            lifecycle_observer: self
                .lifecycle_observer
                .or_else(provide_default_lifecycle_observer),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            operation_timeout: self.operation_timeout,
            background_pause: self.background_pause.unwrap_or(true),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        EngineNotification, NotificationSink, PlayerHandle, RecorderHandle, RecorderNotification,
    };
    use mockall::mock;

    mock! {
        pub Engine {}

        #[async_trait::async_trait]
        impl MediaEngine for Engine {
            async fn create_player(
                &self,
                sink: NotificationSink<EngineNotification>,
            ) -> BridgeResult<Box<dyn PlayerHandle>>;
            async fn create_recorder(
                &self,
                sink: NotificationSink<RecorderNotification>,
            ) -> BridgeResult<Box<dyn RecorderHandle>>;
        }
    }

    fn engine() -> Arc<dyn MediaEngine> {
        Arc::new(MockEngine::new())
    }

    #[test]
    fn test_builder_defaults() {
        let config = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("/data/storage/el2/base/files")
            .build()
            .unwrap();

        assert_eq!(
            config.app_storage_dir,
            PathBuf::from("/data/storage/el2/base/files")
        );
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.operation_timeout, None);
        assert!(config.background_pause);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("/tmp/files")
            .event_buffer_size(8)
            .operation_timeout(Duration::from_secs(5))
            .background_pause(false)
            .build()
            .unwrap();

        assert_eq!(config.event_buffer_size, 8);
        assert_eq!(config.operation_timeout, Some(Duration::from_secs(5)));
        assert!(!config.background_pause);
    }

    #[test]
    fn test_missing_engine_is_capability_error() {
        let result = ToolkitConfig::builder().app_storage_dir("/tmp").build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "MediaEngine")
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_storage_dir_without_shims() {
        let result = ToolkitConfig::builder().media_engine(engine()).build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let result = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("/tmp")
            .event_buffer_size(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_oversized_buffer_rejected() {
        let result = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("/tmp")
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("/tmp")
            .operation_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_storage_dir_rejected() {
        let result = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = ToolkitConfig::builder()
            .media_engine(engine())
            .app_storage_dir("/tmp")
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("MediaEngine { ... }"));
        assert!(rendered.contains("/tmp"));
    }
}
