//! Application lifecycle observation.
//!
//! Playback sessions react to the host app moving to the background: every
//! session that has not opted into background playback gets paused.

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Application is in the foreground and active
    Foreground,
    /// Application is in the background
    Background,
    /// Application is being suspended
    Suspended,
}

impl LifecycleState {
    /// Whether sessions without background permission must stop producing audio.
    pub fn is_backgrounded(&self) -> bool {
        matches!(self, LifecycleState::Background | LifecycleState::Suspended)
    }
}

/// Lifecycle observer trait
///
/// # Platform Support
///
/// - **HarmonyOS / React Native**: instance lifecycle events (`BACKGROUND`, `FOREGROUND`)
/// - **Android**: Activity/Application lifecycle callbacks
/// - **iOS**: UIApplication lifecycle notifications
/// - **Desktop**: always foreground
///
/// # Example
///
/// ```ignore
/// use bridge_traits::background::{LifecycleObserver, LifecycleState};
///
/// async fn watch(observer: &dyn LifecycleObserver) -> Result<()> {
///     let mut stream = observer.subscribe_changes().await?;
///     while let Some(state) = stream.next().await {
///         if state == LifecycleState::Background {
///             // pause sessions
///         }
///     }
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LifecycleObserver: PlatformSendSync {
    /// Get current lifecycle state
    async fn get_state(&self) -> Result<LifecycleState>;

    /// Subscribe to lifecycle state changes
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle state changes
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LifecycleChangeStream: PlatformSend {
    /// Get the next lifecycle state update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_and_suspended_count_as_backgrounded() {
        assert!(!LifecycleState::Foreground.is_backgrounded());
        assert!(LifecycleState::Background.is_backgrounded());
        assert!(LifecycleState::Suspended.is_backgrounded());
    }
}
