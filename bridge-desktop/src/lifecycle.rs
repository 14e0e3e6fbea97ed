//! Lifecycle observation for desktop hosts.
//!
//! Desktop applications have no system-driven background state, so the
//! observer starts in the foreground and only changes when the host calls
//! [`DesktopLifecycleObserver::set_state`] (for example when the main window is
//! minimized).

use async_trait::async_trait;
use bridge_traits::{
    background::{LifecycleChangeStream, LifecycleObserver, LifecycleState},
    error::{BridgeError, Result},
};
use tokio::sync::watch;
use tracing::debug;

/// Desktop lifecycle observer backed by a watch channel.
pub struct DesktopLifecycleObserver {
    state: watch::Sender<LifecycleState>,
}

impl DesktopLifecycleObserver {
    /// Create an observer that reports `Foreground`.
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Foreground);
        Self { state }
    }

    /// Publish a new lifecycle state to every subscriber.
    ///
    /// Repeating the current state is not reported again.
    pub fn set_state(&self, next: LifecycleState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(state = ?next, "Desktop lifecycle state changed");
        }
    }
}

impl Default for DesktopLifecycleObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecycleObserver for DesktopLifecycleObserver {
    async fn get_state(&self) -> Result<LifecycleState> {
        Ok(*self.state.borrow())
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        Ok(Box::new(DesktopLifecycleChangeStream {
            receiver: self.state.subscribe(),
        }))
    }
}

struct DesktopLifecycleChangeStream {
    receiver: watch::Receiver<LifecycleState>,
}

#[async_trait]
impl LifecycleChangeStream for DesktopLifecycleChangeStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        self.receiver.changed().await.ok()?;
        let state = *self.receiver.borrow_and_update();
        Some(state)
    }
}

/// Resolve the per-user directory the toolkit treats as app storage.
///
/// Uses the platform data directory (`~/.local/share`, `~/Library/Application
/// Support`, `%APPDATA%`) and creates the folder when missing.
pub fn default_app_storage_dir() -> Result<std::path::PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .ok_or_else(|| {
            BridgeError::NotAvailable("No data or home directory on this platform".to_string())
        })?;
    let dir = base.join("audio-toolkit");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
