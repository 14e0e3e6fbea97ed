//! Core service façade and bootstrap helpers.
//!
//! [`AudioToolkit`] owns the player and recorder modules, drains their engine
//! notification queues on a dispatch task and reacts to app lifecycle
//! changes. Hosts bind its methods to their JS bridge and forward the events
//! from [`AudioToolkit::subscribe`] as device events.
//!
//! Desktop apps typically enable the `desktop-shims` feature (the default),
//! which fills in the storage directory and lifecycle observer from
//! `bridge-desktop`.

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::{
    EngineNotification, LifecycleChangeStream, LifecycleState, NotificationReceiver,
    RecorderNotification, SessionId, SessionNotification,
};
use core_playback::{PlayConfig, PlayInfo, PlayerModule, RecorderModule, RecorderOptions};
use core_runtime::config::ToolkitConfig;
use core_runtime::events::{EventBus, EventSource, EventStream, Receiver, SessionEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::{DesktopLifecycleObserver, SimulatedEngine};

struct Receivers {
    players: NotificationReceiver<EngineNotification>,
    recorders: NotificationReceiver<RecorderNotification>,
}

struct Dispatcher {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Primary façade exposed to host applications.
///
/// Operations the engine confirms asynchronously (`prepare`, `seek`, `stop`)
/// only complete while the dispatch loop runs, so call
/// [`start`](Self::start) first.
pub struct AudioToolkit {
    config: ToolkitConfig,
    events: EventBus,
    players: Arc<Mutex<PlayerModule>>,
    recorders: Arc<Mutex<RecorderModule>>,
    receivers: Mutex<Option<Receivers>>,
    dispatcher: Mutex<Option<Dispatcher>>,
}

impl AudioToolkit {
    pub fn new(config: ToolkitConfig) -> Self {
        let events = EventBus::new(config.event_buffer_size);
        let (players, player_notifications) = PlayerModule::from_config(&config, events.clone());
        let (recorders, recorder_notifications) =
            RecorderModule::from_config(&config, events.clone());

        Self {
            config,
            events,
            players: Arc::new(Mutex::new(players)),
            recorders: Arc::new(Mutex::new(recorders)),
            receivers: Mutex::new(Some(Receivers {
                players: player_notifications,
                recorders: recorder_notifications,
            })),
            dispatcher: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Spawn the dispatch loop on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `AlreadyStarted` when called twice, or after [`shutdown`](Self::shutdown)
    /// - `InitializationFailed` when the lifecycle observer refuses a subscription
    pub async fn start(&self) -> Result<()> {
        let mut dispatcher = self.dispatcher.lock().await;
        if dispatcher.is_some() {
            return Err(CoreError::AlreadyStarted);
        }

        let lifecycle = match &self.config.lifecycle_observer {
            Some(observer) => Some(observer.subscribe_changes().await.map_err(|err| {
                CoreError::InitializationFailed(format!(
                    "lifecycle subscription failed: {}",
                    err
                ))
            })?),
            None => None,
        };

        let receivers = self
            .receivers
            .lock()
            .await
            .take()
            .ok_or(CoreError::AlreadyStarted)?;

        let (shutdown, stop) = oneshot::channel();
        let task = tokio::spawn(dispatch(
            Arc::clone(&self.players),
            Arc::clone(&self.recorders),
            receivers,
            lifecycle,
            self.config.background_pause,
            stop,
        ));
        *dispatcher = Some(Dispatcher { shutdown, task });

        info!(
            background_pause = self.config.background_pause,
            lifecycle = self.config.lifecycle_observer.is_some(),
            "Audio toolkit started"
        );
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.dispatcher.lock().await.is_some()
    }

    /// Stop dispatching and destroy every player and recorder session.
    pub async fn shutdown(&self) {
        if let Some(Dispatcher { shutdown, task }) = self.dispatcher.lock().await.take() {
            let _ = shutdown.send(());
            if let Err(err) = task.await {
                warn!(error = %err, "Dispatch task ended abnormally");
            }
        }
        self.players.lock().await.shutdown().await;
        self.recorders.lock().await.shutdown().await;
        info!("Audio toolkit shut down");
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Every event of every session.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Events of one session only.
    pub fn session_events(&self, source: EventSource, id: SessionId) -> EventStream {
        EventStream::for_session(self.events.subscribe(), source, id)
    }

    // ========================================================================
    // Player API
    // ========================================================================

    /// Create a player for `path` and wait until it is prepared.
    pub async fn prepare(&self, id: SessionId, path: &str, config: PlayConfig) -> Result<()> {
        let ready = self.players.lock().await.prepare(id, path, config).await?;
        ready.wait().await?;
        Ok(())
    }

    pub async fn set(&self, id: SessionId, config: PlayConfig) -> Result<()> {
        self.players.lock().await.set(id, config).await?;
        Ok(())
    }

    pub async fn play(&self, id: SessionId) -> Result<PlayInfo> {
        Ok(self.players.lock().await.play(id).await?)
    }

    pub async fn resume(&self, id: SessionId) -> Result<PlayInfo> {
        Ok(self.players.lock().await.resume(id).await?)
    }

    pub async fn pause(&self, id: SessionId) -> Result<PlayInfo> {
        Ok(self.players.lock().await.pause(id).await?)
    }

    /// `None` when the session was auto-destroyed.
    pub async fn stop(&self, id: SessionId) -> Result<Option<PlayInfo>> {
        let stopped = self.players.lock().await.stop(id).await?;
        Ok(stopped.wait().await?)
    }

    pub async fn seek(&self, id: SessionId, position_ms: u64) -> Result<PlayInfo> {
        let seeked = self.players.lock().await.seek(id, position_ms).await?;
        Ok(seeked.wait().await?)
    }

    pub async fn get_current_time(&self, id: SessionId) -> Result<PlayInfo> {
        Ok(self.players.lock().await.get_current_time(id)?)
    }

    pub async fn destroy(&self, id: SessionId) -> Result<()> {
        self.players.lock().await.destroy(id).await?;
        Ok(())
    }

    pub async fn player_ids(&self) -> Vec<SessionId> {
        self.players.lock().await.session_ids()
    }

    // ========================================================================
    // Recorder API
    // ========================================================================

    /// Create a recorder writing to `path`; resolves with the output path.
    pub async fn prepare_recorder(
        &self,
        id: SessionId,
        path: &str,
        options: RecorderOptions,
    ) -> Result<PathBuf> {
        let ready = self
            .recorders
            .lock()
            .await
            .prepare(id, path, options)
            .await?;
        Ok(ready.wait().await?)
    }

    pub async fn record(&self, id: SessionId) -> Result<()> {
        self.recorders.lock().await.record(id).await?;
        Ok(())
    }

    pub async fn pause_recorder(&self, id: SessionId) -> Result<()> {
        self.recorders.lock().await.pause(id).await?;
        Ok(())
    }

    pub async fn stop_recorder(&self, id: SessionId) -> Result<()> {
        self.recorders.lock().await.stop(id).await?;
        Ok(())
    }

    pub async fn destroy_recorder(&self, id: SessionId) -> Result<()> {
        self.recorders.lock().await.destroy(id).await?;
        Ok(())
    }

    pub async fn recorder_ids(&self) -> Vec<SessionId> {
        self.recorders.lock().await.session_ids()
    }
}

impl std::fmt::Debug for AudioToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioToolkit")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Dispatch Loop
// ============================================================================

enum Step {
    Player(SessionNotification<EngineNotification>),
    Recorder(SessionNotification<RecorderNotification>),
    Lifecycle(Option<LifecycleState>),
    Shutdown,
}

async fn dispatch(
    players: Arc<Mutex<PlayerModule>>,
    recorders: Arc<Mutex<RecorderModule>>,
    mut receivers: Receivers,
    mut lifecycle: Option<Box<dyn LifecycleChangeStream>>,
    background_pause: bool,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        let step = tokio::select! {
            _ = &mut stop => Step::Shutdown,
            Some(notification) = receivers.players.recv() => Step::Player(notification),
            Some(notification) = receivers.recorders.recv() => Step::Recorder(notification),
            state = next_lifecycle(&mut lifecycle) => Step::Lifecycle(state),
            else => Step::Shutdown,
        };

        match step {
            Step::Player(notification) => {
                players.lock().await.handle_notification(notification).await;
            }
            Step::Recorder(notification) => {
                recorders.lock().await.handle_notification(notification).await;
            }
            Step::Lifecycle(Some(state)) => {
                debug!(?state, "Lifecycle change");
                if background_pause && state.is_backgrounded() {
                    let paused = players.lock().await.pause_on_background().await;
                    debug!(count = paused.len(), "Background sweep finished");
                }
            }
            Step::Lifecycle(None) => {
                debug!("Lifecycle stream closed");
                lifecycle = None;
            }
            Step::Shutdown => break,
        }
    }
    debug!("Dispatch loop stopped");
}

async fn next_lifecycle(
    stream: &mut Option<Box<dyn LifecycleChangeStream>>,
) -> Option<LifecycleState> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// The storage directory and lifecycle observer come from `bridge-desktop`.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_desktop, SimulatedEngine};
/// use std::sync::Arc;
///
/// let toolkit = bootstrap_desktop(Arc::new(SimulatedEngine::new())).await?;
/// let mut events = toolkit.subscribe();
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop(
    engine: Arc<dyn bridge_traits::MediaEngine>,
) -> Result<AudioToolkit> {
    let config = ToolkitConfig::builder().media_engine(engine).build()?;
    let toolkit = AudioToolkit::new(config);
    toolkit.start().await?;
    Ok(toolkit)
}
