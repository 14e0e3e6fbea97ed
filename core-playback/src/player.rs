//! # Player Module
//!
//! Public session API for players plus the executor for state machine
//! effects.
//!
//! ## Flow
//!
//! ```text
//! prepare(id, path) ──> create handle ──> set_source
//!                                             │ initialized
//!                       engine.prepare <──────┘
//!                             │ prepared
//!                             └──> apply config, resolve ready completion
//! ```
//!
//! API calls take `&mut self` and return quickly. Operations the engine
//! confirms later (`prepare`, `seek`, `stop`) hand back a [`Completion`] that
//! resolves once [`PlayerModule::handle_notification`] sees the confirming
//! notification. The owner must keep draining the receiver returned by
//! [`PlayerModule::new`] and must not hold the module while awaiting a
//! completion.

use crate::completion::{pair, Completion};
use crate::config::PlayConfig;
use crate::error::{PlaybackError, Result};
use crate::normalizer::PlayerEvent;
use crate::registry::Registry;
use crate::session::{PendingSeek, PlayInfo, PlayerSession, PlayerSnapshot};
use crate::source::SourceResolver;
use crate::state_machine::{self, Effect};
use bridge_traits::{
    EngineNotification, EngineState, MediaEngine, NotificationHub, NotificationReceiver,
    PlayerHandle, SessionId, SessionNotification,
};
use core_runtime::config::ToolkitConfig;
use core_runtime::events::EventBus;
use core_runtime::logging::strip_path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct PlayerModule {
    engine: Arc<dyn MediaEngine>,
    resolver: SourceResolver,
    hub: NotificationHub<EngineNotification>,
    sessions: Registry<PlayerSession>,
    events: EventBus,
    operation_timeout: Option<Duration>,
}

impl PlayerModule {
    /// Create a module and the receiver its engine notifications arrive on.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        app_storage_dir: impl Into<PathBuf>,
        events: EventBus,
    ) -> (Self, NotificationReceiver<EngineNotification>) {
        let (hub, receiver) = NotificationHub::channel();
        let module = Self {
            engine,
            resolver: SourceResolver::new(app_storage_dir),
            hub,
            sessions: Registry::new(),
            events,
            operation_timeout: None,
        };
        (module, receiver)
    }

    pub fn from_config(
        config: &ToolkitConfig,
        events: EventBus,
    ) -> (Self, NotificationReceiver<EngineNotification>) {
        let (module, receiver) = Self::new(
            Arc::clone(&config.media_engine),
            config.app_storage_dir.clone(),
            events,
        );
        (module.with_operation_timeout(config.operation_timeout), receiver)
    }

    /// Bound how long returned completions wait.
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ========================================================================
    // Public Session API
    // ========================================================================

    /// Merge `update` into the session configuration, applying it right away
    /// when the handle accepts settings.
    pub async fn set(&mut self, id: SessionId, update: PlayConfig) -> Result<()> {
        let session = self.session_mut(id)?;
        session.config.merge(&update);
        debug!(session = %id, config = ?session.config, "Player config updated");

        if !state_machine::accepts_config(session.state) {
            return Ok(());
        }
        match session.handle.as_deref_mut() {
            Some(handle) => apply_config(handle, &update).await,
            None => Ok(()),
        }
    }

    /// Create the session and start loading `path`.
    ///
    /// The returned completion resolves once the engine reports `prepared`.
    pub async fn prepare(
        &mut self,
        id: SessionId,
        path: &str,
        config: PlayConfig,
    ) -> Result<Completion<()>> {
        let source = self.resolver.resolve(path)?;

        if self.sessions.contains(id) {
            info!(session = %id, "Replacing existing player session");
            self.teardown(id).await;
        }

        let sink = self.hub.sink(id);
        let generation = sink.generation();
        let handle = self
            .engine
            .create_player(sink)
            .await
            .map_err(|e| PlaybackError::engine_call("create_player", e))?;

        let (ready, completion) = pair(id, "prepare", self.operation_timeout);
        self.sessions
            .insert(id, PlayerSession::new(handle, generation, config, ready));

        let label = source.to_string();
        debug!(
            session = %id,
            source = strip_path(&label),
            remote = source.is_remote(),
            "Attaching source"
        );
        let attached = self.handle_mut(id)?.set_source(source).await;
        if let Err(err) = attached {
            self.teardown(id).await;
            return Err(PlaybackError::engine_call("set_source", err));
        }

        Ok(completion)
    }

    pub async fn play(&mut self, id: SessionId) -> Result<PlayInfo> {
        self.handle_mut(id)?
            .play()
            .await
            .map_err(|e| PlaybackError::engine_call("play", e))?;
        self.get_current_time(id)
    }

    /// Same as [`play`](Self::play).
    pub async fn resume(&mut self, id: SessionId) -> Result<PlayInfo> {
        self.play(id).await
    }

    pub async fn pause(&mut self, id: SessionId) -> Result<PlayInfo> {
        self.handle_mut(id)?
            .pause()
            .await
            .map_err(|e| PlaybackError::engine_call("pause", e))?;
        self.emit(id, PlayerEvent::Paused);
        self.get_current_time(id)
    }

    /// Stop playback.
    ///
    /// With `autoDestroy` the session is paused, destroyed and the completion
    /// resolves immediately with `None`. Otherwise the completion is
    /// registered, the session rewinds to zero and pauses best-effort; the
    /// completion resolves with fresh info on the next `seekDone`.
    pub async fn stop(&mut self, id: SessionId) -> Result<Completion<Option<PlayInfo>>> {
        let timeout = self.operation_timeout;
        let session = self.session_mut(id)?;

        if session.config.is_auto_destroy() {
            if let Some(handle) = session.handle.as_deref_mut() {
                if let Err(err) = handle.pause().await {
                    warn!(session = %id, error = %err, "Pause before auto-destroy failed");
                }
            }
            self.destroy(id).await?;
            return Ok(Completion::ready(id, "stop", None));
        }

        let Some(handle) = session.handle.as_deref_mut() else {
            return Err(PlaybackError::HandleReleased(id));
        };

        let (continuation, completion) = pair(id, "stop", timeout);
        if let Some(previous) = session.pending_seek.replace(PendingSeek::Stop(continuation)) {
            previous.fail(PlaybackError::SeekInterrupted);
        }

        if let Err(err) = handle.seek(0).await {
            session.pending_seek = None;
            return Err(PlaybackError::engine_call("seek", err));
        }
        // Engines may refuse pause outside `playing`; the rewind still lands.
        if let Err(err) = handle.pause().await {
            warn!(session = %id, error = %err, "Pause during stop failed");
        }

        Ok(completion)
    }

    /// Seek to `position_ms`. An unresolved earlier seek fails with
    /// [`PlaybackError::SeekSuperseded`].
    pub async fn seek(&mut self, id: SessionId, position_ms: u64) -> Result<Completion<PlayInfo>> {
        let timeout = self.operation_timeout;
        let session = self.session_mut(id)?;

        if let Some(previous) = session.pending_seek.take() {
            debug!(session = %id, "Superseding pending seek");
            previous.fail(PlaybackError::SeekSuperseded);
        }

        let handle = session
            .handle
            .as_deref_mut()
            .ok_or(PlaybackError::HandleReleased(id))?;
        handle
            .seek(position_ms)
            .await
            .map_err(|e| PlaybackError::engine_call("seek", e))?;

        let (continuation, completion) = pair(id, "seek", timeout);
        session.pending_seek = Some(PendingSeek::Seek(continuation));
        Ok(completion)
    }

    /// Cached duration and position.
    pub fn get_current_time(&self, id: SessionId) -> Result<PlayInfo> {
        self.sessions
            .get(id)
            .map(|session| session.info)
            .ok_or_else(|| PlaybackError::player_not_found(id))
    }

    /// Release the handle if still held and purge the session.
    pub async fn destroy(&mut self, id: SessionId) -> Result<()> {
        if !self.sessions.contains(id) {
            return Err(PlaybackError::player_not_found(id));
        }
        self.teardown(id).await;
        Ok(())
    }

    /// Pause every live session not allowed to play in the background.
    ///
    /// Returns the sessions that were paused.
    pub async fn pause_on_background(&mut self) -> Vec<SessionId> {
        let mut paused = Vec::new();
        for id in self.sessions.ids() {
            let Some(session) = self.sessions.get_mut(id) else {
                continue;
            };
            if session.config.continues_in_background() {
                continue;
            }
            let Some(handle) = session.handle.as_deref_mut() else {
                continue;
            };
            let outcome = handle.pause().await;
            match outcome {
                Ok(()) => {
                    self.emit(id, PlayerEvent::BackgroundPaused);
                    paused.push(id);
                }
                Err(err) => warn!(session = %id, error = %err, "Background pause failed"),
            }
        }
        if !paused.is_empty() {
            info!(count = paused.len(), "Paused sessions on background");
        }
        paused
    }

    /// Destroy every session.
    pub async fn shutdown(&mut self) {
        for id in self.sessions.ids() {
            self.teardown(id).await;
        }
    }

    pub fn session_state(&self, id: SessionId) -> Option<EngineState> {
        self.sessions.get(id).map(|session| session.state)
    }

    pub fn snapshot(&self, id: SessionId) -> Option<PlayerSnapshot> {
        self.sessions.get(id).map(PlayerSession::snapshot)
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.ids()
    }

    // ========================================================================
    // Notification Dispatch
    // ========================================================================

    /// Feed one engine notification through the state machine.
    pub async fn handle_notification(
        &mut self,
        notification: SessionNotification<EngineNotification>,
    ) {
        let SessionNotification {
            session: id,
            generation,
            notification,
        } = notification;

        let Some(session) = self.sessions.get_mut(id) else {
            debug!(session = %id, kind = notification.name(), "Notification for unknown session");
            return;
        };
        if session.generation != generation {
            debug!(session = %id, kind = notification.name(), "Notification from replaced handle");
            return;
        }

        let transition = state_machine::step(session.state, &notification, &session.config);
        if transition.next != session.state {
            debug!(
                session = %id,
                from = %session.state,
                to = %transition.next,
                "Player state transition"
            );
        }
        session.state = transition.next;

        for effect in transition.effects {
            if !self.sessions.contains(id) {
                break;
            }
            self.run_effect(id, effect).await;
        }
    }

    async fn run_effect(&mut self, id: SessionId, effect: Effect) {
        match effect {
            Effect::Emit(event) => {
                self.emit(id, event);
                return;
            }
            Effect::Teardown => {
                info!(session = %id, "Auto-destroying completed session");
                self.teardown(id).await;
                return;
            }
            _ => {}
        }

        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };

        match effect {
            Effect::Prepare => {
                if let Some(handle) = session.handle.as_deref_mut() {
                    if let Err(err) = handle.prepare().await {
                        warn!(session = %id, error = %err, "Engine prepare failed");
                        if let Some(ready) = session.ready.take() {
                            ready.fail(PlaybackError::engine_call("prepare", err));
                        }
                    }
                }
            }
            Effect::ApplyConfig => {
                if let Some(handle) = session.handle.as_deref_mut() {
                    if let Err(err) = apply_config(handle, &session.config).await {
                        warn!(session = %id, error = %err, "Applying latched config failed");
                    }
                }
            }
            Effect::ResolveReady => {
                if let Some(ready) = session.ready.take() {
                    ready.resolve(());
                }
            }
            Effect::SeekToStart => {
                if let Some(handle) = session.handle.as_deref_mut() {
                    if let Err(err) = handle.seek(0).await {
                        warn!(session = %id, error = %err, "Rewind after completion failed");
                    }
                }
            }
            Effect::Reset => {
                if let Some(handle) = session.handle.as_deref_mut() {
                    if let Err(err) = handle.reset().await {
                        warn!(session = %id, error = %err, "Engine reset failed");
                    }
                }
            }
            Effect::Release => {
                if let Some(mut handle) = session.handle.take() {
                    debug!(session = %id, "Releasing player handle");
                    if let Err(err) = handle.release().await {
                        warn!(session = %id, error = %err, "Engine release failed");
                    }
                }
            }
            Effect::DropHandle => {
                session.handle = None;
            }
            Effect::FailContinuations(cause) => {
                if let Some(ready) = session.ready.take() {
                    ready.fail(cause.to_error(id));
                }
                if let Some(pending) = session.pending_seek.take() {
                    pending.fail(cause.to_error(id));
                }
            }
            Effect::ResolveSeek => {
                if let Some(pending) = session.pending_seek.take() {
                    pending.resolve(session.info);
                }
            }
            Effect::SetPosition(position) => session.info.position = position,
            Effect::SetDuration(duration) => session.info.duration = duration,
            Effect::Emit(_) | Effect::Teardown => {}
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn session_mut(&mut self, id: SessionId) -> Result<&mut PlayerSession> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| PlaybackError::player_not_found(id))
    }

    fn handle_mut(&mut self, id: SessionId) -> Result<&mut (dyn PlayerHandle + 'static)> {
        self.session_mut(id)?
            .handle
            .as_deref_mut()
            .ok_or(PlaybackError::HandleReleased(id))
    }

    fn emit(&self, id: SessionId, event: PlayerEvent) {
        self.events.publish(event.into_session_event(id));
    }

    /// Purge the session and release its handle. Outstanding completions
    /// observe [`PlaybackError::Abandoned`].
    async fn teardown(&mut self, id: SessionId) {
        let Some(mut session) = self.sessions.remove(id) else {
            return;
        };
        if let Some(mut handle) = session.handle.take() {
            if let Err(err) = handle.release().await {
                warn!(session = %id, error = %err, "Engine release failed during teardown");
            }
        }
        debug!(session = %id, "Player session destroyed");
    }
}

impl std::fmt::Debug for PlayerModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerModule")
            .field("sessions", &self.sessions.len())
            .field("app_storage_dir", &self.resolver.app_storage_dir())
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

/// Push loop, speed and volume from `config` to the handle, in that order.
async fn apply_config(
    handle: &mut (dyn PlayerHandle + 'static),
    config: &PlayConfig,
) -> Result<()> {
    if let Some(looping) = config.looping {
        handle
            .set_looping(looping)
            .await
            .map_err(|e| PlaybackError::engine_call("set_looping", e))?;
    }
    if let Some(speed) = config.speed {
        handle
            .set_speed(speed)
            .await
            .map_err(|e| PlaybackError::engine_call("set_speed", e))?;
    }
    if let Some(volume) = config.volume {
        handle
            .set_volume(volume.clamp(0.0, 1.0))
            .await
            .map_err(|e| PlaybackError::engine_call("set_volume", e))?;
    }
    Ok(())
}
