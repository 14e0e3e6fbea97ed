//! # Recorder Module
//!
//! Session API for audio capture. Recorders share the registry and
//! notification plumbing with players but have a much smaller lifecycle:
//!
//! ```text
//! idle → prepared → started ⇄ paused → stopped → (reset) idle → released
//! ```
//!
//! Every engine state change is reported to the application layer as an
//! `info` event; engine failures become `error` events.

use crate::completion::{pair, Completion};
use crate::config::RecorderOptions;
use crate::error::{PlaybackError, Result};
use crate::normalizer::RecorderEvent;
use crate::registry::Registry;
use crate::session::RecorderSession;
use crate::source::SourceResolver;
use bridge_traits::{
    MediaEngine, NotificationHub, NotificationReceiver, RecorderHandle, RecorderNotification,
    RecorderState, SessionId, SessionNotification,
};
use core_runtime::config::ToolkitConfig;
use core_runtime::events::EventBus;
use core_runtime::logging::strip_path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct RecorderModule {
    engine: Arc<dyn MediaEngine>,
    resolver: SourceResolver,
    hub: NotificationHub<RecorderNotification>,
    sessions: Registry<RecorderSession>,
    events: EventBus,
    operation_timeout: Option<Duration>,
}

impl RecorderModule {
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        app_storage_dir: impl Into<PathBuf>,
        events: EventBus,
    ) -> (Self, NotificationReceiver<RecorderNotification>) {
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
    ) -> (Self, NotificationReceiver<RecorderNotification>) {
        let (module, receiver) = Self::new(
            Arc::clone(&config.media_engine),
            config.app_storage_dir.clone(),
            events,
        );
        (module.with_operation_timeout(config.operation_timeout), receiver)
    }

    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Create a recorder writing to `path`.
    ///
    /// A recorder already registered under `id` is released first. The
    /// completion resolves with the resolved output path once the engine
    /// reports `prepared`.
    pub async fn prepare(
        &mut self,
        id: SessionId,
        path: &str,
        options: RecorderOptions,
    ) -> Result<Completion<PathBuf>> {
        let output = self.resolver.resolve_local(path)?;

        if let Some(previous) = self.sessions.remove(id) {
            info!(session = %id, "Releasing previous recorder");
            release(id, previous).await;
        }

        let sink = self.hub.sink(id);
        let generation = sink.generation();
        let mut handle = self
            .engine
            .create_recorder(sink)
            .await
            .map_err(|e| PlaybackError::engine_call("create_recorder", e))?;

        let config = options.recorder_config(output.clone());
        debug!(
            session = %id,
            output = strip_path(&output.to_string_lossy()),
            bitrate = config.profile.audio_bitrate,
            channels = config.profile.audio_channels,
            sample_rate = config.profile.audio_sample_rate,
            "Preparing recorder"
        );
        if let Err(err) = handle.prepare(config).await {
            if let Err(release_err) = handle.release().await {
                warn!(session = %id, error = %release_err, "Recorder release failed");
            }
            return Err(PlaybackError::engine_call("prepare", err));
        }

        let (ready, completion) = pair(id, "prepare", self.operation_timeout);
        self.sessions
            .insert(id, RecorderSession::new(handle, generation, output, ready));
        Ok(completion)
    }

    /// Start capturing when prepared; resume when paused.
    pub async fn record(&mut self, id: SessionId) -> Result<()> {
        let session = self.session_mut(id)?;
        let state = session.state;
        let handle = live_handle(id, session)?;
        match state {
            RecorderState::Prepared => handle
                .start()
                .await
                .map_err(|e| PlaybackError::engine_call("start", e)),
            RecorderState::Paused => handle
                .resume()
                .await
                .map_err(|e| PlaybackError::engine_call("resume", e)),
            RecorderState::Started => Ok(()),
            other => Err(PlaybackError::EngineCall {
                operation: "record",
                message: format!("recorder is {}", other),
            }),
        }
    }

    /// Pause capture. A no-op unless started.
    pub async fn pause(&mut self, id: SessionId) -> Result<()> {
        let session = self.session_mut(id)?;
        if session.state != RecorderState::Started {
            return Ok(());
        }
        live_handle(id, session)?
            .pause()
            .await
            .map_err(|e| PlaybackError::engine_call("pause", e))
    }

    /// Stop capture. A no-op unless started or paused.
    pub async fn stop(&mut self, id: SessionId) -> Result<()> {
        let session = self.session_mut(id)?;
        if !matches!(session.state, RecorderState::Started | RecorderState::Paused) {
            return Ok(());
        }
        live_handle(id, session)?
            .stop()
            .await
            .map_err(|e| PlaybackError::engine_call("stop", e))
    }

    /// Stop if recording, reset, release and purge the session.
    pub async fn destroy(&mut self, id: SessionId) -> Result<()> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| PlaybackError::recorder_not_found(id))?;
        release(id, session).await;
        self.events
            .publish(RecorderEvent::Destroyed.into_session_event(id));
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        for (id, session) in self.sessions.drain() {
            release(id, session).await;
        }
    }

    pub fn session_state(&self, id: SessionId) -> Option<RecorderState> {
        self.sessions.get(id).map(RecorderSession::state)
    }

    pub fn output_path(&self, id: SessionId) -> Option<PathBuf> {
        self.sessions.get(id).map(|s| s.output().to_path_buf())
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.ids()
    }

    /// Track engine state and forward it as events.
    pub async fn handle_notification(
        &mut self,
        notification: SessionNotification<RecorderNotification>,
    ) {
        let SessionNotification {
            session: id,
            generation,
            notification,
        } = notification;

        let Some(session) = self.sessions.get_mut(id) else {
            debug!(session = %id, "Recorder notification for unknown session");
            return;
        };
        if session.generation != generation {
            debug!(session = %id, "Recorder notification from replaced handle");
            return;
        }

        match &notification {
            RecorderNotification::StateChange { state, .. } => {
                debug!(session = %id, from = %session.state, to = %state, "Recorder state transition");
                session.state = *state;
                match state {
                    RecorderState::Prepared => {
                        if let Some(ready) = session.ready.take() {
                            ready.resolve(session.output.clone());
                        }
                    }
                    RecorderState::Released => {
                        session.handle = None;
                        if let Some(ready) = session.ready.take() {
                            ready.fail(PlaybackError::HandleReleased(id));
                        }
                    }
                    _ => {}
                }
            }
            RecorderNotification::Error { code, message } => {
                warn!(session = %id, code, message = %message, "Recorder engine error");
                if let Some(ready) = session.ready.take() {
                    ready.fail(PlaybackError::Engine {
                        code: *code,
                        message: message.clone(),
                    });
                }
            }
        }

        self.events
            .publish(RecorderEvent::from_notification(&notification).into_session_event(id));
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut RecorderSession> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| PlaybackError::recorder_not_found(id))
    }
}

impl std::fmt::Debug for RecorderModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderModule")
            .field("sessions", &self.sessions.len())
            .field("app_storage_dir", &self.resolver.app_storage_dir())
            .finish()
    }
}

fn live_handle(
    id: SessionId,
    session: &mut RecorderSession,
) -> Result<&mut (dyn RecorderHandle + 'static)> {
    session
        .handle
        .as_deref_mut()
        .ok_or(PlaybackError::HandleReleased(id))
}

/// Best-effort teardown of a removed session.
async fn release(id: SessionId, mut session: RecorderSession) {
    let Some(mut handle) = session.handle.take() else {
        return;
    };
    if matches!(session.state, RecorderState::Started | RecorderState::Paused) {
        if let Err(err) = handle.stop().await {
            warn!(session = %id, error = %err, "Recorder stop failed during destroy");
        }
    }
    if let Err(err) = handle.reset().await {
        warn!(session = %id, error = %err, "Recorder reset failed during destroy");
    }
    if let Err(err) = handle.release().await {
        warn!(session = %id, error = %err, "Recorder release failed during destroy");
    }
    debug!(session = %id, "Recorder session destroyed");
}
