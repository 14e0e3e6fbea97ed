//! Simulated media engine for desktop development.
//!
//! Desktop builds ship no native audio stack, so this engine acknowledges
//! every control request immediately with the notification a real engine
//! would send. Sources must exist on disk unless they are remote URLs.
//! Playback time does not advance on its own; hosts and tests drive it with
//! [`SimulatedPlayerControl`].

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    EngineNotification, EngineState, MediaEngine, MediaSource, NotificationSink, PlayerHandle,
    RecorderConfig, RecorderHandle, RecorderNotification, RecorderState, SessionId,
    StateChangeReason,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Error code reported when a source cannot be opened.
pub const SOURCE_UNAVAILABLE: i32 = 5400106;

/// Duration reported for every prepared source.
const DEFAULT_DURATION_MS: u64 = 180_000;

/// Engine whose handles answer synchronously through their sinks.
#[derive(Clone, Default)]
pub struct SimulatedEngine {
    players: Arc<Mutex<HashMap<SessionId, NotificationSink<EngineNotification>>>>,
    duration_ms: Option<u64>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `duration_ms` for every prepared source.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Out-of-band control over a live player, as the OS would exert it.
    pub fn control(&self, session: SessionId) -> Option<SimulatedPlayerControl> {
        self.players
            .lock()
            .get(&session)
            .cloned()
            .map(|sink| SimulatedPlayerControl { sink })
    }
}

#[async_trait]
impl MediaEngine for SimulatedEngine {
    async fn create_player(
        &self,
        sink: NotificationSink<EngineNotification>,
    ) -> Result<Box<dyn PlayerHandle>> {
        debug!(session = %sink.session(), "Creating simulated player");
        self.players.lock().insert(sink.session(), sink.clone());
        Ok(Box::new(SimulatedPlayer {
            sink,
            players: Arc::clone(&self.players),
            source: None,
            state: EngineState::Idle,
            duration_ms: self.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
        }))
    }

    async fn create_recorder(
        &self,
        sink: NotificationSink<RecorderNotification>,
    ) -> Result<Box<dyn RecorderHandle>> {
        debug!(session = %sink.session(), "Creating simulated recorder");
        Ok(Box::new(SimulatedRecorder {
            sink,
            state: RecorderState::Idle,
            output: None,
        }))
    }
}

/// Injects system-originated events into a simulated player.
#[derive(Clone)]
pub struct SimulatedPlayerControl {
    sink: NotificationSink<EngineNotification>,
}

impl SimulatedPlayerControl {
    /// Advance the reported playback position.
    pub fn tick(&self, time_ms: u64) -> Result<()> {
        self.sink.notify(EngineNotification::TimeUpdate { time_ms })
    }

    /// Finish the current item.
    pub fn finish(&self) -> Result<()> {
        self.sink.notify(EngineNotification::EndOfStream)?;
        self.sink
            .notify(EngineNotification::state(EngineState::Completed))
    }

    /// Simulate another app taking the audio output.
    pub fn interrupt(&self) -> Result<()> {
        self.sink.notify(EngineNotification::AudioInterrupt {
            reason: "focus lost".to_string(),
        })?;
        self.sink.notify(EngineNotification::StateChange {
            state: EngineState::Paused,
            reason: StateChangeReason::Background,
        })
    }

    /// Report an asynchronous engine failure.
    pub fn fail(&self, code: i32, message: &str) -> Result<()> {
        self.sink.notify(EngineNotification::Error {
            code,
            message: message.to_string(),
        })?;
        self.sink
            .notify(EngineNotification::state(EngineState::Error))
    }
}

struct SimulatedPlayer {
    sink: NotificationSink<EngineNotification>,
    players: Arc<Mutex<HashMap<SessionId, NotificationSink<EngineNotification>>>>,
    source: Option<MediaSource>,
    state: EngineState,
    duration_ms: u64,
}

impl SimulatedPlayer {
    fn transition(&mut self, state: EngineState) -> Result<()> {
        self.state = state;
        self.sink.notify(EngineNotification::state(state))
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state == EngineState::Released {
            return Err(BridgeError::OperationFailed(
                "player already released".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerHandle for SimulatedPlayer {
    async fn set_source(&mut self, source: MediaSource) -> Result<()> {
        self.ensure_live()?;
        if let MediaSource::File(path) = &source {
            if !path.exists() {
                self.sink.notify(EngineNotification::Error {
                    code: SOURCE_UNAVAILABLE,
                    message: format!("cannot open {}", path.display()),
                })?;
                return self.transition(EngineState::Error);
            }
        }
        self.source = Some(source);
        self.transition(EngineState::Initialized)
    }

    async fn prepare(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.source.is_none() {
            return Err(BridgeError::OperationFailed(
                "prepare called without a source".to_string(),
            ));
        }
        self.sink.notify(EngineNotification::DurationUpdate {
            duration_ms: self.duration_ms,
        })?;
        self.transition(EngineState::Prepared)
    }

    async fn play(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.transition(EngineState::Playing)
    }

    async fn pause(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.transition(EngineState::Paused)
    }

    async fn stop(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.transition(EngineState::Stopped)
    }

    async fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.ensure_live()?;
        let time_ms = position_ms.min(self.duration_ms);
        self.sink.notify(EngineNotification::SeekDone { time_ms })
    }

    async fn reset(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.source = None;
        self.transition(EngineState::Idle)
    }

    async fn release(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.players.lock().remove(&self.sink.session());
        self.transition(EngineState::Released)
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.ensure_live()?;
        debug!(session = %self.sink.session(), volume, "Simulated volume change");
        Ok(())
    }

    async fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.ensure_live()?;
        debug!(session = %self.sink.session(), speed, "Simulated speed change");
        Ok(())
    }

    async fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.ensure_live()?;
        debug!(session = %self.sink.session(), looping, "Simulated looping change");
        Ok(())
    }
}

struct SimulatedRecorder {
    sink: NotificationSink<RecorderNotification>,
    state: RecorderState,
    output: Option<std::path::PathBuf>,
}

impl SimulatedRecorder {
    fn transition(&mut self, state: RecorderState) -> Result<()> {
        self.state = state;
        self.sink.notify(RecorderNotification::StateChange {
            state,
            reason: StateChangeReason::User,
        })
    }

    fn require(&self, allowed: &[RecorderState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(BridgeError::OperationFailed(format!(
                "{} not allowed in state {}",
                operation, self.state
            )))
        }
    }
}

#[async_trait]
impl RecorderHandle for SimulatedRecorder {
    async fn prepare(&mut self, config: RecorderConfig) -> Result<()> {
        self.require(&[RecorderState::Idle], "prepare")?;
        if let Some(parent) = config.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(BridgeError::OperationFailed(format!(
                    "output directory {} does not exist",
                    parent.display()
                )));
            }
        }
        self.output = Some(config.output);
        self.transition(RecorderState::Prepared)
    }

    async fn start(&mut self) -> Result<()> {
        self.require(&[RecorderState::Prepared], "start")?;
        if let Some(output) = &self.output {
            std::fs::File::create(output)?;
        }
        self.transition(RecorderState::Started)
    }

    async fn pause(&mut self) -> Result<()> {
        self.require(&[RecorderState::Started], "pause")?;
        self.transition(RecorderState::Paused)
    }

    async fn resume(&mut self) -> Result<()> {
        self.require(&[RecorderState::Paused], "resume")?;
        self.transition(RecorderState::Started)
    }

    async fn stop(&mut self) -> Result<()> {
        self.require(&[RecorderState::Started, RecorderState::Paused], "stop")?;
        self.transition(RecorderState::Stopped)
    }

    async fn reset(&mut self) -> Result<()> {
        self.output = None;
        self.transition(RecorderState::Idle)
    }

    async fn release(&mut self) -> Result<()> {
        self.transition(RecorderState::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::NotificationHub;

    #[tokio::test]
    async fn player_acknowledges_requests_in_order() {
        let (hub, mut rx) = NotificationHub::channel();
        let engine = SimulatedEngine::new().with_duration(1_000);
        let mut player = engine.create_player(hub.sink(SessionId::new(1))).await.unwrap();

        player
            .set_source(MediaSource::Url("https://example.com/a.mp3".into()))
            .await
            .unwrap();
        player.prepare().await.unwrap();
        player.seek(5_000).await.unwrap();

        let received: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|n| n.notification)
            .collect();
        assert_eq!(
            received,
            vec![
                EngineNotification::state(EngineState::Initialized),
                EngineNotification::DurationUpdate { duration_ms: 1_000 },
                EngineNotification::state(EngineState::Prepared),
                EngineNotification::SeekDone { time_ms: 1_000 },
            ]
        );
    }

    #[tokio::test]
    async fn missing_file_reports_error_state() {
        let (hub, mut rx) = NotificationHub::channel();
        let engine = SimulatedEngine::new();
        let mut player = engine.create_player(hub.sink(SessionId::new(2))).await.unwrap();

        player
            .set_source(MediaSource::File("/definitely/not/here.mp3".into()))
            .await
            .unwrap();

        let first = rx.try_recv().unwrap().notification;
        assert!(matches!(first, EngineNotification::Error { code, .. } if code == SOURCE_UNAVAILABLE));
        assert_eq!(
            rx.try_recv().unwrap().notification,
            EngineNotification::state(EngineState::Error)
        );
    }

    #[tokio::test]
    async fn released_player_rejects_calls() {
        let (hub, _rx) = NotificationHub::channel();
        let engine = SimulatedEngine::new();
        let mut player = engine.create_player(hub.sink(SessionId::new(3))).await.unwrap();

        player.release().await.unwrap();
        assert!(player.play().await.is_err());
        assert!(engine.control(SessionId::new(3)).is_none());
    }

    #[tokio::test]
    async fn control_injects_interrupt() {
        let (hub, mut rx) = NotificationHub::channel();
        let engine = SimulatedEngine::new();
        let _player = engine.create_player(hub.sink(SessionId::new(4))).await.unwrap();

        engine.control(SessionId::new(4)).unwrap().interrupt().unwrap();
        assert!(matches!(
            rx.try_recv().unwrap().notification,
            EngineNotification::AudioInterrupt { .. }
        ));
        assert_eq!(
            rx.try_recv().unwrap().notification,
            EngineNotification::StateChange {
                state: EngineState::Paused,
                reason: StateChangeReason::Background,
            }
        );
    }

    #[tokio::test]
    async fn recorder_enforces_state_order() {
        let (hub, _rx) = NotificationHub::channel();
        let engine = SimulatedEngine::new();
        let mut recorder = engine
            .create_recorder(hub.sink(SessionId::new(5)))
            .await
            .unwrap();

        assert!(recorder.start().await.is_err());
        assert!(recorder.pause().await.is_err());
    }
}
