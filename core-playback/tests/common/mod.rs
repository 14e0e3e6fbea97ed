//! Scripted fake engine shared by the integration tests.
//!
//! Handles only record the calls they receive. Tests play the engine's part
//! by pushing notifications through [`FakeEngine::notify`] and then pumping
//! the module.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    EngineNotification, EngineState, MediaEngine, MediaSource, NotificationReceiver,
    NotificationSink, PlayerHandle, RecorderConfig, RecorderHandle, RecorderNotification,
    RecorderState, SessionId, StateChangeReason,
};
use core_playback::{PlayConfig, PlayerModule, RecorderModule};
use core_runtime::events::{EventBus, Receiver, SessionEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const STORAGE: &str = "/data/storage/el2/base/haps/entry/files";

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetSource(MediaSource),
    Prepare,
    Play,
    Pause,
    Stop,
    Seek(u64),
    Reset,
    Release,
    SetVolume(f32),
    SetSpeed(f32),
    SetLooping(bool),
    RecorderPrepare(RecorderConfig),
    Start,
    Resume,
}

#[derive(Default)]
struct Inner {
    calls: Vec<(SessionId, Op)>,
    players: HashMap<SessionId, NotificationSink<EngineNotification>>,
    recorders: HashMap<SessionId, NotificationSink<RecorderNotification>>,
    failing: HashSet<&'static str>,
    created: usize,
}

#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: Arc<Mutex<Inner>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call named `op` fail synchronously.
    pub fn fail(&self, op: &'static str) {
        self.inner.lock().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<(SessionId, Op)> {
        self.inner.lock().calls.clone()
    }

    pub fn calls_for(&self, id: SessionId) -> Vec<Op> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|(session, _)| *session == id)
            .map(|(_, op)| op.clone())
            .collect()
    }

    pub fn count(&self, id: SessionId, op: &Op) -> usize {
        self.calls_for(id).iter().filter(|c| *c == op).count()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn created(&self) -> usize {
        self.inner.lock().created
    }

    /// Sink of the most recent player handle for `id`.
    pub fn player_sink(&self, id: SessionId) -> NotificationSink<EngineNotification> {
        self.inner
            .lock()
            .players
            .get(&id)
            .cloned()
            .expect("no player handle for session")
    }

    pub fn notify(&self, id: SessionId, notification: EngineNotification) {
        self.player_sink(id).notify(notification).unwrap();
    }

    pub fn notify_state(&self, id: SessionId, state: EngineState) {
        self.notify(id, EngineNotification::state(state));
    }

    pub fn notify_recorder(&self, id: SessionId, state: RecorderState) {
        let sink = self
            .inner
            .lock()
            .recorders
            .get(&id)
            .cloned()
            .expect("no recorder handle for session");
        sink.notify(RecorderNotification::StateChange {
            state,
            reason: StateChangeReason::User,
        })
        .unwrap();
    }

    pub fn notify_recorder_error(&self, id: SessionId, code: i32, message: &str) {
        let sink = self.inner.lock().recorders.get(&id).cloned().unwrap();
        sink.notify(RecorderNotification::Error {
            code,
            message: message.to_string(),
        })
        .unwrap();
    }

    fn record(&self, id: SessionId, name: &'static str, op: Op) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push((id, op));
        if inner.failing.contains(name) {
            return Err(BridgeError::OperationFailed(format!("{} rejected", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn create_player(
        &self,
        sink: NotificationSink<EngineNotification>,
    ) -> Result<Box<dyn PlayerHandle>> {
        let id = sink.session();
        {
            let mut inner = self.inner.lock();
            if inner.failing.contains("create_player") {
                return Err(BridgeError::NotAvailable("no decoder".into()));
            }
            inner.created += 1;
            inner.players.insert(id, sink);
        }
        Ok(Box::new(FakePlayer {
            id,
            engine: self.clone(),
        }))
    }

    async fn create_recorder(
        &self,
        sink: NotificationSink<RecorderNotification>,
    ) -> Result<Box<dyn RecorderHandle>> {
        let id = sink.session();
        {
            let mut inner = self.inner.lock();
            inner.created += 1;
            inner.recorders.insert(id, sink);
        }
        Ok(Box::new(FakeRecorder {
            id,
            engine: self.clone(),
        }))
    }
}

struct FakePlayer {
    id: SessionId,
    engine: FakeEngine,
}

#[async_trait]
impl PlayerHandle for FakePlayer {
    async fn set_source(&mut self, source: MediaSource) -> Result<()> {
        self.engine
            .record(self.id, "set_source", Op::SetSource(source))
    }

    async fn prepare(&mut self) -> Result<()> {
        self.engine.record(self.id, "prepare", Op::Prepare)
    }

    async fn play(&mut self) -> Result<()> {
        self.engine.record(self.id, "play", Op::Play)
    }

    async fn pause(&mut self) -> Result<()> {
        self.engine.record(self.id, "pause", Op::Pause)
    }

    async fn stop(&mut self) -> Result<()> {
        self.engine.record(self.id, "stop", Op::Stop)
    }

    async fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.engine.record(self.id, "seek", Op::Seek(position_ms))
    }

    async fn reset(&mut self) -> Result<()> {
        self.engine.record(self.id, "reset", Op::Reset)
    }

    async fn release(&mut self) -> Result<()> {
        self.engine.record(self.id, "release", Op::Release)
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.engine
            .record(self.id, "set_volume", Op::SetVolume(volume))
    }

    async fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.engine.record(self.id, "set_speed", Op::SetSpeed(speed))
    }

    async fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.engine
            .record(self.id, "set_looping", Op::SetLooping(looping))
    }
}

struct FakeRecorder {
    id: SessionId,
    engine: FakeEngine,
}

#[async_trait]
impl RecorderHandle for FakeRecorder {
    async fn prepare(&mut self, config: RecorderConfig) -> Result<()> {
        self.engine
            .record(self.id, "recorder_prepare", Op::RecorderPrepare(config))
    }

    async fn start(&mut self) -> Result<()> {
        self.engine.record(self.id, "start", Op::Start)
    }

    async fn pause(&mut self) -> Result<()> {
        self.engine.record(self.id, "pause", Op::Pause)
    }

    async fn resume(&mut self) -> Result<()> {
        self.engine.record(self.id, "resume", Op::Resume)
    }

    async fn stop(&mut self) -> Result<()> {
        self.engine.record(self.id, "stop", Op::Stop)
    }

    async fn reset(&mut self) -> Result<()> {
        self.engine.record(self.id, "reset", Op::Reset)
    }

    async fn release(&mut self) -> Result<()> {
        self.engine.record(self.id, "release", Op::Release)
    }
}

// ============================================================================
// Harnesses
// ============================================================================

pub fn id(n: i64) -> SessionId {
    SessionId::new(n)
}

pub struct PlayerHarness {
    pub engine: FakeEngine,
    pub player: PlayerModule,
    pub notifications: NotificationReceiver<EngineNotification>,
    pub events: Receiver<SessionEvent>,
}

impl PlayerHarness {
    pub fn new() -> Self {
        let engine = FakeEngine::new();
        let bus = EventBus::new(64);
        let events = bus.subscribe();
        let (player, notifications) = PlayerModule::new(Arc::new(engine.clone()), STORAGE, bus);
        Self {
            engine,
            player,
            notifications,
            events,
        }
    }

    /// Process every queued engine notification.
    pub async fn pump(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            self.player.handle_notification(notification).await;
        }
    }

    /// Deliver a state change and process it.
    pub async fn deliver(&mut self, id: SessionId, notification: EngineNotification) {
        self.engine.notify(id, notification);
        self.pump().await;
    }

    pub async fn deliver_state(&mut self, id: SessionId, state: EngineState) {
        self.deliver(id, EngineNotification::state(state)).await;
    }

    /// Prepare `id` and walk it to `prepared`.
    pub async fn prepared(&mut self, id: SessionId, config: PlayConfig) {
        let ready = self.player.prepare(id, "clip.mp3", config).await.unwrap();
        self.deliver_state(id, EngineState::Initialized).await;
        self.deliver_state(id, EngineState::Prepared).await;
        ready.wait().await.unwrap();
    }

    /// Every event published so far.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }
}

pub struct RecorderHarness {
    pub engine: FakeEngine,
    pub recorder: RecorderModule,
    pub notifications: NotificationReceiver<RecorderNotification>,
    pub events: Receiver<SessionEvent>,
}

impl RecorderHarness {
    pub fn new() -> Self {
        let engine = FakeEngine::new();
        let bus = EventBus::new(64);
        let events = bus.subscribe();
        let (recorder, notifications) =
            RecorderModule::new(Arc::new(engine.clone()), STORAGE, bus);
        Self {
            engine,
            recorder,
            notifications,
            events,
        }
    }

    pub async fn pump(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            self.recorder.handle_notification(notification).await;
        }
    }

    pub async fn deliver_state(&mut self, id: SessionId, state: RecorderState) {
        self.engine.notify_recorder(id, state);
        self.pump().await;
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }
}
