//! # Event Bus System
//!
//! Provides the event stream the application layer listens to, built on
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Every event belongs to exactly one session and is published on a channel
//! named after the module and the session identifier:
//!
//! ```text
//! RCTAudioPlayerEvent:<sessionId>     { "event": "ended", "data": { "message": "play completed" } }
//! RCTAudioRecorderEvent:<sessionId>   { "event": "info",  "data": { "info": { "what": "started", "extra": 1 } } }
//! ```
//!
//! The vocabulary is closed: see [`EventName`]. Hosts forward each
//! [`SessionEvent`] to their JS bridge using [`SessionEvent::channel`] as the
//! device-event name and [`SessionEvent::to_wire`] as the payload.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   publish   ┌───────────┐   subscribe   ┌──────────────────┐
//! │ PlayerModule ├────────────>│           ├──────────────>│ host JS bridge   │
//! └──────────────┘             │ EventBus  │               └──────────────────┘
//! ┌──────────────┐   publish   │ (broadcast│   subscribe   ┌──────────────────┐
//! │RecorderModule├────────────>│  channel) ├──────────────>│ EventStream      │
//! └──────────────┘             └───────────┘               │ (one session)    │
//!                                                          └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::SessionId;
//! use core_runtime::events::{EventBus, EventData, EventName, EventSource, EventStream, SessionEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = EventStream::for_session(bus.subscribe(), EventSource::Player, SessionId::new(1));
//!
//! bus.publish(SessionEvent::player(
//!     SessionId::new(1),
//!     EventName::Ended,
//!     EventData::message("play completed"),
//! ));
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.channel(), "RCTAudioPlayerEvent:1");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: all senders dropped; treat as shutdown.

use bridge_traits::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Channel prefix for player events.
pub const PLAYER_EVENT_PREFIX: &str = "RCTAudioPlayerEvent";

/// Channel prefix for recorder events.
pub const RECORDER_EVENT_PREFIX: &str = "RCTAudioRecorderEvent";

// ============================================================================
// Event Types
// ============================================================================

/// Module that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Player,
    Recorder,
}

impl EventSource {
    /// Channel prefix the application layer subscribes to.
    pub fn prefix(&self) -> &'static str {
        match self {
            EventSource::Player => PLAYER_EVENT_PREFIX,
            EventSource::Recorder => RECORDER_EVENT_PREFIX,
        }
    }
}

/// Closed event vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    Pause,
    Error,
    Seeked,
    Ended,
    Looped,
    /// Output ownership lost. Announced only; the session state is untouched.
    ForcePause,
    /// Recorder state report.
    Info,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Pause => "pause",
            EventName::Error => "error",
            EventName::Seeked => "seeked",
            EventName::Ended => "ended",
            EventName::Looped => "looped",
            EventName::ForcePause => "forcePause",
            EventName::Info => "info",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorder state report carried by `info` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderInfo {
    /// Engine state name.
    pub what: String,
    /// Numeric state-change reason.
    pub extra: i32,
}

/// Payload shape shared by every event. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<RecorderInfo>,
}

impl EventData {
    /// Payload carrying only a human-readable message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_err(mut self, err: impl Into<String>) -> Self {
        self.err = Some(err.into());
        self
    }

    pub fn with_info(mut self, info: RecorderInfo) -> Self {
        self.info = Some(info);
        self
    }
}

/// `{event, data}` body delivered on a session channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    pub event: EventName,
    pub data: EventData,
}

/// One event for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub source: EventSource,
    pub session: SessionId,
    pub event: EventName,
    pub data: EventData,
}

impl SessionEvent {
    pub fn player(session: SessionId, event: EventName, data: EventData) -> Self {
        Self {
            source: EventSource::Player,
            session,
            event,
            data,
        }
    }

    pub fn recorder(session: SessionId, event: EventName, data: EventData) -> Self {
        Self {
            source: EventSource::Recorder,
            session,
            event,
            data,
        }
    }

    /// Channel name, `<prefix>:<sessionId>`.
    pub fn channel(&self) -> String {
        format!("{}:{}", self.source.prefix(), self.session)
    }

    /// Body delivered on [`channel`](Self::channel).
    pub fn to_wire(&self) -> WireEvent {
        WireEvent {
            event: self.event,
            data: self.data.clone(),
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to session events.
///
/// Cloning the bus yields another publisher on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event, treating the absence of subscribers as "nobody
    /// listening". Returns the number of subscribers reached.
    pub fn publish(&self, event: SessionEvent) -> usize {
        tracing::debug!(
            channel = %event.channel(),
            event = %event.event,
            "Publishing session event"
        );
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&SessionEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
pub struct EventStream {
    receiver: Receiver<SessionEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<SessionEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Stream of the events published on one session channel.
    pub fn for_session(
        receiver: Receiver<SessionEvent>,
        source: EventSource,
        session: SessionId,
    ) -> Self {
        Self::new(receiver).filter(move |event| event.source == source && event.session == session)
    }

    /// Adds a filter function to this stream, replacing any previous one.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SessionEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &SessionEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<SessionEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<SessionEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every matching event currently buffered.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }

    /// Adapt into a [`futures::Stream`] of matching events.
    ///
    /// Lagged gaps are skipped; the stream ends when the bus closes.
    pub fn into_stream(self) -> impl futures::Stream<Item = SessionEvent> + Send {
        futures::stream::unfold(self, |mut events| async move {
            loop {
                match events.recv().await {
                    Ok(event) => return Some((event, events)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
