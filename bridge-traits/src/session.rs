//! Session identifiers and the notification channel engines report through.
//!
//! Native engines deliver lifecycle callbacks asynchronously. Each handle is
//! given a [`NotificationSink`] bound to the session that owns it; everything a
//! handle reports lands on a single per-module queue in delivery order, tagged
//! with the session identifier so the core can route it.
//!
//! Every sink also carries a handle generation. When a session identifier is
//! reused for a new handle, anything still queued from the previous handle
//! carries the old generation and can be discarded.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Identifier of a player or recorder session, chosen by the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A notification tagged with the session whose handle produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionNotification<N> {
    pub session: SessionId,
    /// Generation of the sink that produced this notification.
    pub generation: u64,
    pub notification: N,
}

/// Receiving half of a module's notification queue.
pub type NotificationReceiver<N> = mpsc::UnboundedReceiver<SessionNotification<N>>;

/// Sending half bound to one session. Handed to the engine at handle creation.
pub struct NotificationSink<N> {
    session: SessionId,
    generation: u64,
    sender: mpsc::UnboundedSender<SessionNotification<N>>,
}

impl<N> NotificationSink<N> {
    /// Session this sink reports for.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Generation assigned by the hub when this sink was created.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Queue a notification for the core.
    ///
    /// Fails only when the owning module has been dropped.
    pub fn notify(&self, notification: N) -> Result<()> {
        self.sender
            .send(SessionNotification {
                session: self.session,
                generation: self.generation,
                notification,
            })
            .map_err(|_| BridgeError::ChannelClosed(self.session))
    }
}

impl<N> Clone for NotificationSink<N> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            generation: self.generation,
            sender: self.sender.clone(),
        }
    }
}

impl<N> fmt::Debug for NotificationSink<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationSink")
            .field("session", &self.session)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Factory for per-session sinks sharing one queue.
pub struct NotificationHub<N> {
    sender: mpsc::UnboundedSender<SessionNotification<N>>,
    generations: Arc<AtomicU64>,
}

impl<N> NotificationHub<N> {
    /// Create a hub and the receiver that drains it.
    pub fn channel() -> (Self, NotificationReceiver<N>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                generations: Arc::new(AtomicU64::new(1)),
            },
            receiver,
        )
    }

    /// Create a sink that tags everything it sends with `session` and a
    /// generation no earlier sink of this hub used.
    pub fn sink(&self, session: SessionId) -> NotificationSink<N> {
        NotificationSink {
            session,
            generation: self.generations.fetch_add(1, Ordering::Relaxed),
            sender: self.sender.clone(),
        }
    }
}

impl<N> Clone for NotificationHub<N> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            generations: Arc::clone(&self.generations),
        }
    }
}

impl<N> fmt::Debug for NotificationHub<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub").finish()
    }
}
