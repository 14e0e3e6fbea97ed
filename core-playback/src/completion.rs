//! Single-shot continuations linking an API call to the engine notification
//! that finishes it.
//!
//! The session keeps the [`Continuation`]; the caller awaits the
//! [`Completion`]. Dropping a continuation without resolving it (the session
//! was destroyed) surfaces as [`PlaybackError::Abandoned`].

use crate::error::{PlaybackError, Result};
use bridge_traits::SessionId;
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::trace;

/// Create a linked continuation/completion pair.
pub fn pair<T>(
    session: SessionId,
    operation: &'static str,
    timeout: Option<Duration>,
) -> (Continuation<T>, Completion<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Continuation {
            sender,
            session,
            operation,
        },
        Completion {
            receiver,
            session,
            operation,
            timeout,
        },
    )
}

/// Sending half, owned by the session.
pub struct Continuation<T> {
    sender: oneshot::Sender<Result<T>>,
    session: SessionId,
    operation: &'static str,
}

impl<T> Continuation<T> {
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn resolve(self, value: T) {
        self.finish(Ok(value));
    }

    pub fn fail(self, err: PlaybackError) {
        self.finish(Err(err));
    }

    fn finish(self, outcome: Result<T>) {
        if self.sender.send(outcome).is_err() {
            trace!(
                session = %self.session,
                operation = self.operation,
                "Completion dropped before resolution"
            );
        }
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("session", &self.session)
            .field("operation", &self.operation)
            .finish()
    }
}

/// Receiving half, awaited by the caller.
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    receiver: oneshot::Receiver<Result<T>>,
    session: SessionId,
    operation: &'static str,
    timeout: Option<Duration>,
}

impl<T> Completion<T> {
    /// A completion that is already resolved with `value`.
    pub fn ready(session: SessionId, operation: &'static str, value: T) -> Self {
        let (continuation, completion) = pair(session, operation, None);
        continuation.resolve(value);
        completion
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Wait for the engine to confirm the operation.
    ///
    /// With a timeout configured, expiry yields [`PlaybackError::Timeout`] and
    /// leaves the session as it is.
    pub async fn wait(self) -> Result<T> {
        let Completion {
            receiver,
            session,
            operation,
            timeout,
        } = self;

        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, receiver)
                .await
                .map_err(|_| PlaybackError::Timeout { operation, session })?,
            None => receiver.await,
        };

        received.map_err(|_| PlaybackError::Abandoned { operation, session })?
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("session", &self.session)
            .field("operation", &self.operation)
            .field("timeout", &self.timeout)
            .finish()
    }
}
