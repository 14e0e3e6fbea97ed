use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Dispatch loop already started")]
    AlreadyStarted,

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl CoreError {
    /// `{err, message}` payload for errors raised by a session operation.
    pub fn payload(&self) -> Option<core_playback::ErrorPayload> {
        match self {
            CoreError::Playback(err) => Some(err.payload()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
