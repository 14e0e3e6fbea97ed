use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The platform default storage directory could not be prepared.
    #[error("App storage directory unavailable: {0}")]
    StorageDir(#[source] BridgeError),
}

pub type Result<T> = std::result::Result<T, Error>;
