//! Media path resolution.
//!
//! Rules are tried in a fixed order:
//!
//! 1. starts with `http` → remote URL, verbatim
//! 2. starts with `/data/storage` or `file://` → local path, verbatim
//! 3. anything else → relative to the app storage directory

use crate::error::{PlaybackError, Result};
use bridge_traits::MediaSource;
use std::path::{Path, PathBuf};

pub const REMOTE_PREFIX: &str = "http";
pub const SANDBOX_PREFIX: &str = "/data/storage";
pub const FILE_MANAGER_PREFIX: &str = "file://";

const EMPTY_PATH: &str = "Provided path was empty";

#[derive(Debug, Clone)]
pub struct SourceResolver {
    app_storage_dir: PathBuf,
}

impl SourceResolver {
    pub fn new(app_storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_storage_dir: app_storage_dir.into(),
        }
    }

    pub fn app_storage_dir(&self) -> &Path {
        &self.app_storage_dir
    }

    /// Resolve a playback path.
    pub fn resolve(&self, path: &str) -> Result<MediaSource> {
        if path.trim().is_empty() {
            return Err(PlaybackError::InvalidPath(EMPTY_PATH.to_string()));
        }
        if path.starts_with(REMOTE_PREFIX) {
            return Ok(MediaSource::Url(path.to_string()));
        }
        Ok(MediaSource::File(self.local(path)))
    }

    /// Resolve a path that must stay on the device, such as a recording
    /// destination.
    pub fn resolve_local(&self, path: &str) -> Result<PathBuf> {
        match self.resolve(path)? {
            MediaSource::File(local) => Ok(local),
            MediaSource::Url(url) => Err(PlaybackError::InvalidPath(format!(
                "{} is not a local path",
                url
            ))),
        }
    }

    fn local(&self, path: &str) -> PathBuf {
        if path.starts_with(SANDBOX_PREFIX) || path.starts_with(FILE_MANAGER_PREFIX) {
            PathBuf::from(path)
        } else {
            let mut joined = self.app_storage_dir.clone().into_os_string();
            joined.push("/");
            joined.push(path);
            PathBuf::from(joined)
        }
    }
}
