use std::fmt;
use std::path::{Path, PathBuf};

use crate::engine::backend::BackendError;

/// Setup-time error: building the engine, loading clips, reading config.
///
/// Steady-state playback never returns this; dropped sounds are `None`
/// and backend hiccups are logged.
#[derive(Debug)]
pub enum AudioError {
    Backend(BackendError),
    Io { path: PathBuf, source: std::io::Error },
    Wav { path: PathBuf, source: hound::Error },
    Config(String),
}

impl AudioError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        AudioError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn wav(path: &Path, source: hound::Error) -> Self {
        AudioError::Wav {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Backend(e) => write!(f, "audio backend: {}", e),
            AudioError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            AudioError::Wav { path, source } => {
                write!(f, "cannot read WAV {}: {}", path.display(), source)
            }
            AudioError::Config(msg) => write!(f, "config: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::Backend(e) => Some(e),
            AudioError::Io { source, .. } => Some(source),
            AudioError::Wav { source, .. } => Some(source),
            AudioError::Config(_) => None,
        }
    }
}

impl From<BackendError> for AudioError {
    fn from(e: BackendError) -> Self {
        AudioError::Backend(e)
    }
}

impl From<toml::de::Error> for AudioError {
    fn from(e: toml::de::Error) -> Self {
        AudioError::Config(e.to_string())
    }
}
