use std::io;
use std::path::PathBuf;

use thiserror::Error;
use memtally::observer::error::{RecorderError, RegistryError, SessionError, SourceError};

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("could not read profile {path:?}: {source}")]
    ProfileRead { path: PathBuf, source: io::Error },

    #[error("could not parse profile {path:?}: {source}")]
    ProfileParse { path: PathBuf, source: toml::de::Error },

    #[error("unknown log level `{0}` in profile")]
    LogLevel(String),
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error("access log recorder is still shared after the session ended")]
    RecorderShared,
}
