use std::io;
use std::path::PathBuf;

use thiserror::Error;
use memtally_accesslog::LogError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("line {line}: region ID {id} was already registered")]
    DuplicateId { line: usize, id: u64 },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not read region descriptor {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("could not read region descriptor: {0}")]
    Read(io::Error),

    #[error("could not parse region descriptor: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not open report artifact {path:?}: {source}")]
    Artifact { path: PathBuf, source: io::Error },

    #[error("could not write report artifact {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not open event source {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("could not read event source: {0}")]
    Io(#[from] io::Error),

    #[error("could not replay access log: {0}")]
    Log(#[from] LogError),

    #[error("access trace line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("could not create access log {path:?}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("could not write access log: {0}")]
    Log(#[from] LogError),

    #[error("access log writer thread panicked")]
    WriterPanicked,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("observers can only be attached before the session starts")]
    AlreadyStarted,

    #[error("{count} hook(s) still attached, the session is not quiescent")]
    HookStillAttached { count: usize },

    #[error("the session has already been finished")]
    Finished,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
