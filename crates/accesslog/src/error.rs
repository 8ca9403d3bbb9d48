use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("access log I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode or decode access event: {0}")]
    Codec(#[from] bincode::Error),

    #[error("access log ends in a truncated frame at byte {offset}")]
    Truncated { offset: u64 },
}
