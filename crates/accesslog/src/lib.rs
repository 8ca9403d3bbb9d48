use std::fmt;
use serde::{Serialize, Deserialize};

pub mod error;
pub mod reader;
pub mod writer;

pub use error::LogError;
pub use reader::LogReader;
pub use writer::LogWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "R"),
            AccessKind::Write => write!(f, "W"),
        }
    }
}

/// One memory operand of one retired instruction, as reported by the interception hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub address: u64,
    pub size: u64,
    pub kind: AccessKind,
}

impl AccessEvent {
    pub fn read(address: u64, size: u64) -> Self {
        Self { address, size, kind: AccessKind::Read }
    }

    pub fn write(address: u64, size: u64) -> Self {
        Self { address, size, kind: AccessKind::Write }
    }
}
