use std::io::Write;

use crate::AccessEvent;
use crate::error::LogError;

/// Appends length-prefixed bincode frames to the underlying sink.
pub struct LogWriter<W: Write> {
    sink: W,
    frames: u64,
}

impl<W: Write> LogWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, frames: 0 }
    }

    pub fn append(&mut self, event: &AccessEvent) -> Result<(), LogError> {
        let encoded: Vec<u8> = bincode::serialize(event)?;
        let size = encoded.len() as u64;

        self.sink.write_all(&size.to_le_bytes())?;
        self.sink.write_all(encoded.as_slice())?;
        self.frames += 1;

        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flushes and hands back the sink.
    pub fn finish(mut self) -> Result<W, LogError> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
