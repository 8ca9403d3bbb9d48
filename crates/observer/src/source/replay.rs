use std::fs;
use std::io;
use std::path::Path;
use std::io::Read;

use log::debug;
use memtally_accesslog::LogReader;

use crate::hook::Hook;
use crate::error::SourceError;
use crate::source::EventSource;

/// Replays a binary access log written by [`crate::Recorder`].
pub struct LogReplaySource<R: Read> {
    reader: LogReader<R>,
}

impl<R: Read> LogReplaySource<R> {
    pub fn new(source: R) -> Self {
        Self { reader: LogReader::new(source) }
    }
}

impl LogReplaySource<io::BufReader<fs::File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .map_err(|source| SourceError::Open { path: path.to_path_buf(), source })?;

        debug!("Replaying access log {}", path.display());
        Ok(Self::new(io::BufReader::new(file)))
    }
}

impl<R: Read> EventSource for LogReplaySource<R> {
    fn drive(&mut self, hook: &Hook) -> Result<u64, SourceError> {
        let mut delivered = 0;
        for event in self.reader.by_ref() {
            let event = event?;
            hook.on_access(event.address, event.size, event.kind);
            delivered += 1;
        }

        Ok(delivered)
    }
}
