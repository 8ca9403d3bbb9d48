use std::io;
use std::io::Read;

use crate::AccessEvent;
use crate::error::LogError;

const FRAME_HEADER_SIZE: u64 = 8;

/// Iterates the frames written by [`crate::LogWriter`].
pub struct LogReader<R: Read> {
    source: R,
    offset: u64,
    done: bool,
}

impl<R: Read> LogReader<R> {
    pub fn new(source: R) -> Self {
        Self { source, offset: 0, done: false }
    }

    fn next_frame(&mut self) -> Result<Option<AccessEvent>, LogError> {
        let mut size_buffer = [0u8; FRAME_HEADER_SIZE as usize];
        let read = read_fully(&mut self.source, &mut size_buffer)?;
        if read == 0 {
            return Ok(None);
        }
        if read < size_buffer.len() {
            return Err(LogError::Truncated { offset: self.offset });
        }

        let size = u64::from_le_bytes(size_buffer);
        let mut buffer = Vec::new();
        let payload = (&mut self.source).take(size).read_to_end(&mut buffer)?;
        if (payload as u64) < size {
            return Err(LogError::Truncated { offset: self.offset });
        }

        let decoded: AccessEvent = bincode::deserialize(&buffer[..])?;
        self.offset += FRAME_HEADER_SIZE + size;

        Ok(Some(decoded))
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<AccessEvent, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_frame() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

// Like read_exact but reports how many bytes were read before EOF.
fn read_fully(source: &mut impl Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
