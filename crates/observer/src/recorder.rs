use std::fs;
use std::io;
use std::thread;
use std::path::Path;
use std::sync::mpsc;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error};
use memtally_accesslog::{AccessEvent, AccessKind, LogError, LogWriter};

use crate::error::RecorderError;
use crate::observer::AccessObserver;

/// Events buffered between the hooks and the writer thread before hooks block.
const QUEUE_CAPACITY: usize = 64 * 1024;

/// Records every access into a binary access log.
///
/// Hooks only push onto a bounded channel; frames are encoded and written by a dedicated thread.
/// A full queue blocks the hook until the writer catches up.
pub struct Recorder {
    tx: mpsc::SyncSender<AccessEvent>,
    writer: thread::JoinHandle<Result<u64, LogError>>,
    stopped: AtomicBool,
}

impl Recorder {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let path = path.as_ref();
        let file = fs::File::create(path)
            .map_err(|source| RecorderError::Create { path: path.to_path_buf(), source })?;

        debug!("Recording accesses to {}", path.display());
        Ok(Self::with_sink(io::BufWriter::new(file)))
    }

    pub fn with_sink<W: Write + Send + 'static>(sink: W) -> Self {
        let (tx, rx): (mpsc::SyncSender<AccessEvent>, mpsc::Receiver<AccessEvent>) =
            mpsc::sync_channel(QUEUE_CAPACITY);

        let writer = thread::spawn(move || -> Result<u64, LogError> {
            let mut writer = LogWriter::new(sink);
            for event in rx {
                writer.append(&event)?;
            }

            let frames = writer.frames();
            writer.finish()?;
            Ok(frames)
        });

        Self { tx, writer, stopped: AtomicBool::new(false) }
    }

    /// Closes the channel and waits for the writer thread to drain it.
    pub fn finish(self) -> Result<u64, RecorderError> {
        drop(self.tx);

        let frames = self.writer.join()
            .map_err(|_| RecorderError::WriterPanicked)??;

        debug!("Access log finished with {} frame(s)", frames);
        Ok(frames)
    }
}

impl AccessObserver for Recorder {
    fn on_access(&self, address: u64, size: u64, kind: AccessKind) {
        if self.stopped.load(Ordering::Relaxed) {
            return;
        }

        // The receiver only goes away when the writer failed, which finish() reports.
        if self.tx.send(AccessEvent { address, size, kind }).is_err()
            && !self.stopped.swap(true, Ordering::Relaxed) {
            error!("Access log writer stopped, dropping further events");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::thread;
    use std::io::Cursor;
    use std::sync::atomic::Ordering;

    use memtally_accesslog::{AccessEvent, AccessKind, LogError, LogReader};

    use crate::recorder::Recorder;
    use crate::error::RecorderError;
    use crate::observer::AccessObserver;

    #[test]
    fn recorder_writes_events_in_order() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let recorder = Recorder::create(file.path()).unwrap();
        recorder.on_access(0x10, 4, AccessKind::Read);
        recorder.on_access(0x20, 8, AccessKind::Write);

        assert_eq!(recorder.finish().unwrap(), 2);

        let bytes = std::fs::read(file.path()).unwrap();
        let events = LogReader::new(Cursor::new(bytes))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(events, vec![AccessEvent::read(0x10, 4), AccessEvent::write(0x20, 8)]);
    }

    #[test]
    fn recorder_with_no_events_writes_an_empty_log() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let recorder = Recorder::create(file.path()).unwrap();

        assert_eq!(recorder.finish().unwrap(), 0);
        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 0);
    }

    struct BrokenSink;

    impl io::Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_writer_drops_events_and_reports_on_finish() {
        let recorder = Recorder::with_sink(BrokenSink);

        // Sends succeed until the writer thread has failed and dropped its end of the queue.
        for _ in 0..1_000_000 {
            recorder.on_access(0x10, 4, AccessKind::Write);
            if recorder.stopped.load(Ordering::Relaxed) {
                break;
            }
            thread::yield_now();
        }
        assert!(recorder.stopped.load(Ordering::Relaxed));

        // Further accesses keep returning without blocking.
        recorder.on_access(0x20, 4, AccessKind::Read);

        assert!(matches!(recorder.finish(), Err(RecorderError::Log(LogError::Io(_)))));
    }
}
