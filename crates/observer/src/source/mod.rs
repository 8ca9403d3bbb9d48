use memtally_accesslog::AccessEvent;

use crate::hook::Hook;
use crate::error::SourceError;

mod text;
mod replay;

pub use text::TextTraceSource;
pub use replay::LogReplaySource;

/// Something that produces the observed program's memory accesses and feeds them to a hook:
/// a live instrumentation engine, a recorded log, or a simulator.
///
/// `drive` returns once the observed program has terminated, with the number of events
/// delivered. No event may be delivered after it returns.
pub trait EventSource {
    fn drive(&mut self, hook: &Hook) -> Result<u64, SourceError>;
}

/// Delivers a fixed sequence of events.
pub struct IterSource<I> {
    events: I,
}

impl<I: Iterator<Item = AccessEvent>> IterSource<I> {
    pub fn new(events: impl IntoIterator<IntoIter = I, Item = AccessEvent>) -> Self {
        Self { events: events.into_iter() }
    }
}

impl<I: Iterator<Item = AccessEvent>> EventSource for IterSource<I> {
    fn drive(&mut self, hook: &Hook) -> Result<u64, SourceError> {
        let mut delivered = 0;
        for event in self.events.by_ref() {
            hook.on_access(event.address, event.size, event.kind);
            delivered += 1;
        }

        Ok(delivered)
    }
}
