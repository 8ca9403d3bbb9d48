use std::sync;

use memtally_accesslog::AccessKind;

/// Receives every memory access reported by the interception hook.
///
/// Implementations are called from whichever thread of the observed program performed the
/// access, possibly concurrently, and must not block.
pub trait AccessObserver: Sync + Send {
    fn on_access(&self, address: u64, size: u64, kind: AccessKind);
}

/// Named observers attached to a session, in attachment order.
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: Vec<(String, sync::Arc<dyn AccessObserver>)>,
}

impl ObserverList {
    /// Attaches `observer` under `key`, replacing an observer previously attached with that key.
    pub(crate) fn add(&mut self, key: impl AsRef<str>, observer: sync::Arc<dyn AccessObserver>) {
        log::debug!("Adding access observer: {}", key.as_ref());

        match self.entries.iter().position(|(k, _)| k == key.as_ref()) {
            Some(position) => self.entries[position].1 = observer,
            None => self.entries.push((key.as_ref().to_string(), observer)),
        }
    }

    pub(crate) fn remove(&mut self, key: impl AsRef<str>) -> bool {
        log::debug!("Removing access observer: {}", key.as_ref());

        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key.as_ref());
        before != self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn to_dispatch_list(&self) -> sync::Arc<[sync::Arc<dyn AccessObserver>]> {
        self.entries.iter()
            .map(|(_, observer)| observer.clone())
            .collect()
    }
}
