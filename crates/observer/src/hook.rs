use std::sync;

use memtally_accesslog::AccessKind;

use crate::accountant::Accountant;
use crate::observer::AccessObserver;

/// The handle an instrumentation engine calls before every memory operand it executes.
///
/// Clones share the same accountant. A session can only be finished after every clone has been
/// dropped, which is how teardown ordering is enforced.
#[derive(Clone)]
pub struct Hook {
    accountant: sync::Arc<Accountant>,
    observers: sync::Arc<[sync::Arc<dyn AccessObserver>]>,
}

impl Hook {
    pub(crate) fn new(
        accountant: sync::Arc<Accountant>,
        observers: sync::Arc<[sync::Arc<dyn AccessObserver>]>,
    ) -> Self {
        Self { accountant, observers }
    }

    #[inline]
    pub fn on_access(&self, address: u64, size: u64, kind: AccessKind) {
        self.accountant.record(address, size, kind);

        for observer in self.observers.iter() {
            observer.on_access(address, size, kind);
        }
    }
}
