use std::sync;
use std::path::Path;

use log::info;

use crate::hook::Hook;
use crate::report::{self, Report};
use crate::error::SessionError;
use crate::source::EventSource;
use crate::accountant::Accountant;
use crate::registry::RegionRegistry;
use crate::observer::{AccessObserver, ObserverList};

/// Owns one observation session: the registry's counters, the attached observers, and the hook
/// handed to the instrumentation engine.
///
/// Observers are attached before the first hook is handed out. The report can only be emitted
/// once every hook has been dropped, and no hook is handed out after that.
pub struct Session {
    accountant: sync::Arc<Accountant>,
    observers: ObserverList,
    hook: Option<Hook>,
    finished: bool,
}

impl Session {
    pub fn new(registry: RegionRegistry) -> Self {
        Self {
            accountant: sync::Arc::new(Accountant::new(&registry)),
            observers: ObserverList::default(),
            hook: None,
            finished: false,
        }
    }

    pub fn attach_observer(
        &mut self,
        key: impl AsRef<str>,
        observer: sync::Arc<dyn AccessObserver>,
    ) -> Result<(), SessionError> {
        if self.hook.is_some() || self.finished {
            return Err(SessionError::AlreadyStarted);
        }

        self.observers.add(key, observer);
        Ok(())
    }

    pub fn detach_observer(&mut self, key: impl AsRef<str>) -> Result<bool, SessionError> {
        if self.hook.is_some() || self.finished {
            return Err(SessionError::AlreadyStarted);
        }

        Ok(self.observers.remove(key))
    }

    /// Starts the session if needed and hands out a hook for the instrumentation engine.
    pub fn hook(&mut self) -> Result<Hook, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }

        if self.hook.is_none() {
            info!(
                "Observation session started with {} region(s) and {} extra observer(s)",
                self.accountant.len(),
                self.observers.len(),
            );
        }

        let hook = self.hook
            .get_or_insert_with(|| Hook::new(self.accountant.clone(), self.observers.to_dispatch_list()))
            .clone();

        Ok(hook)
    }

    /// Lets `source` drive the hook until the observed program terminates.
    pub fn run(&mut self, source: &mut dyn EventSource) -> Result<u64, SessionError> {
        let hook = self.hook()?;
        let delivered = source.drive(&hook)?;

        info!("Event source finished after {} access(es)", delivered);
        Ok(delivered)
    }

    /// Current counters. Values may still move while hooks are live.
    pub fn snapshot(&self) -> Report {
        Report::from(self.accountant.as_ref())
    }

    /// Ends the session and emits the report to `artifact` and the log.
    ///
    /// Fails without touching the counters while any hook is still alive, so the caller can drop
    /// the straggler and finish again.
    pub fn finish(&mut self, artifact: impl AsRef<Path>) -> Result<Report, SessionError> {
        self.hook = None;

        // Hooks are only created through `&mut self`, so a unique Arc stays unique.
        let live_hooks = sync::Arc::strong_count(&self.accountant) - 1;
        if live_hooks > 0 {
            return Err(SessionError::HookStillAttached { count: live_hooks });
        }

        self.finished = true;
        Ok(report::emit(&self.accountant, artifact)?)
    }
}
