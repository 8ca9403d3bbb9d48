pub mod error;
pub mod hook;
pub mod report;
pub mod source;
pub mod session;
pub mod observer;
pub mod recorder;
pub mod registry;
pub mod accountant;

pub use memtally_accesslog::{AccessEvent, AccessKind};

pub use hook::Hook;
pub use session::Session;
pub use recorder::Recorder;
pub use accountant::Accountant;
pub use observer::AccessObserver;
pub use report::{Report, RegionTally};
pub use source::{EventSource, IterSource, LogReplaySource, TextTraceSource};
pub use registry::{DuplicatePolicy, LoadOptions, ParsePolicy, Region, RegionRegistry};
