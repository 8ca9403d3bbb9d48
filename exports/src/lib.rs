pub use memtally_address as address;
pub use memtally_logging as logging;
pub use memtally_observer as observer;
pub use memtally_accesslog as accesslog;

pub use memtally_observer::{
    AccessEvent,
    AccessKind,
    AccessObserver,
    EventSource,
    Hook,
    Report,
    RegionRegistry,
    Session,
};
