use std::sync::atomic::{AtomicU64, Ordering};

use memtally_address::AddressRange;
use memtally_accesslog::AccessKind;

use crate::report::RegionTally;
use crate::registry::RegionRegistry;

struct TrackedRegion {
    id: u64,
    range: AddressRange,
    reads: AtomicU64,
    writes: AtomicU64,
}

/// Per-region read/write counters for a frozen set of regions.
///
/// Counters are relaxed atomics: concurrent hooks never lose an increment, but no ordering is
/// implied between regions. Regions are stored by ascending ID.
pub struct Accountant {
    regions: Box<[TrackedRegion]>,
}

impl Accountant {
    pub fn new(registry: &RegionRegistry) -> Self {
        let regions = registry.iter()
            .map(|r| TrackedRegion {
                id: r.id,
                range: r.range,
                reads: AtomicU64::new(0),
                writes: AtomicU64::new(0),
            })
            .collect();

        Self { regions }
    }

    /// Increments the `kind` counter of every region `[address, address + size)` overlaps.
    #[inline]
    pub fn record(&self, address: u64, size: u64, kind: AccessKind) {
        let access = AddressRange::new(address, size);

        for region in self.regions.iter() {
            if !region.range.overlaps(&access) {
                continue;
            }

            let counter = match kind {
                AccessKind::Read => &region.reads,
                AccessKind::Write => &region.writes,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Current counters, by ascending region ID.
    pub fn snapshot(&self) -> Vec<RegionTally> {
        self.regions.iter()
            .map(|r| RegionTally {
                id: r.id,
                range: r.range,
                reads: r.reads.load(Ordering::Relaxed),
                writes: r.writes.load(Ordering::Relaxed),
            })
            .collect()
    }
}
