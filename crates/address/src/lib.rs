use std::ops;
use std::fmt;
use std::fmt::Formatter;

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Default)]
pub struct Address {
    pub value: u64,
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self { value }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#x})", self.value)
    }
}

/// Half-open byte interval `[base, base + size)`.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Default)]
pub struct AddressRange {
    pub base: Address,
    pub size: u64,
}

impl AddressRange {
    pub fn new(base: impl Into<Address>, size: u64) -> Self {
        Self { base: base.into(), size }
    }

    /// Exclusive end of the range. Widened to `u128` since `base + size` may exceed `u64::MAX`.
    pub fn end(&self) -> u128 {
        self.base.value as u128 + self.size as u128
    }

    /// Strict intersection test: `self.base < other.end && other.base < self.end`.
    ///
    /// Ranges that merely touch (one ends where the other starts) do not overlap.
    #[inline(always)]
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        (self.base.value as u128) < other.end() && (other.base.value as u128) < self.end()
    }

    pub fn contains(&self, address: impl Into<Address>) -> bool {
        let address = address.into().value as u128;
        address >= self.base.value as u128 && address < self.end()
    }
}

impl From<ops::Range<u64>> for AddressRange {
    fn from(range: ops::Range<u64>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl fmt::Debug for AddressRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AddressRange({:#x}..{:#x})", self.base.value, self.end())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Address, AddressRange};

    #[test]
    fn we_can_get_the_end_of_a_range() {
        let base: Address = 0x1000u64.into();
        let range = AddressRange::new(base, 0x100);

        assert_eq!(range.end(), 0x1100);
    }

    #[test]
    fn range_end_past_the_address_space_does_not_wrap() {
        let range = AddressRange::new(u64::MAX, 1);

        assert_eq!(range.end(), u64::MAX as u128 + 1);
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let region = AddressRange::new(100u64, 8);
        let access = AddressRange::new(108u64, 8);

        assert!(!region.overlaps(&access));
        assert!(!access.overlaps(&region));
    }

    #[test]
    fn a_single_shared_byte_overlaps() {
        let region = AddressRange::new(100u64, 8);
        let access = AddressRange::new(107u64, 8);

        assert!(region.overlaps(&access));
        assert!(access.overlaps(&region));
    }

    #[test]
    fn containment_and_identity_overlap() {
        let region = AddressRange::new(0x1000u64, 0x10);

        assert!(region.overlaps(&AddressRange::new(0x1004u64, 4)));
        assert!(region.overlaps(&AddressRange::new(0x0ff0u64, 0x100)));
        assert!(region.overlaps(&region));
    }

    #[test]
    fn ranges_at_the_top_of_the_address_space_overlap() {
        let region = AddressRange::new(u64::MAX - 7, 8);
        let access = AddressRange::new(u64::MAX, 8);

        assert!(region.overlaps(&access));
        assert_eq!(region.end(), u64::MAX as u128 + 1);
    }

    #[test]
    fn we_can_check_containment() {
        let range: AddressRange = (0x2000..0x2010).into();

        assert!(range.contains(0x2000u64));
        assert!(range.contains(0x200fu64));
        assert!(!range.contains(0x2010u64));
    }
}
