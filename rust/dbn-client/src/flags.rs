//! Bit set flags used in DBN market data records.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// Indicates it's the last record in the event from the venue for a given
/// `instrument_id`.
pub const LAST: u8 = 1 << 7;
/// Indicates a top-of-book record, not an individual order.
pub const TOB: u8 = 1 << 6;
/// Indicates the record was sourced from a replay, such as a snapshot server.
pub const SNAPSHOT: u8 = 1 << 5;
/// Indicates an aggregated price level record, not an individual order.
pub const MBP: u8 = 1 << 4;
/// Indicates the `ts_recv` value is inaccurate due to clock issues or packet
/// reordering.
pub const BAD_TS_RECV: u8 = 1 << 3;
/// Indicates an unrecoverable gap was detected in the channel.
pub const MAYBE_BAD_BOOK: u8 = 1 << 2;
/// Reserved for publisher-specific use.
pub const PUBLISHER_SPECIFIC: u8 = 1 << 1;

const NAMED_FLAGS: [(u8, &str); 7] = [
    (LAST, "LAST"),
    (TOB, "TOB"),
    (SNAPSHOT, "SNAPSHOT"),
    (MBP, "MBP"),
    (BAD_TS_RECV, "BAD_TS_RECV"),
    (MAYBE_BAD_BOOK, "MAYBE_BAD_BOOK"),
    (PUBLISHER_SPECIFIC, "PUBLISHER_SPECIFIC"),
];

/// A transparent wrapper around the bit field used in several DBN record types,
/// namely [`MboMsg`](crate::MboMsg) and record types derived from it.
///
/// Has the same size and bit layout as the `u8` on the wire. Bits without a name
/// are preserved as-is.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Pod, Zeroable)]
pub struct FlagSet {
    raw: u8,
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = NAMED_FLAGS
            .iter()
            .filter(|(flag, _)| self.is_set(*flag))
            .map(|(_, name)| *name)
            .peekable();
        if names.peek().is_none() {
            return write!(f, "{}", self.raw);
        }
        let joined = names.collect::<Vec<_>>().join(" | ");
        write!(f, "{joined} ({})", self.raw)
    }
}

impl From<u8> for FlagSet {
    fn from(raw: u8) -> Self {
        Self { raw }
    }
}

impl From<FlagSet> for u8 {
    fn from(flags: FlagSet) -> Self {
        flags.raw
    }
}

impl FlagSet {
    /// Returns an empty [`FlagSet`]: one with no flags set.
    pub const fn empty() -> Self {
        Self { raw: 0 }
    }

    /// Creates a new flag set from `raw`.
    pub const fn new(raw: u8) -> Self {
        Self { raw }
    }

    /// Returns the raw value.
    pub const fn raw(&self) -> u8 {
        self.raw
    }

    /// Sets the flags directly with a raw `u8`.
    pub fn set_raw(&mut self, raw: u8) {
        self.raw = raw;
    }

    /// Turns all flags off.
    pub fn clear(&mut self) -> &mut Self {
        self.raw = 0;
        self
    }

    /// Returns `true` if any of the flags are set.
    pub const fn any(&self) -> bool {
        self.raw > 0
    }

    /// Returns `true` if no flags are set.
    pub const fn is_empty(&self) -> bool {
        self.raw == 0
    }

    /// Returns `true` if every bit in `mask` is set.
    pub const fn is_set(&self, mask: u8) -> bool {
        self.raw & mask == mask
    }

    /// Returns a copy with the bits in `mask` set.
    #[must_use]
    pub const fn with(self, mask: u8) -> Self {
        Self {
            raw: self.raw | mask,
        }
    }

    /// Sets the bits in `mask` to `value`, leaving all other bits untouched.
    pub fn set(&mut self, mask: u8, value: bool) -> &mut Self {
        if value {
            self.raw |= mask;
        } else {
            self.raw &= !mask;
        }
        self
    }

    /// Returns `true` if it's the last record in the event from the venue for a given
    /// `instrument_id`.
    pub const fn is_last(&self) -> bool {
        self.is_set(LAST)
    }

    /// Returns `true` if it's a top-of-book record, not an individual order.
    pub const fn is_tob(&self) -> bool {
        self.is_set(TOB)
    }

    /// Returns `true` if this record was sourced from a replay, such as a snapshot
    /// server.
    pub const fn is_snapshot(&self) -> bool {
        self.is_set(SNAPSHOT)
    }

    /// Returns `true` if this record is an aggregated price level record, not an
    /// individual order.
    pub const fn is_mbp(&self) -> bool {
        self.is_set(MBP)
    }

    /// Returns `true` if this record has an inaccurate `ts_recv` value due to clock
    /// issues or packet reordering.
    pub const fn is_bad_ts_recv(&self) -> bool {
        self.is_set(BAD_TS_RECV)
    }

    /// Returns `true` if this record is from a channel where an unrecoverable gap was
    /// detected.
    pub const fn is_maybe_bad_book(&self) -> bool {
        self.is_set(MAYBE_BAD_BOOK)
    }

    /// Returns `true` if the publisher-specific bit is set.
    pub const fn is_publisher_specific(&self) -> bool {
        self.is_set(PUBLISHER_SPECIFIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    #[case::empty(FlagSet::empty(), "0")]
    #[case::one_set(FlagSet::empty().with(MBP), "MBP (16)")]
    #[case::three_set(
        FlagSet::empty().with(TOB).with(SNAPSHOT).with(MAYBE_BAD_BOOK),
        "TOB | SNAPSHOT | MAYBE_BAD_BOOK (100)"
    )]
    #[case::all_set(
        FlagSet::new(255),
        "LAST | TOB | SNAPSHOT | MBP | BAD_TS_RECV | MAYBE_BAD_BOOK | PUBLISHER_SPECIFIC (255)"
    )]
    #[case::only_unnamed(FlagSet::new(1), "1")]
    fn dbg(#[case] target: FlagSet, #[case] exp: &str) {
        assert_eq!(format!("{target:?}"), exp);
    }

    #[test]
    fn same_layout_as_u8() {
        assert_eq!(std::mem::size_of::<FlagSet>(), 1);
        assert_eq!(std::mem::align_of::<FlagSet>(), 1);
        let flags = FlagSet::new(0b1010_0011);
        assert_eq!(bytemuck::bytes_of(&flags), &[0b1010_0011]);
    }

    #[test]
    fn set_and_unset_preserve_other_bits() {
        let mut flags = FlagSet::new(0b0000_0011);
        flags.set(LAST, true);
        assert!(flags.is_last());
        assert!(flags.is_publisher_specific());
        assert_eq!(flags.raw() & 1, 1);
        flags.set(LAST, false).set(TOB, true);
        assert!(!flags.is_last());
        assert!(flags.is_tob());
        assert_eq!(u8::from(flags), 0b0100_0011);
    }

    #[test]
    fn accessors() {
        let flags = FlagSet::new(LAST | BAD_TS_RECV);
        assert!(flags.is_last());
        assert!(flags.is_bad_ts_recv());
        assert!(!flags.is_snapshot());
        assert!(!flags.is_mbp());
        assert!(!flags.is_maybe_bad_book());
        assert!(flags.any());
        assert!(!flags.is_empty());
        let mut flags = flags;
        flags.clear();
        assert!(flags.is_empty());
    }
}
