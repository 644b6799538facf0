//! Recognizing Zstandard frames at the start of an input.

use std::ops::RangeInclusive;

/// Range of magic numbers for a Zstandard skippable frame.
pub const ZSTD_SKIPPABLE_MAGIC_RANGE: RangeInclusive<u32> = 0x184D2A50..=0x184D2A5F;
/// Magic number for the beginning of a Zstandard frame.
pub const ZSTD_MAGIC_NUMBER: u32 = 0xFD2FB528;
/// The number of leading bytes needed to recognize the legacy DBZ container.
pub(crate) const DBZ_PREFIX_LEN: usize = 12;
const DBZ_PREFIX: &[u8] = b"DBZ";

fn magic(bytes: &[u8]) -> Option<u32> {
    let magic: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(magic))
}

/// Returns `true` if `bytes` starts with a Zstandard frame.
pub fn starts_with_prefix(bytes: &[u8]) -> bool {
    magic(bytes) == Some(ZSTD_MAGIC_NUMBER)
}

/// Returns `true` if `bytes` starts with a Zstandard skippable frame, the first part of
/// a legacy DBZ file.
pub fn starts_with_skippable_frame(bytes: &[u8]) -> bool {
    magic(bytes).is_some_and(|magic| ZSTD_SKIPPABLE_MAGIC_RANGE.contains(&magic))
}

/// Returns `true` if `bytes` starts with the legacy DBZ container: a skippable frame
/// whose payload begins with `DBZ`.
pub fn is_legacy_dbz(bytes: &[u8]) -> bool {
    starts_with_skippable_frame(bytes) && bytes.get(8..11) == Some(DBZ_PREFIX)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_starts_with_prefix_valid() {
        let mut compressed = Vec::new();
        ::zstd::stream::copy_encode(b"DBN\x03".as_slice(), &mut compressed, 0).unwrap();
        assert!(starts_with_prefix(&compressed));
        assert!(!starts_with_skippable_frame(&compressed));
    }

    #[rstest]
    #[case::dbn(b"DBN\x02".as_slice())]
    #[case::short(&[0x28, 0xB5, 0x2F])]
    #[case::empty(&[])]
    fn test_starts_with_prefix_other(#[case] bytes: &[u8]) {
        assert!(!starts_with_prefix(bytes));
        assert!(!is_legacy_dbz(bytes));
    }

    #[rstest]
    #[case::first(0x184D2A50)]
    #[case::last(0x184D2A5F)]
    fn test_legacy_dbz(#[case] magic: u32) {
        let mut bytes = magic.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xF0, 0, 0, 0]);
        bytes.extend_from_slice(b"DBZ\x01");
        assert_eq!(bytes.len(), DBZ_PREFIX_LEN);
        assert!(is_legacy_dbz(&bytes));
        // skippable frame with another payload
        bytes[8..11].copy_from_slice(b"XYZ");
        assert!(starts_with_skippable_frame(&bytes));
        assert!(!is_legacy_dbz(&bytes));
    }
}
