use std::os::raw::c_char;

use crate::{Error, Result};

/// Tries to convert a str slice to fixed-length null-terminated C char array.
///
/// # Errors
/// This function returns an error if `s` contains more than N - 1 characters. The last
/// character is reserved for the null byte.
pub fn str_to_c_chars<const N: usize>(s: &str) -> Result<[c_char; N]> {
    if s.len() > N.saturating_sub(1) {
        return Err(Error::encode(format!(
            "string cannot be longer than {}; received str of length {}",
            N.saturating_sub(1),
            s.len(),
        )));
    }
    let mut res = [0; N];
    for (c, byte) in res.iter_mut().zip(s.as_bytes()) {
        *c = *byte as c_char;
    }
    Ok(res)
}

/// Tries to convert a slice of `c_char`s to a UTF-8 `str`. The string ends at the
/// first null byte.
///
/// # Errors
/// This function returns an error if `chars` contains no null byte or contains
/// invalid UTF-8 before it.
pub fn c_chars_to_str(chars: &[c_char]) -> Result<&str> {
    let bytes: &[u8] = bytemuck::cast_slice(chars);
    let end = bytes
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| Error::decode("missing null terminator in fixed-width string"))?;
    std::str::from_utf8(&bytes[..end])
        .map_err(|e| Error::utf8(e, format!("converting c_char array: {:?}", &bytes[..end])))
}

/// Parses a raw nanosecond-precision UNIX timestamp to an `OffsetDateTime`. Returns
/// `None` if `ts` contains the sentinel for a null timestamp.
pub fn ts_to_dt(ts: u64) -> Option<time::OffsetDateTime> {
    if ts == crate::UNDEF_TIMESTAMP {
        None
    } else {
        time::OffsetDateTime::from_unix_timestamp_nanos(ts as i128).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_chars_round_trip() {
        let chars = str_to_c_chars::<8>("ESZ4").unwrap();
        assert_eq!(c_chars_to_str(&chars).unwrap(), "ESZ4");
    }

    #[test]
    fn test_str_to_c_chars_too_long() {
        assert!(matches!(
            str_to_c_chars::<4>("ABCD"),
            Err(Error::Encode(_))
        ));
        assert!(str_to_c_chars::<4>("ABC").is_ok());
    }

    #[test]
    fn test_c_chars_missing_terminator() {
        let chars = [b'A' as c_char; 4];
        assert!(matches!(c_chars_to_str(&chars), Err(Error::Decode(_))));
    }

    #[test]
    fn test_c_chars_invalid_utf8() {
        let chars = [0xFFu8 as c_char, 0];
        assert!(matches!(c_chars_to_str(&chars), Err(Error::Utf8 { .. })));
    }

    #[test]
    fn test_ts_to_dt() {
        assert!(ts_to_dt(crate::UNDEF_TIMESTAMP).is_none());
        let dt = ts_to_dt(1_658_441_851_000_000_000).unwrap();
        assert_eq!(dt.year(), 2022);
    }
}
