//! Decoding DBN and Zstd-compressed DBN files and streams. Decoders implement the
//! [`DecodeRecordRef`], [`DecodeRecord`], and [`DbnMetadata`] traits.
mod channel;
pub mod dbn;
mod dyn_reader;
mod stream;
pub mod zstd;

// Re-exports
pub use self::{
    channel::{ByteChannel, ByteChannelWriter},
    dbn::{Decoder, MetadataDecoder, RecordDecoder},
    dyn_reader::DynReader,
    stream::StreamIterDecoder,
};
pub use crate::compat::decode_record_ref;

use crate::{HasRType, Metadata, RecordRef, Result};

/// Trait for types that decode references to DBN records of a dynamic type.
pub trait DecodeRecordRef {
    /// Tries to decode a generic reference to a record. Returns `Ok(None)` if the input
    /// has been exhausted.
    ///
    /// The returned reference is only valid until the next call to the decoder.
    ///
    /// # Errors
    /// This function returns an error if the underlying reader returns an error of a
    /// kind other than `io::ErrorKind::UnexpectedEof` upon reading.
    ///
    /// If the `length` property of the record is invalid, an
    /// [`Error::Decode`](crate::Error::Decode) will be returned.
    fn decode_record_ref(&mut self) -> Result<Option<RecordRef<'_>>>;
}

/// Trait for types that decode DBN records of a particular type.
pub trait DecodeRecord {
    /// Tries to decode a reference to a single record of type `T`. Returns `Ok(None)`
    /// if the input has been exhausted.
    ///
    /// # Errors
    /// This function returns an error if the underlying reader returns an error of a
    /// kind other than `io::ErrorKind::UnexpectedEof` upon reading.
    ///
    /// If the next record is of a different type than `T`, an
    /// [`Error::Conversion`](crate::Error::Conversion) will be returned.
    ///
    /// If the `length` property of the record is invalid, an
    /// [`Error::Decode`](crate::Error::Decode) will be returned.
    fn decode_record<T: HasRType>(&mut self) -> Result<Option<&T>>;

    /// Tries to decode all records into a `Vec`. This eagerly decodes the data.
    ///
    /// # Errors
    /// This function returns an error if the underlying reader returns an error of a
    /// kind other than `io::ErrorKind::UnexpectedEof` upon reading.
    ///
    /// If any of the records is of a different type than `T`, an
    /// [`Error::Conversion`](crate::Error::Conversion) will be returned.
    ///
    /// If the `length` property of any of the records is invalid, a
    /// [`Error::Decode`](crate::Error::Decode) will be returned.
    fn decode_records<T: HasRType + Clone>(mut self) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        let mut res = Vec::new();
        while let Some(rec) = self.decode_record::<T>()? {
            res.push(rec.clone());
        }
        Ok(res)
    }
}

/// Trait for decoders with metadata about what's being decoded.
pub trait DbnMetadata {
    /// Returns an immutable reference to the decoded [`Metadata`].
    fn metadata(&self) -> &Metadata;

    /// Returns a mutable reference to the decoded [`Metadata`].
    fn metadata_mut(&mut self) -> &mut Metadata;
}

/// A trait for decoders that can be converted to streaming iterators.
pub trait DecodeStream: DecodeRecord + Sized {
    /// Converts the decoder into a streaming iterator of records of type `T`. This
    /// lazily decodes the data.
    fn decode_stream<T: HasRType>(self) -> StreamIterDecoder<Self, T>;
}

/// Reads into `buf` until it's full or the end of the stream is reached, returning
/// the number of bytes read. Unlike [`std::io::Read::read_exact`], the end of the
/// stream isn't an error.
pub(crate) fn read_up_to(reader: &mut impl std::io::Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use super::*;

    struct Trickle<'a> {
        data: &'a [u8],
        interrupted: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.interrupted = false;
            let Some((first, rest)) = self.data.split_first() else {
                return Ok(0);
            };
            match buf.first_mut() {
                Some(b) => {
                    *b = *first;
                    self.data = rest;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn test_read_up_to_retries_interrupted_and_short_reads() {
        let mut reader = Trickle {
            data: b"DBN\x03rest",
            interrupted: false,
        };
        let mut buf = [0; 4];
        assert_eq!(read_up_to(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"DBN\x03");
    }

    #[test]
    fn test_read_up_to_stops_at_eof() {
        let mut buf = [0; 8];
        assert_eq!(read_up_to(&mut b"DB".as_slice(), &mut buf).unwrap(), 2);
        assert_eq!(read_up_to(&mut io::empty(), &mut buf).unwrap(), 0);
    }
}
