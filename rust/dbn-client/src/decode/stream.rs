use streaming_iterator::StreamingIterator;

use super::DecodeRecord;
use crate::record::HasRType;

/// Owned copies of the records of type `T` from a [`DecodeRecord`], decoded one per
/// call to [`advance`](StreamingIterator::advance). Iteration stops at the first
/// error, which is kept in [`last_err`](Self::last_err).
pub struct StreamIterDecoder<D, T>
where
    D: DecodeRecord,
    T: HasRType,
{
    decoder: D,
    /// `None` before the first `advance()` and once the stream is done.
    current: Option<T>,
    count: usize,
    last_err: Option<crate::Error>,
}

impl<D, T> StreamIterDecoder<D, T>
where
    D: DecodeRecord,
    T: HasRType,
{
    /// Wraps `decoder`.
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            current: None,
            count: 0,
            last_err: None,
        }
    }

    /// Returns the error that ended iteration, if any.
    pub fn last_err(&self) -> Option<&crate::Error> {
        self.last_err.as_ref()
    }

    /// Returns the number of records yielded so far.
    pub fn count_decoded(&self) -> usize {
        self.count
    }

    /// Consumes the iterator and returns the underlying decoder.
    pub fn into_inner(self) -> D {
        self.decoder
    }
}

impl<D, T> StreamingIterator for StreamIterDecoder<D, T>
where
    D: DecodeRecord,
    T: HasRType,
{
    type Item = T;

    fn advance(&mut self) {
        if self.last_err.is_some() {
            self.current = None;
            return;
        }
        self.current = match self.decoder.decode_record::<T>() {
            Ok(Some(rec)) => {
                self.count += 1;
                Some(*rec)
            }
            Ok(None) => None,
            Err(err) => {
                self.last_err = Some(err);
                None
            }
        };
    }

    fn get(&self) -> Option<&Self::Item> {
        self.current.as_ref()
    }
}
