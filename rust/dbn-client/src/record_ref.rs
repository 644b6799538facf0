//! The [`RecordRef`] struct for non-owning references to DBN records.

use std::{fmt::Debug, mem};

use crate::{
    record::{HasRType, Record, RecordHeader},
    rtype, BboMsg, CbboMsg, Cmbp1Msg, Error, ImbalanceMsg, InstrumentDefMsg, MboMsg, Mbp10Msg,
    Mbp1Msg, Result, StatMsg, StatusMsg, TradeMsg,
};

/// A wrapper around a non-owning immutable reference to a DBN record. This wrapper
/// allows for mixing of record types and schemas, and runtime record polymorphism.
///
/// The referenced bytes always span exactly the length declared in the header.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct RecordRef<'a> {
    header: &'a RecordHeader,
    bytes: &'a [u8],
}

impl<'a> RecordRef<'a> {
    /// Constructs a new reference to the DBN record at the beginning of `buffer`.
    /// Any bytes past the length declared in the record's header are ignored.
    ///
    /// # Errors
    /// This function returns an error if `buffer` is too short to contain a header,
    /// isn't aligned for a [`RecordHeader`], or is shorter than the length declared in
    /// the header. It also returns an error if the declared length is shorter than a
    /// header.
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        let header_bytes = buffer.get(..mem::size_of::<RecordHeader>()).ok_or_else(|| {
            Error::decode(format!(
                "buffer of {} bytes is too short to contain a record header",
                buffer.len()
            ))
        })?;
        let header: &RecordHeader = bytemuck::try_from_bytes(header_bytes)
            .map_err(|e| Error::decode(format!("invalid record header: {e}")))?;
        let record_size = header.record_size();
        if record_size < mem::size_of::<RecordHeader>() {
            return Err(Error::decode(format!(
                "invalid record with length {record_size} shorter than header"
            )));
        }
        let bytes = buffer.get(..record_size).ok_or_else(|| {
            Error::decode(format!(
                "record with length {record_size} exceeds buffer of {} bytes",
                buffer.len()
            ))
        })?;
        Ok(Self { header, bytes })
    }

    /// Returns `true` if the object points to a record of type `T`.
    pub fn has<T: HasRType>(&self) -> bool {
        T::has_rtype(self.header.rtype)
    }

    /// Returns a reference to the underlying record of type `T`.
    ///
    /// # Errors
    /// This function returns a conversion error if the record is of another type and
    /// a decode error if the encoded length of the record is less than the size of
    /// `T`, which usually indicates a mismatched DBN version.
    pub fn get<T: HasRType>(&self) -> Result<&'a T> {
        if !self.has::<T>() {
            return Err(Error::conversion::<T>(format!(
                "record with rtype {:#04X}",
                self.header.rtype
            )));
        }
        let bytes = self.bytes.get(..mem::size_of::<T>()).ok_or_else(|| {
            Error::decode(format!(
                "malformed `{}` record: expected length of at least {} bytes, found {} bytes. \
                Confirm the DBN version in the Metadata header and the version upgrade policy",
                std::any::type_name::<T>(),
                mem::size_of::<T>(),
                self.bytes.len()
            ))
        })?;
        bytemuck::try_from_bytes(bytes)
            .map_err(|e| Error::decode(format!("failed to cast record: {e}")))
    }
}

impl<'a, R> From<&'a R> for RecordRef<'a>
where
    R: HasRType,
{
    /// Constructs a new reference to a DBN record.
    fn from(rec: &'a R) -> Self {
        let bytes = bytemuck::bytes_of(rec);
        Self {
            header: rec.header(),
            bytes: bytes.get(..rec.record_size()).unwrap_or(bytes),
        }
    }
}

impl<'a> AsRef<[u8]> for RecordRef<'a> {
    fn as_ref(&self) -> &'a [u8] {
        self.bytes
    }
}

fn raw_index_ts_of<T: HasRType>(rec: &RecordRef) -> Option<u64> {
    rec.get::<T>().ok().map(Record::raw_index_ts)
}

impl<'a> Record for RecordRef<'a> {
    fn header(&self) -> &'a RecordHeader {
        self.header
    }

    fn record_size(&self) -> usize {
        self.bytes.len()
    }

    fn raw_index_ts(&self) -> u64 {
        match self.header.rtype {
            rtype::MBO => raw_index_ts_of::<MboMsg>(self),
            rtype::MBP_0 => raw_index_ts_of::<TradeMsg>(self),
            rtype::MBP_1 => raw_index_ts_of::<Mbp1Msg>(self),
            rtype::MBP_10 => raw_index_ts_of::<Mbp10Msg>(self),
            rtype::BBO_1S | rtype::BBO_1M => raw_index_ts_of::<BboMsg>(self),
            rtype::CMBP_1 | rtype::TCBBO => raw_index_ts_of::<Cmbp1Msg>(self),
            rtype::CBBO_1S | rtype::CBBO_1M => raw_index_ts_of::<CbboMsg>(self),
            rtype::STATUS => raw_index_ts_of::<StatusMsg>(self),
            rtype::INSTRUMENT_DEF => raw_index_ts_of::<InstrumentDefMsg>(self),
            rtype::IMBALANCE => raw_index_ts_of::<ImbalanceMsg>(self),
            rtype::STATISTICS => raw_index_ts_of::<StatMsg>(self),
            _ => None,
        }
        .unwrap_or(self.header.ts_event)
    }
}

impl<'a> Debug for RecordRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRef")
            .field("header", self.header)
            .field("len", &self.bytes.len())
            .finish()
    }
}
