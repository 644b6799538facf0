use bytemuck::Pod;

use super::ts_to_dt;
use crate::{RType, RecordHeader};

/// A DBN record: bytes that start with a [`RecordHeader`] whose `rtype` identifies
/// the layout of the rest.
pub trait Record: AsRef<[u8]> {
    /// Returns the header.
    fn header(&self) -> &RecordHeader;

    /// Returns the size of the record in bytes, as declared by its header.
    fn record_size(&self) -> usize {
        self.header().record_size()
    }

    /// Returns the record type as an [`RType`] for exhaustive matching.
    ///
    /// # Errors
    /// This function returns an error if `rtype` isn't a known [`RType`].
    fn rtype(&self) -> crate::Result<RType> {
        self.header().rtype()
    }

    /// Returns the primary timestamp as UNIX nanoseconds. Records should be sorted
    /// and looked up in symbol maps by it. Defaults to `ts_event`.
    fn raw_index_ts(&self) -> u64 {
        self.header().ts_event
    }

    /// Returns the primary timestamp as a datetime, or `None` if it's unset.
    fn index_ts(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.raw_index_ts())
    }

    /// Returns the UTC date of the primary timestamp, or `None` if it's unset.
    fn index_date(&self) -> Option<time::Date> {
        self.index_ts().map(|dt| dt.date())
    }
}

/// A [`Record`] whose header can be modified.
pub trait RecordMut {
    /// Returns the header mutably.
    fn header_mut(&mut self) -> &mut RecordHeader;
}

/// A plain-old-data record type with a fixed set of rtypes. Being [`Pod`] is what
/// lets raw bytes be checked and viewed as the type.
pub trait HasRType: Record + RecordMut + Pod {
    /// Returns `true` if a record with `rtype` can be viewed as `Self`.
    fn has_rtype(rtype: u8) -> bool;
}
