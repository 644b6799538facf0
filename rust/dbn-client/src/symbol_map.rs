//! Lookups from instrument ID to symbol, built from metadata or from symbol mapping
//! records.

use std::{cmp::Ordering, collections::HashMap, mem, ops::Deref, sync::Arc};

use time::{macros::time, PrimitiveDateTime};

use crate::{
    compat::{SymbolMappingRec, SymbolMappingVersion},
    Error, MappingInterval, Metadata, Record, RecordRef, SType, SymbolMappingMsg,
};

/// Maps a date and instrument ID to a symbol. Suited to historical data spanning
/// several days, where an instrument ID can be reassigned. Usually created with
/// [`Metadata::symbol_map()`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsSymbolMap(HashMap<(time::Date, u32), Arc<String>>);

/// Maps an instrument ID to a symbol at a single point in time. Suited to live data
/// and to single-day historical data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PitSymbolMap(HashMap<u32, String>);

/// Looks up the symbol for a record.
pub trait SymbolIndex {
    /// Returns the symbol for `record`'s instrument, if known.
    fn get_for_rec<R: Record>(&self, record: &R) -> Option<&String>;
}

impl TsSymbolMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the map holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of `(date, instrument ID)` entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Builds a map from every mapping interval in `metadata`.
    ///
    /// # Errors
    /// This function returns an error if neither `stype_in` nor `stype_out` is
    /// [`SType::InstrumentId`] or if a mapped instrument ID isn't a valid `u32`.
    pub fn from_metadata(metadata: &Metadata) -> crate::Result<Self> {
        Self::try_from(metadata)
    }

    /// Maps `instrument_id` to `symbol` on each day in `[start_date, end_date)`,
    /// replacing existing entries. An empty range is a no-op.
    ///
    /// # Errors
    /// This function returns an error if `start_date` is after `end_date`.
    pub fn insert(
        &mut self,
        instrument_id: u32,
        start_date: time::Date,
        end_date: time::Date,
        symbol: Arc<String>,
    ) -> crate::Result<()> {
        if start_date.cmp(&end_date) == Ordering::Greater {
            return Err(Error::bad_arg(
                "start_date",
                "start_date cannot come after end_date",
            ));
        }
        let mut day = Some(start_date);
        while let Some(date) = day.filter(|date| *date < end_date) {
            self.0.insert((date, instrument_id), Arc::clone(&symbol));
            day = date.next_day();
        }
        Ok(())
    }

    /// Returns the symbol of `instrument_id` on `date`.
    pub fn get(&self, date: time::Date, instrument_id: u32) -> Option<&String> {
        self.0.get(&(date, instrument_id)).map(Deref::deref)
    }

    /// Returns the underlying map.
    pub fn inner(&self) -> &HashMap<(time::Date, u32), Arc<String>> {
        &self.0
    }
}

impl SymbolIndex for TsSymbolMap {
    fn get_for_rec<R: Record>(&self, record: &R) -> Option<&String> {
        let date = record.index_date()?;
        self.get(date, record.header().instrument_id)
    }
}

impl TryFrom<&Metadata> for TsSymbolMap {
    type Error = Error;

    fn try_from(metadata: &Metadata) -> Result<Self, Error> {
        let mut res = Self::new();
        let mut symbols: HashMap<&str, Arc<String>> = HashMap::new();
        for_each_resolved(metadata, |instrument_id, symbol, interval| {
            let symbol = symbols
                .entry(symbol)
                .or_insert_with(|| Arc::new(symbol.to_owned()));
            res.insert(
                instrument_id,
                interval.start_date,
                interval.end_date,
                Arc::clone(symbol),
            )
        })?;
        Ok(res)
    }
}

impl PitSymbolMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the map holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of instruments mapped.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Builds a map from the intervals in `metadata` that contain `date`.
    ///
    /// # Errors
    /// This function returns an error if `date` lies outside `[start, end)` of
    /// `metadata`, if neither `stype_in` nor `stype_out` is
    /// [`SType::InstrumentId`], or if a mapped instrument ID isn't a valid `u32`.
    pub fn from_metadata(metadata: &Metadata, date: time::Date) -> crate::Result<Self> {
        let midnight = PrimitiveDateTime::new(date, time!(0:00)).assume_utc();
        let before_start = metadata.start().is_some_and(|start| date < start.date());
        // `end` is exclusive and may fall exactly on midnight
        let at_or_after_end = metadata.end().is_some_and(|end| midnight >= end);
        if before_start || at_or_after_end {
            return Err(Error::bad_arg("date", "Outside the query range"));
        }
        let mut res = Self::new();
        for_each_resolved(metadata, |instrument_id, symbol, interval| {
            if interval.start_date <= date && date < interval.end_date {
                res.0.insert(instrument_id, symbol.to_owned());
            }
            Ok(())
        })?;
        Ok(res)
    }

    /// Applies `record` if it's a symbol mapping of any DBN version, with or without
    /// `ts_out`. Other records are ignored.
    ///
    /// # Errors
    /// This function returns an error if the mapping's output symbol isn't a valid
    /// C string.
    pub fn on_record(&mut self, record: RecordRef) -> crate::Result<()> {
        if !record.has::<SymbolMappingMsg>() {
            return Ok(());
        }
        // version 1 mappings are smaller than any later version
        let version = if record.record_size() < mem::size_of::<SymbolMappingMsg>() {
            crate::v1::DBN_VERSION
        } else {
            crate::v2::DBN_VERSION
        };
        self.on_symbol_mapping(SymbolMappingVersion::new(version, record)?.as_rec())
    }

    /// Maps the record's instrument ID to its output symbol. Later mappings for the
    /// same instrument replace earlier ones.
    ///
    /// # Errors
    /// This function returns an error if the output symbol isn't a valid C string.
    pub fn on_symbol_mapping<S: SymbolMappingRec + ?Sized>(
        &mut self,
        symbol_mapping: &S,
    ) -> crate::Result<()> {
        let symbol = symbol_mapping.stype_out_symbol()?.to_owned();
        self.0.insert(symbol_mapping.header().instrument_id, symbol);
        Ok(())
    }

    /// Returns the symbol of `instrument_id`.
    pub fn get(&self, instrument_id: u32) -> Option<&String> {
        self.0.get(&instrument_id)
    }

    /// Returns the underlying map.
    pub fn inner(&self) -> &HashMap<u32, String> {
        &self.0
    }
}

impl SymbolIndex for PitSymbolMap {
    fn get_for_rec<R: Record>(&self, record: &R) -> Option<&String> {
        self.get(record.header().instrument_id)
    }
}

/// Calls `f` with the instrument ID and text symbol of every resolved interval in
/// `metadata`, whichever side of the mapping holds the instrument ID.
fn for_each_resolved<'m, F>(metadata: &'m Metadata, mut f: F) -> crate::Result<()>
where
    F: FnMut(u32, &'m str, &'m MappingInterval) -> crate::Result<()>,
{
    let ids_are_raw_symbols = is_inverse(metadata)?;
    for mapping in metadata.mappings.iter() {
        // unresolved intervals from older streams have an empty symbol
        for interval in mapping.intervals.iter().filter(|i| !i.symbol.is_empty()) {
            let (id, symbol) = if ids_are_raw_symbols {
                (&mapping.raw_symbol, &interval.symbol)
            } else {
                (&interval.symbol, &mapping.raw_symbol)
            };
            f(parse_instrument_id(id)?, symbol.as_str(), interval)?;
        }
    }
    Ok(())
}

fn parse_instrument_id(symbol: &str) -> crate::Result<u32> {
    symbol
        .parse()
        .map_err(|_| Error::conversion::<u32>(symbol))
}

/// Returns `true` when the instrument IDs are the requested symbols rather than the
/// resolved ones.
fn is_inverse(metadata: &Metadata) -> crate::Result<bool> {
    match (metadata.stype_in, metadata.stype_out) {
        (_, Some(SType::InstrumentId)) => Ok(false),
        (Some(SType::InstrumentId), _) => Ok(true),
        _ => Err(Error::bad_arg(
            "metadata",
            "Can only create symbol maps from metadata where either stype_out or stype_in is instrument ID",
        )),
    }
}
