//! [`Metadata`], the header of every DBN stream, and its [`MetadataBuilder`].

use std::num::NonZeroU64;

use crate::{
    compat::version_symbol_cstr_len, record::ts_to_dt, PitSymbolMap, SType, Schema,
    TsSymbolMap, VersionUpgradePolicy,
};

/// Describes the contents of a DBN stream. Every DBN file and stream begins with its
/// encoded metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The DBN version the metadata was encoded with, or upgraded to. Encoders write
    /// [`crate::DBN_VERSION`] unless told otherwise.
    pub version: u8,
    /// The dataset code, e.g. `XNAS.ITCH`.
    pub dataset: String,
    /// The schema of every record in the stream. `None` means the stream may mix
    /// record types.
    pub schema: Option<Schema>,
    /// Start of the requested range as UNIX nanoseconds.
    pub start: u64,
    /// End of the requested range as UNIX nanoseconds (exclusive). `None` when the
    /// range is open ended.
    pub end: Option<NonZeroU64>,
    /// Maximum number of records requested, if any.
    pub limit: Option<NonZeroU64>,
    /// Symbology of the requested symbols. `None` when mixed, as in live sessions.
    pub stype_in: Option<SType>,
    /// Symbology the request was resolved to. `None` when mixed.
    pub stype_out: Option<SType>,
    /// Whether each record is followed by an 8-byte gateway send timestamp.
    pub ts_out: bool,
    /// Width in bytes of the fixed-length symbol fields, null terminator included.
    /// Determined by `version`.
    pub symbol_cstr_len: usize,
    /// The symbols as requested.
    pub symbols: Vec<String>,
    /// Symbols that failed to resolve on at least one day of the range.
    pub partial: Vec<String>,
    /// Symbols that failed to resolve on every day of the range.
    pub not_found: Vec<String>,
    /// How each requested symbol resolved over the range.
    pub mappings: Vec<SymbolMapping>,
}

impl Metadata {
    /// Returns a [`MetadataBuilder`]. `dataset`, `schema`, `start`, `stype_in` and
    /// `stype_out` must be set before `build()` becomes available.
    pub fn builder() -> MetadataBuilder<Unset, Unset, Unset, Unset, Unset> {
        MetadataBuilder::default()
    }

    /// Returns `start` as a datetime.
    pub fn start(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.start)
    }

    /// Returns `end` as a datetime, or `None` if the range is open ended.
    pub fn end(&self) -> Option<time::OffsetDateTime> {
        self.end.and_then(|end| ts_to_dt(end.get()))
    }

    /// Builds a point-in-time map from instrument ID to symbol for `date`. Suited to
    /// single-day data where mappings can't change mid-stream; see
    /// [`Self::symbol_map()`] otherwise.
    ///
    /// # Errors
    /// This function returns an error if `date` lies outside `[start, end)`, if
    /// neither `stype_in` nor `stype_out` is [`SType::InstrumentId`], or if a
    /// mapped instrument ID isn't a valid `u32`.
    pub fn symbol_map_for_date(&self, date: time::Date) -> crate::Result<PitSymbolMap> {
        PitSymbolMap::from_metadata(self, date)
    }

    /// Builds a map from date and instrument ID to symbol covering every mapping
    /// interval.
    ///
    /// # Errors
    /// This function returns an error if neither `stype_in` nor `stype_out` is
    /// [`SType::InstrumentId`] or if a mapped instrument ID isn't a valid `u32`.
    pub fn symbol_map(&self) -> crate::Result<TsSymbolMap> {
        TsSymbolMap::from_metadata(self)
    }

    /// Raises `version` to the target of `upgrade_policy`, never lowering it.
    /// Symbols are stored decoded so only `version` and `symbol_cstr_len` change.
    pub fn upgrade(&mut self, upgrade_policy: VersionUpgradePolicy) {
        if upgrade_policy.is_upgrade_situation(self.version) {
            self.version = upgrade_policy.output_version(self.version);
            self.symbol_cstr_len = version_symbol_cstr_len(self.version);
        }
    }
}

/// Typestate builder for [`Metadata`].
///
/// Each required field has its own type parameter which starts as [`Unset`];
/// `build()` only exists once all of them are set:
/// - [`dataset`](Metadata::dataset)
/// - [`schema`](Metadata::schema)
/// - [`start`](Metadata::start)
/// - [`stype_in`](Metadata::stype_in)
/// - [`stype_out`](Metadata::stype_out)
#[derive(Debug)]
pub struct MetadataBuilder<D, Sch, Start, StIn, StOut> {
    dataset: D,
    schema: Sch,
    start: Start,
    stype_in: StIn,
    stype_out: StOut,
    rest: OptionalFields,
}

/// Placeholder for a required builder field that hasn't been set.
#[derive(Debug)]
pub struct Unset {}

#[derive(Debug)]
struct OptionalFields {
    version: u8,
    end: Option<NonZeroU64>,
    limit: Option<NonZeroU64>,
    ts_out: bool,
    symbols: Vec<String>,
    partial: Vec<String>,
    not_found: Vec<String>,
    mappings: Vec<SymbolMapping>,
}

impl MetadataBuilder<Unset, Unset, Unset, Unset, Unset> {
    /// Creates a builder with no required fields set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D, Sch, Start, StIn, StOut> MetadataBuilder<D, Sch, Start, StIn, StOut> {
    /// Sets [`version`](Metadata::version).
    pub fn version(mut self, version: u8) -> Self {
        self.rest.version = version;
        self
    }

    /// Sets [`dataset`](Metadata::dataset).
    pub fn dataset(
        self,
        dataset: impl ToString,
    ) -> MetadataBuilder<String, Sch, Start, StIn, StOut> {
        MetadataBuilder {
            dataset: dataset.to_string(),
            schema: self.schema,
            start: self.start,
            stype_in: self.stype_in,
            stype_out: self.stype_out,
            rest: self.rest,
        }
    }

    /// Sets [`schema`](Metadata::schema).
    pub fn schema(
        self,
        schema: Option<Schema>,
    ) -> MetadataBuilder<D, Option<Schema>, Start, StIn, StOut> {
        MetadataBuilder {
            dataset: self.dataset,
            schema,
            start: self.start,
            stype_in: self.stype_in,
            stype_out: self.stype_out,
            rest: self.rest,
        }
    }

    /// Sets [`start`](Metadata::start).
    pub fn start(self, start: u64) -> MetadataBuilder<D, Sch, u64, StIn, StOut> {
        MetadataBuilder {
            dataset: self.dataset,
            schema: self.schema,
            start,
            stype_in: self.stype_in,
            stype_out: self.stype_out,
            rest: self.rest,
        }
    }

    /// Sets [`end`](Metadata::end).
    pub fn end(mut self, end: Option<NonZeroU64>) -> Self {
        self.rest.end = end;
        self
    }

    /// Sets [`limit`](Metadata::limit).
    pub fn limit(mut self, limit: Option<NonZeroU64>) -> Self {
        self.rest.limit = limit;
        self
    }

    /// Sets [`stype_in`](Metadata::stype_in).
    pub fn stype_in(
        self,
        stype_in: Option<SType>,
    ) -> MetadataBuilder<D, Sch, Start, Option<SType>, StOut> {
        MetadataBuilder {
            dataset: self.dataset,
            schema: self.schema,
            start: self.start,
            stype_in,
            stype_out: self.stype_out,
            rest: self.rest,
        }
    }

    /// Sets [`stype_out`](Metadata::stype_out).
    pub fn stype_out(
        self,
        stype_out: Option<SType>,
    ) -> MetadataBuilder<D, Sch, Start, StIn, Option<SType>> {
        MetadataBuilder {
            dataset: self.dataset,
            schema: self.schema,
            start: self.start,
            stype_in: self.stype_in,
            stype_out,
            rest: self.rest,
        }
    }

    /// Sets [`ts_out`](Metadata::ts_out).
    pub fn ts_out(mut self, ts_out: bool) -> Self {
        self.rest.ts_out = ts_out;
        self
    }

    /// Sets [`symbols`](Metadata::symbols).
    pub fn symbols(mut self, symbols: Vec<String>) -> Self {
        self.rest.symbols = symbols;
        self
    }

    /// Sets [`partial`](Metadata::partial).
    pub fn partial(mut self, partial: Vec<String>) -> Self {
        self.rest.partial = partial;
        self
    }

    /// Sets [`not_found`](Metadata::not_found).
    pub fn not_found(mut self, not_found: Vec<String>) -> Self {
        self.rest.not_found = not_found;
        self
    }

    /// Sets [`mappings`](Metadata::mappings).
    pub fn mappings(mut self, mappings: Vec<SymbolMapping>) -> Self {
        self.rest.mappings = mappings;
        self
    }
}

impl MetadataBuilder<String, Option<Schema>, u64, Option<SType>, Option<SType>> {
    /// Creates the [`Metadata`]. `symbol_cstr_len` follows from the version.
    pub fn build(self) -> Metadata {
        let OptionalFields {
            version,
            end,
            limit,
            ts_out,
            symbols,
            partial,
            not_found,
            mappings,
        } = self.rest;
        Metadata {
            version,
            dataset: self.dataset,
            schema: self.schema,
            start: self.start,
            end,
            limit,
            stype_in: self.stype_in,
            stype_out: self.stype_out,
            ts_out,
            symbol_cstr_len: version_symbol_cstr_len(version),
            symbols,
            partial,
            not_found,
            mappings,
        }
    }
}

impl Default for MetadataBuilder<Unset, Unset, Unset, Unset, Unset> {
    fn default() -> Self {
        Self {
            dataset: Unset {},
            schema: Unset {},
            start: Unset {},
            stype_in: Unset {},
            stype_out: Unset {},
            rest: OptionalFields {
                version: crate::DBN_VERSION,
                end: None,
                limit: None,
                ts_out: false,
                symbols: Vec::new(),
                partial: Vec::new(),
                not_found: Vec::new(),
                mappings: Vec::new(),
            },
        }
    }
}

/// A requested symbol and how it resolved over the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMapping {
    /// The symbol as requested, in `stype_in`.
    pub raw_symbol: String,
    /// Consecutive date ranges and the `stype_out` symbol for each.
    pub intervals: Vec<MappingInterval>,
}

/// One date range of a [`SymbolMapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingInterval {
    /// First UTC date of the range.
    pub start_date: time::Date,
    /// UTC date after the last date of the range.
    pub end_date: time::Date,
    /// The `stype_out` symbol. Empty for legacy streams without resolution.
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use time::macros::datetime;

    use super::*;

    fn v1_metadata() -> Metadata {
        Metadata::builder()
            .version(1)
            .dataset("OPRA.PILLAR")
            .schema(Some(Schema::Mbp1))
            .start(0)
            .stype_in(None)
            .stype_out(Some(SType::InstrumentId))
            .build()
    }

    #[rstest]
    #[case(VersionUpgradePolicy::AsIs, 1, crate::v1::SYMBOL_CSTR_LEN)]
    #[case(VersionUpgradePolicy::UpgradeToV2, 2, crate::v2::SYMBOL_CSTR_LEN)]
    #[case(VersionUpgradePolicy::UpgradeToV3, 3, crate::v3::SYMBOL_CSTR_LEN)]
    fn test_upgrade_metadata(
        #[case] upgrade_policy: VersionUpgradePolicy,
        #[case] exp_version: u8,
        #[case] exp_symbol_cstr_len: usize,
    ) {
        let mut target = v1_metadata();
        assert_eq!(target.version, 1);
        assert_eq!(target.symbol_cstr_len, crate::v1::SYMBOL_CSTR_LEN);
        target.upgrade(upgrade_policy);
        assert_eq!(target.version, exp_version);
        assert_eq!(target.symbol_cstr_len, exp_symbol_cstr_len);
    }

    #[test]
    fn test_upgrade_never_downgrades() {
        let mut target = v1_metadata();
        target.version = 3;
        target.symbol_cstr_len = crate::v3::SYMBOL_CSTR_LEN;
        target.upgrade(VersionUpgradePolicy::UpgradeToV2);
        assert_eq!(target.version, 3);
    }

    #[test]
    fn test_builder_defaults() {
        let target = Metadata::builder()
            .dataset("XNAS.ITCH")
            .schema(None)
            .start(1)
            .stype_in(Some(SType::RawSymbol))
            .stype_out(Some(SType::InstrumentId))
            .build();
        assert_eq!(target.version, crate::DBN_VERSION);
        assert_eq!(target.symbol_cstr_len, crate::SYMBOL_CSTR_LEN);
        assert!(target.end.is_none());
        assert!(target.mappings.is_empty());
    }

    #[test]
    fn test_start_end_datetimes() {
        let mut target = v1_metadata();
        target.start = datetime!(2023-07-01 00:00 UTC).unix_timestamp_nanos() as u64;
        target.end = NonZeroU64::new(datetime!(2023-07-02 00:00 UTC).unix_timestamp_nanos() as u64);
        assert_eq!(target.start(), Some(datetime!(2023-07-01 00:00 UTC)));
        assert_eq!(target.end(), Some(datetime!(2023-07-02 00:00 UTC)));
    }
}
