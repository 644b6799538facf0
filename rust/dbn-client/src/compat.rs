//! Compatibility shims for different DBN versions.
//!
//! Records whose physical layout changed between versions are upgraded through
//! per-kind tagged enums. The upgraded record is written into a caller-supplied
//! [`CompatBuffer`] so upgrading never allocates.

mod traits;

use std::{mem, os::raw::c_char};

use bytemuck::{Pod, Zeroable};
use dbn_client_macros::{dbn_record, DbnAttr};

use crate::{
    rtype, v1, v2, v3, Error, HasRType, Record, RecordHeader, RecordRef, Result, VersionUpgradePolicy,
    WithTsOut,
};

pub use traits::{InstrumentDefRec, SymbolMappingRec};

/// The length of symbol fields in DBN version 1 (prior version being phased out).
pub const SYMBOL_CSTR_LEN_V1: usize = 22;
/// The length of symbol fields in DBN version 2 (prior version being phased out).
pub const SYMBOL_CSTR_LEN_V2: usize = 71;
/// The length of symbol fields in DBN version 3 (current version).
pub const SYMBOL_CSTR_LEN_V3: usize = SYMBOL_CSTR_LEN_V2;

/// The length of the fixed-length asset field in instrument definitions in DBN version
/// 1.
pub const ASSET_CSTR_LEN_V1: usize = 7;
/// The length of the fixed-length asset field in instrument definitions in DBN version
/// 2.
pub const ASSET_CSTR_LEN_V2: usize = ASSET_CSTR_LEN_V1;
/// The length of the fixed-length asset field in instrument definitions in DBN version
/// 3 (current version).
pub const ASSET_CSTR_LEN_V3: usize = 11;

pub(crate) const METADATA_RESERVED_LEN_V1: usize = 47;

/// Returns the length of symbol fields in the given DBN version
pub const fn version_symbol_cstr_len(version: u8) -> usize {
    if version < 2 {
        SYMBOL_CSTR_LEN_V1
    } else {
        SYMBOL_CSTR_LEN_V2
    }
}

/// Copies `old` with `length` recomputed for the layout of `R`.
pub(crate) const fn resized_header<R: HasRType>(old: &RecordHeader) -> RecordHeader {
    RecordHeader::new::<R>(old.rtype, old.publisher_id, old.instrument_id, old.ts_event)
}

/// Copies a fixed-width C string into a field of width `M`, null padding the rest.
pub(crate) fn widen_cstr<const N: usize, const M: usize>(src: &[c_char; N]) -> [c_char; M] {
    let mut res = [0; M];
    let len = N.min(M);
    res[..len].copy_from_slice(&src[..len]);
    res
}

pub use crate::record::ErrorMsg as ErrorMsgV2;
pub use crate::record::InstrumentDefMsg as InstrumentDefMsgV3;
pub use crate::record::SymbolMappingMsg as SymbolMappingMsgV2;
pub use crate::record::SystemMsg as SystemMsgV2;

/// Definition of an instrument in DBN version 1. The record of the
/// [`Definition`](crate::enums::Schema::Definition) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::INSTRUMENT_DEF)]
pub struct InstrumentDefMsgV1 {
    /// Record header.
    pub hd: RecordHeader,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Minimum price increment in units of 1e-9.
    pub min_price_increment: i64,
    /// The multiplier to convert the venue's display price to the conventional price.
    pub display_factor: i64,
    /// The last eligible trade time expressed as a number of nanoseconds since the
    /// UNIX epoch.
    pub expiration: u64,
    /// The time of instrument activation expressed as a number of nanoseconds since the
    /// UNIX epoch.
    pub activation: u64,
    /// The allowable high limit price for the trading day in units of 1e-9.
    pub high_limit_price: i64,
    /// The allowable low limit price for the trading day in units of 1e-9.
    pub low_limit_price: i64,
    /// The differential value for price banding in units of 1e-9.
    pub max_price_variation: i64,
    /// The trading session settlement price on `trading_reference_date`.
    pub trading_reference_price: i64,
    /// The contract size for each instrument, in combination with `unit_of_measure`.
    pub unit_of_measure_qty: i64,
    /// The value currently under development by the venue, in units of 1e-9.
    pub min_price_increment_amount: i64,
    /// The value used for price calculation in spread and leg pricing in units of 1e-9.
    pub price_ratio: i64,
    /// A bitmap of instrument eligibility attributes.
    pub inst_attrib_value: i32,
    /// The `instrument_id` of the first underlying instrument.
    pub underlying_id: u32,
    /// The instrument ID assigned by the publisher. May be the same as `instrument_id`.
    pub raw_instrument_id: u32,
    /// The implied book depth on the price level data feed.
    pub market_depth_implied: i32,
    /// The (outright) book depth on the price level data feed.
    pub market_depth: i32,
    /// Market segment ID.
    pub market_segment_id: u32,
    /// The maximum trading volume for the instrument.
    pub max_trade_vol: u32,
    /// The minimum order entry quantity for the instrument.
    pub min_lot_size: i32,
    /// The minimum quantity required for a block trade of the instrument.
    pub min_lot_size_block: i32,
    /// The minimum quantity required for a round lot of the instrument.
    pub min_lot_size_round_lot: i32,
    /// The minimum trading volume for the instrument.
    pub min_trade_vol: u32,
    #[doc(hidden)]
    pub _reserved2: [u8; 4],
    /// The number of deliverables per instrument, i.e. peak days.
    pub contract_multiplier: i32,
    /// The quantity that a contract will decay daily.
    pub decay_quantity: i32,
    /// The fixed contract value assigned to each instrument.
    pub original_contract_size: i32,
    #[doc(hidden)]
    pub _reserved3: [u8; 4],
    /// The trading session date corresponding to the settlement price in
    /// `trading_reference_price`, in number of days since the UNIX epoch.
    pub trading_reference_date: u16,
    /// The channel ID assigned at the venue.
    pub appl_id: i16,
    /// The calendar year reflected in the instrument symbol.
    pub maturity_year: u16,
    /// The date at which a contract will begin to decay.
    pub decay_start_date: u16,
    /// The channel ID assigned by Databento.
    pub channel_id: u16,
    /// Currency of the price fields.
    pub currency: [c_char; 4],
    /// The currency used for settlement, if different from `currency`.
    pub settl_currency: [c_char; 4],
    /// The strategy type of the spread.
    pub secsubtype: [c_char; 6],
    /// Raw symbol from the publisher.
    pub raw_symbol: [c_char; SYMBOL_CSTR_LEN_V1],
    /// Security group code.
    pub group: [c_char; 21],
    /// Exchange code.
    pub exchange: [c_char; 5],
    /// Underlying asset (product) code.
    pub asset: [c_char; ASSET_CSTR_LEN_V1],
    /// The ISO standard instrument categorization code.
    pub cfi: [c_char; 7],
    /// The security type of the instrument.
    pub security_type: [c_char; 7],
    /// The unit of measure for the instrument's original contract size.
    pub unit_of_measure: [c_char; 31],
    /// Symbol of the first underlying.
    pub underlying: [c_char; 21],
    /// The currency of [`strike_price`](Self::strike_price).
    pub strike_price_currency: [c_char; 4],
    /// Instrument class.
    pub instrument_class: c_char,
    #[doc(hidden)]
    pub _reserved4: [u8; 2],
    /// Option strike price in units of 1e-9.
    pub strike_price: i64,
    #[doc(hidden)]
    pub _reserved5: [u8; 6],
    /// Matching algorithm, usually **F**IFO.
    pub match_algorithm: c_char,
    /// The current trading state of the instrument.
    pub md_security_trading_status: u8,
    /// The price denominator of the main fraction.
    pub main_fraction: u8,
    /// The number of digits to the right of the tick mark, to display fractional
    /// prices.
    pub price_display_format: u8,
    /// The type indicators for the settlement price, as a bitmap.
    pub settl_price_type: u8,
    /// The price denominator of the sub fraction.
    pub sub_fraction: u8,
    /// Product complex.
    pub underlying_product: u8,
    /// Indicates if the instrument definition has been added, modified, or deleted.
    pub security_update_action: c_char,
    /// The calendar month reflected in the instrument symbol.
    pub maturity_month: u8,
    /// The calendar day reflected in the instrument symbol, or 0.
    pub maturity_day: u8,
    /// The calendar week reflected in the instrument symbol, or 0.
    pub maturity_week: u8,
    /// Indicates if the instrument is user defined: **Y**es or **N**o.
    pub user_defined_instrument: c_char,
    /// The type of `contract_multiplier`. Either `1` for hours, or `2` for days.
    pub contract_multiplier_unit: i8,
    /// The schedule for delivering electricity.
    pub flow_schedule_type: i8,
    /// The tick rule of the spread.
    pub tick_rule: u8,
    #[doc(hidden)]
    pub _dummy: [u8; 3],
}

/// Definition of an instrument in DBN version 2. The record of the
/// [`Definition`](crate::enums::Schema::Definition) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::INSTRUMENT_DEF)]
pub struct InstrumentDefMsgV2 {
    /// Record header.
    pub hd: RecordHeader,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Minimum price increment in units of 1e-9.
    pub min_price_increment: i64,
    /// The multiplier to convert the venue's display price to the conventional price.
    pub display_factor: i64,
    /// The last eligible trade time expressed as a number of nanoseconds since the
    /// UNIX epoch.
    pub expiration: u64,
    /// The time of instrument activation expressed as a number of nanoseconds since the
    /// UNIX epoch.
    pub activation: u64,
    /// The allowable high limit price for the trading day in units of 1e-9.
    pub high_limit_price: i64,
    /// The allowable low limit price for the trading day in units of 1e-9.
    pub low_limit_price: i64,
    /// The differential value for price banding in units of 1e-9.
    pub max_price_variation: i64,
    /// The trading session settlement price on `trading_reference_date`.
    pub trading_reference_price: i64,
    /// The contract size for each instrument, in combination with `unit_of_measure`.
    pub unit_of_measure_qty: i64,
    /// The value currently under development by the venue, in units of 1e-9.
    pub min_price_increment_amount: i64,
    /// The value used for price calculation in spread and leg pricing in units of 1e-9.
    pub price_ratio: i64,
    /// Option strike price in units of 1e-9.
    pub strike_price: i64,
    /// A bitmap of instrument eligibility attributes.
    pub inst_attrib_value: i32,
    /// The `instrument_id` of the first underlying instrument.
    pub underlying_id: u32,
    /// The instrument ID assigned by the publisher. May be the same as `instrument_id`.
    pub raw_instrument_id: u32,
    /// The implied book depth on the price level data feed.
    pub market_depth_implied: i32,
    /// The (outright) book depth on the price level data feed.
    pub market_depth: i32,
    /// Market segment ID.
    pub market_segment_id: u32,
    /// The maximum trading volume for the instrument.
    pub max_trade_vol: u32,
    /// The minimum order entry quantity for the instrument.
    pub min_lot_size: i32,
    /// The minimum quantity required for a block trade of the instrument.
    pub min_lot_size_block: i32,
    /// The minimum quantity required for a round lot of the instrument.
    pub min_lot_size_round_lot: i32,
    /// The minimum trading volume for the instrument.
    pub min_trade_vol: u32,
    /// The number of deliverables per instrument, i.e. peak days.
    pub contract_multiplier: i32,
    /// The quantity that a contract will decay daily.
    pub decay_quantity: i32,
    /// The fixed contract value assigned to each instrument.
    pub original_contract_size: i32,
    /// The trading session date corresponding to the settlement price in
    /// `trading_reference_price`, in number of days since the UNIX epoch.
    pub trading_reference_date: u16,
    /// The channel ID assigned at the venue.
    pub appl_id: i16,
    /// The calendar year reflected in the instrument symbol.
    pub maturity_year: u16,
    /// The date at which a contract will begin to decay.
    pub decay_start_date: u16,
    /// The channel ID assigned by Databento.
    pub channel_id: u16,
    /// Currency of the price fields.
    pub currency: [c_char; 4],
    /// The currency used for settlement, if different from `currency`.
    pub settl_currency: [c_char; 4],
    /// The strategy type of the spread.
    pub secsubtype: [c_char; 6],
    /// Raw symbol from the publisher.
    pub raw_symbol: [c_char; SYMBOL_CSTR_LEN_V2],
    /// Security group code.
    pub group: [c_char; 21],
    /// Exchange code.
    pub exchange: [c_char; 5],
    /// Underlying asset (product) code.
    pub asset: [c_char; ASSET_CSTR_LEN_V2],
    /// The ISO standard instrument categorization code.
    pub cfi: [c_char; 7],
    /// The security type of the instrument.
    pub security_type: [c_char; 7],
    /// The unit of measure for the instrument's original contract size.
    pub unit_of_measure: [c_char; 31],
    /// Symbol of the first underlying.
    pub underlying: [c_char; 21],
    /// The currency of [`strike_price`](Self::strike_price).
    pub strike_price_currency: [c_char; 4],
    /// Instrument class.
    pub instrument_class: c_char,
    /// Matching algorithm, usually **F**IFO.
    pub match_algorithm: c_char,
    /// The current trading state of the instrument.
    pub md_security_trading_status: u8,
    /// The price denominator of the main fraction.
    pub main_fraction: u8,
    /// The number of digits to the right of the tick mark, to display fractional
    /// prices.
    pub price_display_format: u8,
    /// The type indicators for the settlement price, as a bitmap.
    pub settl_price_type: u8,
    /// The price denominator of the sub fraction.
    pub sub_fraction: u8,
    /// Product complex.
    pub underlying_product: u8,
    /// Indicates if the instrument definition has been added, modified, or deleted.
    pub security_update_action: c_char,
    /// The calendar month reflected in the instrument symbol.
    pub maturity_month: u8,
    /// The calendar day reflected in the instrument symbol, or 0.
    pub maturity_day: u8,
    /// The calendar week reflected in the instrument symbol, or 0.
    pub maturity_week: u8,
    /// Indicates if the instrument is user defined: **Y**es or **N**o.
    pub user_defined_instrument: c_char,
    /// The type of `contract_multiplier`. Either `1` for hours, or `2` for days.
    pub contract_multiplier_unit: i8,
    /// The schedule for delivering electricity.
    pub flow_schedule_type: i8,
    /// The tick rule of the spread.
    pub tick_rule: u8,
    #[doc(hidden)]
    pub _reserved: [u8; 10],
}

/// An error message from the Databento Live Subscription Gateway (LSG) in DBN version
/// 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::ERROR)]
pub struct ErrorMsgV1 {
    /// Record header.
    pub hd: RecordHeader,
    /// The error message.
    pub err: [c_char; 64],
}

/// A symbol mapping message in DBN version 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::SYMBOL_MAPPING)]
pub struct SymbolMappingMsgV1 {
    /// Record header.
    pub hd: RecordHeader,
    /// The input symbol.
    pub stype_in_symbol: [c_char; SYMBOL_CSTR_LEN_V1],
    /// The output symbol.
    pub stype_out_symbol: [c_char; SYMBOL_CSTR_LEN_V1],
    #[doc(hidden)]
    pub _dummy: [u8; 4],
    /// The start of the mapping interval expressed as the number of nanoseconds since
    /// the UNIX epoch.
    pub start_ts: u64,
    /// The end of the mapping interval expressed as the number of nanoseconds since
    /// the UNIX epoch.
    pub end_ts: u64,
}

/// A non-error message from the Databento Live Subscription Gateway (LSG) in DBN
/// version 1. Also used for heartbeating.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::SYSTEM)]
pub struct SystemMsgV1 {
    /// Record header.
    pub hd: RecordHeader,
    /// The message from the Databento Live Subscription Gateway (LSG).
    pub msg: [c_char; 64],
}

/// An 8-byte aligned scratch buffer large enough for any record, including a
/// trailing `ts_out`. Upgraded records are written here.
#[repr(C, align(8))]
#[derive(Clone)]
pub struct CompatBuffer([u8; crate::MAX_RECORD_LEN]);

impl Default for CompatBuffer {
    fn default() -> Self {
        Self([0; crate::MAX_RECORD_LEN])
    }
}

impl std::fmt::Debug for CompatBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatBuffer")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl CompatBuffer {
    /// Creates a new zeroed buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `rec` to the beginning of the buffer, wrapping it with `ts_out` when
    /// present, and returns a reference to the copy.
    ///
    /// # Errors
    /// This function returns an error if the record doesn't fit in the buffer.
    pub fn write_record<T: HasRType>(
        &mut self,
        rec: T,
        ts_out: Option<u64>,
    ) -> Result<RecordRef<'_>> {
        match ts_out {
            Some(ts_out) => self.write(WithTsOut::new(rec, ts_out)),
            None => self.write(rec),
        }
    }

    fn write<T: HasRType>(&mut self, rec: T) -> Result<RecordRef<'_>> {
        let size = mem::size_of::<T>();
        let slot = self.0.get_mut(..size).ok_or_else(|| {
            Error::decode(format!(
                "record of {size} bytes exceeds compat buffer of {} bytes",
                crate::MAX_RECORD_LEN
            ))
        })?;
        let slot: &mut T = bytemuck::try_from_bytes_mut(slot)
            .map_err(|e| Error::decode(format!("failed to cast compat buffer: {e}")))?;
        *slot = rec;
        Ok(RecordRef::from(&*slot))
    }
}

/// Reads the trailing live gateway send timestamp of a record decoded with
/// `ts_out`.
fn read_ts_out(rec: &RecordRef) -> Result<u64> {
    let bytes = rec.as_ref();
    let start = bytes
        .len()
        .checked_sub(mem::size_of::<u64>())
        .filter(|start| *start >= mem::size_of::<RecordHeader>())
        .ok_or_else(|| Error::decode("record too short to contain ts_out"))?;
    Ok(bytemuck::pod_read_unaligned(&bytes[start..]))
}

/// A definition record of any supported DBN version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrumentDefVersion<'a> {
    /// A version 1 definition.
    V1(&'a v1::InstrumentDefMsg),
    /// A version 2 definition.
    V2(&'a v2::InstrumentDefMsg),
    /// A version 3 definition.
    V3(&'a v3::InstrumentDefMsg),
}

impl<'a> InstrumentDefVersion<'a> {
    /// Interprets `rec` as a definition of DBN version `version`.
    ///
    /// # Errors
    /// This function returns an error if `rec` isn't a definition or is too short for
    /// the layout of `version`.
    pub fn new(version: u8, rec: RecordRef<'a>) -> Result<Self> {
        Ok(match version {
            1 => Self::V1(rec.get()?),
            2 => Self::V2(rec.get()?),
            _ => Self::V3(rec.get()?),
        })
    }

    /// Upgrades the definition according to `policy`, writing the result to
    /// `compat_buffer`. Returns `None` if no upgrade was necessary.
    ///
    /// # Errors
    /// This function returns an error if the upgraded record doesn't fit in
    /// `compat_buffer`.
    pub fn upgrade<'b>(
        self,
        policy: VersionUpgradePolicy,
        ts_out: Option<u64>,
        compat_buffer: &'b mut CompatBuffer,
    ) -> Result<Option<RecordRef<'b>>> {
        let upgraded = match (self, policy) {
            (_, VersionUpgradePolicy::AsIs) => return Ok(None),
            (Self::V1(old), VersionUpgradePolicy::UpgradeToV2) => {
                compat_buffer.write_record(v2::InstrumentDefMsg::from(old), ts_out)?
            }
            (Self::V1(old), VersionUpgradePolicy::UpgradeToV3) => {
                compat_buffer.write_record(v3::InstrumentDefMsg::from(old), ts_out)?
            }
            (Self::V2(old), VersionUpgradePolicy::UpgradeToV3) => {
                compat_buffer.write_record(v3::InstrumentDefMsg::from(old), ts_out)?
            }
            (Self::V2(_), VersionUpgradePolicy::UpgradeToV2) | (Self::V3(_), _) => return Ok(None),
        };
        Ok(Some(upgraded))
    }
}

/// An error record of any supported DBN version. Versions 2 and 3 share a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorMsgVersion<'a> {
    /// A version 1 error.
    V1(&'a v1::ErrorMsg),
    /// A version 2 or 3 error.
    V2(&'a v2::ErrorMsg),
}

impl<'a> ErrorMsgVersion<'a> {
    /// Interprets `rec` as an error record of DBN version `version`.
    ///
    /// # Errors
    /// This function returns an error if `rec` isn't an error record or is too short
    /// for the layout of `version`.
    pub fn new(version: u8, rec: RecordRef<'a>) -> Result<Self> {
        Ok(if version < 2 {
            Self::V1(rec.get()?)
        } else {
            Self::V2(rec.get()?)
        })
    }

    /// Upgrades the error according to `policy`, writing the result to
    /// `compat_buffer`. Returns `None` if no upgrade was necessary.
    ///
    /// # Errors
    /// This function returns an error if the upgraded record doesn't fit in
    /// `compat_buffer`.
    pub fn upgrade<'b>(
        self,
        policy: VersionUpgradePolicy,
        ts_out: Option<u64>,
        compat_buffer: &'b mut CompatBuffer,
    ) -> Result<Option<RecordRef<'b>>> {
        match (self, policy) {
            (Self::V1(old), VersionUpgradePolicy::UpgradeToV2 | VersionUpgradePolicy::UpgradeToV3) => {
                compat_buffer
                    .write_record(v2::ErrorMsg::from(old), ts_out)
                    .map(Some)
            }
            (Self::V1(_), VersionUpgradePolicy::AsIs) | (Self::V2(_), _) => Ok(None),
        }
    }
}

/// A symbol mapping record of any supported DBN version. Versions 2 and 3 share a
/// layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolMappingVersion<'a> {
    /// A version 1 symbol mapping.
    V1(&'a v1::SymbolMappingMsg),
    /// A version 2 or 3 symbol mapping.
    V2(&'a v2::SymbolMappingMsg),
}

impl<'a> SymbolMappingVersion<'a> {
    /// Interprets `rec` as a symbol mapping of DBN version `version`.
    ///
    /// # Errors
    /// This function returns an error if `rec` isn't a symbol mapping or is too short
    /// for the layout of `version`.
    pub fn new(version: u8, rec: RecordRef<'a>) -> Result<Self> {
        Ok(if version < 2 {
            Self::V1(rec.get()?)
        } else {
            Self::V2(rec.get()?)
        })
    }

    /// Returns the version-independent view of the mapping.
    pub fn as_rec(&self) -> &'a dyn SymbolMappingRec {
        match *self {
            Self::V1(rec) => rec,
            Self::V2(rec) => rec,
        }
    }

    /// Upgrades the symbol mapping according to `policy`, writing the result to
    /// `compat_buffer`. Returns `None` if no upgrade was necessary.
    ///
    /// # Errors
    /// This function returns an error if the upgraded record doesn't fit in
    /// `compat_buffer`.
    pub fn upgrade<'b>(
        self,
        policy: VersionUpgradePolicy,
        ts_out: Option<u64>,
        compat_buffer: &'b mut CompatBuffer,
    ) -> Result<Option<RecordRef<'b>>> {
        match (self, policy) {
            (Self::V1(old), VersionUpgradePolicy::UpgradeToV2 | VersionUpgradePolicy::UpgradeToV3) => {
                compat_buffer
                    .write_record(v2::SymbolMappingMsg::from(old), ts_out)
                    .map(Some)
            }
            (Self::V1(_), VersionUpgradePolicy::AsIs) | (Self::V2(_), _) => Ok(None),
        }
    }
}

/// A system record of any supported DBN version. Versions 2 and 3 share a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemMsgVersion<'a> {
    /// A version 1 system message.
    V1(&'a v1::SystemMsg),
    /// A version 2 or 3 system message.
    V2(&'a v2::SystemMsg),
}

impl<'a> SystemMsgVersion<'a> {
    /// Interprets `rec` as a system message of DBN version `version`.
    ///
    /// # Errors
    /// This function returns an error if `rec` isn't a system message or is too short
    /// for the layout of `version`.
    pub fn new(version: u8, rec: RecordRef<'a>) -> Result<Self> {
        Ok(if version < 2 {
            Self::V1(rec.get()?)
        } else {
            Self::V2(rec.get()?)
        })
    }

    /// Upgrades the system message according to `policy`, writing the result to
    /// `compat_buffer`. Returns `None` if no upgrade was necessary.
    ///
    /// # Errors
    /// This function returns an error if the upgraded record doesn't fit in
    /// `compat_buffer`.
    pub fn upgrade<'b>(
        self,
        policy: VersionUpgradePolicy,
        ts_out: Option<u64>,
        compat_buffer: &'b mut CompatBuffer,
    ) -> Result<Option<RecordRef<'b>>> {
        match (self, policy) {
            (Self::V1(old), VersionUpgradePolicy::UpgradeToV2 | VersionUpgradePolicy::UpgradeToV3) => {
                compat_buffer
                    .write_record(v2::SystemMsg::from(old), ts_out)
                    .map(Some)
            }
            (Self::V1(_), VersionUpgradePolicy::AsIs) | (Self::V2(_), _) => Ok(None),
        }
    }
}

/// Decodes the record in `input`, upgrading it to the version targeted by
/// `upgrade_policy` if it was encoded in an older `version`. Upgraded records are
/// written to `compat_buffer`; all other records are returned as references to
/// `input` without copying.
///
/// `ts_out` indicates whether the record is followed by a live gateway send timestamp,
/// i.e. whether it's a [`WithTsOut`].
///
/// # Errors
/// This function returns an error if `input` doesn't contain a valid record or the
/// record is too short for the layout of `version`.
pub fn decode_record_ref<'a>(
    version: u8,
    upgrade_policy: VersionUpgradePolicy,
    ts_out: bool,
    compat_buffer: &'a mut CompatBuffer,
    input: &'a [u8],
) -> Result<RecordRef<'a>> {
    let rec = RecordRef::new(input)?;
    if !upgrade_policy.is_upgrade_situation(version) {
        return Ok(rec);
    }
    let rtype = rec.header().rtype;
    if !matches!(
        rtype,
        rtype::INSTRUMENT_DEF | rtype::ERROR | rtype::SYMBOL_MAPPING | rtype::SYSTEM
    ) {
        return Ok(rec);
    }
    let ts_out = if ts_out {
        Some(read_ts_out(&rec)?)
    } else {
        None
    };
    let upgraded = match rtype {
        rtype::INSTRUMENT_DEF => {
            InstrumentDefVersion::new(version, rec)?.upgrade(upgrade_policy, ts_out, compat_buffer)?
        }
        rtype::ERROR => {
            ErrorMsgVersion::new(version, rec)?.upgrade(upgrade_policy, ts_out, compat_buffer)?
        }
        rtype::SYMBOL_MAPPING => SymbolMappingVersion::new(version, rec)?.upgrade(
            upgrade_policy,
            ts_out,
            compat_buffer,
        )?,
        _ => SystemMsgVersion::new(version, rec)?.upgrade(upgrade_policy, ts_out, compat_buffer)?,
    };
    match upgraded {
        Some(upgraded) => {
            log::debug!(
                "Upgraded record with rtype {rtype:#04X} from DBN version {version} to {}",
                upgrade_policy.output_version(version)
            );
            Ok(upgraded)
        }
        None => Ok(rec),
    }
}
