//! Market data types for encoding different Databento [`Schema`](crate::enums::Schema)s
//! and conversion functions.

mod conv;
mod impl_default;
mod methods;
mod traits;
mod with_ts_out_methods;

#[cfg(test)]
mod layout_tests;

use std::os::raw::c_char;

use bytemuck::{Pod, Zeroable};
use dbn_client_macros::{dbn_record, DbnAttr};

use crate::{enums::rtype, FlagSet, ASSET_CSTR_LEN, SYMBOL_CSTR_LEN};

pub use conv::{c_chars_to_str, str_to_c_chars, ts_to_dt};
pub(crate) use methods::try_char_enum;
pub use traits::{HasRType, Record, RecordMut};

/// Common data for all Databento records. Always found at the beginning of a record
/// struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
pub struct RecordHeader {
    /// The length of the record in 32-bit words.
    pub(crate) length: u8,
    /// The record type; with `0xe0..0x0F` specifying MBP levels size. Record types
    /// implement the trait [`HasRType`], and the [`has_rtype`][HasRType::has_rtype]
    /// function can be used to check if that type can be used to decode a message with
    /// a given rtype. The set of possible values is defined in [`rtype`].
    pub rtype: u8,
    /// Publisher ID, identifying the dataset and venue.
    pub publisher_id: u16,
    /// Numeric instrument ID.
    pub instrument_id: u32,
    /// The matching-engine-received timestamp expressed as the number of nanoseconds
    /// since the UNIX epoch.
    pub ts_event: u64,
}

/// A market-by-order (MBO) tick message. The record of the
/// [`Mbo`](crate::enums::Schema::Mbo) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::MBO)]
pub struct MboMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The order ID assigned at the venue.
    pub order_id: u64,
    /// Order price in units of 1e-9.
    pub price: i64,
    /// Order quantity.
    pub size: u32,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    /// A channel ID within the venue.
    pub channel_id: u8,
    /// The event action. Can be **A**dd, **C**ancel, **M**odify, clea**R**,
    /// **T**rade, **F**ill, or **N**one.
    pub action: c_char,
    /// The side that initiates the event. Can be **A**sk for a sell order (or sell
    /// aggressor in a trade), **B**id for a buy order (or buy aggressor in a trade), or
    /// **N**one where no side is specified by the original source.
    pub side: c_char,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Nanoseconds between the venue sending and `ts_recv`, capped at 2 seconds.
    pub ts_in_delta: i32,
    /// Venue-assigned message sequence number.
    pub sequence: u32,
}

/// A level.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
pub struct BidAskPair {
    /// The bid price.
    pub bid_px: i64,
    /// The ask price.
    pub ask_px: i64,
    /// The bid size.
    pub bid_sz: u32,
    /// The ask size.
    pub ask_sz: u32,
    /// The bid order count.
    pub bid_ct: u32,
    /// The ask order count.
    pub ask_ct: u32,
}

/// A price level consolidated from multiple venues.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
pub struct ConsolidatedBidAskPair {
    /// The bid price.
    pub bid_px: i64,
    /// The ask price.
    pub ask_px: i64,
    /// The bid size.
    pub bid_sz: u32,
    /// The ask size.
    pub ask_sz: u32,
    /// The bid publisher ID assigned by Databento, which denotes the dataset and venue.
    pub bid_pb: u16,
    #[doc(hidden)]
    pub _reserved1: [u8; 2],
    /// The ask publisher ID assigned by Databento, which denotes the dataset and venue.
    pub ask_pb: u16,
    #[doc(hidden)]
    pub _reserved2: [u8; 2],
}

/// Market by price implementation with a book depth of 0. Equivalent to
/// MBP-0. The record of the [`Trades`](crate::enums::Schema::Trades) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::MBP_0)]
pub struct TradeMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// Order price in units of 1e-9.
    pub price: i64,
    /// Order quantity.
    pub size: u32,
    /// The event action. Always **T**rade in the trades schema.
    pub action: c_char,
    /// The side that initiates the trade.
    pub side: c_char,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    /// The depth of actual book change.
    pub depth: u8,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Nanoseconds between the venue sending and `ts_recv`, capped at 2 seconds.
    pub ts_in_delta: i32,
    /// Venue-assigned message sequence number.
    pub sequence: u32,
}

/// Market by price implementation with a known book depth of 1. The record of the
/// [`Mbp1`](crate::enums::Schema::Mbp1) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::MBP_1)]
pub struct Mbp1Msg {
    /// Record header.
    pub hd: RecordHeader,
    /// Order price in units of 1e-9.
    pub price: i64,
    /// Order quantity.
    pub size: u32,
    /// The event action. Can be **A**dd, **C**ancel, **M**odify, clea**R**, or
    /// **T**rade.
    pub action: c_char,
    /// Side of the initiating order.
    pub side: c_char,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    /// The depth of actual book change.
    pub depth: u8,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Nanoseconds between the venue sending and `ts_recv`, capped at 2 seconds.
    pub ts_in_delta: i32,
    /// Venue-assigned message sequence number.
    pub sequence: u32,
    /// Best bid and offer.
    pub levels: [BidAskPair; 1],
}

/// Market by price implementation with a known book depth of 10. The record of the
/// [`Mbp10`](crate::enums::Schema::Mbp10) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::MBP_10)]
pub struct Mbp10Msg {
    /// Record header.
    pub hd: RecordHeader,
    /// Order price in units of 1e-9.
    pub price: i64,
    /// Order quantity.
    pub size: u32,
    /// The event action.
    pub action: c_char,
    /// Side of the initiating order.
    pub side: c_char,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    /// The depth of actual book change.
    pub depth: u8,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Nanoseconds between the venue sending and `ts_recv`, capped at 2 seconds.
    pub ts_in_delta: i32,
    /// Venue-assigned message sequence number.
    pub sequence: u32,
    /// The top 10 levels of the order book.
    pub levels: [BidAskPair; 10],
}

/// Subsampled market by price with a known book depth of 1. The record of the
/// [`Bbo1S`](crate::Schema::Bbo1S) and [`Bbo1M`](crate::Schema::Bbo1M) schemas.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::BBO_1S, rtype::BBO_1M)]
pub struct BboMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The price of the last trade expressed as a signed integer where every 1 unit
    /// corresponds to 1e-9, i.e. 1/1,000,000,000 or 0.000000001.
    pub price: i64,
    /// The quantity of the last trade.
    pub size: u32,
    #[doc(hidden)]
    pub _reserved1: u8,
    /// The side that initiated the last trade.
    pub side: c_char,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    #[doc(hidden)]
    pub _reserved2: u8,
    /// The end timestamp of the interval, clamped to the second/minute boundary,
    /// expressed as the number of nanoseconds since the UNIX epoch.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    #[doc(hidden)]
    pub _reserved3: [u8; 4],
    /// The sequence number assigned at the venue of the last update.
    pub sequence: u32,
    /// Best bid and offer.
    pub levels: [BidAskPair; 1],
}

/// Consolidated market by price implementation with a known book depth of 1. The
/// record of the [`Cmbp1`](crate::Schema::Cmbp1) and [`Tcbbo`](crate::Schema::Tcbbo)
/// schemas.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::CMBP_1, rtype::TCBBO)]
pub struct Cmbp1Msg {
    /// Record header.
    pub hd: RecordHeader,
    /// Order price in units of 1e-9.
    pub price: i64,
    /// Order quantity.
    pub size: u32,
    /// The event action.
    pub action: c_char,
    /// Side of the initiating order.
    pub side: c_char,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    #[doc(hidden)]
    pub _reserved1: [u8; 1],
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// Nanoseconds between the venue sending and `ts_recv`, capped at 2 seconds.
    pub ts_in_delta: i32,
    #[doc(hidden)]
    pub _reserved2: [u8; 4],
    /// Best bid and offer.
    pub levels: [ConsolidatedBidAskPair; 1],
}

/// Subsampled consolidated market by price with a known book depth of 1. The record
/// of the [`Cbbo1S`](crate::Schema::Cbbo1S) and [`Cbbo1M`](crate::Schema::Cbbo1M)
/// schemas.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::CBBO_1S, rtype::CBBO_1M)]
pub struct CbboMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The price of the last trade expressed as a signed integer where every 1 unit
    /// corresponds to 1e-9, i.e. 1/1,000,000,000 or 0.000000001.
    pub price: i64,
    /// The quantity of the last trade.
    pub size: u32,
    #[doc(hidden)]
    pub _reserved1: u8,
    /// The side that initiated the last trade.
    pub side: c_char,
    /// Bit flags, see [`FlagSet`](crate::FlagSet).
    pub flags: FlagSet,
    #[doc(hidden)]
    pub _reserved2: u8,
    /// The end timestamp of the interval, clamped to the second/minute boundary,
    /// expressed as the number of nanoseconds since the UNIX epoch.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    #[doc(hidden)]
    pub _reserved3: [u8; 8],
    /// Best bid and offer.
    pub levels: [ConsolidatedBidAskPair; 1],
}

/// The record of the [`Tbbo`](crate::enums::Schema::Tbbo) schema.
pub type TbboMsg = Mbp1Msg;
/// The record of the [`Bbo1S`](crate::enums::Schema::Bbo1S) schema.
pub type Bbo1SMsg = BboMsg;
/// The record of the [`Bbo1M`](crate::enums::Schema::Bbo1M) schema.
pub type Bbo1MMsg = BboMsg;
/// The record of the [`Tcbbo`](crate::enums::Schema::Tcbbo) schema.
pub type TcbboMsg = Cmbp1Msg;
/// The record of the [`Cbbo1S`](crate::enums::Schema::Cbbo1S) schema.
pub type Cbbo1SMsg = CbboMsg;
/// The record of the [`Cbbo1M`](crate::enums::Schema::Cbbo1M) schema.
pub type Cbbo1MMsg = CbboMsg;

/// Open, high, low, close, and volume. The record of the following schemas:
/// - [`Ohlcv1S`](crate::enums::Schema::Ohlcv1S)
/// - [`Ohlcv1M`](crate::enums::Schema::Ohlcv1M)
/// - [`Ohlcv1H`](crate::enums::Schema::Ohlcv1H)
/// - [`Ohlcv1D`](crate::enums::Schema::Ohlcv1D)
/// - [`OhlcvEod`](crate::enums::Schema::OhlcvEod)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(
    rtype::OHLCV_1S,
    rtype::OHLCV_1M,
    rtype::OHLCV_1H,
    rtype::OHLCV_1D,
    rtype::OHLCV_EOD,
    rtype::OHLCV_DEPRECATED
)]
pub struct OhlcvMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The open price for the bar.
    pub open: i64,
    /// The high price for the bar.
    pub high: i64,
    /// The low price for the bar.
    pub low: i64,
    /// The close price for the bar.
    pub close: i64,
    /// The total volume traded during the aggregation period.
    pub volume: u64,
}

/// A trading status update message. The record of the
/// [`Status`](crate::enums::Schema::Status) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::STATUS)]
pub struct StatusMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// The type of status change.
    pub action: u16,
    /// Additional details about the cause of the status change.
    pub reason: u16,
    /// Further information about the status change and its effect on trading.
    pub trading_event: u16,
    /// The state of trading in the instrument: `Y`, `N`, or `~` when unknown.
    pub is_trading: c_char,
    /// The state of quoting in the instrument: `Y`, `N`, or `~` when unknown.
    pub is_quoting: c_char,
    /// The state of short sell restrictions for the instrument: `Y`, `N`, or `~`
    /// when unknown.
    pub is_short_sell_restricted: c_char,
    #[doc(hidden)]
    pub _reserved: [u8; 7],
}

/// Definition of an instrument. The record of the
/// [`Definition`](crate::enums::Schema::Definition) schema.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::INSTRUMENT_DEF)]
pub struct InstrumentDefMsg {
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
    /// UNIX epoch. Will be [`crate::UNDEF_TIMESTAMP`] when null, such as for equities.
    pub expiration: u64,
    /// The time of instrument activation expressed as a number of nanoseconds since the
    /// UNIX epoch. Will be [`crate::UNDEF_TIMESTAMP`] when null, such as for equities.
    pub activation: u64,
    /// The allowable high limit price for the trading day in units of 1e-9.
    pub high_limit_price: i64,
    /// The allowable low limit price for the trading day in units of 1e-9.
    pub low_limit_price: i64,
    /// The differential value for price banding in units of 1e-9.
    pub max_price_variation: i64,
    /// The contract size for each instrument, in combination with `unit_of_measure`,
    /// in units of 1e-9.
    pub unit_of_measure_qty: i64,
    /// The value currently under development by the venue, in units of 1e-9.
    pub min_price_increment_amount: i64,
    /// The value used for price calculation in spread and leg pricing in units of 1e-9.
    pub price_ratio: i64,
    /// Option strike price in units of 1e-9.
    pub strike_price: i64,
    /// The instrument ID assigned by the publisher. May be the same as `instrument_id`.
    pub raw_instrument_id: u64,
    /// The tied price (if any) of the leg.
    pub leg_price: i64,
    /// The associated delta (if any) of the leg.
    pub leg_delta: i64,
    /// A bitmap of instrument eligibility attributes.
    pub inst_attrib_value: i32,
    /// The `instrument_id` of the first underlying instrument.
    pub underlying_id: u32,
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
    /// The minimum quantity required for a round lot of the instrument. Multiples of
    /// this quantity are also round lots.
    pub min_lot_size_round_lot: i32,
    /// The minimum trading volume for the instrument.
    pub min_trade_vol: u32,
    /// The number of deliverables per instrument, i.e. peak days.
    pub contract_multiplier: i32,
    /// The quantity that a contract will decay daily, after `decay_start_date` has
    /// been reached.
    pub decay_quantity: i32,
    /// The fixed contract value assigned to each instrument.
    pub original_contract_size: i32,
    /// The numeric ID assigned to the leg instrument.
    pub leg_instrument_id: u32,
    /// The numerator of the price ratio of the leg within the spread.
    pub leg_ratio_price_numerator: i32,
    /// The denominator of the price ratio of the leg within the spread.
    pub leg_ratio_price_denominator: i32,
    /// The numerator of the quantity ratio of the leg within the spread.
    pub leg_ratio_qty_numerator: i32,
    /// The denominator of the quantity ratio of the leg within the spread.
    pub leg_ratio_qty_denominator: i32,
    /// The numeric ID of the leg instrument's underlying instrument.
    pub leg_underlying_id: u32,
    /// The channel ID assigned at the venue.
    pub appl_id: i16,
    /// The calendar year reflected in the instrument symbol.
    pub maturity_year: u16,
    /// The date at which a contract will begin to decay.
    pub decay_start_date: u16,
    /// The channel ID assigned by Databento as an incrementing integer starting at
    /// zero.
    pub channel_id: u16,
    /// The number of legs in the strategy or spread. Will be 0 for outrights.
    pub leg_count: u16,
    /// The 0-based index of the leg.
    pub leg_index: u16,
    /// Currency of the price fields.
    pub currency: [c_char; 4],
    /// The currency used for settlement, if different from `currency`.
    pub settl_currency: [c_char; 4],
    /// The strategy type of the spread.
    pub secsubtype: [c_char; 6],
    /// Raw symbol from the publisher.
    pub raw_symbol: [c_char; SYMBOL_CSTR_LEN],
    /// Security group code.
    pub group: [c_char; 21],
    /// Exchange code.
    pub exchange: [c_char; 5],
    /// Underlying asset (product) code.
    pub asset: [c_char; ASSET_CSTR_LEN],
    /// The ISO standard instrument categorization code.
    pub cfi: [c_char; 7],
    /// The security type of the instrument, e.g. FUT for future or future spread.
    pub security_type: [c_char; 7],
    /// The unit of measure for the instrument's original contract size, e.g. USD or
    /// LBS.
    pub unit_of_measure: [c_char; 31],
    /// Symbol of the first underlying.
    pub underlying: [c_char; 21],
    /// The currency of [`strike_price`](Self::strike_price).
    pub strike_price_currency: [c_char; 4],
    /// The leg instrument's raw symbol assigned by the publisher.
    pub leg_raw_symbol: [c_char; SYMBOL_CSTR_LEN],
    /// Instrument class.
    pub instrument_class: c_char,
    /// Matching algorithm, usually **F**IFO.
    pub match_algorithm: c_char,
    /// The price denominator of the main fraction.
    pub main_fraction: u8,
    /// The number of digits to the right of the tick mark, to display fractional
    /// prices.
    pub price_display_format: u8,
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
    /// The classification of the leg instrument.
    pub leg_instrument_class: c_char,
    /// The side taken for the leg when purchasing the spread.
    pub leg_side: c_char,
    #[doc(hidden)]
    pub _reserved: [u8; 17],
}

/// An auction imbalance message.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::IMBALANCE)]
pub struct ImbalanceMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// The price at which the imbalance shares are calculated, where every 1 unit
    /// corresponds to 1e-9.
    pub ref_price: i64,
    /// Unused.
    pub auction_time: u64,
    /// The hypothetical auction-clearing price for both cross and continuous orders.
    pub cont_book_clr_price: i64,
    /// The hypothetical auction-clearing price for cross orders only.
    pub auct_interest_clr_price: i64,
    /// Unused.
    pub ssr_filling_price: i64,
    /// Unused.
    pub ind_match_price: i64,
    /// Unused.
    pub upper_collar: i64,
    /// Unused.
    pub lower_collar: i64,
    /// The quantity of shares that are eligible to be matched at `ref_price`.
    pub paired_qty: u32,
    /// The quantity of shares that are not paired at `ref_price`.
    pub total_imbalance_qty: u32,
    /// Unused.
    pub market_imbalance_qty: u32,
    /// Unused.
    pub unpaired_qty: u32,
    /// Venue-specific character code indicating the auction type.
    pub auction_type: c_char,
    /// The market side of the `total_imbalance_qty`.
    pub side: c_char,
    /// Unused.
    pub auction_status: u8,
    /// Unused.
    pub freeze_status: u8,
    /// Unused.
    pub num_extensions: u8,
    /// Unused.
    pub unpaired_side: c_char,
    /// Venue-specific character code. For Nasdaq, contains the raw Price Variation
    /// Indicator.
    pub significant_imbalance: c_char,
    #[doc(hidden)]
    pub _reserved: [u8; 1],
}

/// A statistics message. A catchall for various data disseminated by publishers.
/// The [`stat_type`](Self::stat_type) indicates the statistic contained in the message.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::STATISTICS)]
pub struct StatMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// Capture-server receive time as UNIX nanoseconds.
    #[dbn(index_ts)]
    pub ts_recv: u64,
    /// The reference timestamp of the statistic value expressed as the number of
    /// nanoseconds since the UNIX epoch. Will be [`crate::UNDEF_TIMESTAMP`] when
    /// unused.
    pub ts_ref: u64,
    /// The value for price statistics expressed as a signed integer where every 1 unit
    /// corresponds to 1e-9. Will be [`crate::UNDEF_PRICE`] when unused.
    pub price: i64,
    /// The value for non-price statistics. Will be [`crate::UNDEF_STAT_QUANTITY`] when
    /// unused.
    pub quantity: i32,
    /// Venue-assigned message sequence number.
    pub sequence: u32,
    /// Nanoseconds between the venue sending and `ts_recv`, capped at 2 seconds.
    pub ts_in_delta: i32,
    /// The type of statistic value contained in the message. Refer to the
    /// [`StatType`](crate::enums::StatType) for variants.
    pub stat_type: u16,
    /// The channel ID assigned by Databento as an incrementing integer starting at
    /// zero.
    pub channel_id: u16,
    /// Indicates if the statistic is newly added (1) or deleted (2).
    pub update_action: u8,
    /// Additional flags associate with certain stat types.
    pub stat_flags: u8,
    #[doc(hidden)]
    pub _reserved: [u8; 6],
}

/// An error message from the Databento Live Subscription Gateway (LSG).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::ERROR)]
pub struct ErrorMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The error message.
    pub err: [c_char; 302],
    /// The error code. See the [`ErrorCode`](crate::enums::ErrorCode) enum for possible
    /// values.
    pub code: u8,
    /// Sometimes multiple errors are sent together. This field will be non-zero for the
    /// last error.
    pub is_last: u8,
}

/// A symbol mapping message which maps a symbol of one [`SType`](crate::enums::SType)
/// to another.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::SYMBOL_MAPPING)]
pub struct SymbolMappingMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The input symbology type of `stype_in_symbol`.
    pub stype_in: u8,
    /// The input symbol.
    pub stype_in_symbol: [c_char; SYMBOL_CSTR_LEN],
    /// The output symbology type of `stype_out_symbol`.
    pub stype_out: u8,
    /// The output symbol.
    pub stype_out_symbol: [c_char; SYMBOL_CSTR_LEN],
    /// The start of the mapping interval expressed as the number of nanoseconds since
    /// the UNIX epoch.
    pub start_ts: u64,
    /// The end of the mapping interval expressed as the number of nanoseconds since
    /// the UNIX epoch.
    pub end_ts: u64,
}

/// A non-error message from the Databento Live Subscription Gateway (LSG). Also used
/// for heartbeating.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, DbnAttr)]
#[cfg_attr(test, derive(type_layout::TypeLayout))]
#[dbn_record(rtype::SYSTEM)]
pub struct SystemMsg {
    /// Record header.
    pub hd: RecordHeader,
    /// The message from the Databento Live Subscription Gateway (LSG).
    pub msg: [c_char; 303],
    /// Type of system message. See the [`SystemCode`](crate::enums::SystemCode) enum
    /// for possible values.
    pub code: u8,
}

/// Wrapper object for records that include the live gateway send timestamp (`ts_out`).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WithTsOut<T: HasRType> {
    /// The inner record.
    pub rec: T,
    /// The live gateway send timestamp expressed as number of nanoseconds since the UNIX
    /// epoch.
    pub ts_out: u64,
}

// SAFETY: every `HasRType` type is a `Pod` record that starts with a `RecordHeader`,
// so it's 8-byte aligned with a size that's a multiple of 8. Appending a `u64`
// therefore introduces no padding and any bit pattern remains valid.
unsafe impl<T: HasRType> Zeroable for WithTsOut<T> {}
unsafe impl<T: HasRType> Pod for WithTsOut<T> {}
