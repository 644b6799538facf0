//! Enums used in DBN records and metadata.

mod methods;

use std::fmt::{self, Display, Formatter};
use std::os::raw::c_char;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A side of the market. The side of the market for resting orders, or the side
/// of the aggressor for trades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Side {
    /// A sell order or sell aggressor in a trade.
    Ask = b'A',
    /// A buy order or a buy aggressor in a trade.
    Bid = b'B',
    /// No side specified by the original source.
    None = b'N',
}

/// An order event or order book operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Action {
    /// An existing order was modified: price and/or size.
    Modify = b'M',
    /// An aggressing order traded. Does not affect the book.
    Trade = b'T',
    /// An existing order was filled. Does not affect the book.
    Fill = b'F',
    /// An order was fully or partially cancelled.
    Cancel = b'C',
    /// A new order was added to the book.
    Add = b'A',
    /// Reset the book; clear all orders for an instrument.
    Clear = b'R',
    /// Has no effect on the book, but may carry `flags` or other information.
    None = b'N',
}

/// The class of instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum InstrumentClass {
    /// A bond.
    Bond = b'B',
    /// A call option.
    Call = b'C',
    /// A future.
    Future = b'F',
    /// A stock.
    Stock = b'K',
    /// A spread composed of multiples instrument classes.
    MixedSpread = b'M',
    /// A put option.
    Put = b'P',
    /// A spread composed of futures.
    FutureSpread = b'S',
    /// A spread composed of options.
    OptionSpread = b'T',
    /// A foreign exchange spot.
    FxSpot = b'X',
    /// A commodity being traded for immediate delivery.
    CommoditySpot = b'Y',
}

/// The type of matching algorithm used for the instrument at the exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MatchAlgorithm {
    /// No matching algorithm was specified.
    Undefined = b' ',
    /// First-in-first-out matching.
    Fifo = b'F',
    /// A configurable match algorithm.
    Configurable = b'K',
    /// Trade quantity is allocated to resting orders based on a pro-rata percentage:
    /// resting order quantity divided by total quantity.
    ProRata = b'C',
    /// Like [`Self::Fifo`] but with LMM allocations prior to FIFO allocations.
    FifoLmm = b'T',
    /// Like [`Self::ProRata`] but includes a configurable allocation to the first order
    /// that improves the market.
    ThresholdProRata = b'O',
    /// Like [`Self::FifoLmm`] but includes a configurable allocation to the first order
    /// that improves the market.
    FifoTopLmm = b'S',
    /// Like [`Self::ThresholdProRata`] but includes a special priority to LMMs.
    ThresholdProRataLmm = b'Q',
    /// Special variant used only for Eurodollar futures on CME.
    EurodollarFutures = b'Y',
    /// Trade quantity is shared between all orders at the best price.
    TimeProRata = b'P',
    /// A two-pass FIFO algorithm.
    InstitutionalPrioritization = b'V',
}

/// Whether the instrument is user-defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum UserDefinedInstrument {
    /// The instrument is not user-defined.
    #[default]
    No = b'N',
    /// The instrument is user-defined.
    Yes = b'Y',
}

/// The type of definition update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SecurityUpdateAction {
    /// A new instrument definition.
    #[default]
    Add = b'A',
    /// A modified instrument definition of an existing one.
    Modify = b'M',
    /// Removal of an instrument definition.
    Delete = b'D',
    /// Only present in v1 data.
    Invalid = b'~',
}

/// A symbology type. Refer to the
/// [symbology documentation](https://databento.com/docs/standards-and-conventions/symbology)
/// for more information.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SType {
    /// Symbology using a unique numeric ID.
    InstrumentId = 0,
    /// Symbology using the original symbols provided by the publisher.
    RawSymbol = 1,
    /// A set of Databento-specific symbologies for referring to groups of symbols.
    /// Superseded by [`Self::Continuous`] and [`Self::Parent`].
    Smart = 2,
    /// A Databento-specific symbology where one symbol may point to different
    /// instruments at different points of time, e.g. to always refer to the front month
    /// future.
    Continuous = 3,
    /// A Databento-specific symbology for referring to a group of symbols by one
    /// "parent" symbol, e.g. ES.FUT to refer to all ES futures.
    Parent = 4,
    /// Symbology for US equities using NASDAQ Integrated suffix conventions.
    NasdaqSymbol = 5,
    /// Symbology for US equities using CMS suffix conventions.
    CmsSymbol = 6,
    /// Symbology using International Security Identification Numbers (ISIN).
    Isin = 7,
    /// Symbology using US domestic Committee on Uniform Securities Identification
    /// Procedure (CUSIP) codes.
    UsCode = 8,
    /// Symbology using Bloomberg composite global IDs.
    BbgCompId = 9,
    /// Symbology using Bloomberg composite tickers.
    BbgCompTicker = 10,
    /// Symbology using Bloomberg FIGI exchange level IDs.
    Figi = 11,
    /// Symbology using Bloomberg exchange level tickers.
    FigiTicker = 12,
}

/// Record types, possible values for [`RecordHeader::rtype`](crate::RecordHeader::rtype).
#[allow(deprecated)]
pub mod rtype {
    use num_enum::{IntoPrimitive, TryFromPrimitive};

    /// A type of record, i.e. a struct implementing
    /// [`HasRType`](crate::record::HasRType).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
    #[repr(u8)]
    pub enum RType {
        /// Denotes a market-by-price record with a book depth of 0 (used for the
        /// [`Trades`](super::Schema::Trades) schema).
        Mbp0 = 0,
        /// Denotes a market-by-price record with a book depth of 1 (also used for the
        /// [`Tbbo`](super::Schema::Tbbo) schema).
        Mbp1 = 0x01,
        /// Denotes a market-by-price record with a book depth of 10.
        Mbp10 = 0x0A,
        /// Denotes an open, high, low, close, and volume record at an unspecified
        /// cadence.
        #[deprecated(
            since = "0.3.3",
            note = "Separated into separate rtypes for each OHLCV schema."
        )]
        OhlcvDeprecated = 0x11,
        /// Denotes an open, high, low, close, and volume record at a 1-second cadence.
        Ohlcv1S = 0x20,
        /// Denotes an open, high, low, close, and volume record at a 1-minute cadence.
        Ohlcv1M = 0x21,
        /// Denotes an open, high, low, close, and volume record at an hourly cadence.
        Ohlcv1H = 0x22,
        /// Denotes an open, high, low, close, and volume record at a daily cadence
        /// based on the UTC date.
        Ohlcv1D = 0x23,
        /// Denotes an open, high, low, close, and volume record at a daily cadence
        /// based on the end of the trading session.
        OhlcvEod = 0x24,
        /// Denotes an exchange status record.
        Status = 0x12,
        /// Denotes an instrument definition record.
        InstrumentDef = 0x13,
        /// Denotes an order imbalance record.
        Imbalance = 0x14,
        /// Denotes an error from gateway.
        Error = 0x15,
        /// Denotes a symbol mapping record.
        SymbolMapping = 0x16,
        /// Denotes a non-error message from the gateway. Also used for heartbeats.
        System = 0x17,
        /// Denotes a statistics record from the publisher (not calculated by Databento).
        Statistics = 0x18,
        /// Denotes a market by order record.
        Mbo = 0xA0,
        /// Denotes a consolidated best bid and offer record.
        Cmbp1 = 0xB1,
        /// Denotes a consolidated best bid and offer record subsampled on a one-second
        /// interval.
        Cbbo1S = 0xC0,
        /// Denotes a consolidated best bid and offer record subsampled on a one-minute
        /// interval.
        Cbbo1M = 0xC1,
        /// Denotes a consolidated best bid and offer trade record containing the
        /// consolidated BBO before the trade.
        Tcbbo = 0xC2,
        /// Denotes a best bid and offer record subsampled on a one-second interval.
        Bbo1S = 0xC3,
        /// Denotes a best bid and offer record subsampled on a one-minute interval.
        Bbo1M = 0xC4,
    }

    /// Market by price with a book depth of 0 (used for trades).
    pub const MBP_0: u8 = RType::Mbp0 as u8;
    /// Market by price with a book depth of 1 (also used for TBBO).
    pub const MBP_1: u8 = RType::Mbp1 as u8;
    /// Market by price with a book depth of 10.
    pub const MBP_10: u8 = RType::Mbp10 as u8;
    /// Open, high, low, close, and volume at an unspecified cadence.
    #[deprecated(
        since = "0.3.3",
        note = "Separated into separate rtypes for each OHLCV schema."
    )]
    pub const OHLCV_DEPRECATED: u8 = RType::OhlcvDeprecated as u8;
    /// Open, high, low, close, and volume at a 1-second cadence.
    pub const OHLCV_1S: u8 = RType::Ohlcv1S as u8;
    /// Open, high, low, close, and volume at a 1-minute cadence.
    pub const OHLCV_1M: u8 = RType::Ohlcv1M as u8;
    /// Open, high, low, close, and volume at an hourly cadence.
    pub const OHLCV_1H: u8 = RType::Ohlcv1H as u8;
    /// Open, high, low, close, and volume at a daily cadence based on the UTC date.
    pub const OHLCV_1D: u8 = RType::Ohlcv1D as u8;
    /// Open, high, low, close, and volume at a daily cadence based on the end of the
    /// trading session.
    pub const OHLCV_EOD: u8 = RType::OhlcvEod as u8;
    /// Exchange status.
    pub const STATUS: u8 = RType::Status as u8;
    /// Instrument definition.
    pub const INSTRUMENT_DEF: u8 = RType::InstrumentDef as u8;
    /// Order imbalance.
    pub const IMBALANCE: u8 = RType::Imbalance as u8;
    /// Error from gateway.
    pub const ERROR: u8 = RType::Error as u8;
    /// Symbol mapping.
    pub const SYMBOL_MAPPING: u8 = RType::SymbolMapping as u8;
    /// A non-error message. Also used for heartbeats.
    pub const SYSTEM: u8 = RType::System as u8;
    /// Statistics from the publisher.
    pub const STATISTICS: u8 = RType::Statistics as u8;
    /// Market by order.
    pub const MBO: u8 = RType::Mbo as u8;
    /// Consolidated best bid and offer.
    pub const CMBP_1: u8 = RType::Cmbp1 as u8;
    /// Consolidated best bid and offer subsampled at 1-second intervals.
    pub const CBBO_1S: u8 = RType::Cbbo1S as u8;
    /// Consolidated best bid and offer subsampled at 1-minute intervals.
    pub const CBBO_1M: u8 = RType::Cbbo1M as u8;
    /// Consolidated best bid and offer with trades.
    pub const TCBBO: u8 = RType::Tcbbo as u8;
    /// Best bid and offer subsampled at 1-second intervals.
    pub const BBO_1S: u8 = RType::Bbo1S as u8;
    /// Best bid and offer subsampled at 1-minute intervals.
    pub const BBO_1M: u8 = RType::Bbo1M as u8;

    /// Returns the size in bytes of the current-version record identified by
    /// `rtype`, or `None` if `rtype` isn't recognized.
    pub fn record_size(rtype: u8) -> Option<usize> {
        RType::try_from(rtype).ok().map(RType::record_size)
    }
}

/// A data record schema.
///
/// Each schema has a particular record type associated with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Schema {
    /// Market by order.
    Mbo = 0,
    /// Market by price with a book depth of 1.
    Mbp1 = 1,
    /// Market by price with a book depth of 10.
    Mbp10 = 2,
    /// All trade events with the best bid and offer (BBO) immediately **before** the
    /// effect of the trade.
    Tbbo = 3,
    /// All trade events.
    Trades = 4,
    /// Open, high, low, close, and volume at a one-second interval.
    Ohlcv1S = 5,
    /// Open, high, low, close, and volume at a one-minute interval.
    Ohlcv1M = 6,
    /// Open, high, low, close, and volume at an hourly interval.
    Ohlcv1H = 7,
    /// Open, high, low, close, and volume at a daily interval based on the UTC date.
    Ohlcv1D = 8,
    /// Instrument definitions.
    Definition = 9,
    /// Additional data disseminated by publishers.
    Statistics = 10,
    /// Trading status events.
    Status = 11,
    /// Auction imbalance events.
    Imbalance = 12,
    /// Open, high, low, close, and volume at a daily cadence based on the end of the
    /// trading session.
    OhlcvEod = 13,
    /// Consolidated best bid and offer.
    Cmbp1 = 14,
    /// Consolidated best bid and offer subsampled at one-second intervals, in addition
    /// to trades.
    Cbbo1S = 15,
    /// Consolidated best bid and offer subsampled at one-minute intervals, in addition
    /// to trades.
    Cbbo1M = 16,
    /// All trade events with the consolidated best bid and offer (CBBO) immediately
    /// **before** the effect of the trade.
    Tcbbo = 17,
    /// Best bid and offer subsampled at one-second intervals, in addition to trades.
    Bbo1S = 18,
    /// Best bid and offer subsampled at one-minute intervals, in addition to trades.
    Bbo1M = 19,
}

/// A compression format or none if uncompressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// Uncompressed.
    #[default]
    None,
    /// Zstandard compressed.
    Zstd,
}

/// An error code from the live subscription gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ErrorCode {
    /// The authentication step failed.
    AuthFailed = 1,
    /// The user account or API key were deactivated.
    ApiKeyDeactivated = 2,
    /// The user has exceeded their open connection limit.
    ConnectionLimitExceeded = 3,
    /// One or more symbols failed to resolve.
    SymbolResolutionFailed = 4,
    /// There was an issue with a subscription request (other than symbol resolution).
    InvalidSubscription = 5,
    /// An error occurred in the gateway.
    InternalError = 6,
    /// No error code was specified or this record was upgraded from a version 1 struct
    /// where the code field didn't exist.
    Unset = 255,
}

/// A [`SystemMsg`](crate::SystemMsg) code indicating the type of message from the
/// live subscription gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SystemCode {
    /// A message sent in the absence of other records to indicate the connection
    /// remains open.
    Heartbeat = 0,
    /// An acknowledgement of a subscription request.
    SubscriptionAck = 1,
    /// The gateway has detected this session is falling behind real-time.
    SlowReaderWarning = 2,
    /// Indicates a replay subscription has caught up with real-time data.
    ReplayCompleted = 3,
    /// Signals that all records for interval-based schemas have been published for the
    /// given timestamp.
    EndOfInterval = 4,
    /// No system code was specified or this record was upgraded from a version 1 struct
    /// where the code field didn't exist.
    Unset = 255,
}

/// The type of statistic contained in a [`StatMsg`](crate::StatMsg).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum StatType {
    /// The price of the first trade of an instrument. `price` will be set.
    OpeningPrice = 1,
    /// The probable price of the first trade of an instrument published during pre-
    /// open. Both `price` and `quantity` will be set.
    IndicativeOpeningPrice = 2,
    /// The settlement price of an instrument. `price` will be set and `flags` indicate
    /// whether the price is final or preliminary and actual or theoretical.
    SettlementPrice = 3,
    /// The lowest trade price of an instrument during the trading session. `price` will
    /// be set.
    TradingSessionLowPrice = 4,
    /// The highest trade price of an instrument during the trading session. `price` will
    /// be set.
    TradingSessionHighPrice = 5,
    /// The number of contracts cleared for an instrument on the previous trading date.
    /// `quantity` will be set.
    ClearedVolume = 6,
    /// The lowest offer price for an instrument during the trading session. `price`
    /// will be set.
    LowestOffer = 7,
    /// The highest bid price for an instrument during the trading session. `price`
    /// will be set.
    HighestBid = 8,
    /// The current number of outstanding contracts of an instrument. `quantity` will
    /// be set.
    OpenInterest = 9,
    /// The volume-weighted average price (VWAP) for a fixing period. `price` will be
    /// set.
    FixingPrice = 10,
    /// The last trade price during a trading session. `price` will be set.
    ClosePrice = 11,
    /// The change in price from the close price of the previous trading session to the
    /// most recent trading session. `price` will be set.
    NetChange = 12,
    /// The volume-weighted average price (VWAP) during the trading session.
    /// `price` will be set to the VWAP while `quantity` will be the traded
    /// volume.
    Vwap = 13,
}

/// The type of [`StatMsg`](crate::StatMsg) update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum StatUpdateAction {
    /// A new statistic.
    New = 1,
    /// A removal of a statistic.
    Delete = 2,
}

/// How to handle decoding DBN data from other versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VersionUpgradePolicy {
    /// Decode data from all supported versions as-is.
    AsIs,
    /// Decode and convert data from DBN versions prior to version 2 to that version.
    /// Attempting to decode data from newer versions passes it through unchanged.
    UpgradeToV2,
    /// Decode and convert data from DBN versions prior to version 3 to that version.
    #[default]
    UpgradeToV3,
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for SType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Side> for char {
    fn from(side: Side) -> Self {
        u8::from(side) as char
    }
}

impl From<Side> for c_char {
    fn from(side: Side) -> Self {
        u8::from(side) as c_char
    }
}

impl From<Action> for char {
    fn from(action: Action) -> Self {
        u8::from(action) as char
    }
}

impl From<Action> for c_char {
    fn from(action: Action) -> Self {
        u8::from(action) as c_char
    }
}
