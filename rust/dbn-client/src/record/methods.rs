use std::{mem, os::raw::c_char};

use num_enum::TryFromPrimitive;

use super::*;
use crate::{
    enums::{
        Action, ErrorCode, InstrumentClass, MatchAlgorithm, SType, SecurityUpdateAction, Side,
        StatType, StatUpdateAction, SystemCode, UserDefinedInstrument,
    },
    Error, RType, Result,
};

/// Converts a raw discriminant field into the enum `T`.
fn try_enum<T, P>(raw: P) -> Result<T>
where
    T: TryFromPrimitive<Primitive = P>,
    P: Copy + std::fmt::UpperHex,
{
    T::try_from_primitive(raw).map_err(|_| Error::conversion::<T>(format!("{raw:#04X}")))
}

pub(crate) fn try_char_enum<T: TryFromPrimitive<Primitive = u8>>(raw: c_char) -> Result<T> {
    try_enum(raw as u8)
}

impl RecordHeader {
    /// The multiplier for converting the `length` field to the number of bytes.
    pub const LENGTH_MULTIPLIER: usize = 4;

    /// Creates a new `RecordHeader`. `R` and `rtype` should be compatible.
    pub const fn new<R: HasRType>(
        rtype: u8,
        publisher_id: u16,
        instrument_id: u32,
        ts_event: u64,
    ) -> Self {
        Self {
            length: (mem::size_of::<R>() / Self::LENGTH_MULTIPLIER) as u8,
            rtype,
            publisher_id,
            instrument_id,
            ts_event,
        }
    }

    /// Returns the raw length of the record in 32-bit words.
    pub const fn length(&self) -> u8 {
        self.length
    }

    /// Returns the size of the **entire** record in bytes. The size of a `RecordHeader`
    /// is constant.
    pub const fn record_size(&self) -> usize {
        self.length as usize * Self::LENGTH_MULTIPLIER
    }

    /// Tries to convert the raw record type into an enum.
    ///
    /// # Errors
    /// This function returns an error if the `rtype` field does not
    /// contain a valid, known [`RType`].
    pub fn rtype(&self) -> Result<RType> {
        try_enum(self.rtype)
    }

    /// Parses the raw matching-engine-received timestamp into a datetime. Returns
    /// `None` if `ts_event` contains the sentinel for a null timestamp.
    pub fn ts_event(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_event)
    }
}

/// Implements the accessors shared by order book records for each type given.
macro_rules! impl_book_accessors {
    (side: $($side_rec:ty),+; action: $($action_rec:ty),+) => {
        $(
            impl $side_rec {
                /// Returns `side` as a [`Side`].
                ///
                /// # Errors
                /// This function returns an error if `side` isn't a known [`Side`].
                pub fn side(&self) -> Result<Side> {
                    try_char_enum(self.side)
                }

                /// Returns `ts_recv` as a datetime, or `None` if it's unset.
                pub fn ts_recv(&self) -> Option<time::OffsetDateTime> {
                    ts_to_dt(self.ts_recv)
                }
            }
        )+
        $(
            impl $action_rec {
                /// Returns `action` as an [`Action`].
                ///
                /// # Errors
                /// This function returns an error if `action` isn't a known [`Action`].
                pub fn action(&self) -> Result<Action> {
                    try_char_enum(self.action)
                }
            }
        )+
    };
}

impl_book_accessors!(
    side: MboMsg, TradeMsg, Mbp1Msg, Mbp10Msg, BboMsg, Cmbp1Msg, CbboMsg;
    action: MboMsg, TradeMsg, Mbp1Msg, Mbp10Msg, Cmbp1Msg
);

impl MboMsg {
    /// Returns `ts_in_delta` as a duration.
    pub fn ts_in_delta(&self) -> time::Duration {
        time::Duration::new(0, self.ts_in_delta)
    }
}

impl StatusMsg {
    /// Returns `ts_recv` as a datetime, or `None` if it's unset.
    pub fn ts_recv(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_recv)
    }

    /// Returns the trading state: `Some(true)` for `Y`, `Some(false)` for `N`, and
    /// `None` when unknown.
    pub fn is_trading(&self) -> Option<bool> {
        tri_state(self.is_trading)
    }

    /// Returns the quoting state: `Some(true)` for `Y`, `Some(false)` for `N`, and
    /// `None` when unknown.
    pub fn is_quoting(&self) -> Option<bool> {
        tri_state(self.is_quoting)
    }

    /// Returns the short sell restriction state: `Some(true)` for `Y`, `Some(false)`
    /// for `N`, and `None` when unknown.
    pub fn is_short_sell_restricted(&self) -> Option<bool> {
        tri_state(self.is_short_sell_restricted)
    }
}

fn tri_state(raw: c_char) -> Option<bool> {
    match raw as u8 {
        b'Y' => Some(true),
        b'N' => Some(false),
        _ => None,
    }
}

impl InstrumentDefMsg {
    /// Returns `ts_recv` as a datetime, or `None` if it's unset.
    pub fn ts_recv(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_recv)
    }

    /// Parses the raw last eligible trade time into a datetime. Returns `None` if
    /// `expiration` contains the sentinel for a null timestamp.
    pub fn expiration(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.expiration)
    }

    /// Parses the raw time of instrument activation into a datetime. Returns `None` if
    /// `activation` contains the sentinel for a null timestamp.
    pub fn activation(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.activation)
    }

    /// Returns the currency used for price fields as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `currency` contains invalid UTF-8.
    pub fn currency(&self) -> Result<&str> {
        c_chars_to_str(&self.currency)
    }

    /// Returns the currency used for settlement as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `settl_currency` contains invalid UTF-8.
    pub fn settl_currency(&self) -> Result<&str> {
        c_chars_to_str(&self.settl_currency)
    }

    /// Returns the strategy type of the spread as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `secsubtype` contains invalid UTF-8.
    pub fn secsubtype(&self) -> Result<&str> {
        c_chars_to_str(&self.secsubtype)
    }

    /// Returns the instrument raw symbol assigned by the publisher as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `raw_symbol` contains invalid UTF-8.
    pub fn raw_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.raw_symbol)
    }

    /// Returns the security group code of the instrument as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `group` contains invalid UTF-8.
    pub fn group(&self) -> Result<&str> {
        c_chars_to_str(&self.group)
    }

    /// Returns the exchange used to identify the instrument as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `exchange` contains invalid UTF-8.
    pub fn exchange(&self) -> Result<&str> {
        c_chars_to_str(&self.exchange)
    }

    /// Returns the underlying asset code (product code) of the instrument as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `asset` contains invalid UTF-8.
    pub fn asset(&self) -> Result<&str> {
        c_chars_to_str(&self.asset)
    }

    /// Returns the ISO standard instrument categorization code as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `cfi` contains invalid UTF-8.
    pub fn cfi(&self) -> Result<&str> {
        c_chars_to_str(&self.cfi)
    }

    /// Returns the security type of the instrument, e.g. FUT for future or future
    /// spread as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `security_type` contains invalid UTF-8.
    pub fn security_type(&self) -> Result<&str> {
        c_chars_to_str(&self.security_type)
    }

    /// Returns the unit of measure for the instrument's original contract size, e.g.
    /// USD or LBS, as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `unit_of_measure` contains invalid UTF-8.
    pub fn unit_of_measure(&self) -> Result<&str> {
        c_chars_to_str(&self.unit_of_measure)
    }

    /// Returns the symbol of the first underlying instrument as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `underlying` contains invalid UTF-8.
    pub fn underlying(&self) -> Result<&str> {
        c_chars_to_str(&self.underlying)
    }

    /// Returns the currency of [`strike_price`](Self::strike_price) as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `strike_price_currency` contains invalid UTF-8.
    pub fn strike_price_currency(&self) -> Result<&str> {
        c_chars_to_str(&self.strike_price_currency)
    }

    /// Returns the leg instrument's raw symbol as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `leg_raw_symbol` contains invalid UTF-8.
    pub fn leg_raw_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.leg_raw_symbol)
    }

    /// Tries to convert the raw classification of the instrument to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `instrument_class` field does not
    /// contain a valid [`InstrumentClass`].
    pub fn instrument_class(&self) -> Result<InstrumentClass> {
        try_char_enum(self.instrument_class)
    }

    /// Tries to convert the raw matching algorithm used for the instrument to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `match_algorithm` field does not
    /// contain a valid [`MatchAlgorithm`].
    pub fn match_algorithm(&self) -> Result<MatchAlgorithm> {
        try_char_enum(self.match_algorithm)
    }

    /// Returns `security_update_action` as a [`SecurityUpdateAction`].
    ///
    /// # Errors
    /// This function returns an error if `security_update_action` isn't a known
    /// [`SecurityUpdateAction`].
    pub fn security_update_action(&self) -> Result<SecurityUpdateAction> {
        try_char_enum(self.security_update_action)
    }

    /// Tries to convert the raw `user_defined_instrument` to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `user_defined_instrument` field does not
    /// contain a valid [`UserDefinedInstrument`].
    pub fn user_defined_instrument(&self) -> Result<UserDefinedInstrument> {
        try_char_enum(self.user_defined_instrument)
    }
}

impl ImbalanceMsg {
    /// Returns `ts_recv` as a datetime, or `None` if it's unset.
    pub fn ts_recv(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_recv)
    }

    /// Tries to convert the raw `side` to an enum.
    ///
    /// # Errors
    /// This function returns an error if `side` isn't a known [`Side`].
    pub fn side(&self) -> Result<Side> {
        try_char_enum(self.side)
    }
}

impl StatMsg {
    /// Returns `ts_recv` as a datetime, or `None` if it's unset.
    pub fn ts_recv(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_recv)
    }

    /// Parses the raw reference timestamp of the statistic value into a datetime.
    /// Returns `None` if `ts_ref` contains the sentinel for a null timestamp.
    pub fn ts_ref(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_ref)
    }

    /// Tries to convert the raw type of the statistic value to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `stat_type` field does not
    /// contain a valid [`StatType`].
    pub fn stat_type(&self) -> Result<StatType> {
        try_enum(self.stat_type)
    }

    /// Tries to convert the raw `update_action` to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `update_action` field does not
    /// contain a valid [`StatUpdateAction`].
    pub fn update_action(&self) -> Result<StatUpdateAction> {
        try_enum(self.update_action)
    }
}

impl ErrorMsg {
    /// Creates a new `ErrorMsg`. `msg` is truncated to fit within the `err` field,
    /// always leaving a null terminator.
    pub fn new(ts_event: u64, code: Option<ErrorCode>, msg: &str, is_last: bool) -> Self {
        let mut error = Self {
            hd: RecordHeader::new::<Self>(rtype::ERROR, 0, 0, ts_event),
            is_last: is_last as u8,
            ..Default::default()
        };
        if let Some(code) = code {
            error.code = code as u8;
        }
        // leave at least one null byte
        let err_len = error.err.len();
        for (c, byte) in error.err.iter_mut().zip(msg.as_bytes()).take(err_len - 1) {
            *c = *byte as c_char;
        }
        error
    }

    /// Returns `err` as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `err` contains invalid UTF-8.
    pub fn err(&self) -> Result<&str> {
        c_chars_to_str(&self.err)
    }

    /// Tries to convert the raw `code` to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `code` field does not contain a valid
    /// [`ErrorCode`].
    pub fn code(&self) -> Result<ErrorCode> {
        try_enum(self.code)
    }
}

impl SymbolMappingMsg {
    /// Creates a new `SymbolMappingMsg`.
    ///
    /// # Errors
    /// This function returns an error if `stype_in_symbol` or `stype_out_symbol`
    /// contain more than maximum number of characters of 70.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instrument_id: u32,
        ts_event: u64,
        stype_in: SType,
        stype_in_symbol: &str,
        stype_out: SType,
        stype_out_symbol: &str,
        start_ts: u64,
        end_ts: u64,
    ) -> Result<Self> {
        Ok(Self {
            // symbol mappings aren't publisher-specific
            hd: RecordHeader::new::<Self>(rtype::SYMBOL_MAPPING, 0, instrument_id, ts_event),
            stype_in: stype_in as u8,
            stype_in_symbol: str_to_c_chars(stype_in_symbol)?,
            stype_out: stype_out as u8,
            stype_out_symbol: str_to_c_chars(stype_out_symbol)?,
            start_ts,
            end_ts,
        })
    }

    /// Tries to convert the raw `stype_in` to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `stype_in` field does not contain a
    /// valid [`SType`].
    pub fn stype_in(&self) -> Result<SType> {
        try_enum(self.stype_in)
    }

    /// Returns the input symbol as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `stype_in_symbol` contains invalid UTF-8.
    pub fn stype_in_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.stype_in_symbol)
    }

    /// Tries to convert the raw `stype_out` to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `stype_out` field does not contain a
    /// valid [`SType`].
    pub fn stype_out(&self) -> Result<SType> {
        try_enum(self.stype_out)
    }

    /// Returns the output symbol as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `stype_out_symbol` contains invalid UTF-8.
    pub fn stype_out_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.stype_out_symbol)
    }

    /// Parses the raw start of the mapping interval into a datetime. Returns `None` if
    /// `start_ts` contains the sentinel for a null timestamp.
    pub fn start_ts(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.start_ts)
    }

    /// Parses the raw end of the mapping interval into a datetime. Returns `None` if
    /// `end_ts` contains the sentinel for a null timestamp.
    pub fn end_ts(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.end_ts)
    }
}

impl SystemMsg {
    /// The message text of a heartbeat.
    pub const HEARTBEAT: &'static str = "Heartbeat";

    /// Creates a new `SystemMsg`.
    ///
    /// # Errors
    /// This function returns an error if `msg` is too long.
    pub fn new(ts_event: u64, code: Option<SystemCode>, msg: &str) -> Result<Self> {
        Ok(Self {
            hd: RecordHeader::new::<Self>(rtype::SYSTEM, 0, 0, ts_event),
            msg: str_to_c_chars(msg)?,
            code: code.map(u8::from).unwrap_or(u8::MAX),
        })
    }

    /// Creates a new heartbeat `SystemMsg`.
    pub fn heartbeat(ts_event: u64) -> Self {
        let mut msg = Self {
            hd: RecordHeader::new::<Self>(rtype::SYSTEM, 0, 0, ts_event),
            code: SystemCode::Heartbeat as u8,
            ..Default::default()
        };
        for (c, byte) in msg.msg.iter_mut().zip(Self::HEARTBEAT.as_bytes()) {
            *c = *byte as c_char;
        }
        msg
    }

    /// Checks whether the message is a heartbeat from the gateway. Records upgraded
    /// from version 1 have no code, so the message text is checked instead.
    pub fn is_heartbeat(&self) -> bool {
        match self.code() {
            Ok(SystemCode::Unset) | Err(_) => self
                .msg()
                .map(|msg| msg == Self::HEARTBEAT)
                .unwrap_or_default(),
            Ok(code) => code == SystemCode::Heartbeat,
        }
    }

    /// Returns the message from the Databento Live Subscription Gateway (LSG) as
    /// a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `msg` contains invalid UTF-8.
    pub fn msg(&self) -> Result<&str> {
        c_chars_to_str(&self.msg)
    }

    /// Tries to convert the raw `code` to an enum.
    ///
    /// # Errors
    /// This function returns an error if the `code` field does not contain a valid
    /// [`SystemCode`].
    pub fn code(&self) -> Result<SystemCode> {
        try_enum(self.code)
    }
}
