use std::{mem, str::FromStr};

use crate::{
    record::{
        BboMsg, CbboMsg, Cmbp1Msg, ErrorMsg, ImbalanceMsg, InstrumentDefMsg, MboMsg, Mbp10Msg,
        Mbp1Msg, OhlcvMsg, StatMsg, StatusMsg, SymbolMappingMsg, SystemMsg, TradeMsg,
    },
    InstrumentClass, RType, SType, Schema, VersionUpgradePolicy,
};

impl InstrumentClass {
    /// Returns `true` if the instrument class is a type of option.
    ///
    /// Note: excludes [`Self::MixedSpread`], which *may* include options.
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Call | Self::Put | Self::OptionSpread)
    }

    /// Returns `true` if the instrument class is a type of future.
    ///
    /// Note: excludes [`Self::MixedSpread`], which *may* include futures.
    pub fn is_future(&self) -> bool {
        matches!(self, Self::Future | Self::FutureSpread)
    }

    /// Returns `true` if the instrument class is a type of spread, i.e. composed of two
    /// or more instrument legs.
    pub fn is_spread(&self) -> bool {
        matches!(
            self,
            Self::FutureSpread | Self::OptionSpread | Self::MixedSpread
        )
    }
}

/// Get the corresponding `rtype` for the given `schema`.
impl From<Schema> for RType {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::Mbo => RType::Mbo,
            Schema::Mbp1 | Schema::Tbbo => RType::Mbp1,
            Schema::Mbp10 => RType::Mbp10,
            Schema::Trades => RType::Mbp0,
            Schema::Ohlcv1S => RType::Ohlcv1S,
            Schema::Ohlcv1M => RType::Ohlcv1M,
            Schema::Ohlcv1H => RType::Ohlcv1H,
            Schema::Ohlcv1D => RType::Ohlcv1D,
            Schema::OhlcvEod => RType::OhlcvEod,
            Schema::Definition => RType::InstrumentDef,
            Schema::Statistics => RType::Statistics,
            Schema::Status => RType::Status,
            Schema::Imbalance => RType::Imbalance,
            Schema::Cmbp1 => RType::Cmbp1,
            Schema::Cbbo1S => RType::Cbbo1S,
            Schema::Cbbo1M => RType::Cbbo1M,
            Schema::Tcbbo => RType::Tcbbo,
            Schema::Bbo1S => RType::Bbo1S,
            Schema::Bbo1M => RType::Bbo1M,
        }
    }
}

impl RType {
    /// Tries to convert the given rtype to a [`Schema`].
    ///
    /// Returns `None` if there's no corresponding `Schema` for the given rtype or
    /// in the case of `OHLCV_DEPRECATED`, it doesn't map to a single `Schema`.
    pub fn try_into_schema(rtype: u8) -> Option<Schema> {
        use crate::enums::rtype::*;
        match rtype {
            MBP_0 => Some(Schema::Trades),
            MBP_1 => Some(Schema::Mbp1),
            MBP_10 => Some(Schema::Mbp10),
            OHLCV_1S => Some(Schema::Ohlcv1S),
            OHLCV_1M => Some(Schema::Ohlcv1M),
            OHLCV_1H => Some(Schema::Ohlcv1H),
            OHLCV_1D => Some(Schema::Ohlcv1D),
            OHLCV_EOD => Some(Schema::OhlcvEod),
            STATUS => Some(Schema::Status),
            INSTRUMENT_DEF => Some(Schema::Definition),
            IMBALANCE => Some(Schema::Imbalance),
            STATISTICS => Some(Schema::Statistics),
            MBO => Some(Schema::Mbo),
            CMBP_1 => Some(Schema::Cmbp1),
            CBBO_1S => Some(Schema::Cbbo1S),
            CBBO_1M => Some(Schema::Cbbo1M),
            TCBBO => Some(Schema::Tcbbo),
            BBO_1S => Some(Schema::Bbo1S),
            BBO_1M => Some(Schema::Bbo1M),
            _ => None,
        }
    }

    /// Returns the size in bytes of the current-version record type associated with
    /// the `RType`, excluding any appended `ts_out`.
    #[allow(deprecated)]
    pub const fn record_size(self) -> usize {
        match self {
            RType::Mbp0 => mem::size_of::<TradeMsg>(),
            RType::Mbp1 => mem::size_of::<Mbp1Msg>(),
            RType::Mbp10 => mem::size_of::<Mbp10Msg>(),
            RType::OhlcvDeprecated
            | RType::Ohlcv1S
            | RType::Ohlcv1M
            | RType::Ohlcv1H
            | RType::Ohlcv1D
            | RType::OhlcvEod => mem::size_of::<OhlcvMsg>(),
            RType::Status => mem::size_of::<StatusMsg>(),
            RType::InstrumentDef => mem::size_of::<InstrumentDefMsg>(),
            RType::Imbalance => mem::size_of::<ImbalanceMsg>(),
            RType::Error => mem::size_of::<ErrorMsg>(),
            RType::SymbolMapping => mem::size_of::<SymbolMappingMsg>(),
            RType::System => mem::size_of::<SystemMsg>(),
            RType::Statistics => mem::size_of::<StatMsg>(),
            RType::Mbo => mem::size_of::<MboMsg>(),
            RType::Cmbp1 | RType::Tcbbo => mem::size_of::<Cmbp1Msg>(),
            RType::Cbbo1S | RType::Cbbo1M => mem::size_of::<CbboMsg>(),
            RType::Bbo1S | RType::Bbo1M => mem::size_of::<BboMsg>(),
        }
    }
}

impl Schema {
    /// Converts the given schema to a `&'static str`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Schema::Mbo => "mbo",
            Schema::Mbp1 => "mbp-1",
            Schema::Mbp10 => "mbp-10",
            Schema::Tbbo => "tbbo",
            Schema::Trades => "trades",
            Schema::Ohlcv1S => "ohlcv-1s",
            Schema::Ohlcv1M => "ohlcv-1m",
            Schema::Ohlcv1H => "ohlcv-1h",
            Schema::Ohlcv1D => "ohlcv-1d",
            Schema::Definition => "definition",
            Schema::Statistics => "statistics",
            Schema::Status => "status",
            Schema::Imbalance => "imbalance",
            Schema::OhlcvEod => "ohlcv-eod",
            Schema::Cmbp1 => "cmbp-1",
            Schema::Cbbo1S => "cbbo-1s",
            Schema::Cbbo1M => "cbbo-1m",
            Schema::Tcbbo => "tcbbo",
            Schema::Bbo1S => "bbo-1s",
            Schema::Bbo1M => "bbo-1m",
        }
    }

    /// Returns the size in bytes of the current-version record type of the schema.
    pub fn record_size(self) -> usize {
        RType::from(self).record_size()
    }
}

impl FromStr for Schema {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mbo" => Ok(Schema::Mbo),
            "mbp-1" => Ok(Schema::Mbp1),
            "mbp-10" => Ok(Schema::Mbp10),
            "tbbo" => Ok(Schema::Tbbo),
            "trades" => Ok(Schema::Trades),
            "ohlcv-1s" => Ok(Schema::Ohlcv1S),
            "ohlcv-1m" => Ok(Schema::Ohlcv1M),
            "ohlcv-1h" => Ok(Schema::Ohlcv1H),
            "ohlcv-1d" => Ok(Schema::Ohlcv1D),
            "definition" => Ok(Schema::Definition),
            "statistics" => Ok(Schema::Statistics),
            "status" => Ok(Schema::Status),
            "imbalance" => Ok(Schema::Imbalance),
            "ohlcv-eod" => Ok(Schema::OhlcvEod),
            "cmbp-1" => Ok(Schema::Cmbp1),
            "cbbo-1s" => Ok(Schema::Cbbo1S),
            "cbbo-1m" => Ok(Schema::Cbbo1M),
            "tcbbo" => Ok(Schema::Tcbbo),
            "bbo-1s" => Ok(Schema::Bbo1S),
            "bbo-1m" => Ok(Schema::Bbo1M),
            _ => Err(crate::Error::conversion::<Self>(s)),
        }
    }
}

impl SType {
    /// Converts the symbology type to its `str` representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SType::InstrumentId => "instrument_id",
            SType::RawSymbol => "raw_symbol",
            SType::Smart => "smart",
            SType::Continuous => "continuous",
            SType::Parent => "parent",
            SType::NasdaqSymbol => "nasdaq_symbol",
            SType::CmsSymbol => "cms_symbol",
            SType::Isin => "isin",
            SType::UsCode => "us_code",
            SType::BbgCompId => "bbg_comp_id",
            SType::BbgCompTicker => "bbg_comp_ticker",
            SType::Figi => "figi",
            SType::FigiTicker => "figi_ticker",
        }
    }
}

impl FromStr for SType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instrument_id" | "product_id" => Ok(SType::InstrumentId),
            "raw_symbol" | "native" => Ok(SType::RawSymbol),
            "smart" => Ok(SType::Smart),
            "continuous" => Ok(SType::Continuous),
            "parent" => Ok(SType::Parent),
            "nasdaq_symbol" | "nasdaq" => Ok(SType::NasdaqSymbol),
            "cms_symbol" | "cms" => Ok(SType::CmsSymbol),
            "isin" => Ok(SType::Isin),
            "us_code" => Ok(SType::UsCode),
            "bbg_comp_id" => Ok(SType::BbgCompId),
            "bbg_comp_ticker" => Ok(SType::BbgCompTicker),
            "figi" => Ok(SType::Figi),
            "figi_ticker" => Ok(SType::FigiTicker),
            _ => Err(crate::Error::conversion::<Self>(s)),
        }
    }
}

impl VersionUpgradePolicy {
    /// Returns the DBN version records are upgraded to, or `None` for
    /// [`Self::AsIs`].
    pub const fn target_version(self) -> Option<u8> {
        match self {
            Self::AsIs => None,
            Self::UpgradeToV2 => Some(2),
            Self::UpgradeToV3 => Some(3),
        }
    }

    /// Returns `true` if data of `version` needs to be rewritten under this policy.
    /// Data already at or past the target version is never rewritten.
    pub const fn is_upgrade_situation(self, version: u8) -> bool {
        match self.target_version() {
            Some(target) => version < target,
            None => false,
        }
    }

    /// Returns the output DBN version given the input version and upgrade policy.
    pub const fn output_version(self, input_version: u8) -> u8 {
        if self.is_upgrade_situation(input_version) {
            match self.target_version() {
                Some(target) => target,
                None => input_version,
            }
        } else {
            input_version
        }
    }
}
