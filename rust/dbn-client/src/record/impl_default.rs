//! `Default` for records. Fields without a null sentinel are zeroed.
use std::os::raw::c_char;

use crate::{
    enums::{
        ErrorCode, MatchAlgorithm, SecurityUpdateAction, Side, StatUpdateAction, SystemCode,
        UserDefinedInstrument,
    },
    RType, Schema, UNDEF_ORDER_SIZE, UNDEF_PRICE, UNDEF_STAT_QUANTITY, UNDEF_TIMESTAMP,
};

use super::*;

/// Raw value of a tri-state field whose state isn't known, e.g.
/// [`StatusMsg::is_trading`].
const TRI_STATE_UNKNOWN: c_char = b'~' as c_char;
const NO_SIDE: c_char = Side::None as c_char;
const NO_ACTION: c_char = b'N' as c_char;

impl RecordHeader {
    /// Creates a header for a record of type `R` with a null `ts_event`.
    pub const fn default<R: HasRType>(rtype: u8) -> Self {
        Self::new::<R>(rtype, 0, 0, UNDEF_TIMESTAMP)
    }
}

impl Default for MboMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::MBO),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            action: NO_ACTION,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for BidAskPair {
    fn default() -> Self {
        Self {
            bid_px: UNDEF_PRICE,
            ask_px: UNDEF_PRICE,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for ConsolidatedBidAskPair {
    fn default() -> Self {
        Self {
            bid_px: UNDEF_PRICE,
            ask_px: UNDEF_PRICE,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for TradeMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::MBP_0),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            action: b'T' as c_char,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for Mbp1Msg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::MBP_1),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            action: NO_ACTION,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            levels: Default::default(),
            ..Zeroable::zeroed()
        }
    }
}

impl Default for Mbp10Msg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::MBP_10),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            action: NO_ACTION,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            levels: Default::default(),
            ..Zeroable::zeroed()
        }
    }
}

impl BboMsg {
    /// Returns a `BboMsg` with null fields and the rtype of `schema`.
    pub fn default_for_schema(schema: Schema) -> Self {
        Self {
            hd: RecordHeader::default::<Self>(RType::from(schema) as u8),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            levels: Default::default(),
            ..Zeroable::zeroed()
        }
    }
}

impl Cmbp1Msg {
    /// Returns a `Cmbp1Msg` with null fields and the rtype of `schema`.
    pub fn default_for_schema(schema: Schema) -> Self {
        Self {
            hd: RecordHeader::default::<Self>(RType::from(schema) as u8),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            action: NO_ACTION,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            levels: Default::default(),
            ..Zeroable::zeroed()
        }
    }
}

impl CbboMsg {
    /// Returns a `CbboMsg` with null fields and the rtype of `schema`.
    pub fn default_for_schema(schema: Schema) -> Self {
        Self {
            hd: RecordHeader::default::<Self>(RType::from(schema) as u8),
            price: UNDEF_PRICE,
            size: UNDEF_ORDER_SIZE,
            side: NO_SIDE,
            ts_recv: UNDEF_TIMESTAMP,
            levels: Default::default(),
            ..Zeroable::zeroed()
        }
    }
}

impl OhlcvMsg {
    /// Returns an `OhlcvMsg` with null prices and the rtype of `schema`.
    pub fn default_for_schema(schema: Schema) -> Self {
        Self {
            hd: RecordHeader::default::<Self>(RType::from(schema) as u8),
            open: UNDEF_PRICE,
            high: UNDEF_PRICE,
            low: UNDEF_PRICE,
            close: UNDEF_PRICE,
            volume: 0,
        }
    }
}

impl Default for StatusMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::STATUS),
            ts_recv: UNDEF_TIMESTAMP,
            is_trading: TRI_STATE_UNKNOWN,
            is_quoting: TRI_STATE_UNKNOWN,
            is_short_sell_restricted: TRI_STATE_UNKNOWN,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for InstrumentDefMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::INSTRUMENT_DEF),
            ts_recv: UNDEF_TIMESTAMP,
            expiration: UNDEF_TIMESTAMP,
            activation: UNDEF_TIMESTAMP,
            min_price_increment: UNDEF_PRICE,
            display_factor: UNDEF_PRICE,
            high_limit_price: UNDEF_PRICE,
            low_limit_price: UNDEF_PRICE,
            max_price_variation: UNDEF_PRICE,
            unit_of_measure_qty: UNDEF_PRICE,
            min_price_increment_amount: UNDEF_PRICE,
            price_ratio: UNDEF_PRICE,
            strike_price: UNDEF_PRICE,
            leg_price: UNDEF_PRICE,
            leg_delta: UNDEF_PRICE,
            inst_attrib_value: i32::MAX,
            market_depth_implied: i32::MAX,
            market_depth: i32::MAX,
            min_lot_size: i32::MAX,
            min_lot_size_block: i32::MAX,
            min_lot_size_round_lot: i32::MAX,
            contract_multiplier: i32::MAX,
            decay_quantity: i32::MAX,
            original_contract_size: i32::MAX,
            market_segment_id: u32::MAX,
            max_trade_vol: u32::MAX,
            min_trade_vol: u32::MAX,
            appl_id: i16::MAX,
            maturity_year: u16::MAX,
            decay_start_date: u16::MAX,
            channel_id: u16::MAX,
            match_algorithm: MatchAlgorithm::Undefined as c_char,
            main_fraction: u8::MAX,
            price_display_format: u8::MAX,
            sub_fraction: u8::MAX,
            underlying_product: u8::MAX,
            security_update_action: SecurityUpdateAction::default() as c_char,
            maturity_month: u8::MAX,
            maturity_day: u8::MAX,
            maturity_week: u8::MAX,
            user_defined_instrument: UserDefinedInstrument::default() as c_char,
            contract_multiplier_unit: i8::MAX,
            flow_schedule_type: i8::MAX,
            tick_rule: u8::MAX,
            leg_side: NO_SIDE,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for ImbalanceMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::IMBALANCE),
            ts_recv: UNDEF_TIMESTAMP,
            auction_time: UNDEF_TIMESTAMP,
            ref_price: UNDEF_PRICE,
            cont_book_clr_price: UNDEF_PRICE,
            auct_interest_clr_price: UNDEF_PRICE,
            ssr_filling_price: UNDEF_PRICE,
            ind_match_price: UNDEF_PRICE,
            upper_collar: UNDEF_PRICE,
            lower_collar: UNDEF_PRICE,
            paired_qty: UNDEF_ORDER_SIZE,
            total_imbalance_qty: UNDEF_ORDER_SIZE,
            market_imbalance_qty: UNDEF_ORDER_SIZE,
            unpaired_qty: UNDEF_ORDER_SIZE,
            auction_type: TRI_STATE_UNKNOWN,
            significant_imbalance: TRI_STATE_UNKNOWN,
            side: NO_SIDE,
            unpaired_side: NO_SIDE,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for StatMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::STATISTICS),
            ts_recv: UNDEF_TIMESTAMP,
            ts_ref: UNDEF_TIMESTAMP,
            price: UNDEF_PRICE,
            quantity: UNDEF_STAT_QUANTITY,
            channel_id: u16::MAX,
            update_action: StatUpdateAction::New as u8,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for ErrorMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::ERROR),
            code: ErrorCode::Unset as u8,
            is_last: u8::MAX,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for SymbolMappingMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::SYMBOL_MAPPING),
            stype_in: u8::MAX,
            stype_out: u8::MAX,
            start_ts: UNDEF_TIMESTAMP,
            end_ts: UNDEF_TIMESTAMP,
            ..Zeroable::zeroed()
        }
    }
}

impl Default for SystemMsg {
    fn default() -> Self {
        Self {
            hd: RecordHeader::default::<Self>(rtype::SYSTEM),
            code: SystemCode::Unset as u8,
            ..Zeroable::zeroed()
        }
    }
}
