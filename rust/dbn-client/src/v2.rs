//! Record data types for encoding different Databento [`Schema`](crate::enums::Schema)s
//! in DBN version 2.

pub use crate::compat::{
    InstrumentDefMsgV2 as InstrumentDefMsg, ASSET_CSTR_LEN_V2 as ASSET_CSTR_LEN,
    SYMBOL_CSTR_LEN_V2 as SYMBOL_CSTR_LEN,
};
pub use crate::record::{
    Bbo1MMsg, Bbo1SMsg, BboMsg, Cbbo1MMsg, Cbbo1SMsg, CbboMsg, Cmbp1Msg, ErrorMsg, ImbalanceMsg,
    MboMsg, Mbp10Msg, Mbp1Msg, OhlcvMsg, StatMsg, StatusMsg, SymbolMappingMsg, SystemMsg,
    TbboMsg, TcbboMsg, TradeMsg, WithTsOut,
};

mod methods;

use crate::{
    compat::{resized_header, widen_cstr, InstrumentDefRec, SymbolMappingRec},
    v1,
};

/// The DBN version of this module.
pub const DBN_VERSION: u8 = 2;

impl From<&v1::InstrumentDefMsg> for InstrumentDefMsg {
    fn from(old: &v1::InstrumentDefMsg) -> Self {
        Self {
            hd: resized_header::<Self>(&old.hd),
            raw_symbol: widen_cstr(&old.raw_symbol),
            ts_recv: old.ts_recv,
            min_price_increment: old.min_price_increment,
            display_factor: old.display_factor,
            expiration: old.expiration,
            activation: old.activation,
            high_limit_price: old.high_limit_price,
            low_limit_price: old.low_limit_price,
            max_price_variation: old.max_price_variation,
            trading_reference_price: old.trading_reference_price,
            unit_of_measure_qty: old.unit_of_measure_qty,
            min_price_increment_amount: old.min_price_increment_amount,
            price_ratio: old.price_ratio,
            strike_price: old.strike_price,
            inst_attrib_value: old.inst_attrib_value,
            underlying_id: old.underlying_id,
            raw_instrument_id: old.raw_instrument_id,
            market_depth_implied: old.market_depth_implied,
            market_depth: old.market_depth,
            market_segment_id: old.market_segment_id,
            max_trade_vol: old.max_trade_vol,
            min_lot_size: old.min_lot_size,
            min_lot_size_block: old.min_lot_size_block,
            min_lot_size_round_lot: old.min_lot_size_round_lot,
            min_trade_vol: old.min_trade_vol,
            contract_multiplier: old.contract_multiplier,
            decay_quantity: old.decay_quantity,
            original_contract_size: old.original_contract_size,
            trading_reference_date: old.trading_reference_date,
            appl_id: old.appl_id,
            maturity_year: old.maturity_year,
            decay_start_date: old.decay_start_date,
            channel_id: old.channel_id,
            currency: old.currency,
            settl_currency: old.settl_currency,
            secsubtype: old.secsubtype,
            group: old.group,
            exchange: old.exchange,
            asset: old.asset,
            cfi: old.cfi,
            security_type: old.security_type,
            unit_of_measure: old.unit_of_measure,
            underlying: old.underlying,
            strike_price_currency: old.strike_price_currency,
            instrument_class: old.instrument_class,
            match_algorithm: old.match_algorithm,
            md_security_trading_status: old.md_security_trading_status,
            main_fraction: old.main_fraction,
            price_display_format: old.price_display_format,
            settl_price_type: old.settl_price_type,
            sub_fraction: old.sub_fraction,
            underlying_product: old.underlying_product,
            security_update_action: old.security_update_action,
            maturity_month: old.maturity_month,
            maturity_day: old.maturity_day,
            maturity_week: old.maturity_week,
            user_defined_instrument: old.user_defined_instrument,
            contract_multiplier_unit: old.contract_multiplier_unit,
            flow_schedule_type: old.flow_schedule_type,
            tick_rule: old.tick_rule,
            ..Default::default()
        }
    }
}

impl From<&v1::ErrorMsg> for ErrorMsg {
    fn from(old: &v1::ErrorMsg) -> Self {
        Self {
            hd: resized_header::<Self>(&old.hd),
            err: widen_cstr(&old.err),
            ..Default::default()
        }
    }
}

impl From<&v1::SymbolMappingMsg> for SymbolMappingMsg {
    fn from(old: &v1::SymbolMappingMsg) -> Self {
        Self {
            hd: resized_header::<Self>(&old.hd),
            stype_in_symbol: widen_cstr(&old.stype_in_symbol),
            stype_out_symbol: widen_cstr(&old.stype_out_symbol),
            start_ts: old.start_ts,
            end_ts: old.end_ts,
            ..Default::default()
        }
    }
}

impl From<&v1::SystemMsg> for SystemMsg {
    fn from(old: &v1::SystemMsg) -> Self {
        Self {
            hd: resized_header::<Self>(&old.hd),
            msg: widen_cstr(&old.msg),
            ..Default::default()
        }
    }
}

impl SymbolMappingRec for SymbolMappingMsg {
    fn stype_in_symbol(&self) -> crate::Result<&str> {
        Self::stype_in_symbol(self)
    }

    fn stype_out_symbol(&self) -> crate::Result<&str> {
        Self::stype_out_symbol(self)
    }

    fn raw_start_ts(&self) -> u64 {
        self.start_ts
    }

    fn raw_end_ts(&self) -> u64 {
        self.end_ts
    }
}

impl InstrumentDefRec for InstrumentDefMsg {
    fn raw_symbol(&self) -> crate::Result<&str> {
        Self::raw_symbol(self)
    }

    fn asset(&self) -> crate::Result<&str> {
        Self::asset(self)
    }

    fn security_type(&self) -> crate::Result<&str> {
        Self::security_type(self)
    }

    fn security_update_action(&self) -> crate::Result<crate::SecurityUpdateAction> {
        Self::security_update_action(self)
    }

    fn channel_id(&self) -> u16 {
        self.channel_id
    }
}
