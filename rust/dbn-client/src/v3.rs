//! Record data types for encoding different Databento [`Schema`](crate::enums::Schema)s
//! in DBN version 3, the current version.

pub use crate::compat::{
    InstrumentDefMsgV3 as InstrumentDefMsg, ASSET_CSTR_LEN_V3 as ASSET_CSTR_LEN,
    SYMBOL_CSTR_LEN_V3 as SYMBOL_CSTR_LEN,
};
pub use crate::record::{
    Bbo1MMsg, Bbo1SMsg, BboMsg, Cbbo1MMsg, Cbbo1SMsg, CbboMsg, Cmbp1Msg, ErrorMsg, ImbalanceMsg,
    MboMsg, Mbp10Msg, Mbp1Msg, OhlcvMsg, StatMsg, StatusMsg, SymbolMappingMsg, SystemMsg,
    TbboMsg, TcbboMsg, TradeMsg, WithTsOut,
};

use crate::{
    compat::{resized_header, widen_cstr, InstrumentDefRec},
    v1, v2,
};

/// The DBN version of this module.
pub const DBN_VERSION: u8 = 3;

impl From<&v1::InstrumentDefMsg> for InstrumentDefMsg {
    /// Upgrades through the version 2 layout, which holds every version 1 field
    /// that survives into version 3.
    fn from(old: &v1::InstrumentDefMsg) -> Self {
        Self::from(&v2::InstrumentDefMsg::from(old))
    }
}

impl From<&v2::InstrumentDefMsg> for InstrumentDefMsg {
    fn from(old: &v2::InstrumentDefMsg) -> Self {
        let mut res = Self {
            hd: resized_header::<Self>(&old.hd),
            raw_symbol: old.raw_symbol,
            ts_recv: old.ts_recv,
            min_price_increment: old.min_price_increment,
            display_factor: old.display_factor,
            expiration: old.expiration,
            activation: old.activation,
            high_limit_price: old.high_limit_price,
            low_limit_price: old.low_limit_price,
            max_price_variation: old.max_price_variation,
            unit_of_measure_qty: old.unit_of_measure_qty,
            min_price_increment_amount: old.min_price_increment_amount,
            price_ratio: old.price_ratio,
            strike_price: old.strike_price,
            raw_instrument_id: u64::from(old.raw_instrument_id),
            inst_attrib_value: old.inst_attrib_value,
            underlying_id: old.underlying_id,
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
            appl_id: old.appl_id,
            maturity_year: old.maturity_year,
            decay_start_date: old.decay_start_date,
            channel_id: old.channel_id,
            currency: old.currency,
            settl_currency: old.settl_currency,
            secsubtype: old.secsubtype,
            group: old.group,
            exchange: old.exchange,
            cfi: old.cfi,
            security_type: old.security_type,
            unit_of_measure: old.unit_of_measure,
            underlying: old.underlying,
            strike_price_currency: old.strike_price_currency,
            instrument_class: old.instrument_class,
            match_algorithm: old.match_algorithm,
            main_fraction: old.main_fraction,
            price_display_format: old.price_display_format,
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
        };
        res.asset = widen_cstr(&old.asset);
        res
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

#[cfg(test)]
mod tests {
    use crate::{record::str_to_c_chars, UNDEF_PRICE};

    use super::*;

    #[test]
    fn test_default_equivalency() {
        assert_eq!(
            InstrumentDefMsg::from(&v2::InstrumentDefMsg::default()),
            InstrumentDefMsg::default()
        );
    }

    #[test]
    fn test_v1_upgrade_matches_two_step() {
        let old = v1::InstrumentDefMsg {
            raw_symbol: str_to_c_chars("ESZ4").unwrap(),
            asset: str_to_c_chars("ES").unwrap(),
            strike_price: 5_000,
            ..Default::default()
        };
        let new = InstrumentDefMsg::from(&old);
        assert_eq!(new, InstrumentDefMsg::from(&v2::InstrumentDefMsg::from(&old)));
        assert_eq!(new.raw_symbol().unwrap(), "ESZ4");
        assert_eq!(new.asset().unwrap(), "ES");
        assert_eq!(new.strike_price, 5_000);
        assert_eq!(new.hd.record_size(), std::mem::size_of::<InstrumentDefMsg>());
    }

    #[test]
    fn test_v2_upgrade_drops_removed_fields() {
        let old = v2::InstrumentDefMsg {
            trading_reference_price: 100,
            raw_instrument_id: 42,
            raw_symbol: str_to_c_chars("A_SYMBOL_LONGER_THAN_TWENTY_TWO_CHARS").unwrap(),
            asset: str_to_c_chars("ES").unwrap(),
            ..Default::default()
        };
        let new = InstrumentDefMsg::from(&old);
        assert_eq!(new.raw_instrument_id, 42);
        assert_eq!(
            new.raw_symbol().unwrap(),
            "A_SYMBOL_LONGER_THAN_TWENTY_TWO_CHARS"
        );
        assert_eq!(new.asset().unwrap(), "ES");
        assert_eq!(new.leg_price, UNDEF_PRICE);
        assert_eq!(new.leg_count, 0);
    }
}
