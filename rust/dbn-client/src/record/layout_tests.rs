use std::mem::{self, offset_of};

use rstest::rstest;
use type_layout::{Field, TypeLayout};

use crate::{Schema, UNDEF_TIMESTAMP};

use super::*;

const OHLCV_MSG: OhlcvMsg = OhlcvMsg {
    hd: RecordHeader {
        length: 14,
        rtype: rtype::OHLCV_1S,
        publisher_id: 1,
        instrument_id: 5482,
        ts_event: 1609160400000000000,
    },
    open: 372025000000000,
    high: 372050000000000,
    low: 372025000000000,
    close: 372050000000000,
    volume: 57,
};

#[test]
fn test_bytes_round_trip_through_pod() {
    let bytes = bytemuck::bytes_of(&OHLCV_MSG).to_vec();
    assert_eq!(bytes.len(), OHLCV_MSG.record_size());
    let ohlcv: OhlcvMsg = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(ohlcv, OHLCV_MSG);
}

#[test]
fn test_as_ref_matches_bytes_of() {
    assert_eq!(OHLCV_MSG.as_ref(), bytemuck::bytes_of(&OHLCV_MSG));
}

#[rstest]
#[case::header(RecordHeader::default::<MboMsg>(rtype::MBO), 16)]
#[case::mbo(MboMsg::default(), 56)]
#[case::ba_pair(BidAskPair::default(), 32)]
#[case::cba_pair(ConsolidatedBidAskPair::default(), mem::size_of::<BidAskPair>())]
#[case::trade(TradeMsg::default(), 48)]
#[case::mbp1(Mbp1Msg::default(), mem::size_of::<TradeMsg>() + mem::size_of::<BidAskPair>())]
#[case::mbp10(Mbp10Msg::default(), mem::size_of::<TradeMsg>() + mem::size_of::<BidAskPair>() * 10)]
#[case::bbo(BboMsg::default_for_schema(Schema::Bbo1S), mem::size_of::<Mbp1Msg>())]
#[case::cmbp1(Cmbp1Msg::default_for_schema(Schema::Cmbp1), mem::size_of::<Mbp1Msg>())]
#[case::cbbo(CbboMsg::default_for_schema(Schema::Cbbo1S), mem::size_of::<Mbp1Msg>())]
#[case::ohlcv(OhlcvMsg::default_for_schema(Schema::Ohlcv1S), 56)]
#[case::status(StatusMsg::default(), 40)]
#[case::definition(InstrumentDefMsg::default(), 520)]
#[case::imbalance(ImbalanceMsg::default(), 112)]
#[case::stat(StatMsg::default(), 64)]
#[case::error(ErrorMsg::default(), 320)]
#[case::symbol_mapping(SymbolMappingMsg::default(), 176)]
#[case::system(SystemMsg::default(), 320)]
#[case::with_ts_out(WithTsOut::new(SystemMsg::default(), 0), mem::size_of::<SystemMsg>() + 8)]
fn test_sizes<R: Sized>(#[case] _rec: R, #[case] exp: usize) {
    assert_eq!(mem::size_of::<R>(), exp);
    assert!(mem::size_of::<R>() <= crate::MAX_RECORD_LEN);
}

#[rstest]
#[case::header(RecordHeader::default::<MboMsg>(rtype::MBO))]
#[case::mbo(MboMsg::default())]
#[case::ba_pair(BidAskPair::default())]
#[case::cba_pair(ConsolidatedBidAskPair::default())]
#[case::trade(TradeMsg::default())]
#[case::mbp1(Mbp1Msg::default())]
#[case::mbp10(Mbp10Msg::default())]
#[case::bbo(BboMsg::default_for_schema(Schema::Bbo1S))]
#[case::cmbp1(Cmbp1Msg::default_for_schema(Schema::Cmbp1))]
#[case::cbbo(CbboMsg::default_for_schema(Schema::Cbbo1S))]
#[case::ohlcv(OhlcvMsg::default_for_schema(Schema::Ohlcv1S))]
#[case::status(StatusMsg::default())]
#[case::definition(InstrumentDefMsg::default())]
#[case::imbalance(ImbalanceMsg::default())]
#[case::stat(StatMsg::default())]
#[case::error(ErrorMsg::default())]
#[case::symbol_mapping(SymbolMappingMsg::default())]
#[case::system(SystemMsg::default())]
fn test_alignment_and_no_padding<R: TypeLayout>(#[case] _rec: R) {
    let layout = R::type_layout();
    assert_eq!(layout.alignment, 8, "Unexpected alignment: {layout}");
    for field in layout.fields.iter() {
        assert!(
            matches!(field, Field::Field { .. }),
            "Detected padding: {layout}"
        );
    }
}

#[test]
fn test_header_offsets() {
    assert_eq!(offset_of!(RecordHeader, length), 0);
    assert_eq!(offset_of!(RecordHeader, rtype), 1);
    assert_eq!(offset_of!(RecordHeader, publisher_id), 2);
    assert_eq!(offset_of!(RecordHeader, instrument_id), 4);
    assert_eq!(offset_of!(RecordHeader, ts_event), 8);
}

#[test]
fn test_symbol_mapping_offsets() {
    assert_eq!(offset_of!(SymbolMappingMsg, stype_in), 16);
    assert_eq!(offset_of!(SymbolMappingMsg, stype_in_symbol), 17);
    assert_eq!(offset_of!(SymbolMappingMsg, stype_out), 88);
    assert_eq!(offset_of!(SymbolMappingMsg, stype_out_symbol), 89);
    assert_eq!(offset_of!(SymbolMappingMsg, start_ts), 160);
}

#[test]
fn test_default_header_length_matches_size() {
    assert_eq!(
        InstrumentDefMsg::default().record_size(),
        mem::size_of::<InstrumentDefMsg>()
    );
    assert_eq!(
        WithTsOut::new(ErrorMsg::default(), 1).record_size(),
        mem::size_of::<WithTsOut<ErrorMsg>>()
    );
}

#[test]
fn test_index_ts() {
    let rec = MboMsg {
        ts_recv: 1,
        ..Default::default()
    };
    assert_eq!(rec.raw_index_ts(), 1);
    let rec = OhlcvMsg::default_for_schema(Schema::Ohlcv1D);
    assert_eq!(rec.raw_index_ts(), UNDEF_TIMESTAMP);
    assert!(rec.index_ts().is_none());
    assert!(rec.index_date().is_none());
}

#[test]
fn test_has_rtype() {
    assert!(OhlcvMsg::has_rtype(rtype::OHLCV_1H));
    assert!(!OhlcvMsg::has_rtype(rtype::MBO));
    assert!(BboMsg::has_rtype(rtype::BBO_1M));
    assert!(WithTsOut::<TradeMsg>::has_rtype(rtype::MBP_0));
}
