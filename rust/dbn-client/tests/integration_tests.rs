use std::{ffi::c_char, io::Write, mem, num::NonZeroU64, thread};

use dbn_client::{
    compat::{decode_record_ref, CompatBuffer},
    decode::{
        ByteChannel, DbnMetadata, DecodeRecord, DecodeRecordRef, DecodeStream, Decoder,
        MetadataDecoder,
    },
    encode::{EncodeRecord, Encoder},
    v1, v2, ErrorCode, Error, MappingInterval, MboMsg, Metadata, OhlcvMsg, Record, RecordRef,
    SType, Schema, StatMsg, SymbolMapping, TradeMsg, VersionUpgradePolicy, WithTsOut,
    DBN_VERSION,
};
use rstest::*;
use streaming_iterator::StreamingIterator;
use tempfile::NamedTempFile;
use time::macros::date;

fn metadata(version: u8) -> Metadata {
    Metadata::builder()
        .version(version)
        .dataset("XNAS.ITCH")
        .schema(Some(Schema::Trades))
        .start(1_704_153_600_000_000_000)
        .end(NonZeroU64::new(1_704_412_800_000_000_000))
        .limit(None)
        .stype_in(Some(SType::RawSymbol))
        .stype_out(Some(SType::InstrumentId))
        .symbols(vec!["AAPL".to_owned(), "MSFT".to_owned()])
        .partial(vec!["NVDA".to_owned()])
        .not_found(vec!["QQQQQ".to_owned()])
        .mappings(vec![
            SymbolMapping {
                raw_symbol: "AAPL".to_owned(),
                intervals: vec![
                    MappingInterval {
                        start_date: date!(2024 - 01 - 02),
                        end_date: date!(2024 - 01 - 04),
                        symbol: "32".to_owned(),
                    },
                    MappingInterval {
                        start_date: date!(2024 - 01 - 04),
                        end_date: date!(2024 - 01 - 05),
                        symbol: "33".to_owned(),
                    },
                ],
            },
            SymbolMapping {
                raw_symbol: "MSFT".to_owned(),
                intervals: vec![MappingInterval {
                    start_date: date!(2024 - 01 - 02),
                    end_date: date!(2024 - 01 - 05),
                    symbol: "7152".to_owned(),
                }],
            },
        ])
        .build()
}

fn trades() -> Vec<TradeMsg> {
    (0..50)
        .map(|i| TradeMsg {
            price: 185_000_000_000 + i,
            size: i as u32 + 1,
            sequence: i as u32,
            ..Default::default()
        })
        .collect()
}

fn encode_trades(metadata: &Metadata, zstd: bool) -> Vec<u8> {
    let mut buffer = Vec::new();
    if zstd {
        let mut encoder = Encoder::with_zstd(&mut buffer, metadata).unwrap();
        encoder.encode_records(&trades()).unwrap();
    } else {
        let mut encoder = Encoder::new(&mut buffer, metadata).unwrap();
        encoder.encode_records(&trades()).unwrap();
    }
    buffer
}

fn v1_error(msg: &str) -> v1::ErrorMsg {
    let mut rec = v1::ErrorMsg::default();
    for (dst, b) in rec.err.iter_mut().zip(msg.bytes()) {
        *dst = b as c_char;
    }
    rec
}

#[test]
fn minimal_v1_stream() {
    let metadata = Metadata::builder()
        .version(1)
        .dataset("GLBX.MDP3")
        .schema(Some(Schema::Mbo))
        .start(0)
        .stype_in(Some(SType::RawSymbol))
        .stype_out(Some(SType::InstrumentId))
        .build();
    let buffer = Encoder::new(Vec::new(), &metadata).unwrap().into_inner();

    let mut decoder =
        Decoder::with_upgrade_policy(buffer.as_slice(), VersionUpgradePolicy::AsIs).unwrap();
    let decoded = decoder.metadata();
    assert_eq!(decoded.version, 1);
    assert_eq!(decoded.dataset, "GLBX.MDP3");
    assert!(decoded.symbols.is_empty());
    assert!(decoded.partial.is_empty());
    assert!(decoded.not_found.is_empty());
    assert!(decoded.mappings.is_empty());
    assert!(decoder.decode_record_ref().unwrap().is_none());
    // stays at end of stream
    assert!(decoder.decode_record_ref().unwrap().is_none());
}

#[test]
fn v1_error_upgrades_to_v2() {
    let msg = "x".repeat(63);
    let v1_rec = v1_error(&msg);
    let mut buffer = Vec::new();
    Encoder::new(&mut buffer, &metadata(1))
        .unwrap()
        .encode_record(&v1_rec)
        .unwrap();

    let mut decoder =
        Decoder::with_upgrade_policy(buffer.as_slice(), VersionUpgradePolicy::UpgradeToV2)
            .unwrap();
    assert_eq!(decoder.metadata().version, 2);
    assert_eq!(decoder.metadata().symbol_cstr_len, v2::SYMBOL_CSTR_LEN);
    let rec_ref = decoder.decode_record_ref().unwrap().unwrap();
    let rec = rec_ref.get::<v2::ErrorMsg>().unwrap();
    assert_eq!(rec.err[..64], v1_rec.err);
    assert_eq!(rec.err().unwrap(), msg);
    assert_eq!(rec.code, ErrorCode::Unset as u8);
    assert_eq!(
        rec.hd.record_size(),
        mem::size_of::<v2::ErrorMsg>(),
        "length must be recomputed for the new layout"
    );
    assert_eq!(rec_ref.record_size(), mem::size_of::<v2::ErrorMsg>());
    assert!(decoder.decode_record_ref().unwrap().is_none());
}

#[test]
fn v1_records_decode_as_is() {
    let v1_rec = v1_error("Gateway closed");
    let mut buffer = Vec::new();
    Encoder::new(&mut buffer, &metadata(1))
        .unwrap()
        .encode_record(&v1_rec)
        .unwrap();

    let decoder =
        Decoder::with_upgrade_policy(buffer.as_slice(), VersionUpgradePolicy::AsIs).unwrap();
    let recs = decoder.decode_records::<v1::ErrorMsg>().unwrap();
    assert_eq!(recs, [v1_rec]);
}

#[rstest]
#[case::before_start(date!(2024 - 01 - 01))]
#[case::at_end(date!(2024 - 01 - 05))]
#[case::after_end(date!(2024 - 02 - 01))]
fn pit_symbol_map_out_of_range(#[case] date: time::Date) {
    let res = metadata(DBN_VERSION).symbol_map_for_date(date);
    assert!(
        matches!(res, Err(Error::BadArgument { ref param_name, .. }) if param_name == "date"),
        "{res:?}"
    );
}

#[rstest]
#[case::first_day(date!(2024 - 01 - 02), "32")]
#[case::last_day(date!(2024 - 01 - 04), "33")]
fn pit_symbol_map_in_range(#[case] date: time::Date, #[case] aapl_id: &str) {
    let symbol_map = metadata(DBN_VERSION).symbol_map_for_date(date).unwrap();
    assert_eq!(symbol_map.len(), 2);
    assert_eq!(
        symbol_map.get(aapl_id.parse().unwrap()).map(String::as_str),
        Some("AAPL")
    );
    assert_eq!(symbol_map.get(7152).map(String::as_str), Some("MSFT"));
}

#[test]
fn ts_symbol_map_spans_intervals() {
    let symbol_map = metadata(DBN_VERSION).symbol_map().unwrap();
    assert_eq!(
        symbol_map.get(date!(2024 - 01 - 03), 32).map(String::as_str),
        Some("AAPL")
    );
    assert_eq!(
        symbol_map.get(date!(2024 - 01 - 04), 33).map(String::as_str),
        Some("AAPL")
    );
    assert!(symbol_map.get(date!(2024 - 01 - 04), 32).is_none());
}

#[rstest]
fn compression_transparency(#[values(1, 2, 3)] version: u8) {
    let metadata = metadata(version);
    let plain = encode_trades(&metadata, false);
    let compressed = encode_trades(&metadata, true);
    assert_ne!(plain, compressed);

    let plain_decoder = Decoder::inferred(plain.as_slice()).unwrap();
    let zstd_decoder = Decoder::inferred(compressed.as_slice()).unwrap();
    assert!(!plain_decoder.get_ref().is_compressed());
    assert!(zstd_decoder.get_ref().is_compressed());
    assert_eq!(plain_decoder.metadata(), zstd_decoder.metadata());
    let plain_recs = plain_decoder.decode_records::<TradeMsg>().unwrap();
    let zstd_recs = zstd_decoder.decode_records::<TradeMsg>().unwrap();
    assert_eq!(plain_recs, zstd_recs);
    assert_eq!(plain_recs, trades());
}

#[rstest]
fn decode_from_byte_channel(#[values(false, true)] zstd: bool) {
    let encoded = encode_trades(&metadata(DBN_VERSION), zstd);
    let (mut writer, reader) = ByteChannel::bounded(4);
    let producer = thread::spawn(move || {
        // uneven chunks so records straddle reads
        for chunk in encoded.chunks(37) {
            writer.write_all(chunk).unwrap();
        }
    });
    let decoder = Decoder::inferred(reader).unwrap();
    assert_eq!(*decoder.metadata(), metadata(DBN_VERSION));
    assert_eq!(decoder.decode_records::<TradeMsg>().unwrap(), trades());
    producer.join().unwrap();
}

#[test]
fn round_trip_mixed_records() {
    let metadata = Metadata::builder()
        .dataset("GLBX.MDP3")
        .schema(None)
        .start(0)
        .stype_in(Some(SType::RawSymbol))
        .stype_out(Some(SType::InstrumentId))
        .build();
    let mbo = MboMsg {
        order_id: 12,
        price: 4_500_250_000_000,
        size: 3,
        ..Default::default()
    };
    let ohlcv = OhlcvMsg {
        open: 1,
        high: 4,
        low: 0,
        close: 2,
        volume: 100,
        ..OhlcvMsg::default_for_schema(Schema::Ohlcv1M)
    };
    let stat = StatMsg {
        quantity: 42,
        ..Default::default()
    };
    let mut buffer = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buffer, &metadata).unwrap();
        encoder.encode_record(&mbo).unwrap();
        encoder.encode_record(&ohlcv).unwrap();
        encoder.encode_record(&stat).unwrap();
        encoder.flush().unwrap();
    }

    let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
    assert_eq!(*decoder.metadata(), metadata);
    let rec = decoder.decode_record_ref().unwrap().unwrap();
    assert!(rec.has::<MboMsg>());
    assert_eq!(*rec.get::<MboMsg>().unwrap(), mbo);
    assert!(matches!(rec.get::<TradeMsg>(), Err(Error::Conversion { .. })));
    let rec = decoder.decode_record_ref().unwrap().unwrap();
    assert_eq!(*rec.get::<OhlcvMsg>().unwrap(), ohlcv);
    let rec = decoder.decode_record_ref().unwrap().unwrap();
    assert_eq!(*rec.get::<StatMsg>().unwrap(), stat);
    assert!(decoder.decode_record_ref().unwrap().is_none());
}

/// Offsets where each variable-length metadata section ends in a version 2 stream
/// built from `metadata(2)`.
fn v2_section_ends() -> [(usize, &'static str); 4] {
    let sym = v2::SYMBOL_CSTR_LEN;
    let count = mem::size_of::<u32>();
    let interval = 2 * mem::size_of::<u32>() + sym;
    // prelude, fixed fields, schema_definition_length
    let symbols_end = 8 + 100 + 4 + count + 2 * sym;
    let partial_end = symbols_end + count + sym;
    let not_found_end = partial_end + count + sym;
    let mappings_end = not_found_end + count + (sym + count + 2 * interval) + (sym + count + interval);
    [
        (symbols_end, "symbols"),
        (partial_end, "partial"),
        (not_found_end, "not_found"),
        (mappings_end, "mappings"),
    ]
}

#[rstest]
#[case::symbols(0)]
#[case::partial(1)]
#[case::not_found(2)]
#[case::mappings(3)]
fn metadata_section_truncated_by_one_byte(#[case] section: usize) {
    let mut buffer = Vec::new();
    dbn_client::encode::MetadataEncoder::new(&mut buffer)
        .encode(&metadata(2))
        .unwrap();
    let ends = v2_section_ends();
    assert_eq!(ends[3].0, buffer.len());

    let (end, name) = ends[section];
    buffer.truncate(end - 1);
    let length = (buffer.len() - 8) as u32;
    buffer[4..8].copy_from_slice(&length.to_le_bytes());
    let res = MetadataDecoder::new(buffer.as_slice()).decode();
    assert!(
        matches!(res, Err(Error::Decode(ref msg)) if msg.contains(name)),
        "{res:?}"
    );
}

#[test]
fn metadata_truncated_stream_is_io_error() {
    let mut buffer = Vec::new();
    dbn_client::encode::MetadataEncoder::new(&mut buffer)
        .encode(&metadata(3))
        .unwrap();
    buffer.pop();
    let res = MetadataDecoder::new(buffer.as_slice()).decode();
    assert!(matches!(res, Err(Error::Io { .. })), "{res:?}");
}

#[rstest]
#[case::current(DBN_VERSION, VersionUpgradePolicy::UpgradeToV3)]
#[case::as_is(1, VersionUpgradePolicy::AsIs)]
#[case::v2_to_v2(2, VersionUpgradePolicy::UpgradeToV2)]
fn upgrade_is_idempotent(#[case] version: u8, #[case] policy: VersionUpgradePolicy) {
    let rec = dbn_client::ErrorMsg::new(1, None, "test", true);
    let bytes = rec.as_ref();
    let mut compat_buffer = CompatBuffer::new();
    let res = decode_record_ref(version, policy, false, &mut compat_buffer, bytes).unwrap();
    assert_eq!(res.as_ref().as_ptr(), bytes.as_ptr(), "should borrow the input");
    assert_eq!(res.as_ref(), bytes);
}

#[test]
fn length_invariant_with_ts_out() {
    let metadata = Metadata::builder()
        .dataset("XNAS.ITCH")
        .schema(Some(Schema::Trades))
        .start(0)
        .stype_in(Some(SType::RawSymbol))
        .stype_out(Some(SType::InstrumentId))
        .ts_out(true)
        .build();
    let recs: Vec<_> = trades()
        .into_iter()
        .map(|rec| WithTsOut::new(rec, 1_704_153_600_000_000_000))
        .collect();
    let mut buffer = Vec::new();
    Encoder::new(&mut buffer, &metadata)
        .unwrap()
        .encode_records(&recs)
        .unwrap();
    let metadata_len = u32::from_le_bytes(buffer[4..8].try_into().unwrap()) as usize + 8;

    let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
    assert!(decoder.metadata().ts_out);
    let mut consumed = 0;
    while let Some(rec) = decoder.decode_record_ref().unwrap() {
        assert_eq!(rec.header().record_size(), rec.as_ref().len());
        assert_eq!(rec.record_size(), mem::size_of::<WithTsOut<TradeMsg>>());
        consumed += rec.record_size();
    }
    assert_eq!(metadata_len + consumed, buffer.len());

    let decoder = Decoder::new(buffer.as_slice()).unwrap();
    assert_eq!(decoder.decode_records::<WithTsOut<TradeMsg>>().unwrap(), recs);
}

#[test]
fn partial_trailing_record_ends_cleanly() {
    let mut buffer = encode_trades(&metadata(DBN_VERSION), false);
    let record_len = mem::size_of::<TradeMsg>();
    buffer.truncate(buffer.len() - record_len / 2);

    let decoder = Decoder::new(buffer.as_slice()).unwrap();
    let recs = decoder.decode_records::<TradeMsg>().unwrap();
    assert_eq!(recs.len(), trades().len() - 1);
    assert_eq!(recs, trades()[..recs.len()]);
}

#[test]
fn decode_stream_yields_all_records() {
    let buffer = encode_trades(&metadata(DBN_VERSION), false);
    let mut stream = Decoder::new(buffer.as_slice())
        .unwrap()
        .decode_stream::<TradeMsg>();
    let mut sequences = Vec::new();
    while let Some(rec) = stream.next() {
        sequences.push(rec.sequence);
    }
    assert!(stream.last_err().is_none());
    assert_eq!(sequences, (0..50).collect::<Vec<u32>>());
}

#[test]
fn legacy_dbz_is_rejected() {
    let mut buffer = Vec::new();
    // skippable frame header followed by the legacy metadata magic
    buffer.extend_from_slice(&0x184D2A50u32.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());
    buffer.extend_from_slice(b"DBZ\x01");
    buffer.extend_from_slice(&[0; 4]);
    let res = Decoder::inferred(buffer.as_slice());
    assert!(
        matches!(res, Err(Error::Decode(ref msg)) if msg.contains("DBZ")),
        "{:?}",
        res.err()
    );
}

#[rstest]
#[case::garbage(b"PK\x03\x04garbage".as_slice())]
#[case::empty(b"".as_slice())]
#[case::newer_version(b"DBN\x09\x00\x00\x00\x00".as_slice())]
fn invalid_input_is_rejected(#[case] input: &[u8]) {
    let res = Decoder::inferred(input);
    assert!(res.is_err());
}

#[fixture]
fn dbn_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&encode_trades(&metadata(DBN_VERSION), false))
        .unwrap();
    file
}

#[fixture]
fn zstd_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&encode_trades(&metadata(DBN_VERSION), true))
        .unwrap();
    file
}

#[rstest]
fn decode_from_file(dbn_file: NamedTempFile) {
    let decoder = Decoder::from_file(dbn_file.path()).unwrap();
    assert_eq!(*decoder.metadata(), metadata(DBN_VERSION));
    assert_eq!(decoder.decode_records::<TradeMsg>().unwrap(), trades());
}

#[rstest]
fn decode_from_zstd_file(zstd_file: NamedTempFile) {
    let decoder = Decoder::from_zstd_file(zstd_file.path()).unwrap();
    assert_eq!(*decoder.metadata(), metadata(DBN_VERSION));
    assert_eq!(decoder.decode_records::<TradeMsg>().unwrap(), trades());
}

#[rstest]
fn decode_inferred_file(dbn_file: NamedTempFile, zstd_file: NamedTempFile) {
    for file in [dbn_file, zstd_file] {
        let reader = dbn_client::decode::DynReader::from_file(file.path()).unwrap();
        let decoder = Decoder::new(reader).unwrap();
        assert_eq!(decoder.decode_records::<TradeMsg>().unwrap(), trades());
    }
}

#[test]
fn missing_file_is_io_error() {
    let res = Decoder::from_file("/nonexistent/path/data.dbn");
    assert!(matches!(res, Err(Error::Io { .. })), "{:?}", res.err());
}

#[test]
fn record_ref_rejects_short_buffer() {
    let rec = TradeMsg::default();
    let bytes = &rec.as_ref()[..8];
    assert!(matches!(RecordRef::new(bytes), Err(Error::Decode(_))));
}
