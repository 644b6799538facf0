//! Encoding of DBN files and streams.
use std::{io, mem, num::NonZeroU64};

use super::{zstd_encoder, EncodeDbn, EncodeRecord, EncodeRecordRef};
use crate::{
    compat::{METADATA_RESERVED_LEN_V1, SYMBOL_CSTR_LEN_V1},
    Error, HasRType, Metadata, RecordRef, Result, SymbolMapping, DBN_VERSION, NULL_END,
    NULL_LIMIT, NULL_RECORD_COUNT, NULL_SCHEMA, NULL_STYPE,
};

/// Type for encoding files and streams in Databento Binary Encoding (DBN).
pub struct Encoder<W>
where
    W: io::Write,
{
    record_encoder: RecordEncoder<W>,
}

impl<W> Encoder<W>
where
    W: io::Write,
{
    /// Creates a new DBN [`Encoder`] that will write to `writer`.
    ///
    /// # Errors
    /// This function will return an error if it fails to encode `metadata` to
    /// `writer`.
    pub fn new(mut writer: W, metadata: &Metadata) -> Result<Self> {
        MetadataEncoder::new(&mut writer).encode(metadata)?;
        Ok(Self {
            record_encoder: RecordEncoder::new(writer),
        })
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.record_encoder.get_ref()
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        self.record_encoder.get_mut()
    }

    /// Consumes the encoder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.record_encoder.into_inner()
    }
}

impl<W> Encoder<zstd::stream::AutoFinishEncoder<'_, W>>
where
    W: io::Write,
{
    /// Creates a new DBN [`Encoder`] that will write Zstd-compressed output to
    /// `writer`. The Zstd frame is finished when the encoder is dropped.
    ///
    /// # Errors
    /// This function will return an error if it fails to encode `metadata` to
    /// `writer`.
    pub fn with_zstd(writer: W, metadata: &Metadata) -> Result<Self> {
        Encoder::new(zstd_encoder(writer)?, metadata)
    }
}

impl<W> EncodeRecord for Encoder<W>
where
    W: io::Write,
{
    fn encode_record<R: HasRType>(&mut self, record: &R) -> Result<()> {
        self.record_encoder.encode_record(record)
    }

    fn encode_records<R: HasRType>(&mut self, records: &[R]) -> Result<()> {
        self.record_encoder.encode_records(records)
    }

    fn flush(&mut self) -> Result<()> {
        self.record_encoder.flush()
    }
}

impl<W> EncodeRecordRef for Encoder<W>
where
    W: io::Write,
{
    fn encode_record_ref(&mut self, record: RecordRef) -> Result<()> {
        self.record_encoder.encode_record_ref(record)
    }
}

impl<W> EncodeDbn for Encoder<W> where W: io::Write {}

/// Type for encoding [`Metadata`] into Databento Binary Encoding (DBN).
pub struct MetadataEncoder<W>
where
    W: io::Write,
{
    writer: W,
}

impl<W> MetadataEncoder<W>
where
    W: io::Write,
{
    /// Creates a new [`MetadataEncoder`] that will write to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes `metadata` into DBN using the layout of `metadata.version`. Version 3
    /// metadata is padded to a multiple of 8 bytes so the records that follow are
    /// aligned.
    ///
    /// # Errors
    /// This function returns an error if it fails to write to the underlying writer,
    /// `metadata` is from a newer DBN version than is supported, or a string doesn't
    /// fit in its fixed-width field.
    pub fn encode(&mut self, metadata: &Metadata) -> Result<()> {
        if metadata.version > DBN_VERSION {
            return Err(Error::encode(format!(
                "can't encode Metadata with version {} which is greater than the maximum supported version {DBN_VERSION}",
                metadata.version
            )));
        }
        // Never write version 0, which denotes legacy DBZ
        let version = metadata.version.max(1);
        let symbol_cstr_len = if version == 1 {
            SYMBOL_CSTR_LEN_V1
        } else {
            metadata.symbol_cstr_len
        };
        let encoded_symbol_cstr_len = u16::try_from(symbol_cstr_len).map_err(|_| {
            Error::encode(format!("symbol_cstr_len {symbol_cstr_len} doesn't fit in a u16"))
        })?;
        let (length, end_padding) = calc_length(metadata, version, symbol_cstr_len)?;

        self.write(b"DBN")?;
        self.write(&[version])?;
        self.write(&length.to_le_bytes())?;
        self.encode_fixed_len_cstr(crate::METADATA_DATASET_CSTR_LEN, &metadata.dataset)?;
        self.write(&metadata.schema.map(u16::from).unwrap_or(NULL_SCHEMA).to_le_bytes())?;
        self.encode_range_and_counts(version, metadata.start, metadata.end, metadata.limit)?;
        self.write(&[
            metadata.stype_in.map(u8::from).unwrap_or(NULL_STYPE),
            metadata.stype_out.map(u8::from).unwrap_or(NULL_STYPE),
            metadata.ts_out as u8,
        ])?;
        if version == 1 {
            self.write(&[0; METADATA_RESERVED_LEN_V1])?;
        } else {
            self.write(&encoded_symbol_cstr_len.to_le_bytes())?;
            self.write(&[0; crate::METADATA_RESERVED_LEN])?;
        }
        // schema_definition_length
        self.write(&0u32.to_le_bytes())?;
        self.encode_repeated_symbol_cstr(symbol_cstr_len, &metadata.symbols)?;
        self.encode_repeated_symbol_cstr(symbol_cstr_len, &metadata.partial)?;
        self.encode_repeated_symbol_cstr(symbol_cstr_len, &metadata.not_found)?;
        self.encode_symbol_mappings(symbol_cstr_len, &metadata.mappings)?;
        self.write(&[0; 7][..end_padding])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::io(e, "writing DBN metadata"))
    }

    fn encode_range_and_counts(
        &mut self,
        version: u8,
        start: u64,
        end: Option<NonZeroU64>,
        limit: Option<NonZeroU64>,
    ) -> Result<()> {
        self.write(&start.to_le_bytes())?;
        self.write(&end.map(NonZeroU64::get).unwrap_or(NULL_END).to_le_bytes())?;
        self.write(&limit.map(NonZeroU64::get).unwrap_or(NULL_LIMIT).to_le_bytes())?;
        if version == 1 {
            self.write(&NULL_RECORD_COUNT.to_le_bytes())?;
        }
        Ok(())
    }

    fn encode_repeated_symbol_cstr(
        &mut self,
        symbol_cstr_len: usize,
        symbols: &[String],
    ) -> Result<()> {
        self.write(&encode_count(symbols.len())?.to_le_bytes())?;
        for symbol in symbols {
            self.encode_fixed_len_cstr(symbol_cstr_len, symbol)?;
        }
        Ok(())
    }

    fn encode_symbol_mappings(
        &mut self,
        symbol_cstr_len: usize,
        symbol_mappings: &[SymbolMapping],
    ) -> Result<()> {
        self.write(&encode_count(symbol_mappings.len())?.to_le_bytes())?;
        for mapping in symbol_mappings {
            self.encode_fixed_len_cstr(symbol_cstr_len, &mapping.raw_symbol)?;
            self.write(&encode_count(mapping.intervals.len())?.to_le_bytes())?;
            for interval in mapping.intervals.iter() {
                self.write(&encode_date(interval.start_date).to_le_bytes())?;
                self.write(&encode_date(interval.end_date).to_le_bytes())?;
                self.encode_fixed_len_cstr(symbol_cstr_len, &interval.symbol)?;
            }
        }
        Ok(())
    }

    fn encode_fixed_len_cstr(&mut self, cstr_len: usize, string: &str) -> Result<()> {
        if !string.is_ascii() {
            return Err(Error::Conversion {
                input: string.to_owned(),
                desired_type: "ASCII",
            });
        }
        if string.len() >= cstr_len {
            return Err(Error::encode(format!(
                "'{string}' is too long to be encoded in DBN; it cannot be longer than {} characters",
                cstr_len.saturating_sub(1)
            )));
        }
        self.write(string.as_bytes())?;
        // pad remaining space with null bytes
        let mut remaining = cstr_len - string.len();
        while remaining > 0 {
            let n = remaining.min(64);
            self.write(&[0; 64][..n])?;
            remaining -= n;
        }
        Ok(())
    }
}

fn encode_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::encode(format!("{len} entries can't be encoded in DBN")))
}

fn encode_date(date: time::Date) -> u32 {
    date.year() as u32 * 10_000 + u8::from(date.month()) as u32 * 100 + date.day() as u32
}

/// Returns the length of the encoded metadata after the prelude, and the number of
/// bytes of padding at the end.
fn calc_length(metadata: &Metadata, version: u8, symbol_cstr_len: usize) -> Result<(u32, usize)> {
    let mapping_interval_len = mem::size_of::<u32>() * 2 + symbol_cstr_len;
    // schema_definition_length, symbols_count, partial_count, not_found_count, mappings_count
    let var_len_counts_size = mem::size_of::<u32>() * 5;
    let c_str_count = metadata.symbols.len() + metadata.partial.len() + metadata.not_found.len();
    let needed_len = crate::METADATA_FIXED_LEN
        + var_len_counts_size
        + c_str_count * symbol_cstr_len
        + metadata
            .mappings
            .iter()
            .map(|m| symbol_cstr_len + mem::size_of::<u32>() + m.intervals.len() * mapping_interval_len)
            .sum::<usize>();
    let rem = needed_len % 8;
    let end_padding = if version < 3 || rem == 0 { 0 } else { 8 - rem };
    let length = u32::try_from(needed_len + end_padding)
        .map_err(|_| Error::encode("metadata is too large to be encoded in DBN"))?;
    Ok((length, end_padding))
}

/// Type for encoding Databento Binary Encoding (DBN) records (not metadata).
pub struct RecordEncoder<W>
where
    W: io::Write,
{
    writer: W,
}

impl<W> RecordEncoder<W>
where
    W: io::Write,
{
    /// Creates a new DBN [`RecordEncoder`] that will write to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes the encoder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> EncodeRecord for RecordEncoder<W>
where
    W: io::Write,
{
    fn encode_record<R: HasRType>(&mut self, record: &R) -> Result<()> {
        self.writer.write_all(record.as_ref()).map_err(|e| {
            Error::io(
                e,
                format!("serializing record with rtype {:#04X}", record.header().rtype),
            )
        })
    }

    fn encode_records<R: HasRType>(&mut self, records: &[R]) -> Result<()> {
        self.writer
            .write_all(bytemuck::cast_slice(records))
            .map_err(|e| Error::io(e, format!("serializing {} records", records.len())))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::io(e, "flushing output"))
    }
}

impl<W> EncodeRecordRef for RecordEncoder<W>
where
    W: io::Write,
{
    fn encode_record_ref(&mut self, record: RecordRef) -> Result<()> {
        self.writer
            .write_all(record.as_ref())
            .map_err(|e| Error::io(e, format!("serializing {record:?}")))
    }
}

impl<W> EncodeDbn for RecordEncoder<W> where W: io::Write {}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        compat::version_symbol_cstr_len,
        decode::{DbnMetadata, Decoder, DecodeRecord, MetadataDecoder},
        test_utils::test_metadata,
        MboMsg, Record, SType, Schema, TradeMsg, VersionUpgradePolicy,
    };

    #[rstest]
    #[case::v1(1, 0)]
    #[case::v2(2, 0)]
    #[case::v3(3, 1)]
    fn test_calc_length(#[case] version: u8, #[case] exp_padding: usize) {
        let metadata = test_metadata(version);
        let symbol_cstr_len = version_symbol_cstr_len(version);
        let (length, end_padding) = calc_length(&metadata, version, symbol_cstr_len).unwrap();
        assert_eq!(end_padding, exp_padding);
        let mut buffer = Vec::new();
        MetadataEncoder::new(&mut buffer).encode(&metadata).unwrap();
        assert_eq!(buffer.len(), 8 + length as usize);
        if version == 3 {
            assert_eq!(length % 8, 0);
        }
    }

    #[test]
    fn test_encode_minimal_layout() {
        let metadata = Metadata::builder()
            .version(1)
            .dataset("GLBX.MDP3")
            .schema(Some(Schema::Mbo))
            .start(1)
            .stype_in(Some(SType::RawSymbol))
            .stype_out(Some(SType::InstrumentId))
            .build();
        let mut buffer = Vec::new();
        MetadataEncoder::new(&mut buffer).encode(&metadata).unwrap();
        assert_eq!(&buffer[..4], b"DBN\x01");
        // fixed fields plus schema_definition_length and four empty section counts
        assert_eq!(buffer.len(), 8 + 100 + 4 + 4 * 4);
        assert_eq!(u32::from_le_bytes(buffer[4..8].try_into().unwrap()), 120);
        assert_eq!(&buffer[8..17], b"GLBX.MDP3");
        assert_eq!(buffer[17..24], [0; 7]);
        // deprecated record_count
        assert_eq!(buffer[8 + 16 + 2 + 24..8 + 16 + 2 + 32], [0xFF; 8]);
    }

    #[rstest]
    fn test_encode_decode_identity(#[values(1, 2, 3)] version: u8) {
        let metadata = test_metadata(version);
        let mut buffer = Vec::new();
        MetadataEncoder::new(&mut buffer).encode(&metadata).unwrap();
        let decoded = MetadataDecoder::new(buffer.as_slice()).decode().unwrap();
        assert_eq!(decoded, metadata);
        let mut reencoded = Vec::new();
        MetadataEncoder::new(&mut reencoded).encode(&decoded).unwrap();
        assert_eq!(reencoded, buffer);
    }

    #[test]
    fn test_encode_newer_version_fails() {
        let mut metadata = test_metadata(DBN_VERSION);
        metadata.version = DBN_VERSION + 1;
        let res = MetadataEncoder::new(Vec::new()).encode(&metadata);
        assert!(matches!(res, Err(Error::Encode(_))));
    }

    #[rstest]
    #[case::too_long(&"A".repeat(22), 1)]
    #[case::fits_v2(&"A".repeat(22), 2)]
    #[case::non_ascii("Ä", 3)]
    fn test_encode_symbol(#[case] symbol: &str, #[case] version: u8) {
        let mut metadata = test_metadata(version);
        metadata.symbols = vec![symbol.to_owned()];
        let res = MetadataEncoder::new(Vec::new()).encode(&metadata);
        if symbol.is_ascii() && symbol.len() < version_symbol_cstr_len(version) {
            assert!(res.is_ok());
        } else if symbol.is_ascii() {
            assert!(matches!(res, Err(Error::Encode(msg)) if msg.contains("too long")));
        } else {
            assert!(matches!(res, Err(Error::Conversion { .. })));
        }
    }

    #[test]
    fn test_encoder_round_trip() {
        let metadata = test_metadata(DBN_VERSION);
        let recs = [
            MboMsg {
                order_id: 1,
                ..Default::default()
            },
            MboMsg {
                order_id: 2,
                ..Default::default()
            },
        ];
        let mut encoder = Encoder::new(Vec::new(), &metadata).unwrap();
        encoder.encode_record(&recs[0]).unwrap();
        encoder.encode_record_ref(RecordRef::from(&recs[1])).unwrap();
        encoder.flush().unwrap();
        let buffer = encoder.into_inner();
        let decoder = Decoder::new(buffer.as_slice()).unwrap();
        assert_eq!(*decoder.metadata(), metadata);
        assert_eq!(decoder.decode_records::<MboMsg>().unwrap(), recs);
    }

    #[test]
    fn test_encode_decoded_upgrades() {
        let metadata = test_metadata(1);
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, &metadata).unwrap();
            encoder
                .encode_record(&crate::v1::SymbolMappingMsg::default())
                .unwrap();
        }
        let decoder =
            Decoder::with_upgrade_policy(buffer.as_slice(), VersionUpgradePolicy::UpgradeToV3)
                .unwrap();
        let upgraded_metadata = decoder.metadata().clone();
        let mut output = Vec::new();
        {
            let mut encoder = Encoder::new(&mut output, &upgraded_metadata).unwrap();
            encoder.encode_decoded(decoder).unwrap();
        }
        let decoder = Decoder::new(output.as_slice()).unwrap();
        assert_eq!(decoder.metadata().version, 3);
        let recs = decoder.decode_records::<crate::SymbolMappingMsg>().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].record_size(), mem::size_of::<crate::SymbolMappingMsg>());
    }

    #[test]
    fn test_with_zstd() {
        let metadata = test_metadata(DBN_VERSION);
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::with_zstd(&mut buffer, &metadata).unwrap();
            encoder.encode_records(&[TradeMsg::default()]).unwrap();
        }
        assert!(crate::decode::zstd::starts_with_prefix(&buffer));
        let decoder = Decoder::with_zstd(buffer.as_slice()).unwrap();
        assert_eq!(*decoder.metadata(), metadata);
        assert_eq!(decoder.decode_records::<TradeMsg>().unwrap().len(), 1);
    }
}
