//! Decoding of DBN files and streams: metadata followed by records.
mod aligned_buffer;

use std::{
    fs::File,
    io::{self, BufReader},
    mem,
    num::NonZeroU64,
    path::Path,
};

use self::aligned_buffer::AlignedBuffer;
use super::{DbnMetadata, DecodeRecord, DecodeRecordRef, DecodeStream, DynReader, StreamIterDecoder};
use crate::{
    compat::{self, CompatBuffer, SYMBOL_CSTR_LEN_V1},
    Error, HasRType, MappingInterval, Metadata, RecordHeader, RecordRef, Result, SType, Schema,
    SymbolMapping, VersionUpgradePolicy, DBN_VERSION, METADATA_FIXED_LEN, NULL_END, NULL_SCHEMA,
    NULL_STYPE,
};

const DBN_PREFIX: &[u8] = b"DBN";
const DBN_PREFIX_LEN: usize = DBN_PREFIX.len();
const DEFAULT_BUF_SIZE: usize = 64 * 1024;

/// Returns `true` if `bytes` starts with uncompressed DBN: the magic string followed
/// by a version byte.
pub fn starts_with_prefix(bytes: &[u8]) -> bool {
    bytes.len() > DBN_PREFIX_LEN && bytes.starts_with(DBN_PREFIX)
}

fn check_version(version: u8) -> Result<()> {
    if version == 0 {
        Err(Error::decode("invalid DBN version 0"))
    } else if version > DBN_VERSION {
        Err(Error::decode(format!(
            "can't decode newer version of DBN. Decoder version is {DBN_VERSION}, input version is {version}"
        )))
    } else {
        Ok(())
    }
}

/// Type for decoding files and streams in Databento Binary Encoding (DBN), both
/// metadata and records.
pub struct Decoder<R> {
    metadata: Metadata,
    /// The symbol string length as decoded, before any upgrade.
    input_symbol_cstr_len: usize,
    decoder: RecordDecoder<R>,
}

impl<R> Decoder<R>
where
    R: io::Read,
{
    /// Creates a new DBN [`Decoder`] from `reader`. Records from previous DBN versions
    /// are upgraded according to the default [`VersionUpgradePolicy`].
    ///
    /// # Errors
    /// This function will return an error if it is unable to parse the metadata in
    /// `reader` or the input is encoded in a newer version of DBN.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_upgrade_policy(reader, VersionUpgradePolicy::default())
    }

    /// Creates a new DBN [`Decoder`] from `reader`. It will decode records from
    /// previous DBN versions according to `upgrade_policy`.
    ///
    /// # Errors
    /// This function will return an error if it is unable to parse the metadata in
    /// `reader` or the input is encoded in a newer version of DBN.
    pub fn with_upgrade_policy(
        mut reader: R,
        upgrade_policy: VersionUpgradePolicy,
    ) -> Result<Self> {
        let mut metadata = MetadataDecoder::new(&mut reader).decode()?;
        let decoder = RecordDecoder::with_version(
            reader,
            metadata.version,
            upgrade_policy,
            metadata.ts_out,
        )?;
        let input_symbol_cstr_len = metadata.symbol_cstr_len;
        metadata.upgrade(upgrade_policy);
        Ok(Self {
            metadata,
            input_symbol_cstr_len,
            decoder,
        })
    }

    /// Returns a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        self.decoder.get_ref()
    }

    /// Returns a mutable reference to the inner reader.
    pub fn get_mut(&mut self) -> &mut R {
        self.decoder.get_mut()
    }

    /// Consumes the decoder and returns the inner reader.
    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }

    /// Returns the active upgrade policy.
    pub fn upgrade_policy(&self) -> VersionUpgradePolicy {
        self.decoder.upgrade_policy
    }

    /// Sets the behavior for decoding DBN data of previous versions. The metadata's
    /// `version` and `symbol_cstr_len` are updated to match.
    pub fn set_upgrade_policy(&mut self, upgrade_policy: VersionUpgradePolicy) {
        self.metadata.version = self.decoder.version;
        self.metadata.symbol_cstr_len = self.input_symbol_cstr_len;
        self.metadata.upgrade(upgrade_policy);
        self.decoder.set_upgrade_policy(upgrade_policy);
    }

    /// Tries to decode a single record and returns a reference to the record that
    /// lasts until the next call. Returns `Ok(None)` if the input has been
    /// exhausted.
    ///
    /// # Errors
    /// This function returns an error if the underlying reader returns an error or
    /// the record is invalid.
    pub fn decode_ref(&mut self) -> Result<Option<RecordRef<'_>>> {
        self.decoder.decode_ref()
    }
}

impl<R> Decoder<DynReader<R>>
where
    R: io::Read,
{
    /// Creates a new DBN [`Decoder`] from `reader`, inferring whether the input is
    /// Zstd-compressed.
    ///
    /// # Errors
    /// This function will return an error if the input is neither DBN nor
    /// Zstd-compressed DBN, is legacy DBZ, or it is unable to parse the metadata.
    pub fn inferred(reader: R) -> Result<Self> {
        Decoder::new(DynReader::inferred(reader)?)
    }
}

impl<R> Decoder<::zstd::stream::Decoder<'static, BufReader<R>>>
where
    R: io::Read,
{
    /// Creates a new DBN [`Decoder`] from Zstd-compressed `reader`.
    ///
    /// # Errors
    /// This function will return an error if it is unable to parse the metadata in
    /// `reader` or the input is encoded in a newer version of DBN.
    pub fn with_zstd(reader: R) -> Result<Self> {
        Decoder::new(
            ::zstd::stream::Decoder::new(reader)
                .map_err(|e| Error::io(e, "creating zstd decoder"))?,
        )
    }
}

impl<R> Decoder<::zstd::stream::Decoder<'static, R>>
where
    R: io::BufRead,
{
    /// Creates a new DBN [`Decoder`] from Zstd-compressed buffered `reader`.
    ///
    /// # Errors
    /// This function will return an error if it is unable to parse the metadata in
    /// `reader` or the input is encoded in a newer version of DBN.
    pub fn with_zstd_buffer(reader: R) -> Result<Self> {
        Decoder::new(
            ::zstd::stream::Decoder::with_buffer(reader)
                .map_err(|e| Error::io(e, "creating zstd decoder"))?,
        )
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        Error::io(
            e,
            format!("opening DBN file at path '{}'", path.display()),
        )
    })
}

impl Decoder<BufReader<File>> {
    /// Creates a DBN [`Decoder`] from the uncompressed DBN file at `path`.
    ///
    /// # Errors
    /// This function will return an error if it is unable to read the file at `path`
    /// or if it is unable to parse the metadata in the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(BufReader::new(open_file(path.as_ref())?))
    }
}

impl Decoder<::zstd::stream::Decoder<'static, BufReader<File>>> {
    /// Creates a DBN [`Decoder`] from the Zstd-compressed DBN file at `path`.
    ///
    /// # Errors
    /// This function will return an error if it is unable to read the file at `path`
    /// or if it is unable to parse the metadata in the file.
    pub fn from_zstd_file(path: impl AsRef<Path>) -> Result<Self> {
        Decoder::with_zstd(open_file(path.as_ref())?)
    }
}

impl<R> DecodeRecordRef for Decoder<R>
where
    R: io::Read,
{
    fn decode_record_ref(&mut self) -> Result<Option<RecordRef<'_>>> {
        self.decoder.decode_ref()
    }
}

impl<R> DbnMetadata for Decoder<R>
where
    R: io::Read,
{
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl<R> DecodeRecord for Decoder<R>
where
    R: io::Read,
{
    fn decode_record<T: HasRType>(&mut self) -> Result<Option<&T>> {
        self.decoder.decode()
    }
}

impl<R> DecodeStream for Decoder<R>
where
    R: io::Read,
{
    fn decode_stream<T: HasRType>(self) -> StreamIterDecoder<Self, T> {
        StreamIterDecoder::new(self)
    }
}

/// A DBN decoder of records. Doesn't decode metadata.
pub struct RecordDecoder<R> {
    /// The DBN version of the input.
    version: u8,
    upgrade_policy: VersionUpgradePolicy,
    ts_out: bool,
    reader: R,
    buffer: AlignedBuffer,
    compat_buffer: CompatBuffer,
    /// Length of the record returned by the previous call to `decode_ref`. It's only
    /// consumed at the next call so the returned reference stays valid.
    last_len: usize,
}

impl<R> RecordDecoder<R>
where
    R: io::Read,
{
    /// Creates a new `RecordDecoder` that will decode from `reader`.
    ///
    /// Note: assumes the input is of the current DBN version. To decode records from a
    /// previous version, use [`RecordDecoder::with_version()`].
    pub fn new(reader: R) -> Self {
        Self {
            version: DBN_VERSION,
            // upgrade policy doesn't matter when decoding the current DBN version
            upgrade_policy: VersionUpgradePolicy::AsIs,
            ts_out: false,
            reader,
            buffer: AlignedBuffer::with_capacity(DEFAULT_BUF_SIZE),
            compat_buffer: CompatBuffer::new(),
            last_len: 0,
        }
    }

    /// Creates a new `RecordDecoder` that will decode from `reader` with the specified
    /// DBN version and update records according to `upgrade_policy`. `ts_out`
    /// indicates whether every record is followed by a send timestamp.
    ///
    /// # Errors
    /// This function will return an error if the `version` exceeds the highest
    /// supported version.
    pub fn with_version(
        reader: R,
        version: u8,
        upgrade_policy: VersionUpgradePolicy,
        ts_out: bool,
    ) -> Result<Self> {
        check_version(version)?;
        let mut res = Self::new(reader);
        res.version = version;
        res.upgrade_policy = upgrade_policy;
        res.ts_out = ts_out;
        Ok(res)
    }

    /// Sets the DBN version to expect when decoding.
    ///
    /// # Errors
    /// This function will return an error if the `version` exceeds the highest
    /// supported version.
    pub fn set_version(&mut self, version: u8) -> Result<()> {
        check_version(version)?;
        self.version = version;
        Ok(())
    }

    /// Sets the behavior for decoding DBN data of previous versions.
    pub fn set_upgrade_policy(&mut self, upgrade_policy: VersionUpgradePolicy) {
        self.upgrade_policy = upgrade_policy;
    }

    /// Sets whether to expect a send timestamp appended after every record.
    pub fn set_ts_out(&mut self, ts_out: bool) {
        self.ts_out = ts_out;
    }

    /// Returns a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the inner reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consumes the decoder and returns the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Tries to decode the next record of type `T`. Returns `Ok(None)` if
    /// the reader is exhausted.
    ///
    /// # Errors
    /// This function returns an error if the underlying reader returns an
    /// error or the next record is invalid.
    ///
    /// If the next record is of a different type than `T`, this function returns an
    /// [`Error::Conversion`].
    pub fn decode<T: HasRType>(&mut self) -> Result<Option<&T>> {
        match self.decode_ref()? {
            Some(rec) => rec.get::<T>().map(Some),
            None => Ok(None),
        }
    }

    /// Tries to decode a generic reference to a record. Returns `Ok(None)` if the
    /// reader is exhausted. A partial record at the end of the input is logged as a
    /// warning and treated as the end of the input.
    ///
    /// # Errors
    /// This function returns an error if the underlying reader returns an error.
    /// It will also return an error if it encounters an invalid record.
    pub fn decode_ref(&mut self) -> Result<Option<RecordRef<'_>>> {
        self.buffer.consume(mem::take(&mut self.last_len));
        self.buffer.align();
        if !self.fill_buffer(mem::size_of::<RecordHeader>())? {
            return Ok(self.end_of_stream());
        }
        let length = self.buffer.data()[0] as usize * RecordHeader::LENGTH_MULTIPLIER;
        if length < mem::size_of::<RecordHeader>() {
            return Err(Error::decode(format!(
                "invalid record with length {length} shorter than header"
            )));
        }
        if !self.fill_buffer(length)? {
            return Ok(self.end_of_stream());
        }
        self.last_len = length;
        compat::decode_record_ref(
            self.version,
            self.upgrade_policy,
            self.ts_out,
            &mut self.compat_buffer,
            &self.buffer.data()[..length],
        )
        .map(Some)
    }

    /// Reads until at least `len` bytes are buffered. Returns `false` if the input
    /// ended first.
    fn fill_buffer(&mut self, len: usize) -> Result<bool> {
        self.buffer.reserve(len);
        while self.buffer.available_data() < len {
            let read = loop {
                match self.reader.read(self.buffer.space()) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    res => break res.map_err(|e| Error::io(e, "decoding record"))?,
                }
            };
            if read == 0 {
                return Ok(false);
            }
            self.buffer.fill(read);
        }
        Ok(true)
    }

    fn end_of_stream<'a>(&mut self) -> Option<RecordRef<'a>> {
        let remaining = self.buffer.available_data();
        if remaining > 0 {
            log::warn!(
                "Unexpected partial record remaining in stream: {remaining} bytes will be ignored"
            );
            self.buffer.reset();
        }
        None
    }
}

impl<R> DecodeRecordRef for RecordDecoder<R>
where
    R: io::Read,
{
    fn decode_record_ref(&mut self) -> Result<Option<RecordRef<'_>>> {
        self.decode_ref()
    }
}

impl<R> DecodeRecord for RecordDecoder<R>
where
    R: io::Read,
{
    fn decode_record<T: HasRType>(&mut self) -> Result<Option<&T>> {
        self.decode()
    }
}

impl<R> DecodeStream for RecordDecoder<R>
where
    R: io::Read,
{
    fn decode_stream<T: HasRType>(self) -> StreamIterDecoder<Self, T> {
        StreamIterDecoder::new(self)
    }
}

/// Type for decoding [`Metadata`] from Databento Binary Encoding (DBN).
pub struct MetadataDecoder<R>
where
    R: io::Read,
{
    reader: R,
}

impl<R> MetadataDecoder<R>
where
    R: io::Read,
{
    /// Creates a new DBN [`MetadataDecoder`] from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Decodes and returns a DBN [`Metadata`]. Reads exactly the prelude and the
    /// declared length of the metadata from the reader.
    ///
    /// # Errors
    /// This function will return an error if it is unable to parse the metadata, the
    /// input doesn't begin with the DBN prefix, or the input is encoded in a newer
    /// version of DBN.
    pub fn decode(&mut self) -> Result<Metadata> {
        let mut prelude = [0u8; 8];
        self.reader
            .read_exact(&mut prelude)
            .map_err(|e| Error::io(e, "reading metadata prelude"))?;
        if !prelude.starts_with(DBN_PREFIX) {
            return Err(Error::decode("invalid DBN header"));
        }
        let version = prelude[DBN_PREFIX_LEN];
        check_version(version)?;
        let length = u32::from_le_bytes([prelude[4], prelude[5], prelude[6], prelude[7]]) as usize;
        if length < METADATA_FIXED_LEN {
            return Err(Error::decode(format!(
                "invalid DBN metadata. Metadata length {length} is shorter than the fixed length {METADATA_FIXED_LEN}"
            )));
        }
        let mut buffer = vec![0u8; length];
        self.reader
            .read_exact(&mut buffer)
            .map_err(|e| Error::io(e, "reading metadata"))?;
        decode_metadata_fields(version, &buffer)
    }

    /// Consumes the decoder and returns the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// A bounds-checked cursor over an encoded metadata buffer.
struct MetadataCursor<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> MetadataCursor<'a> {
    fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let bytes = self
            .pos
            .checked_add(len)
            .and_then(|end| self.buffer.get(self.pos..end))
            .ok_or_else(|| {
                Error::decode(format!(
                    "unexpected end of metadata buffer while reading {field}"
                ))
            })?;
        self.pos += len;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N]> {
        let mut res = [0; N];
        res.copy_from_slice(self.take(N, field)?);
        Ok(res)
    }

    fn u8(&mut self, field: &str) -> Result<u8> {
        self.array::<1>(field).map(|[b]| b)
    }

    fn u16(&mut self, field: &str) -> Result<u16> {
        self.array(field).map(u16::from_le_bytes)
    }

    fn u32(&mut self, field: &str) -> Result<u32> {
        self.array(field).map(u32::from_le_bytes)
    }

    fn u64(&mut self, field: &str) -> Result<u64> {
        self.array(field).map(u64::from_le_bytes)
    }

    /// Reads a fixed-width, null-terminated string.
    fn cstr(&mut self, len: usize, field: &str) -> Result<String> {
        let bytes = self.take(len, field)?;
        let nul = bytes
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::decode(format!("missing null terminator in {field}")))?;
        std::str::from_utf8(&bytes[..nul])
            .map(ToOwned::to_owned)
            .map_err(|e| Error::utf8(e, format!("reading {field}")))
    }

    /// Reads the count of a repeated section and checks the items it declares fit in
    /// the rest of the buffer.
    fn section_count(&mut self, item_len: usize, section: &str) -> Result<usize> {
        let count = self.u32(&format!("`{section}` count"))? as usize;
        match count.checked_mul(item_len) {
            Some(span) if span <= self.remaining() => Ok(count),
            _ => Err(Error::decode(format!(
                "metadata section `{section}` declares {count} entries of at least {item_len} bytes \
                but only {} bytes remain",
                self.remaining()
            ))),
        }
    }

    fn repeated_cstr(&mut self, symbol_cstr_len: usize, section: &str) -> Result<Vec<String>> {
        let count = self.section_count(symbol_cstr_len, section)?;
        (0..count)
            .map(|i| self.cstr(symbol_cstr_len, &format!("`{section}` symbol at index {i}")))
            .collect()
    }

    fn symbol_mappings(&mut self, symbol_cstr_len: usize) -> Result<Vec<SymbolMapping>> {
        const SECTION: &str = "mappings";
        // raw symbol and interval count
        let count = self.section_count(symbol_cstr_len + mem::size_of::<u32>(), SECTION)?;
        (0..count)
            .map(|i| self.symbol_mapping(symbol_cstr_len, i))
            .collect()
    }

    fn symbol_mapping(&mut self, symbol_cstr_len: usize, idx: usize) -> Result<SymbolMapping> {
        let raw_symbol = self.cstr(symbol_cstr_len, &format!("raw symbol of mapping at index {idx}"))?;
        let interval_len = 2 * mem::size_of::<u32>() + symbol_cstr_len;
        let interval_count =
            self.section_count(interval_len, &format!("mappings[{idx}].intervals"))?;
        let intervals = (0..interval_count)
            .map(|i| {
                let context = format!("mapping interval at index {i} within mapping at index {idx}");
                let start_date = decode_iso8601(self.u32(&context)?).map_err(|e| {
                    Error::decode(format!("{e} while parsing start date of {context}"))
                })?;
                let end_date = decode_iso8601(self.u32(&context)?).map_err(|e| {
                    Error::decode(format!("{e} while parsing end date of {context}"))
                })?;
                let symbol = self.cstr(symbol_cstr_len, &format!("symbol of {context}"))?;
                Ok(MappingInterval {
                    start_date,
                    end_date,
                    symbol,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SymbolMapping {
            raw_symbol,
            intervals,
        })
    }
}

/// Decodes the metadata fields following the prelude.
pub(crate) fn decode_metadata_fields(version: u8, buffer: &[u8]) -> Result<Metadata> {
    let mut cursor = MetadataCursor { buffer, pos: 0 };
    let dataset = cursor.cstr(crate::METADATA_DATASET_CSTR_LEN, "dataset")?;
    let raw_schema = cursor.u16("schema")?;
    let schema = if raw_schema == NULL_SCHEMA {
        None
    } else {
        Some(Schema::try_from(raw_schema).map_err(|_| Error::conversion::<Schema>(raw_schema))?)
    };
    let start = cursor.u64("start")?;
    let end = cursor.u64("end")?;
    let limit = NonZeroU64::new(cursor.u64("limit")?);
    if version == 1 {
        // deprecated record_count
        cursor.take(mem::size_of::<u64>(), "record_count")?;
    }
    let stype_in = decode_stype(cursor.u8("stype_in")?)?;
    let stype_out = decode_stype(cursor.u8("stype_out")?)?;
    let ts_out = cursor.u8("ts_out")? != 0;
    let symbol_cstr_len = if version == 1 {
        SYMBOL_CSTR_LEN_V1
    } else {
        match cursor.u16("symbol_cstr_len")? {
            0 => return Err(Error::decode("invalid DBN metadata with symbol_cstr_len 0")),
            len => len as usize,
        }
    };
    cursor.take(
        if version == 1 {
            compat::METADATA_RESERVED_LEN_V1
        } else {
            crate::METADATA_RESERVED_LEN
        },
        "reserved",
    )?;
    let schema_definition_length = cursor.u32("schema_definition_length")?;
    if schema_definition_length != 0 {
        return Err(Error::decode(format!(
            "unsupported schema definition of {schema_definition_length} bytes; only a length of 0 is supported"
        )));
    }
    let symbols = cursor.repeated_cstr(symbol_cstr_len, "symbols")?;
    let partial = cursor.repeated_cstr(symbol_cstr_len, "partial")?;
    let not_found = cursor.repeated_cstr(symbol_cstr_len, "not_found")?;
    let mappings = cursor.symbol_mappings(symbol_cstr_len)?;

    Ok(Metadata {
        version,
        dataset,
        schema,
        start,
        end: if end == NULL_END {
            None
        } else {
            NonZeroU64::new(end)
        },
        limit,
        stype_in,
        stype_out,
        ts_out,
        symbol_cstr_len,
        symbols,
        partial,
        not_found,
        mappings,
    })
}

fn decode_stype(raw: u8) -> Result<Option<SType>> {
    if raw == NULL_STYPE {
        Ok(None)
    } else {
        SType::try_from(raw)
            .map(Some)
            .map_err(|_| Error::conversion::<SType>(raw))
    }
}

/// Parses a date encoded as an integer of the form `YYYYMMDD`.
pub(crate) fn decode_iso8601(raw: u32) -> std::result::Result<time::Date, String> {
    let year = raw / 10_000;
    let remaining = raw % 10_000;
    let raw_month = remaining / 100;
    let month = u8::try_from(raw_month)
        .map_err(|e| format!("{e:?} while parsing {raw} into date"))
        .and_then(|m| {
            time::Month::try_from(m).map_err(|e| format!("{e:?} while parsing {raw} into date"))
        })?;
    let day = remaining % 100;
    time::Date::from_calendar_date(year as i32, month, day as u8)
        .map_err(|e| format!("couldn't convert {raw} to a valid date: {e:?}"))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use rstest::rstest;
    use streaming_iterator::StreamingIterator;
    use time::macros::date;

    use super::*;
    use crate::{
        compat::ErrorMsgV1,
        encode::{dbn::MetadataEncoder, EncodeRecord, RecordEncoder},
        rtype,
        test_utils::{capture_logs, test_metadata},
        BboMsg, ErrorCode, ErrorMsg, ImbalanceMsg, InstrumentDefMsg, MboMsg, Mbp10Msg, Mbp1Msg,
        OhlcvMsg, Record, StatMsg, StatusMsg, SymbolMappingMsg, SystemMsg, TradeMsg, WithTsOut,
    };

    fn encode_metadata(metadata: &Metadata) -> Vec<u8> {
        let mut buffer = Vec::new();
        MetadataEncoder::new(&mut buffer).encode(metadata).unwrap();
        buffer
    }

    fn encode_stream<R: HasRType>(metadata: &Metadata, records: &[R]) -> Vec<u8> {
        let mut buffer = encode_metadata(metadata);
        let mut encoder = RecordEncoder::new(&mut buffer);
        encoder.encode_records(records).unwrap();
        buffer
    }

    #[rstest]
    #[case::valid(20220131, Ok(date!(2022 - 01 - 31)))]
    #[case::leap_day(20240229, Ok(date!(2024 - 02 - 29)))]
    #[case::bad_month(20221331, Err(()))]
    #[case::bad_day(20230229, Err(()))]
    #[case::zero(0, Err(()))]
    fn test_decode_iso8601(#[case] raw: u32, #[case] exp: std::result::Result<time::Date, ()>) {
        assert_eq!(decode_iso8601(raw).map_err(|_| ()), exp);
    }

    #[rstest]
    fn test_metadata_identity(#[values(1, 2, 3)] version: u8) {
        let metadata = test_metadata(version);
        let encoded = encode_metadata(&metadata);
        let decoded = MetadataDecoder::new(encoded.as_slice()).decode().unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn test_metadata_decoder_reads_exactly_metadata() {
        let mut encoded = encode_metadata(&test_metadata(2));
        encoded.extend_from_slice(b"records");
        let mut decoder = MetadataDecoder::new(encoded.as_slice());
        decoder.decode().unwrap();
        let mut rest = Vec::new();
        decoder.into_inner().read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"records");
    }

    #[test]
    fn test_invalid_prefix() {
        let mut encoded = encode_metadata(&test_metadata(3));
        encoded[..3].copy_from_slice(b"DBZ");
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(matches!(res, Err(Error::Decode(msg)) if msg == "invalid DBN header"));
    }

    #[rstest]
    #[case::newer(DBN_VERSION + 1, "newer version")]
    #[case::zero(0, "version 0")]
    fn test_unsupported_version(#[case] version: u8, #[case] exp_msg: &str) {
        let mut encoded = encode_metadata(&test_metadata(3));
        encoded[3] = version;
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.contains(exp_msg)));
        let res = RecordDecoder::with_version(io::empty(), version, VersionUpgradePolicy::AsIs, false);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    fn test_metadata_length_shorter_than_fixed() {
        let mut encoded = encode_metadata(&test_metadata(3));
        encoded[4..8].copy_from_slice(&99u32.to_le_bytes());
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.contains("fixed length")));
    }

    #[test]
    fn test_truncated_metadata_is_io_error() {
        let encoded = encode_metadata(&test_metadata(3));
        let res = MetadataDecoder::new(&encoded[..encoded.len() - 8]).decode();
        assert!(matches!(res, Err(Error::Io { .. })));
    }

    #[rstest]
    fn test_nonzero_schema_definition_length(#[values(1, 2, 3)] version: u8) {
        let mut encoded = encode_metadata(&test_metadata(version));
        // prelude and fixed-length fields
        let offset = 8 + METADATA_FIXED_LEN;
        encoded[offset..offset + 4].copy_from_slice(&8u32.to_le_bytes());
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.contains("schema definition")));
    }

    #[rstest]
    fn test_symbol_missing_null_terminator(#[values(1, 3)] version: u8) {
        let metadata = test_metadata(version);
        let mut encoded = encode_metadata(&metadata);
        // prelude, fixed-length fields, schema_definition_length, and symbols count
        let offset = 8 + METADATA_FIXED_LEN + 8;
        encoded[offset..offset + metadata.symbol_cstr_len].fill(b'A');
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(
            matches!(res, Err(Error::Decode(msg)) if msg.contains("missing null terminator in `symbols`"))
        );
    }

    #[test]
    fn test_invalid_utf8_symbol() {
        let metadata = test_metadata(2);
        let mut encoded = encode_metadata(&metadata);
        let offset = 8 + METADATA_FIXED_LEN + 8;
        encoded[offset] = 0xFF;
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(matches!(res, Err(Error::Utf8 { .. })));
    }

    #[test]
    fn test_null_schema_and_stypes() {
        let mut metadata = test_metadata(3);
        metadata.schema = None;
        metadata.stype_in = None;
        metadata.stype_out = None;
        let encoded = encode_metadata(&metadata);
        let decoded = MetadataDecoder::new(encoded.as_slice()).decode().unwrap();
        assert_eq!(decoded.schema, None);
        assert_eq!(decoded.stype_in, None);
        assert_eq!(decoded.stype_out, None);
    }

    #[test]
    fn test_invalid_schema() {
        let mut encoded = encode_metadata(&test_metadata(3));
        let offset = 8 + crate::METADATA_DATASET_CSTR_LEN;
        encoded[offset..offset + 2].copy_from_slice(&400u16.to_le_bytes());
        let res = MetadataDecoder::new(encoded.as_slice()).decode();
        assert!(matches!(res, Err(Error::Conversion { .. })));
    }

    #[rstest]
    #[case::mbo(MboMsg::default())]
    #[case::trade(TradeMsg::default())]
    #[case::mbp1(Mbp1Msg::default())]
    #[case::mbp10(Mbp10Msg::default())]
    #[case::bbo(BboMsg::default_for_schema(Schema::Bbo1S))]
    #[case::ohlcv(OhlcvMsg::default_for_schema(Schema::Ohlcv1D))]
    #[case::status(StatusMsg::default())]
    #[case::definition(InstrumentDefMsg::default())]
    #[case::imbalance(ImbalanceMsg::default())]
    #[case::stat(StatMsg::default())]
    #[case::error(ErrorMsg::default())]
    #[case::symbol_mapping(SymbolMappingMsg::default())]
    #[case::system(SystemMsg::default())]
    fn test_length_invariant<R: HasRType + PartialEq + std::fmt::Debug>(
        #[case] rec: R,
        #[values(false, true)] ts_out: bool,
    ) {
        let mut metadata = test_metadata(DBN_VERSION);
        metadata.ts_out = ts_out;
        let records = [rec, rec];
        let buffer = if ts_out {
            let records = records.map(|rec| WithTsOut::new(rec, 1_000));
            encode_stream(&metadata, &records)
        } else {
            encode_stream(&metadata, &records)
        };
        let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
        let exp_size = mem::size_of::<R>() + if ts_out { mem::size_of::<u64>() } else { 0 };
        let mut count = 0;
        while let Some(rec_ref) = decoder.decode_record_ref().unwrap() {
            assert_eq!(rec_ref.header().record_size(), exp_size);
            assert_eq!(rec_ref.record_size(), exp_size);
            assert_eq!(rec_ref.as_ref().len(), exp_size);
            assert_eq!(*rec_ref.get::<R>().unwrap(), rec);
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_decode_records_and_wrong_type() {
        let metadata = test_metadata(DBN_VERSION);
        let trades = vec![
            TradeMsg {
                price: 1,
                ..Default::default()
            },
            TradeMsg {
                price: 2,
                ..Default::default()
            },
        ];
        let buffer = encode_stream(&metadata, &trades);
        let decoder = Decoder::new(buffer.as_slice()).unwrap();
        assert_eq!(decoder.decode_records::<TradeMsg>().unwrap(), trades);
        let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
        assert!(matches!(
            decoder.decode_record::<MboMsg>(),
            Err(Error::Conversion { .. })
        ));
    }

    #[test]
    fn test_decode_stream() {
        let metadata = test_metadata(DBN_VERSION);
        let trades: Vec<_> = (0..3)
            .map(|i| TradeMsg {
                sequence: i,
                ..Default::default()
            })
            .collect();
        let buffer = encode_stream(&metadata, &trades);
        let mut stream = Decoder::new(buffer.as_slice())
            .unwrap()
            .decode_stream::<TradeMsg>();
        let mut sequences = Vec::new();
        while let Some(trade) = stream.next() {
            sequences.push(trade.sequence);
        }
        assert_eq!(sequences, [0, 1, 2]);
        assert_eq!(stream.count_decoded(), 3);
        assert!(stream.last_err().is_none());
    }

    #[test]
    fn test_decode_stream_error() {
        let metadata = test_metadata(DBN_VERSION);
        let buffer = encode_stream(&metadata, &[MboMsg::default()]);
        let mut stream = Decoder::new(buffer.as_slice())
            .unwrap()
            .decode_stream::<TradeMsg>();
        assert!(stream.next().is_none());
        assert!(matches!(stream.last_err(), Some(Error::Conversion { .. })));
    }

    #[test]
    fn test_record_shorter_than_header() {
        let mut buffer = encode_metadata(&test_metadata(DBN_VERSION));
        buffer.extend_from_slice(&[1, rtype::MBP_0, 0, 0]);
        buffer.extend_from_slice(&[0; 12]);
        let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
        let res = decoder.decode_record_ref();
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.contains("shorter than header")));
    }

    #[rstest]
    #[case::mid_header(4)]
    #[case::mid_body(20)]
    #[case::one_byte_short(47)]
    fn test_partial_tail_warns_once(#[case] tail_len: usize) {
        let metadata = test_metadata(DBN_VERSION);
        let mut buffer = encode_stream(&metadata, &[TradeMsg::default()]);
        buffer.extend_from_slice(&TradeMsg::default().as_ref()[..tail_len]);
        let (res, logs) = capture_logs(|| {
            let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
            let mut count = 0;
            while decoder.decode_record::<TradeMsg>().unwrap().is_some() {
                count += 1;
            }
            // stays at the end of the stream
            assert!(decoder.decode_record_ref().unwrap().is_none());
            count
        });
        assert_eq!(res, 1);
        let warnings: Vec<_> = logs
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].1.contains(&format!("{tail_len} bytes")));
    }

    #[test]
    fn test_clean_end_logs_no_warning() {
        let buffer = encode_stream(&test_metadata(DBN_VERSION), &[TradeMsg::default()]);
        let (_, logs) = capture_logs(|| {
            let decoder = Decoder::new(buffer.as_slice()).unwrap();
            decoder.decode_records::<TradeMsg>().unwrap()
        });
        assert!(logs.iter().all(|(level, _)| *level != log::Level::Warn));
    }

    #[test]
    fn test_upgrade_v1_error() {
        let metadata = test_metadata(1);
        let mut old = ErrorMsgV1::default();
        old.hd.ts_event = 5;
        old.err[..4].copy_from_slice(&[b'b' as _, b'o' as _, b'o' as _, b'm' as _]);
        let buffer = encode_stream(&metadata, &[old]);

        let mut decoder =
            Decoder::with_upgrade_policy(buffer.as_slice(), VersionUpgradePolicy::UpgradeToV2)
                .unwrap();
        assert_eq!(decoder.metadata().version, 2);
        assert_eq!(decoder.metadata().symbol_cstr_len, crate::v2::SYMBOL_CSTR_LEN);
        let rec = decoder.decode_record::<ErrorMsg>().unwrap().unwrap();
        assert_eq!(rec.err().unwrap(), "boom");
        assert_eq!(rec.code().unwrap(), ErrorCode::Unset);
        assert_eq!(rec.hd.ts_event, 5);
        assert_eq!(rec.record_size(), mem::size_of::<ErrorMsg>());
    }

    #[test]
    fn test_as_is_keeps_v1_layout() {
        let metadata = test_metadata(1);
        let buffer = encode_stream(&metadata, &[ErrorMsgV1::default()]);
        let mut decoder =
            Decoder::with_upgrade_policy(buffer.as_slice(), VersionUpgradePolicy::AsIs).unwrap();
        assert_eq!(decoder.metadata().version, 1);
        let rec = decoder.decode_record::<ErrorMsgV1>().unwrap().unwrap();
        assert_eq!(rec.record_size(), mem::size_of::<ErrorMsgV1>());
    }

    #[test]
    fn test_set_upgrade_policy_updates_metadata() {
        let buffer = encode_stream(&test_metadata(1), &[ErrorMsgV1::default()]);
        let mut decoder = Decoder::new(buffer.as_slice()).unwrap();
        assert_eq!(decoder.upgrade_policy(), VersionUpgradePolicy::UpgradeToV3);
        assert_eq!(decoder.metadata().version, 3);
        decoder.set_upgrade_policy(VersionUpgradePolicy::AsIs);
        assert_eq!(decoder.metadata().version, 1);
        assert_eq!(decoder.metadata().symbol_cstr_len, SYMBOL_CSTR_LEN_V1);
        decoder.set_upgrade_policy(VersionUpgradePolicy::UpgradeToV2);
        assert_eq!(decoder.metadata().version, 2);
        assert!(decoder.decode_record::<ErrorMsg>().unwrap().is_some());
    }

    #[test]
    fn test_record_decoder_across_small_reads() {
        struct OneByte<'a>(&'a [u8]);
        impl io::Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                let n = self.0.len().min(buf.len()).min(1);
                buf[..n].copy_from_slice(&self.0[..n]);
                self.0 = &self.0[n..];
                Ok(n)
            }
        }
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
        let mut buffer = Vec::new();
        RecordEncoder::new(&mut buffer).encode_records(&recs).unwrap();
        let decoder = RecordDecoder::new(OneByte(&buffer));
        assert_eq!(decoder.decode_records::<MboMsg>().unwrap(), recs);
    }

    #[test]
    fn test_record_decoder_grows_for_large_stream() {
        let recs: Vec<_> = (0..4_000)
            .map(|i| Mbp10Msg {
                sequence: i,
                ..Default::default()
            })
            .collect();
        let mut buffer = Vec::new();
        RecordEncoder::new(&mut buffer).encode_records(&recs).unwrap();
        let decoder = RecordDecoder::new(buffer.as_slice());
        assert_eq!(decoder.decode_records::<Mbp10Msg>().unwrap(), recs);
    }

    #[test]
    fn test_inferred_and_file_constructors() {
        use std::io::Write;

        let metadata = test_metadata(DBN_VERSION);
        let buffer = encode_stream(&metadata, &[TradeMsg::default()]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&buffer).unwrap();
        let decoder = Decoder::from_file(file.path()).unwrap();
        assert_eq!(*decoder.metadata(), metadata);
        assert_eq!(decoder.decode_records::<TradeMsg>().unwrap().len(), 1);

        let mut zst_file = tempfile::NamedTempFile::new().unwrap();
        ::zstd::stream::copy_encode(buffer.as_slice(), &mut zst_file, 0).unwrap();
        let decoder = Decoder::from_zstd_file(zst_file.path()).unwrap();
        assert_eq!(*decoder.metadata(), metadata);
        let decoder = Decoder::inferred(std::fs::File::open(zst_file.path()).unwrap()).unwrap();
        assert_eq!(decoder.decode_records::<TradeMsg>().unwrap().len(), 1);

        assert!(matches!(
            Decoder::from_file(file.path().with_extension("missing")),
            Err(Error::Io { .. })
        ));
    }
}
