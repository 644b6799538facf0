use std::{
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::Path,
};

use super::{dbn, read_up_to, zstd};
use crate::{Compression, Error, Result};

/// The raw input of a Zstd decoder: bytes peeked while detecting the compression
/// followed by the rest of the source.
type Peeked<R> = io::Chain<Cursor<Vec<u8>>, R>;

/// Type for runtime polymorphism over whether decoding uncompressed or Zstd-compressed
/// DBN. Implements [`io::Read`] and always yields uncompressed DBN.
pub struct DynReader<R>
where
    R: io::Read,
{
    /// Uncompressed bytes already read from `inner` while verifying the input.
    peeked: Cursor<Vec<u8>>,
    inner: DynReaderImpl<R>,
}

enum DynReaderImpl<R>
where
    R: io::Read,
{
    Uncompressed(R),
    Zstd(::zstd::stream::Decoder<'static, BufReader<Peeked<R>>>),
}

impl<R> DynReader<R>
where
    R: io::Read,
{
    /// Creates a new [`DynReader`] from a reader, with the specified `compression`.
    ///
    /// # Errors
    /// This function will return an error if it fails to create the zstd decoder.
    pub fn with_compression(reader: R, compression: Compression) -> Result<Self> {
        let inner = match compression {
            Compression::None => DynReaderImpl::Uncompressed(reader),
            Compression::Zstd => DynReaderImpl::Zstd(Self::zstd_decoder(Vec::new(), reader)?),
        };
        Ok(Self {
            peeked: Cursor::default(),
            inner,
        })
    }

    /// Creates a new [`DynReader`] from a reader, inferring the compression from the
    /// first bytes of the input.
    ///
    /// # Errors
    /// This function will return an error if it is unable to read from `reader`, if
    /// the input is the legacy DBZ format, if Zstd-compressed input doesn't contain
    /// DBN, or if the input is neither DBN nor Zstd-compressed.
    pub fn inferred(mut reader: R) -> Result<Self> {
        let mut prefix = vec![0; 4];
        let read = read_up_to(&mut reader, &mut prefix)
            .map_err(|e| Error::io(e, "reading input to infer compression"))?;
        prefix.truncate(read);
        if dbn::starts_with_prefix(&prefix) {
            log::debug!("Detected uncompressed DBN input");
            return Ok(Self {
                peeked: Cursor::new(prefix),
                inner: DynReaderImpl::Uncompressed(reader),
            });
        }
        if zstd::starts_with_prefix(&prefix) {
            log::debug!("Detected Zstd-compressed input");
            let mut decoder = Self::zstd_decoder(prefix, reader)?;
            let mut decompressed = vec![0; 4];
            let read = read_up_to(&mut decoder, &mut decompressed)
                .map_err(|e| Error::io(e, "decompressing start of input"))?;
            decompressed.truncate(read);
            if !dbn::starts_with_prefix(&decompressed) {
                return Err(Error::decode(
                    "Zstd-compressed input doesn't start with a DBN prefix",
                ));
            }
            return Ok(Self {
                peeked: Cursor::new(decompressed),
                inner: DynReaderImpl::Zstd(decoder),
            });
        }
        if zstd::starts_with_skippable_frame(&prefix) {
            prefix.resize(zstd::DBZ_PREFIX_LEN, 0);
            let read = read_up_to(&mut reader, &mut prefix[4..])
                .map_err(|e| Error::io(e, "reading input to infer compression"))?;
            prefix.truncate(4 + read);
            if zstd::is_legacy_dbz(&prefix) {
                return Err(Error::decode(
                    "legacy DBZ format is no longer supported, convert it to DBN with the dbn CLI",
                ));
            }
        }
        Err(Error::decode(format!(
            "unrecognized input: expected DBN or Zstd-compressed DBN, found leading bytes {prefix:02X?}"
        )))
    }

    fn zstd_decoder(
        prefix: Vec<u8>,
        reader: R,
    ) -> Result<::zstd::stream::Decoder<'static, BufReader<Peeked<R>>>> {
        ::zstd::stream::Decoder::new(Cursor::new(prefix).chain(reader))
            .map_err(|e| Error::io(e, "creating zstd decoder"))
    }

    /// Returns `true` if the input is being decompressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self.inner, DynReaderImpl::Zstd(_))
    }
}

impl DynReader<BufReader<File>> {
    /// Creates a new [`DynReader`] from the file at `path`, inferring the
    /// compression.
    ///
    /// # Errors
    /// This function will return an error if the file doesn't exist, it is unable to
    /// read from it, or it doesn't contain DBN or Zstd-compressed DBN.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::io(
                e,
                format!("opening file to decode at path '{}'", path.as_ref().display()),
            )
        })?;
        DynReader::inferred(BufReader::new(file))
    }
}

impl<R> io::Read for DynReader<R>
where
    R: io::Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.peeked.read(buf)?;
        if read > 0 {
            return Ok(read);
        }
        match &mut self.inner {
            DynReaderImpl::Uncompressed(reader) => reader.read(buf),
            DynReaderImpl::Zstd(reader) => reader.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    const DBN: &[u8] = b"DBN\x02\x00\x00\x00\x00body";

    fn compress(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = ::zstd::stream::Encoder::new(Vec::new(), 0).unwrap();
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_inferred_uncompressed() {
        let mut reader = DynReader::inferred(DBN).unwrap();
        assert!(!reader.is_compressed());
        let mut res = Vec::new();
        reader.read_to_end(&mut res).unwrap();
        assert_eq!(res, DBN);
    }

    #[test]
    fn test_inferred_zstd() {
        let compressed = compress(DBN);
        let mut reader = DynReader::inferred(compressed.as_slice()).unwrap();
        assert!(reader.is_compressed());
        let mut res = Vec::new();
        reader.read_to_end(&mut res).unwrap();
        assert_eq!(res, DBN);
    }

    #[rstest]
    #[case::none(Compression::None, DBN.to_vec())]
    #[case::zstd(Compression::Zstd, compress(DBN))]
    fn test_with_compression(#[case] compression: Compression, #[case] input: Vec<u8>) {
        let mut reader = DynReader::with_compression(input.as_slice(), compression).unwrap();
        let mut res = Vec::new();
        reader.read_to_end(&mut res).unwrap();
        assert_eq!(res, DBN);
    }

    #[test]
    fn test_zstd_without_dbn() {
        let compressed = compress(b"not dbn at all");
        let res = DynReader::inferred(compressed.as_slice());
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.contains("DBN prefix")));
    }

    #[test]
    fn test_legacy_dbz_rejected() {
        let mut input = 0x184D2A50u32.to_le_bytes().to_vec();
        input.extend_from_slice(&16u32.to_le_bytes());
        input.extend_from_slice(b"DBZ\x01");
        input.extend_from_slice(&[0; 16]);
        let res = DynReader::inferred(input.as_slice());
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.contains("DBZ")));
    }

    #[rstest]
    #[case::text(b"hello world".as_slice())]
    #[case::empty(b"".as_slice())]
    #[case::short_prefix(b"DB".as_slice())]
    #[case::other_skippable(b"\x50\x2A\x4D\x18\x04\x00\x00\x00abcd".as_slice())]
    fn test_unrecognized(#[case] input: &[u8]) {
        let res = DynReader::inferred(input);
        assert!(matches!(res, Err(Error::Decode(msg)) if msg.starts_with("unrecognized input")));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&compress(DBN)).unwrap();
        let mut reader = DynReader::from_file(file.path()).unwrap();
        let mut res = Vec::new();
        reader.read_to_end(&mut res).unwrap();
        assert_eq!(res, DBN);
    }

    #[test]
    fn test_from_file_missing() {
        let res = DynReader::from_file("/does/not/exist.dbn");
        assert!(matches!(res, Err(Error::Io { .. })));
    }
}
