//! Encoding DBN and Zstd-compressed DBN files and streams. Encoders implement the
//! [`EncodeDbn`] trait.
pub mod dbn;
mod dyn_writer;

use std::io;

// Re-exports
pub use self::{
    dbn::{Encoder, MetadataEncoder, RecordEncoder},
    dyn_writer::DynWriter,
};

use crate::{
    decode::{DbnMetadata, DecodeRecordRef},
    Error, HasRType, RecordRef, Result,
};

/// Trait for types that encode a DBN record of a specific type.
pub trait EncodeRecord {
    /// Encodes a single DBN record of type `R`.
    ///
    /// # Errors
    /// This function returns an error if it's unable to write to the underlying writer.
    fn encode_record<R: HasRType>(&mut self, record: &R) -> Result<()>;

    /// Encodes a slice of DBN records.
    ///
    /// # Errors
    /// This function returns an error if it's unable to write to the underlying writer.
    fn encode_records<R: HasRType>(&mut self, records: &[R]) -> Result<()> {
        for record in records {
            self.encode_record(record)?;
        }
        Ok(())
    }

    /// Flushes any buffered content to the true output.
    ///
    /// # Errors
    /// This function returns an error if it's unable to flush the underlying writer.
    fn flush(&mut self) -> Result<()>;
}

/// Trait for types that encode DBN records with mixed schemas.
pub trait EncodeRecordRef {
    /// Encodes a single DBN [`RecordRef`], including any trailing `ts_out`.
    ///
    /// # Errors
    /// This function returns an error if it's unable to write to the underlying writer.
    fn encode_record_ref(&mut self, record: RecordRef) -> Result<()>;
}

/// Trait for types that encode DBN records.
pub trait EncodeDbn: EncodeRecord + EncodeRecordRef {
    /// Encodes DBN records directly from a DBN decoder.
    ///
    /// # Errors
    /// This function returns an error if it's unable to write to the underlying writer
    /// or the decoder returns an error.
    fn encode_decoded<D: DecodeRecordRef + DbnMetadata>(&mut self, mut decoder: D) -> Result<()> {
        while let Some(record) = decoder.decode_record_ref()? {
            self.encode_record_ref(record)?;
        }
        self.flush()
    }
}

/// The default Zstandard compression level used.
pub const ZSTD_COMPRESSION_LEVEL: i32 = 0;

fn zstd_encoder<'a, W: io::Write>(writer: W) -> Result<zstd::stream::AutoFinishEncoder<'a, W>> {
    let mut zstd_encoder = zstd::Encoder::new(writer, ZSTD_COMPRESSION_LEVEL)
        .map_err(|e| Error::io(e, "creating zstd encoder"))?;
    zstd_encoder
        .include_checksum(true)
        .map_err(|e| Error::io(e, "setting zstd checksum"))?;
    Ok(zstd_encoder.auto_finish())
}
