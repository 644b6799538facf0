use std::io;

use crossbeam_channel::{bounded, Receiver, Sender};

/// The reading half of an in-memory byte stream fed from another thread, such as a
/// socket reader. Implements [`io::Read`] so it can be passed to any decoder.
///
/// Reads block until the writer sends more bytes. Once every [`ByteChannelWriter`] has
/// been dropped and all sent bytes have been read, reads return `Ok(0)`, ending the
/// stream.
#[derive(Debug)]
pub struct ByteChannel {
    receiver: Receiver<Vec<u8>>,
    chunk: Vec<u8>,
    pos: usize,
}

/// The writing half of a [`ByteChannel`]. Implements [`io::Write`].
#[derive(Debug, Clone)]
pub struct ByteChannelWriter {
    sender: Sender<Vec<u8>>,
}

impl ByteChannel {
    /// Creates a new channel that buffers at most `capacity` writes before blocking the
    /// writer.
    pub fn bounded(capacity: usize) -> (ByteChannelWriter, Self) {
        let (sender, receiver) = bounded(capacity);
        (
            ByteChannelWriter { sender },
            Self {
                receiver,
                chunk: Vec::new(),
                pos: 0,
            },
        )
    }
}

impl io::Read for ByteChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.chunk.len() {
            match self.receiver.recv() {
                Ok(chunk) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                // all writers dropped
                Err(_) => return Ok(0),
            }
        }
        let remaining = &self.chunk[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl io::Write for ByteChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.sender.send(buf.to_vec()).map_err(|_| {
            io::Error::new(io::ErrorKind::BrokenPipe, "byte channel reader was dropped")
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        thread,
    };

    use super::*;

    #[test]
    fn test_read_across_threads() {
        let (mut writer, mut reader) = ByteChannel::bounded(2);
        let producer = thread::spawn(move || {
            for chunk in [b"DB".as_slice(), b"N", b"\x03rest"] {
                writer.write_all(chunk).unwrap();
            }
        });
        let mut res = Vec::new();
        reader.read_to_end(&mut res).unwrap();
        producer.join().unwrap();
        assert_eq!(res, b"DBN\x03rest");
    }

    #[test]
    fn test_partial_reads() {
        let (mut writer, mut reader) = ByteChannel::bounded(4);
        writer.write_all(b"abcdef").unwrap();
        drop(writer);
        let mut buf = [0; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_after_reader_dropped() {
        let (mut writer, reader) = ByteChannel::bounded(1);
        drop(reader);
        let err = writer.write(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
