//! The record decoder's read buffer.

const WORD: usize = std::mem::size_of::<u64>();

/// A growable byte window over `u64` storage, so that after [`align`](Self::align)
/// the unread bytes start on an 8-byte boundary and records can be viewed in place.
///
/// Unread bytes are `start..end`; bytes after `end` are free for the reader to fill.
#[derive(Debug, Clone)]
pub(crate) struct AlignedBuffer {
    words: Box<[u64]>,
    start: usize,
    end: usize,
}

impl AlignedBuffer {
    /// Allocates a buffer that holds at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: alloc_words(capacity),
            start: 0,
            end: 0,
        }
    }

    /// Returns the unread bytes.
    pub fn data(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words[..])[self.start..self.end]
    }

    /// Returns the free bytes after the unread ones. Pair with [`fill`](Self::fill).
    pub fn space(&mut self) -> &mut [u8] {
        let end = self.end;
        &mut bytemuck::cast_slice_mut(&mut self.words[..])[end..]
    }

    pub fn available_data(&self) -> usize {
        self.end - self.start
    }

    fn capacity(&self) -> usize {
        self.words.len() * WORD
    }

    /// Marks up to `count` bytes of [`space`](Self::space) as unread data.
    pub fn fill(&mut self, count: usize) {
        self.end = (self.end + count).min(self.capacity());
    }

    /// Drops up to `count` unread bytes from the front. Compacts once more than half
    /// of the buffer is behind the read position.
    pub fn consume(&mut self, count: usize) {
        self.start = (self.start + count).min(self.end);
        if self.start > self.capacity() / 2 {
            self.compact();
        }
    }

    /// Makes room for `len` unread bytes, compacting first and then reallocating
    /// if that isn't enough.
    pub fn reserve(&mut self, len: usize) {
        if self.capacity() - self.start >= len {
            return;
        }
        self.compact();
        if self.capacity() < len {
            let mut words = alloc_words(len);
            words[..self.words.len()].copy_from_slice(&self.words);
            self.words = words;
        }
    }

    /// Moves the unread bytes to the front if they aren't 8-byte aligned.
    pub fn align(&mut self) {
        if self.start % WORD != 0 {
            self.compact();
        }
    }

    /// Discards everything.
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        let (start, end) = (self.start, self.end);
        bytemuck::cast_slice_mut::<u64, u8>(&mut self.words[..]).copy_within(start..end, 0);
        self.start = 0;
        self.end = end - start;
    }
}

fn alloc_words(bytes: usize) -> Box<[u64]> {
    vec![0; bytes.div_ceil(WORD)].into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, bytes: &[u8]) -> AlignedBuffer {
        let mut buf = AlignedBuffer::with_capacity(capacity);
        buf.space()[..bytes.len()].copy_from_slice(bytes);
        buf.fill(bytes.len());
        buf
    }

    fn is_aligned(buf: &AlignedBuffer) -> bool {
        buf.data().as_ptr() as usize % WORD == 0
    }

    #[test]
    fn test_capacity_rounds_up_to_words() {
        let mut buf = AlignedBuffer::with_capacity(100);
        assert!(is_aligned(&buf));
        assert_eq!(buf.space().len(), 104);
    }

    #[test]
    fn test_fill_and_consume() {
        let mut buf = filled(16, b"abcd");
        assert_eq!(buf.data(), b"abcd");
        buf.consume(2);
        assert_eq!(buf.data(), b"cd");
        assert_eq!(buf.space().len(), 12);
        buf.consume(10);
        assert_eq!(buf.available_data(), 0);
    }

    #[test]
    fn test_consume_past_half_compacts() {
        let mut buf = filled(16, b"0123456789ab");
        buf.consume(10);
        assert_eq!(buf.data(), b"ab");
        assert_eq!(buf.space().len(), 14);
    }

    #[test]
    fn test_reserve_keeps_unread_bytes() {
        let mut buf = filled(16, b"01234567");
        buf.consume(4);
        buf.reserve(16);
        assert_eq!(buf.data(), b"4567");
        assert!(buf.available_data() + buf.space().len() >= 16);
        buf.reserve(64);
        assert_eq!(buf.data(), b"4567");
        assert!(buf.space().len() >= 60);
        assert!(is_aligned(&buf));
    }

    #[test]
    fn test_align_after_odd_consume() {
        let mut buf = filled(32, &[1, 2, 3, 4, 5, 6, 7, 8]);
        buf.consume(3);
        assert!(!is_aligned(&buf));
        buf.align();
        assert!(is_aligned(&buf));
        assert_eq!(buf.data(), &[4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_reset() {
        let mut buf = filled(16, b"data");
        buf.reset();
        assert_eq!(buf.available_data(), 0);
        assert_eq!(buf.space().len(), 16);
    }
}
