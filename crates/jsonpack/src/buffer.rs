//! Append-only byte buffer backing the [`Builder`](crate::Builder).
//!
//! The write position is the buffer length and normally only grows. Bytes
//! that have already been committed are mutated exclusively through the named
//! patch primitives ([`set_byte`], [`write_uint_le`], [`shift_right`],
//! [`truncate_by`]); header patch-up and string promotion are built on these
//! and nothing else rewrites history.
//!
//! [`set_byte`]: OutputBuffer::set_byte
//! [`write_uint_le`]: OutputBuffer::write_uint_le
//! [`shift_right`]: OutputBuffer::shift_right
//! [`truncate_by`]: OutputBuffer::truncate_by

use alloc::vec::Vec;

#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Current write position, one past the last committed byte.
    #[inline]
    #[must_use]
    pub fn pos(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Ensures capacity for `additional` more bytes without changing `pos`.
    #[inline]
    pub fn reserve_space(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    #[inline]
    pub fn push_byte(&mut self, byte: u8) {
        self.data.push(byte);
    }

    #[inline]
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Appends the low `width` bytes of `value`, little-endian.
    pub fn append_uint_le(&mut self, value: u64, width: usize) {
        debug_assert!(matches!(width, 1 | 2 | 4 | 8));
        self.data.extend_from_slice(&value.to_le_bytes()[..width]);
    }

    /// Rewrites one committed byte.
    #[inline]
    pub fn set_byte(&mut self, at: usize, byte: u8) {
        self.data[at] = byte;
    }

    /// Rewrites `width` committed bytes at `at` with `value`, little-endian.
    pub fn write_uint_le(&mut self, at: usize, value: u64, width: usize) {
        debug_assert!(matches!(width, 1 | 2 | 4 | 8));
        self.data[at..at + width].copy_from_slice(&value.to_le_bytes()[..width]);
    }

    /// Rewrites eight committed bytes at `at`, little-endian.
    pub fn write_u64_le(&mut self, at: usize, value: u64) {
        self.write_uint_le(at, value, 8);
    }

    /// Moves the committed bytes `[at, pos)` right by `gap`, advancing the
    /// write position by the same amount. The vacated bytes are zeroed and
    /// are expected to be overwritten by a header.
    pub fn shift_right(&mut self, at: usize, gap: usize) {
        let end = self.data.len();
        debug_assert!(at <= end);
        self.data.resize(end + gap, 0);
        self.data.copy_within(at..end, at + gap);
        self.data[at..at + gap].fill(0);
    }

    /// Drops the last `count` committed bytes, rewinding the write position.
    pub fn truncate_by(&mut self, count: usize) {
        debug_assert!(count <= self.data.len());
        self.data.truncate(self.data.len() - count);
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::OutputBuffer;

    #[test]
    fn shift_right_moves_committed_bytes() {
        let mut buf = OutputBuffer::new();
        buf.extend_from_slice(b"ab-payload");
        buf.shift_right(2, 8);
        assert_eq!(buf.pos(), 18);
        assert_eq!(&buf.as_bytes()[..2], b"ab");
        assert_eq!(&buf.as_bytes()[10..], b"-payload");
        assert_eq!(&buf.as_bytes()[2..10], &[0u8; 8]);
    }

    #[test]
    fn shift_right_at_end_only_grows() {
        let mut buf = OutputBuffer::new();
        buf.extend_from_slice(b"xy");
        buf.shift_right(2, 4);
        assert_eq!(buf.as_bytes(), &[b'x', b'y', 0, 0, 0, 0]);
    }

    #[test]
    fn write_uint_le_widths() {
        let mut buf = OutputBuffer::new();
        buf.extend_from_slice(&[0xff; 8]);
        buf.write_uint_le(0, 0x1122, 2);
        assert_eq!(&buf.as_bytes()[..2], &[0x22, 0x11]);
        buf.write_uint_le(2, 0xa1b2_c3d4, 4);
        assert_eq!(&buf.as_bytes()[2..6], &[0xd4, 0xc3, 0xb2, 0xa1]);
    }

    #[test]
    fn append_uint_le_takes_low_bytes() {
        let mut buf = OutputBuffer::new();
        buf.append_uint_le(0x0102_0304, 2);
        assert_eq!(buf.as_bytes(), &[0x04, 0x03]);
    }

    #[test]
    fn truncate_by_rewinds() {
        let mut buf = OutputBuffer::new();
        buf.extend_from_slice(b"abcdef");
        buf.truncate_by(3);
        assert_eq!(buf.as_bytes(), b"abc");
        buf.push_byte(b'!');
        assert_eq!(buf.as_bytes(), b"abc!");
    }
}
