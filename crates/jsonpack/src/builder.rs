//! The emitter half of the transcoder.
//!
//! [`Builder`] owns the output buffer and knows the layout rules of the
//! binary form: it exposes typed append operations for scalars, a
//! [`StringWriter`] session for incremental string payloads, and
//! open/report/close for containers. Container headers cannot be sized when
//! the container is opened, so `open_*` writes a one-byte placeholder and
//! [`close`](Builder::close) later picks the narrowest sub-kind, shifts the
//! payload to make room for the header, and appends the index table.

use alloc::vec::Vec;

use crate::buffer::OutputBuffer;
use crate::options::ParserOptions;
use crate::slice::Slice;
use crate::tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Array,
    Object,
}

#[derive(Debug)]
struct OpenContainer {
    /// Buffer offset of the (placeholder) tag byte.
    base: usize,
    kind: ContainerKind,
    /// Absolute start offsets of the direct children, in emission order.
    offsets: Vec<usize>,
}

/// Size-aware emitter for the binary form.
///
/// Values are appended front to back; the only rewrites of committed bytes
/// are the header patch-ups performed by [`close`](Builder::close) and by
/// string promotion, both of which go through the
/// [`OutputBuffer`] patch primitives.
///
/// # Examples
///
/// ```
/// use jsonpack::Builder;
///
/// let mut b = Builder::new();
/// let base = b.open_array();
/// b.report_child_offset(base);
/// b.add_uint(1);
/// b.report_child_offset(base);
/// b.add_uint(2);
/// b.close();
/// assert_eq!(b.as_bytes(), &[0x02, 0x03, 0x31, 0x32][..]);
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    buf: OutputBuffer,
    stack: Vec<OpenContainer>,
    options: ParserOptions,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            buf: OutputBuffer::new(),
            stack: Vec::new(),
            options,
        }
    }

    pub(crate) fn set_options(&mut self, options: ParserOptions) {
        self.options = options;
    }

    /// Discards all output and open containers.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.stack.clear();
    }

    /// `true` once every opened container has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.stack.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Read access to the first complete value in the buffer.
    #[must_use]
    pub fn slice(&self) -> Slice<'_> {
        Slice::new(self.as_bytes())
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_vec()
    }

    pub fn add_null(&mut self) {
        self.buf.push_byte(tag::NULL);
    }

    pub fn add_true(&mut self) {
        self.buf.push_byte(tag::TRUE);
    }

    pub fn add_false(&mut self) {
        self.buf.push_byte(tag::FALSE);
    }

    pub fn add_uint(&mut self, value: u64) {
        if value <= 9 {
            self.buf.push_byte(tag::SMALL_UINT + value as u8);
            return;
        }
        let width = byte_width(value);
        self.buf.push_byte(tag::UINT + (width as u8 - 1));
        self.buf.append_uint_le(value, width);
    }

    /// Appends the negative integer `-magnitude`.
    ///
    /// A magnitude of zero is appended as the unsigned zero.
    pub fn add_neg_int(&mut self, magnitude: u64) {
        if magnitude == 0 {
            self.buf.push_byte(tag::SMALL_UINT);
            return;
        }
        if magnitude <= 6 {
            self.buf.push_byte(tag::SMALL_NEG_BASE - magnitude as u8);
            return;
        }
        let width = byte_width(magnitude);
        self.buf.push_byte(tag::NEG_INT + (width as u8 - 1));
        self.buf.append_uint_le(magnitude, width);
    }

    pub fn add_double(&mut self, value: f64) {
        self.buf.push_byte(tag::DOUBLE);
        self.buf.append_uint_le(value.to_bits(), 8);
    }

    /// Appends a complete string value.
    pub fn add_string(&mut self, value: &str) {
        let mut writer = self.begin_string();
        writer.push_slice(value.as_bytes());
        writer.finish();
    }

    /// Starts a string value whose payload is produced incrementally.
    ///
    /// The returned session borrows the builder; call
    /// [`finish`](StringWriter::finish) to patch the header once the payload
    /// is complete. Dropping the session without finishing leaves the buffer
    /// in an unspecified state, as after a failed parse.
    pub fn begin_string(&mut self) -> StringWriter<'_> {
        let base = self.buf.pos();
        self.buf.push_byte(tag::SHORT_STRING);
        StringWriter {
            builder: self,
            base,
            large: false,
        }
    }

    /// Opens an array and returns its base offset.
    pub fn open_array(&mut self) -> usize {
        self.open(ContainerKind::Array)
    }

    /// Opens an object and returns its base offset.
    pub fn open_object(&mut self) -> usize {
        self.open(ContainerKind::Object)
    }

    fn open(&mut self, kind: ContainerKind) -> usize {
        let base = self.buf.pos();
        self.buf.push_byte(tag::PLACEHOLDER);
        self.stack.push(OpenContainer {
            base,
            kind,
            offsets: Vec::new(),
        });
        base
    }

    /// Records the current output position as the start of the next direct
    /// child of the innermost open container.
    ///
    /// # Panics
    ///
    /// Panics if no container is open or if `base` is not the innermost one.
    pub fn report_child_offset(&mut self, base: usize) {
        let pos = self.buf.pos();
        let Some(top) = self.stack.last_mut() else {
            panic!("report_child_offset called without an open container");
        };
        assert_eq!(
            top.base, base,
            "child reported against a container that is not innermost"
        );
        top.offsets.push(pos);
    }

    /// Closes the innermost open container, fixing its header.
    ///
    /// Picks the narrowest sub-kind that fits the final byte length, shifts
    /// the payload right to make room for the length/count fields, appends
    /// the index table where the layout carries one, and for sorted objects
    /// orders the table by byte-lexicographic key comparison. The payload
    /// bytes themselves keep emission order.
    ///
    /// # Panics
    ///
    /// Panics if no container is open.
    pub fn close(&mut self) {
        let Some(open) = self.stack.pop() else {
            panic!("close called without an open container");
        };
        let sorted = self.options.sort_attribute_names;
        if open.offsets.is_empty() {
            // Empty containers always land in the 1-byte class: the length
            // byte counts itself and nothing else.
            debug_assert_eq!(self.buf.pos(), open.base + 1);
            let tag = match open.kind {
                ContainerKind::Array => tag::ARRAY_PLAIN,
                ContainerKind::Object if sorted => tag::OBJECT_SORTED,
                ContainerKind::Object => tag::OBJECT_UNSORTED,
            };
            self.buf.set_byte(open.base, tag);
            self.buf.push_byte(0x01);
            return;
        }
        match open.kind {
            ContainerKind::Array => {
                if self.items_equally_sized(&open.offsets) {
                    self.close_plain_array(open.base);
                } else {
                    self.close_indexed(open.base, &open.offsets, tag::ARRAY_INDEXED, false);
                }
            }
            ContainerKind::Object => {
                let first = if sorted {
                    tag::OBJECT_SORTED
                } else {
                    tag::OBJECT_UNSORTED
                };
                self.close_indexed(open.base, &open.offsets, first, sorted);
            }
        }
    }

    fn items_equally_sized(&self, offsets: &[usize]) -> bool {
        let mut size = None;
        for pair in offsets.windows(2) {
            let s = pair[1] - pair[0];
            if *size.get_or_insert(s) != s {
                return false;
            }
        }
        let last = self.buf.pos() - offsets[offsets.len() - 1];
        size.map_or(true, |s| s == last)
    }

    /// Table-less array: `tag, length, items`. The item count is implied by
    /// the uniform item size.
    fn close_plain_array(&mut self, base: usize) {
        let payload = self.buf.pos() - (base + 1);
        let (class, width) = fit_class(|w| 1 + w + payload);
        self.buf.shift_right(base + 1, width);
        self.buf.set_byte(base, tag::ARRAY_PLAIN + class);
        self.buf.write_uint_le(base + 1, (width + payload) as u64, width);
    }

    /// Indexed container: `tag, length, count, payload, offset table`.
    /// Offsets are relative to the tag byte and point at items (arrays) or
    /// keys (objects).
    fn close_indexed(&mut self, base: usize, offsets: &[usize], first_tag: u8, sort: bool) {
        let payload = self.buf.pos() - (base + 1);
        let count = offsets.len();
        let (mut class, mut width) = fit_class(|w| 1 + 2 * w + payload + count * w);
        if sort && class == 1 {
            // The 2-byte sorted-object tag is the long-string tag; widen to
            // the 4-byte header to keep the output unambiguous.
            class = 2;
            width = 4;
        }
        let header = 2 * width;
        self.buf.shift_right(base + 1, header);
        let mut table: Vec<u64> = offsets
            .iter()
            .map(|&off| (off - base + header) as u64)
            .collect();
        if sort {
            sort_index_by_key(&self.buf, base, &mut table);
        }
        self.buf.reserve_space(count * width);
        for &entry in &table {
            self.buf.append_uint_le(entry, width);
        }
        let length = self.buf.pos() - (base + 1);
        self.buf.set_byte(base, first_tag + class);
        self.buf.write_uint_le(base + 1, length as u64, width);
        self.buf.write_uint_le(base + 1 + width, count as u64, width);
    }
}

/// Incremental string emission session.
///
/// The payload is laid down under a short-string header; once it exceeds
/// [`tag::SHORT_STRING_MAX`] bytes the already-written payload is shifted
/// right by eight bytes to make room for the long-string length field
/// (promotion is one-way). [`finish`](StringWriter::finish) patches the
/// header for whichever layout the payload ended up in.
#[derive(Debug)]
pub struct StringWriter<'a> {
    builder: &'a mut Builder,
    base: usize,
    large: bool,
}

impl StringWriter<'_> {
    /// Payload bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        let skip = if self.large { 9 } else { 1 };
        self.builder.buf.pos() - (self.base + skip)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.builder.buf.push_byte(byte);
        self.maybe_promote();
    }

    pub fn push_slice(&mut self, bytes: &[u8]) {
        self.builder.buf.extend_from_slice(bytes);
        self.maybe_promote();
    }

    /// Drops the last `count` payload bytes, for re-emitting a partially
    /// written sequence (surrogate-pair recombination).
    pub fn rewind(&mut self, count: usize) {
        debug_assert!(count <= self.len());
        self.builder.buf.truncate_by(count);
    }

    fn maybe_promote(&mut self) {
        if !self.large && self.builder.buf.pos() - (self.base + 1) > tag::SHORT_STRING_MAX {
            self.builder.buf.shift_right(self.base + 1, 8);
            self.large = true;
        }
    }

    /// Patches the string header and ends the session.
    pub fn finish(self) {
        let len = self.len();
        if self.large {
            self.builder.buf.set_byte(self.base, tag::LONG_STRING);
            self.builder.buf.write_u64_le(self.base + 1, len as u64);
        } else {
            self.builder
                .buf
                .set_byte(self.base, tag::SHORT_STRING + len as u8);
        }
    }
}

/// Bytes needed to store `value` little-endian, at least one.
fn byte_width(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    core::cmp::max(1, (bits + 7) / 8)
}

/// Narrowest width class whose total value size fits its limit:
/// < 256, < 64 Ki, < 4 Gi, else the 8-byte class.
fn fit_class(total_for_width: impl Fn(usize) -> usize) -> (u8, usize) {
    for class in 0..3u8 {
        let width = 1usize << class;
        if (total_for_width(width) as u64) < (1u64 << (8 * width as u32)) {
            return (class, width);
        }
    }
    (3, 8)
}

fn sort_index_by_key(buf: &OutputBuffer, base: usize, table: &mut [u64]) {
    let bytes = buf.as_bytes();
    table.sort_by(|&a, &b| {
        key_bytes(bytes, base + a as usize).cmp(key_bytes(bytes, base + b as usize))
    });
}

/// Payload of the string starting at `at`; object keys are always strings.
fn key_bytes(bytes: &[u8], at: usize) -> &[u8] {
    let tag = bytes[at];
    if (tag::SHORT_STRING..=tag::SHORT_STRING + tag::SHORT_STRING_MAX as u8).contains(&tag) {
        let len = (tag - tag::SHORT_STRING) as usize;
        &bytes[at + 1..at + 1 + len]
    } else if tag == tag::LONG_STRING {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[at + 1..at + 9]);
        let len = u64::from_le_bytes(raw) as usize;
        &bytes[at + 9..at + 9 + len]
    } else {
        debug_assert!(false, "object key is not a string");
        &[]
    }
}
