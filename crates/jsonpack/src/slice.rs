//! Read access to the binary form.
//!
//! A [`Slice`] is a borrowed view positioned on the tag byte of one value.
//! Every accessor sizes the value from that tag (plus the length field for
//! containers and long strings), so navigation needs no decoding pass and no
//! allocation. Accessors return `None` on a type mismatch.

use crate::tag::{self, ValueType};

#[derive(Debug, Clone, Copy)]
pub struct Slice<'a> {
    data: &'a [u8],
}

impl<'a> Slice<'a> {
    /// Views `data` as a value starting at its first byte.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn head(&self) -> u8 {
        self.data.first().copied().unwrap_or(tag::PLACEHOLDER)
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        tag::value_type(self.head())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.head() == tag::NULL
    }

    /// Total byte size of this value, header included.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        let head = self.head();
        match head {
            // containers: the length field counts everything after the tag
            0x02..=0x09 | 0x0b | 0x0d..=0x12 => {
                let width = container_width(head);
                1 + self.read_uint(1, width) as usize
            }
            tag::LONG_STRING => 9 + self.read_uint(1, 8) as usize,
            tag::DOUBLE => 9,
            0x20..=0x2f => {
                let width = ((head & 0x07) + 1) as usize;
                1 + width
            }
            0x40..=0xbf => 1 + (head - tag::SHORT_STRING) as usize,
            // null, booleans, small integers, placeholder
            _ => 1,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.head() {
            tag::TRUE => Some(true),
            tag::FALSE => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        if self.head() != tag::DOUBLE {
            return None;
        }
        Some(f64::from_bits(self.read_uint(1, 8)))
    }

    /// The value as an unsigned integer, for the uint and small-uint tags.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        let head = self.head();
        match head {
            0x28..=0x2f => Some(self.read_uint(1, ((head & 0x07) + 1) as usize)),
            0x30..=0x39 => Some(u64::from(head - tag::SMALL_UINT)),
            _ => None,
        }
    }

    /// Magnitude of a negative integer value.
    pub(crate) fn neg_magnitude(&self) -> Option<u64> {
        let head = self.head();
        match head {
            0x20..=0x27 => Some(self.read_uint(1, ((head & 0x07) + 1) as usize)),
            0x3a..=0x3f => Some(u64::from(tag::SMALL_NEG_BASE - head)),
            _ => None,
        }
    }

    /// The value as a signed integer, if it is an integer that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if let Some(value) = self.as_u64() {
            return i64::try_from(value).ok();
        }
        let magnitude = self.neg_magnitude()?;
        if magnitude <= i64::MAX as u64 + 1 {
            Some((magnitude as i64).wrapping_neg())
        } else {
            None
        }
    }

    /// Raw payload bytes of a string value.
    ///
    /// The payload is valid UTF-8 for every input the parser accepts, with
    /// one documented exception: isolated `\uD800..\uDFFF` escapes come
    /// through as surrogate triplets.
    #[must_use]
    pub fn string_bytes(&self) -> Option<&'a [u8]> {
        let head = self.head();
        match head {
            0x40..=0xbf => {
                let len = (head - tag::SHORT_STRING) as usize;
                self.data.get(1..1 + len)
            }
            tag::LONG_STRING => {
                let len = self.read_uint(1, 8) as usize;
                self.data.get(9..9 + len)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.string_bytes()?).ok()
    }

    /// Number of items (arrays) or entries (objects).
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        Some(self.container()?.count)
    }

    /// Item `index` of an array.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Slice<'a>> {
        if self.value_type() != ValueType::Array {
            return None;
        }
        let meta = self.container()?;
        if index >= meta.count {
            return None;
        }
        let offset = self.nth_offset(&meta, index)?;
        Some(Slice::new(self.data.get(offset..)?))
    }

    /// Key/value pair `index` of an object, in index-table order.
    #[must_use]
    pub fn entry_at(&self, index: usize) -> Option<(Slice<'a>, Slice<'a>)> {
        if self.value_type() != ValueType::Object {
            return None;
        }
        let meta = self.container()?;
        if index >= meta.count {
            return None;
        }
        let key_off = self.nth_offset(&meta, index)?;
        let key = Slice::new(self.data.get(key_off..)?);
        let value = Slice::new(self.data.get(key_off + key.byte_size()..)?);
        Some((key, value))
    }

    /// Looks up `key` in an object: binary search when the index table is
    /// sorted (tag range `0x0b..=0x0e`), linear scan otherwise.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Slice<'a>> {
        if self.value_type() != ValueType::Object {
            return None;
        }
        let meta = self.container()?;
        if matches!(self.head(), 0x0b | 0x0d | 0x0e) {
            let mut lo = 0usize;
            let mut hi = meta.count;
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                let (entry_key, value) = self.entry_at(mid)?;
                match entry_key.string_bytes()?.cmp(key.as_bytes()) {
                    core::cmp::Ordering::Less => lo = mid + 1,
                    core::cmp::Ordering::Greater => hi = mid,
                    core::cmp::Ordering::Equal => return Some(value),
                }
            }
            None
        } else {
            (0..meta.count).find_map(|i| {
                let (entry_key, value) = self.entry_at(i)?;
                (entry_key.string_bytes()? == key.as_bytes()).then_some(value)
            })
        }
    }

    fn container(&self) -> Option<ContainerMeta> {
        let head = self.head();
        match head {
            0x02..=0x05 => {
                // table-less array: uniform item size implies the count
                let width = 1usize << (head - tag::ARRAY_PLAIN);
                let length = self.read_uint(1, width) as usize;
                let payload = length.checked_sub(width)?;
                let count = if payload == 0 {
                    0
                } else {
                    let item = Slice::new(self.data.get(1 + width..)?).byte_size();
                    payload / item
                };
                Some(ContainerMeta {
                    width,
                    count,
                    items_at: 1 + width,
                    table_at: None,
                })
            }
            0x06..=0x09 | 0x0b | 0x0d..=0x12 => {
                let width = container_width(head);
                let length = self.read_uint(1, width) as usize;
                if length == 1 {
                    // empty container: a lone length byte after the tag
                    return Some(ContainerMeta {
                        width,
                        count: 0,
                        items_at: 1 + width,
                        table_at: None,
                    });
                }
                let count = self.read_uint(1 + width, width) as usize;
                let table_at = (1 + length).checked_sub(count.checked_mul(width)?)?;
                Some(ContainerMeta {
                    width,
                    count,
                    items_at: 1 + 2 * width,
                    table_at: Some(table_at),
                })
            }
            _ => None,
        }
    }

    fn nth_offset(&self, meta: &ContainerMeta, index: usize) -> Option<usize> {
        match meta.table_at {
            Some(table_at) => {
                let entry_at = table_at + index * meta.width;
                Some(self.read_uint(entry_at, meta.width) as usize)
            }
            None => {
                let item = Slice::new(self.data.get(meta.items_at..)?).byte_size();
                Some(meta.items_at + index * item)
            }
        }
    }

    fn read_uint(&self, at: usize, width: usize) -> u64 {
        let mut raw = [0u8; 8];
        if let Some(bytes) = self.data.get(at..at + width) {
            raw[..width].copy_from_slice(bytes);
        }
        u64::from_le_bytes(raw)
    }
}

struct ContainerMeta {
    width: usize,
    count: usize,
    /// Offset of the first item, unused for indexed layouts.
    items_at: usize,
    table_at: Option<usize>,
}

fn container_width(head: u8) -> usize {
    let class = match head {
        0x02..=0x05 => head - tag::ARRAY_PLAIN,
        0x06..=0x09 => head - tag::ARRAY_INDEXED,
        0x0b | 0x0d | 0x0e => head - tag::OBJECT_SORTED,
        0x0f..=0x12 => head - tag::OBJECT_UNSORTED,
        _ => 0,
    };
    1usize << class
}

#[cfg(test)]
mod tests {
    use super::Slice;
    use crate::builder::Builder;
    use crate::tag::ValueType;

    #[test]
    fn scalar_accessors() {
        let mut b = Builder::new();
        b.add_uint(12);
        let s = b.slice();
        assert_eq!(s.value_type(), ValueType::UInt);
        assert_eq!(s.as_u64(), Some(12));
        assert_eq!(s.as_i64(), Some(12));
        assert_eq!(s.as_f64(), None);
        assert_eq!(s.byte_size(), 2);
    }

    #[test]
    fn negative_magnitudes() {
        let mut b = Builder::new();
        b.add_neg_int(3);
        assert_eq!(b.slice().as_i64(), Some(-3));

        let mut b = Builder::new();
        b.add_neg_int(9_223_372_036_854_775_808);
        assert_eq!(b.slice().as_i64(), Some(i64::MIN));

        let mut b = Builder::new();
        b.add_neg_int(u64::MAX);
        assert_eq!(b.slice().as_i64(), None);
        assert_eq!(b.slice().neg_magnitude(), Some(u64::MAX));
    }

    #[test]
    fn string_payloads() {
        let mut b = Builder::new();
        b.add_string("hé");
        let s = b.slice();
        assert_eq!(s.value_type(), ValueType::String);
        assert_eq!(s.as_str(), Some("hé"));
        assert_eq!(s.byte_size(), 4);
    }

    #[test]
    fn plain_array_navigation() {
        let mut b = Builder::new();
        let base = b.open_array();
        for i in 0..3 {
            b.report_child_offset(base);
            b.add_uint(i);
        }
        b.close();
        let s = b.slice();
        assert_eq!(s.len(), Some(3));
        assert_eq!(s.at(1).and_then(|item| item.as_u64()), Some(1));
        assert_eq!(s.at(3).map(|item| item.byte_size()), None);
    }

    #[test]
    fn indexed_array_navigation() {
        let mut b = Builder::new();
        let base = b.open_array();
        b.report_child_offset(base);
        b.add_uint(1);
        b.report_child_offset(base);
        b.add_string("ab");
        b.close();
        let s = b.slice();
        assert_eq!(s.len(), Some(2));
        assert_eq!(s.at(0).and_then(|item| item.as_u64()), Some(1));
        assert_eq!(s.at(1).and_then(|item| item.as_str()), Some("ab"));
    }

    #[test]
    fn object_lookup_sorted_and_unsorted() {
        for sort in [true, false] {
            let mut b = Builder::with_options(crate::ParserOptions {
                sort_attribute_names: sort,
                ..crate::ParserOptions::default()
            });
            let base = b.open_object();
            for key in ["zebra", "apple", "mango"] {
                b.report_child_offset(base);
                b.add_string(key);
                b.add_uint(u64::from(key.len() as u32));
            }
            b.close();
            let s = b.slice();
            assert_eq!(s.len(), Some(3));
            assert_eq!(s.get("apple").and_then(|v| v.as_u64()), Some(5));
            assert_eq!(s.get("zebra").and_then(|v| v.as_u64()), Some(5));
            assert_eq!(s.get("mango").and_then(|v| v.as_u64()), Some(5));
            assert_eq!(s.get("missing").map(|v| v.byte_size()), None);
        }
    }

    #[test]
    fn sorted_entries_iterate_in_key_order() {
        let mut b = Builder::new();
        let base = b.open_object();
        for key in ["b", "a"] {
            b.report_child_offset(base);
            b.add_string(key);
            b.add_null();
        }
        b.close();
        let s = b.slice();
        let (first_key, _) = s.entry_at(0).unwrap();
        assert_eq!(first_key.as_str(), Some("a"));
    }

    #[test]
    fn empty_containers_have_len_zero() {
        let mut b = Builder::new();
        b.open_array();
        b.close();
        assert_eq!(b.slice().len(), Some(0));
        assert_eq!(b.slice().byte_size(), 2);

        let mut b = Builder::new();
        b.open_object();
        b.close();
        assert_eq!(b.slice().len(), Some(0));
        assert_eq!(b.slice().get("x").map(|v| v.byte_size()), None);
    }
}
