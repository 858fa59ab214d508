//! Tag bytes of the binary form.
//!
//! Every value starts with a single tag byte. Containers and wide integers
//! come in families: the low bits of the tag select a width class or a byte
//! count, so a reader can size a value from its first byte (plus, for
//! containers and long strings, the length field that follows).

/// Placeholder written when a container is opened; never present in finished
/// output.
pub const PLACEHOLDER: u8 = 0x00;

/// Array without index table; `+c` for width class `c` (`0x02..=0x05`).
///
/// Only used when all items have the same byte size, which lets the reader
/// derive the item count from the payload length.
pub const ARRAY_PLAIN: u8 = 0x02;

/// Array with index table; `+c` (`0x06..=0x09`).
pub const ARRAY_INDEXED: u8 = 0x06;

/// Object with key-sorted index table; `+c` (`0x0b..=0x0e`).
///
/// The `0x0c` sub-kind collides with [`LONG_STRING`] and is never emitted;
/// sorted objects in the 2-byte class use the 4-byte header instead.
pub const OBJECT_SORTED: u8 = 0x0b;

/// Long string: 8-byte little-endian payload length, then the payload.
pub const LONG_STRING: u8 = 0x0c;

/// Object with index table in insertion order; `+c` (`0x0f..=0x12`).
pub const OBJECT_UNSORTED: u8 = 0x0f;

pub const NULL: u8 = 0x18;
pub const FALSE: u8 = 0x19;
pub const TRUE: u8 = 0x1a;

/// IEEE-754 double, 8 bytes little-endian bit pattern.
pub const DOUBLE: u8 = 0x1b;

/// Negative integer; `+w-1` for a magnitude stored in `w ∈ 1..=8`
/// little-endian bytes (`0x20..=0x27`). The value is the negated magnitude,
/// so the family covers `(-2^64, 0)`.
pub const NEG_INT: u8 = 0x20;

/// Unsigned integer; `+w-1` for `w ∈ 1..=8` little-endian bytes
/// (`0x28..=0x2f`).
pub const UINT: u8 = 0x28;

/// Small unsigned integer `0..=9` stored in the tag itself (`0x30..=0x39`).
pub const SMALL_UINT: u8 = 0x30;

/// Small negative integer `-n` for `n ∈ 1..=6`, stored as `0x40 - n`
/// (`0x3a..=0x3f`).
pub const SMALL_NEG_BASE: u8 = 0x40;

/// Short string: `0x40 + len` for a payload of `len ∈ 0..=127` bytes
/// (`0x40..=0xbf`).
pub const SHORT_STRING: u8 = 0x40;

/// Longest payload a short string can carry.
pub const SHORT_STRING_MAX: usize = 127;

/// Coarse type of a value, derived from its tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Unassigned or placeholder tag.
    None,
    Null,
    Bool,
    Double,
    /// Unsigned integer, including the small-integer tags.
    UInt,
    /// Negative integer, including the small negative tags.
    NegInt,
    String,
    Array,
    Object,
}

/// Classifies a tag byte.
#[must_use]
pub fn value_type(tag: u8) -> ValueType {
    match tag {
        0x02..=0x09 => ValueType::Array,
        LONG_STRING | 0x40..=0xbf => ValueType::String,
        0x0b | 0x0d | 0x0e | 0x0f..=0x12 => ValueType::Object,
        NULL => ValueType::Null,
        FALSE | TRUE => ValueType::Bool,
        DOUBLE => ValueType::Double,
        0x20..=0x27 | 0x3a..=0x3f => ValueType::NegInt,
        0x28..=0x39 => ValueType::UInt,
        _ => ValueType::None,
    }
}
