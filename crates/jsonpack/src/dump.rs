//! Rendering the binary form back to JSON text.

use alloc::string::String;
use core::fmt::Write as _;

use thiserror::Error;

use crate::slice::Slice;
use crate::tag::ValueType;

/// Failure to render a value as JSON text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DumpError {
    /// JSON has no representation for NaN or infinities.
    #[error("non-finite number cannot be rendered as JSON")]
    NonFiniteNumber,
    /// String payloads with isolated surrogates are not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("unexpected tag byte 0x{0:02x}")]
    UnexpectedTag(u8),
}

/// Renders one value as compact JSON text.
///
/// # Errors
///
/// Fails on non-finite doubles, string payloads that are not valid UTF-8,
/// and unassigned tag bytes.
///
/// # Examples
///
/// ```
/// use jsonpack::{dump, Parser};
///
/// let mut parser = Parser::new();
/// parser.parse(b"[1, null, \"x\"]", false)?;
/// assert_eq!(dump(parser.builder().slice())?, r#"[1,null,"x"]"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn dump(slice: Slice<'_>) -> Result<String, DumpError> {
    let mut out = String::new();
    write_value(&mut out, slice)?;
    Ok(out)
}

fn write_value(out: &mut String, slice: Slice<'_>) -> Result<(), DumpError> {
    match slice.value_type() {
        ValueType::Null => out.push_str("null"),
        ValueType::Bool => out.push_str(if slice.as_bool() == Some(true) {
            "true"
        } else {
            "false"
        }),
        ValueType::UInt => {
            let value = slice.as_u64().ok_or(DumpError::UnexpectedTag(slice.head()))?;
            let _ = write!(out, "{value}");
        }
        ValueType::NegInt => {
            let magnitude = slice
                .neg_magnitude()
                .ok_or(DumpError::UnexpectedTag(slice.head()))?;
            let _ = write!(out, "-{magnitude}");
        }
        ValueType::Double => {
            let value = slice.as_f64().ok_or(DumpError::UnexpectedTag(slice.head()))?;
            if !value.is_finite() {
                return Err(DumpError::NonFiniteNumber);
            }
            let _ = write!(out, "{value}");
        }
        ValueType::String => {
            let text = slice.as_str().ok_or(DumpError::InvalidUtf8)?;
            write_escaped(out, text);
        }
        ValueType::Array => {
            let count = slice.len().unwrap_or(0);
            out.push('[');
            for index in 0..count {
                if index > 0 {
                    out.push(',');
                }
                let item = slice.at(index).ok_or(DumpError::UnexpectedTag(slice.head()))?;
                write_value(out, item)?;
            }
            out.push(']');
        }
        ValueType::Object => {
            let count = slice.len().unwrap_or(0);
            out.push('{');
            for index in 0..count {
                if index > 0 {
                    out.push(',');
                }
                let (key, value) = slice
                    .entry_at(index)
                    .ok_or(DumpError::UnexpectedTag(slice.head()))?;
                let key = key.as_str().ok_or(DumpError::InvalidUtf8)?;
                write_escaped(out, key);
                out.push(':');
                write_value(out, value)?;
            }
            out.push('}');
        }
        ValueType::None => return Err(DumpError::UnexpectedTag(slice.head())),
    }
    Ok(())
}

fn write_escaped(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}
