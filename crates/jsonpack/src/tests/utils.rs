//! Shared helpers for the parser-level tests.
//!
//! The binary form is verified two ways: byte-exact assertions for layouts
//! the format pins down, and DOM comparison against `serde_json` for
//! structural equivalence.

use alloc::vec::Vec;

use serde_json::Value;

use crate::{ParseError, Parser, ParserOptions, Slice, ValueType};

/// Parses `input` as a single document with default options and returns the
/// binary form.
pub fn parse_one(input: &str) -> Vec<u8> {
    parse_one_with(input, ParserOptions::default())
}

pub fn parse_one_with(input: &str, options: ParserOptions) -> Vec<u8> {
    let mut parser = Parser::with_options(options);
    let count = parser
        .parse(input.as_bytes(), false)
        .unwrap_or_else(|err| panic!("parse of {input:?} failed: {err}"));
    assert_eq!(count, 1, "expected one root value in {input:?}");
    let builder = parser.steal();
    assert!(builder.is_closed());
    builder.into_bytes()
}

pub fn parse_err(input: &str) -> ParseError {
    parse_err_bytes(input.as_bytes())
}

pub fn parse_err_bytes(input: &[u8]) -> ParseError {
    let mut parser = Parser::new();
    parser
        .parse(input, false)
        .expect_err("parse unexpectedly succeeded")
}

/// Parses and reconstructs a `serde_json` DOM from the binary form.
pub fn dom(input: &str) -> Value {
    let bytes = parse_one(input);
    to_dom(Slice::new(&bytes))
}

/// Reconstructs a `serde_json` DOM from one value of the binary form.
pub fn to_dom(slice: Slice<'_>) -> Value {
    match slice.value_type() {
        ValueType::Null => Value::Null,
        ValueType::Bool => Value::from(slice.as_bool().unwrap()),
        ValueType::UInt => Value::from(slice.as_u64().unwrap()),
        ValueType::NegInt => match slice.as_i64() {
            Some(value) => Value::from(value),
            // magnitudes past i64 parse as doubles in serde_json as well
            None => Value::from(-(slice.neg_magnitude().unwrap() as f64)),
        },
        ValueType::Double => Value::from(slice.as_f64().unwrap()),
        ValueType::String => Value::from(slice.as_str().expect("string payload is valid UTF-8")),
        ValueType::Array => {
            let count = slice.len().unwrap();
            Value::Array((0..count).map(|i| to_dom(slice.at(i).unwrap())).collect())
        }
        ValueType::Object => {
            let count = slice.len().unwrap();
            let mut map = serde_json::Map::new();
            for i in 0..count {
                let (key, value) = slice.entry_at(i).unwrap();
                map.insert(key.as_str().unwrap().into(), to_dom(value));
            }
            Value::Object(map)
        }
        ValueType::None => panic!("unassigned tag byte 0x{:02x}", slice.head()),
    }
}

/// Structural equality with tolerance for floating-point values: the
/// fraction and exponent accumulation is not guaranteed to round like
/// `serde_json`'s own number parsing, so doubles compare approximately.
pub fn dom_approx_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x == y {
                return true;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => {
                    x == y || (x - y).abs() <= x.abs().max(y.abs()) * 1e-12
                }
                _ => false,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| dom_approx_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| dom_approx_eq(x, y)))
        }
        _ => a == b,
    }
}
