//! Single-pass transcoding of JSON text into a compact, typed binary form.
//!
//! The crate couples a hand-written JSON recognizer ([`Parser`]) with a
//! size-aware emitter ([`Builder`]): input bytes flow through the parser's
//! cursor straight into builder append calls, with no intermediate value
//! tree. Byte layouts depend on cumulative size, so the builder patches
//! headers after the fact — a string header widens once its payload passes
//! 127 bytes, and container headers are sized and written when the container
//! closes.
//!
//! [`Slice`] gives read access to the produced bytes and [`dump`] renders
//! them back to JSON text.
//!
//! # Examples
//!
//! ```
//! use jsonpack::{dump, Parser};
//!
//! let mut parser = Parser::new();
//! let n = parser.parse(br#"{"b": [1, 2.5], "a": null}"#, false)?;
//! assert_eq!(n, 1);
//!
//! let builder = parser.steal();
//! let slice = builder.slice();
//! assert_eq!(slice.get("b").and_then(|v| v.at(0)).and_then(|v| v.as_u64()), Some(1));
//! // attribute names are sorted by default
//! assert_eq!(dump(slice)?, r#"{"a":null,"b":[1,2.5]}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod builder;
mod dump;
mod error;
mod options;
mod parser;
mod slice;
pub mod tag;

pub use buffer::OutputBuffer;
pub use builder::{Builder, StringWriter};
pub use dump::{dump, DumpError};
pub use error::{ErrorKind, ParseError};
pub use options::ParserOptions;
pub use parser::Parser;
pub use slice::Slice;
pub use tag::ValueType;

#[cfg(test)]
mod tests;
