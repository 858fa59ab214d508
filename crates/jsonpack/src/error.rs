//! Parse failure reporting.

use thiserror::Error;

/// A fatal parse failure.
///
/// Carries what went wrong and the byte offset of the last consumed input
/// byte at the moment the failure was detected. All failures abort the
/// current parse; there is no recovery or partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    kind: ErrorKind,
    offset: usize,
}

impl ParseError {
    pub(crate) fn at(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset of the last consumed input byte when the error was
    /// detected, clamped to the input range.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// What a [`ParseError`] is about.
///
/// Callers rarely branch on the kind; the rendered message is the primary
/// surface.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("value expected")]
    ValueExpected,
    #[error("expecting EOF")]
    ExpectingEof,
    #[error("expecting item")]
    ExpectingItem,
    #[error(", or ] expected")]
    CommaOrArrayEndExpected,
    #[error(", or }} expected")]
    CommaOrObjectEndExpected,
    #[error(": expected")]
    ColonExpected,
    #[error("\" or }} expected")]
    QuoteOrObjectEndExpected,
    #[error("true expected")]
    TrueExpected,
    #[error("false expected")]
    FalseExpected,
    #[error("null expected")]
    NullExpected,
    #[error("scanNumber: incomplete number")]
    IncompleteNumber,
    #[error("numeric value out of bounds")]
    NumberOutOfBounds,
    #[error("Unfinished string detected")]
    UnfinishedString,
    #[error("Unfinished \\uXXXX")]
    UnfinishedUnicodeEscape,
    #[error("Illegal hex digit")]
    IllegalHexDigit,
    #[error("Illegal \\ sequence")]
    IllegalEscape,
    #[error("Found control character")]
    ControlCharacter,
    #[error("Illegal UTF-8 byte")]
    IllegalUtf8Byte,
    #[error("Illegal 5- or 6-byte sequence")]
    IllegalUtf8Length,
    #[error("truncated UTF-8 sequence")]
    TruncatedUtf8,
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    /// Array/object recursion exceeded
    /// [`max_nesting_depth`](crate::ParserOptions::max_nesting_depth).
    #[error("nesting too deep")]
    NestingTooDeep,
}
