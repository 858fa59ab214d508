//! The recognizer half of the transcoder.
//!
//! [`Parser`] drives a single forward pass over a contiguous UTF-8 JSON
//! input, emitting into its [`Builder`] as it goes. There is no intermediate
//! value tree: numbers are classified while their digits are scanned, string
//! escapes are transcoded straight into the output payload, and containers
//! are opened and closed around the recursion.

mod number;
mod scanner;

use crate::builder::Builder;
use crate::error::{ErrorKind, ParseError};
use crate::options::ParserOptions;
use number::ParsedNumber;
use scanner::Scanner;

/// Single-pass JSON parser emitting the binary form.
///
/// A parser owns one [`Builder`] and can be reused across inputs; every
/// [`parse`](Parser::parse) call starts from a cleared builder. On success
/// the builder holds one complete value (or, in multi mode, several
/// consecutive ones); take it with [`steal`](Parser::steal).
///
/// # Examples
///
/// ```
/// use jsonpack::Parser;
///
/// let mut parser = Parser::new();
/// let count = parser.parse(br#"{"a":12}"#, false)?;
/// assert_eq!(count, 1);
/// let builder = parser.steal();
/// assert_eq!(builder.as_bytes()[0], 0x0b);
/// # Ok::<(), jsonpack::ParseError>(())
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    builder: Builder,
    /// Options copied into the builder at the start of every parse.
    pub options: ParserOptions,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            builder: Builder::new(),
            options,
        }
    }

    /// Parses `input` and returns the number of top-level values produced.
    ///
    /// In single mode (`multi == false`) exactly one value is accepted and
    /// anything but trailing whitespace after it fails with "expecting EOF".
    /// In multi mode, whitespace-separated values are parsed until the input
    /// is exhausted. An optional UTF-8 BOM at the very start is skipped.
    ///
    /// # Errors
    ///
    /// Any malformed input or numeric out-of-bounds fails the whole parse;
    /// the builder is then left in an unspecified state and is cleared again
    /// by the next `parse` call.
    pub fn parse(&mut self, input: &[u8], multi: bool) -> Result<u64, ParseError> {
        self.builder.clear();
        self.builder.set_options(self.options);
        let mut run = ParserRun {
            scan: Scanner::new(input),
            builder: &mut self.builder,
            depth: 0,
            max_depth: self.options.max_nesting_depth,
        };
        run.parse_document(multi)
    }

    /// The builder populated by the last successful parse.
    #[must_use]
    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Moves the populated builder out, leaving a fresh one behind.
    #[must_use]
    pub fn steal(&mut self) -> Builder {
        core::mem::take(&mut self.builder)
    }
}

/// State for one `parse` call: the input cursor plus a borrow of the
/// builder. Kept separate from [`Parser`] so the input lifetime does not
/// infect the reusable type.
struct ParserRun<'a, 'b> {
    scan: Scanner<'a>,
    builder: &'b mut Builder,
    depth: usize,
    max_depth: usize,
}

impl ParserRun<'_, '_> {
    fn parse_document(&mut self, multi: bool) -> Result<u64, ParseError> {
        self.scan.skip_bom();
        let mut count = 0u64;
        loop {
            self.parse_value()?;
            count += 1;
            self.scan.skip_whitespace_run();
            if !multi && !self.scan.at_end() {
                // consume the offending byte so the error points at it
                self.scan.consume();
                return Err(self.err(ErrorKind::ExpectingEof));
            }
            if !multi || self.scan.at_end() {
                return Ok(count);
            }
        }
    }

    #[inline]
    fn err(&self, kind: ErrorKind) -> ParseError {
        ParseError::at(kind, self.scan.error_offset())
    }

    #[inline]
    fn consume_or(&mut self, kind: ErrorKind) -> Result<u8, ParseError> {
        match self.scan.consume() {
            Some(byte) => Ok(byte),
            None => Err(self.err(kind)),
        }
    }

    /// Skips whitespace and returns the byte that follows without consuming
    /// it, or fails with `kind` at end of input.
    fn skip_white_space(&mut self, kind: ErrorKind) -> Result<u8, ParseError> {
        self.scan.skip_whitespace_run();
        match self.scan.peek() {
            Some(byte) => Ok(byte),
            None => Err(self.err(kind)),
        }
    }

    fn parse_value(&mut self) -> Result<(), ParseError> {
        self.skip_white_space(ErrorKind::ExpectingItem)?;
        let Some(byte) = self.scan.consume() else {
            return Ok(());
        };
        match byte {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b't' => self.parse_true(),
            b'f' => self.parse_false(),
            b'n' => self.parse_null(),
            b'"' => self.parse_string(),
            _ => {
                // everything else must be a number or is invalid, '-' and
                // '0'..'9' included
                self.scan.unconsume();
                self.parse_number()
            }
        }
    }

    fn parse_true(&mut self) -> Result<(), ParseError> {
        self.expect_literal(b"rue", ErrorKind::TrueExpected)?;
        self.builder.add_true();
        Ok(())
    }

    fn parse_false(&mut self) -> Result<(), ParseError> {
        self.expect_literal(b"alse", ErrorKind::FalseExpected)?;
        self.builder.add_false();
        Ok(())
    }

    fn parse_null(&mut self) -> Result<(), ParseError> {
        self.expect_literal(b"ull", ErrorKind::NullExpected)?;
        self.builder.add_null();
        Ok(())
    }

    /// The lead byte has been consumed by `parse_value`; the rest of the
    /// literal must follow exactly.
    fn expect_literal(&mut self, rest: &[u8], kind: ErrorKind) -> Result<(), ParseError> {
        for &expected in rest {
            if self.scan.consume() != Some(expected) {
                return Err(self.err(kind));
            }
        }
        Ok(())
    }

    fn enter_container(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.err(ErrorKind::NestingTooDeep));
        }
        Ok(())
    }

    fn parse_array(&mut self) -> Result<(), ParseError> {
        self.enter_container()?;
        let base = self.builder.open_array();

        if self.skip_white_space(ErrorKind::ExpectingItem)? == b']' {
            self.scan.advance(1);
            self.builder.close();
            self.depth -= 1;
            return Ok(());
        }

        loop {
            self.builder.report_child_offset(base);
            self.parse_value()?;
            let byte = self.skip_white_space(ErrorKind::CommaOrArrayEndExpected)?;
            if byte == b']' {
                self.scan.advance(1);
                self.builder.close();
                self.depth -= 1;
                return Ok(());
            }
            if byte != b',' {
                return Err(self.err(ErrorKind::CommaOrArrayEndExpected));
            }
            self.scan.advance(1);
        }
    }

    fn parse_object(&mut self) -> Result<(), ParseError> {
        self.enter_container()?;
        let base = self.builder.open_object();

        let mut byte = self.skip_white_space(ErrorKind::QuoteOrObjectEndExpected)?;
        if byte == b'}' {
            self.scan.advance(1);
            self.builder.close();
            self.depth -= 1;
            return Ok(());
        }

        loop {
            if byte != b'"' {
                return Err(self.err(ErrorKind::QuoteOrObjectEndExpected));
            }
            self.scan.advance(1);
            self.builder.report_child_offset(base);
            self.parse_string()?;

            if self.skip_white_space(ErrorKind::ColonExpected)? != b':' {
                return Err(self.err(ErrorKind::ColonExpected));
            }
            self.scan.advance(1);
            self.parse_value()?;

            let next = self.skip_white_space(ErrorKind::CommaOrObjectEndExpected)?;
            if next == b'}' {
                self.scan.advance(1);
                self.builder.close();
                self.depth -= 1;
                return Ok(());
            }
            if next != b',' {
                return Err(self.err(ErrorKind::CommaOrObjectEndExpected));
            }
            self.scan.advance(1);
            byte = self.skip_white_space(ErrorKind::QuoteOrObjectEndExpected)?;
        }
    }

    /// Scans a number per the JSON grammar. The integer part accumulates in
    /// a [`ParsedNumber`]; a fraction or exponent demotes the value to a
    /// double even when the integer part still fit.
    fn parse_number(&mut self) -> Result<(), ParseError> {
        let mut number = ParsedNumber::new();
        let mut negative = false;

        let mut byte = self.consume_or(ErrorKind::ValueExpected)?;
        if byte == b'-' {
            byte = self.consume_or(ErrorKind::IncompleteNumber)?;
            negative = true;
        }
        if !byte.is_ascii_digit() {
            return Err(self.err(ErrorKind::ValueExpected));
        }
        if byte != b'0' {
            // a leading zero ends the integer part immediately
            self.scan.unconsume();
            self.scan_digits(&mut number)?;
        }

        let mut value = 0.0f64;
        let mut has_fraction = false;
        match self.scan.consume() {
            Some(b'.') => {
                let next = self.consume_or(ErrorKind::IncompleteNumber)?;
                if !next.is_ascii_digit() {
                    return Err(self.err(ErrorKind::IncompleteNumber));
                }
                self.scan.unconsume();
                let fractional = self.scan_fractional_digits();
                has_fraction = true;
                value = if negative {
                    -number.as_double() - fractional
                } else {
                    number.as_double() + fractional
                };
            }
            Some(_) => self.scan.unconsume(),
            None => {}
        }

        let mut has_exponent = false;
        match self.scan.consume() {
            Some(b'e' | b'E') => {
                has_exponent = true;
                if !has_fraction {
                    value = if negative {
                        -number.as_double()
                    } else {
                        number.as_double()
                    };
                }
                let mut byte = self.consume_or(ErrorKind::IncompleteNumber)?;
                let mut exponent_negative = false;
                if byte == b'+' || byte == b'-' {
                    exponent_negative = byte == b'-';
                    byte = self.consume_or(ErrorKind::IncompleteNumber)?;
                }
                if !byte.is_ascii_digit() {
                    return Err(self.err(ErrorKind::IncompleteNumber));
                }
                self.scan.unconsume();
                let mut exponent = ParsedNumber::new();
                self.scan_digits(&mut exponent)?;
                let scale = number::power_of_ten(&exponent);
                if exponent_negative {
                    value /= scale;
                } else {
                    value *= scale;
                }
                if !value.is_finite() {
                    return Err(self.err(ErrorKind::NumberOutOfBounds));
                }
            }
            Some(_) => self.scan.unconsume(),
            None => {}
        }

        if has_fraction || has_exponent {
            self.builder.add_double(value);
        } else if !number.is_integer {
            // the integer accumulator overflowed into the double path
            let double = number.double_value;
            self.builder
                .add_double(if negative { -double } else { double });
        } else if negative {
            self.builder.add_neg_int(number.int_value);
        } else {
            self.builder.add_uint(number.int_value);
        }
        Ok(())
    }

    fn scan_digits(&mut self, number: &mut ParsedNumber) -> Result<(), ParseError> {
        while let Some(byte) = self.scan.consume() {
            if !byte.is_ascii_digit() {
                self.scan.unconsume();
                break;
            }
            number
                .add_digit(byte)
                .map_err(|kind| ParseError::at(kind, self.scan.error_offset()))?;
        }
        Ok(())
    }

    fn scan_fractional_digits(&mut self) -> f64 {
        let mut scale = 0.1f64;
        let mut fractional = 0.0f64;
        while let Some(byte) = self.scan.consume() {
            if !byte.is_ascii_digit() {
                self.scan.unconsume();
                break;
            }
            fractional += scale * f64::from(byte - b'0');
            scale /= 10.0;
        }
        fractional
    }

    /// Scans a string body (the opening quote is already consumed),
    /// transcoding escapes and validating UTF-8 straight into the builder's
    /// string session.
    ///
    /// `high_surrogate` remembers a preceding `\uD800..\uDBFF` escape so the
    /// following low half can be recombined; any other emission clears it.
    fn parse_string(&mut self) -> Result<(), ParseError> {
        let mut out = self.builder.begin_string();
        let mut high_surrogate: u32 = 0;
        loop {
            // Fast path: bulk-copy a run of plain ASCII. Multi-byte UTF-8
            // stays on the validating loop below.
            if self.scan.remaining() >= 16 {
                let tail = self.scan.tail();
                let run = tail
                    .iter()
                    .take_while(|&&b| (0x20..0x80).contains(&b) && b != b'"' && b != b'\\')
                    .count();
                if run > 0 {
                    out.push_slice(&tail[..run]);
                    self.scan.advance(run);
                    high_surrogate = 0;
                }
            }

            let Some(byte) = self.scan.consume() else {
                return Err(ParseError::at(
                    ErrorKind::UnfinishedString,
                    self.scan.error_offset(),
                ));
            };
            match byte {
                b'"' => {
                    out.finish();
                    return Ok(());
                }
                b'\\' => {
                    let Some(escape) = self.scan.consume() else {
                        return Err(ParseError::at(
                            ErrorKind::UnfinishedString,
                            self.scan.error_offset(),
                        ));
                    };
                    match escape {
                        b'"' | b'/' | b'\\' => {
                            out.push_byte(escape);
                            high_surrogate = 0;
                        }
                        b'b' => {
                            out.push_byte(0x08);
                            high_surrogate = 0;
                        }
                        b'f' => {
                            out.push_byte(0x0c);
                            high_surrogate = 0;
                        }
                        b'n' => {
                            out.push_byte(0x0a);
                            high_surrogate = 0;
                        }
                        b'r' => {
                            out.push_byte(0x0d);
                            high_surrogate = 0;
                        }
                        b't' => {
                            out.push_byte(0x09);
                            high_surrogate = 0;
                        }
                        b'u' => {
                            let mut unit: u32 = 0;
                            for _ in 0..4 {
                                let Some(hex) = self.scan.consume() else {
                                    return Err(ParseError::at(
                                        ErrorKind::UnfinishedUnicodeEscape,
                                        self.scan.error_offset(),
                                    ));
                                };
                                let digit = match hex {
                                    b'0'..=b'9' => u32::from(hex - b'0'),
                                    b'a'..=b'f' => u32::from(hex - b'a') + 10,
                                    b'A'..=b'F' => u32::from(hex - b'A') + 10,
                                    _ => {
                                        return Err(ParseError::at(
                                            ErrorKind::IllegalHexDigit,
                                            self.scan.error_offset(),
                                        ));
                                    }
                                };
                                unit = (unit << 4) + digit;
                            }
                            if unit < 0x80 {
                                out.push_byte(unit as u8);
                                high_surrogate = 0;
                            } else if unit < 0x800 {
                                out.push_slice(&[
                                    0xc0 | (unit >> 6) as u8,
                                    0x80 | (unit & 0x3f) as u8,
                                ]);
                                high_surrogate = 0;
                            } else if (0xdc00..0xe000).contains(&unit) && high_surrogate != 0 {
                                // low half: replace the provisional 3-byte
                                // high half with the combined code point
                                let code =
                                    0x10000 + ((high_surrogate - 0xd800) << 10) + (unit - 0xdc00);
                                out.rewind(3);
                                out.push_slice(&[
                                    0xf0 | (code >> 18) as u8,
                                    0x80 | ((code >> 12) & 0x3f) as u8,
                                    0x80 | ((code >> 6) & 0x3f) as u8,
                                    0x80 | (code & 0x3f) as u8,
                                ]);
                                high_surrogate = 0;
                            } else {
                                high_surrogate = if (0xd800..0xdc00).contains(&unit) {
                                    unit
                                } else {
                                    0
                                };
                                out.push_slice(&[
                                    0xe0 | (unit >> 12) as u8,
                                    0x80 | ((unit >> 6) & 0x3f) as u8,
                                    0x80 | (unit & 0x3f) as u8,
                                ]);
                            }
                        }
                        _ => {
                            return Err(ParseError::at(
                                ErrorKind::IllegalEscape,
                                self.scan.error_offset(),
                            ));
                        }
                    }
                }
                _ if byte < 0x80 => {
                    if byte < 0x20 {
                        return Err(ParseError::at(
                            ErrorKind::ControlCharacter,
                            self.scan.error_offset(),
                        ));
                    }
                    high_surrogate = 0;
                    out.push_byte(byte);
                }
                _ => {
                    // multi-byte UTF-8 sequence
                    let follow = if byte & 0xc0 == 0x80 {
                        return Err(ParseError::at(
                            ErrorKind::IllegalUtf8Byte,
                            self.scan.error_offset(),
                        ));
                    } else if byte & 0xe0 == 0xc0 {
                        1
                    } else if byte & 0xf0 == 0xe0 {
                        2
                    } else if byte & 0xf8 == 0xf0 {
                        3
                    } else {
                        return Err(ParseError::at(
                            ErrorKind::IllegalUtf8Length,
                            self.scan.error_offset(),
                        ));
                    };
                    out.push_byte(byte);
                    for _ in 0..follow {
                        let Some(cont) = self.scan.consume() else {
                            return Err(ParseError::at(
                                ErrorKind::TruncatedUtf8,
                                self.scan.error_offset(),
                            ));
                        };
                        if cont & 0xc0 != 0x80 {
                            return Err(ParseError::at(
                                ErrorKind::InvalidUtf8,
                                self.scan.error_offset(),
                            ));
                        }
                        out.push_byte(cont);
                    }
                    high_surrogate = 0;
                }
            }
        }
    }
}
