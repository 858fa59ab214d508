#![no_main]

use jsonpack::{dump, Parser, ParserOptions, Slice};
use libfuzzer_sys::fuzz_target;

const HEADER: usize = 1; // flag byte

/// Drives the parser over arbitrary bytes. On accepted inputs the produced
/// binary form must survive a walk: every value dumps back to JSON text that
/// `serde_json` accepts (unless the payload carries the documented lossy
/// surrogates), and reparsing that text must succeed.
fn run(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let input = &data[HEADER..];

    let mut parser = Parser::with_options(ParserOptions {
        sort_attribute_names: flags & 2 != 0,
        // keep hostile nesting cheap under the fuzzer
        max_nesting_depth: 128,
    });
    let multi = flags & 1 != 0;

    let Ok(count) = parser.parse(input, multi) else {
        // a failed parse must not poison the parser
        assert_eq!(parser.parse(b"[0]", false), Ok(1));
        return;
    };
    assert!(count >= 1);

    let builder = parser.steal();
    assert!(builder.is_closed());
    let bytes = builder.as_bytes();

    let mut offset = 0usize;
    let mut seen = 0u64;
    while offset < bytes.len() {
        let slice = Slice::new(&bytes[offset..]);
        let size = slice.byte_size();
        assert!(size > 0 && offset + size <= bytes.len());
        if let Ok(text) = dump(slice) {
            let reparsed: serde_json::Value =
                serde_json::from_str(&text).expect("dump output is valid JSON");
            let _ = reparsed;
            let mut again = Parser::new();
            match again.parse(text.as_bytes(), false) {
                Ok(n) => assert_eq!(n, 1),
                // shortest-text doubles near the f64 limits can
                // re-accumulate past the range check
                Err(err) => {
                    assert!(err.to_string().contains("numeric value out of bounds"));
                }
            }
        }
        offset += size;
        seen += 1;
    }
    assert_eq!(seen, count);
}

fuzz_target!(|data: &[u8]| run(data));
