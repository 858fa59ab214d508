//! Reads JSON from stdin, prints the binary form as hex and the
//! round-tripped compact JSON text.
//!
//! ```sh
//! echo '{"a": 12}' | cargo run --example transcode
//! ```

use std::io::Read;

use jsonpack::{dump, Parser};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let mut parser = Parser::new();
    let count = parser.parse(input.as_bytes(), true)?;
    let builder = parser.steal();
    eprintln!(
        "{count} value(s), {} JSON bytes -> {} binary bytes",
        input.len(),
        builder.as_bytes().len()
    );

    for byte in builder.as_bytes() {
        print!("{byte:02x}");
    }
    println!();
    println!("{}", dump(builder.slice())?);
    Ok(())
}
