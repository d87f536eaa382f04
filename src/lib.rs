/*!
# `acorn-json`

A vectorized two-stage parser for JSON documents. The input is scanned into
an index of structural byte offsets with SIMD-width bit-mask algorithms, then
walked into a flat, randomly indexable document tape, with deterministic
rejection of malformed input and bit-exact IEEE 754 numeric conversion.

## ⚠️ CAREFUL

Parts of this library are very performance sensitive and lean on unchecked
operations whose invariants are documented where they're used. Any changes
should be:

- tested against the benchmarks to make sure we don't regress (at least not
  accidentally).
- fuzz tested to ensure there aren't soundness holes introduced.

Unchecked operations are performed through macros that use the checked
variant in test/debug builds (or when the `checked` cfg is enabled) to make
sure we never cause UB when working through documents.

## Usage

```
# fn main() -> acorn_json::Result<()> {
let mut parser = acorn_json::Parser::new(16 * 1024, 64);

let document = parser.parse(br#"{"a":1,"b":[true,false,null]}"#)?;

let a = document.root().get("a").unwrap();
assert_eq!(Some(1), a.as_long());
# Ok(())
# }
```
*/

#[macro_use]
mod macros;

mod std_ext;

mod error;
mod num;
mod stage1;
mod unescape;
mod utf8;

pub mod de;

pub use de::{Document, Elements, Entries, Parser, Value, DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
