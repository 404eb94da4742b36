// SPDX-License-Identifier: Apache-2.0

//! Zero-copy JSON values and a skipping pull iterator.
//!
//! [`parse`] builds a [`Value`] tree whose scalars and containers borrow their
//! exact source text, so a value can be written back byte for byte with
//! [`Value::append_to`] or normalized with [`Value::compact`].
//! [`parse_max_depth`] leaves objects below a given depth unparsed until
//! their fields are first read.
//!
//! [`iterate`] returns an [`Iter`] that reads one value at a time and skips
//! whatever the caller does not look at:
//!
//! ```
//! let input = r#"{"user": {"name": "ada", "langs": ["en", "fr"]}, "id": 7}"#;
//! let mut it = jsonspan::iterate(input);
//! assert!(it.next());
//! let mut fields = it.object().unwrap();
//! let mut id = 0;
//! while let Some(key) = fields.next(&mut it).unwrap() {
//!     if key == "id" {
//!         id = it.int().unwrap();
//!     }
//! }
//! assert_eq!(id, 7);
//! ```
//!
//! String helpers [`quote`] and [`unquote`] implement the escaping rules on
//! their own, and [`valid`] checks a document without building anything.
//! The [`append`] module writes new JSON text from Rust values.

mod convert;
mod escape_processor;
mod iterator;
mod json_number;
mod parse_error;
mod parser;
mod tokenizer;
mod valid;
mod value;

pub mod append;
pub mod coerce;

pub use escape_processor::{append_quote, append_unquote, quote, unquote, EscapeProcessor};
pub use iterator::{ArrayWalk, Iter, ObjectWalk};
pub use json_number::{number_type_of, NumberType};
pub use parse_error::ParseError;
pub use parser::{parse, parse_max_depth, Parser, MAX_NESTING};
pub use tokenizer::Tokenizer;
pub use valid::valid;
pub use value::{Array, Field, Kind, Object, Value};

/// Returns a pull iterator over `input`. See [`Iter`].
pub fn iterate(input: &str) -> Iter<'_> {
    Iter::new(input)
}

/// Splits `input` into JSON tokens without checking the grammar.
///
/// Tokens are structural characters, complete string literals (quotes
/// included) and runs of other non-whitespace bytes.
///
/// ```
/// let tokens: Vec<&str> = jsonspan::tokenize(r#"{"a": [1, true]}"#).collect();
/// assert_eq!(tokens, ["{", r#""a""#, ":", "[", "1", ",", "true", "]", "}"]);
/// ```
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}
