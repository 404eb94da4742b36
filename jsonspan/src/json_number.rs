// SPDX-License-Identifier: Apache-2.0

use core::str::FromStr;

use crate::ParseError;

/// The syntactic class of a JSON number.
///
/// Classification looks only at the raw text, so it never fails and never
/// depends on whether the value fits a machine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberType {
    /// A `-` followed by digits only.
    Int,
    /// Digits only.
    Uint,
    /// Anything with a fraction or exponent.
    Float,
}

/// Classifies the raw text of a JSON number.
///
/// ```
/// use jsonspan::{number_type_of, NumberType};
///
/// assert_eq!(number_type_of("-12"), NumberType::Int);
/// assert_eq!(number_type_of("12"), NumberType::Uint);
/// assert_eq!(number_type_of("1.5e3"), NumberType::Float);
/// ```
pub fn number_type_of(raw: &str) -> NumberType {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        NumberType::Float
    } else if negative {
        NumberType::Int
    } else {
        NumberType::Uint
    }
}

/// Detects if a number byte slice represents an integer (no decimal point or exponent).
/// JSON numbers are pure ASCII, so this avoids unnecessary UTF-8 string processing.
pub fn is_integer(bytes: &[u8]) -> bool {
    !bytes.iter().any(|&b| b == b'.' || b == b'e' || b == b'E')
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

/// Checks a token against the JSON number grammar:
/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
pub fn is_valid_number(bytes: &[u8]) -> bool {
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = skip_digits(bytes, i + 1),
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        let start = i + 1;
        i = skip_digits(bytes, start);
        if i == start {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        i = skip_digits(bytes, start);
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}

fn parse_integer<T: FromStr>(raw: &str) -> Result<T, ParseError> {
    if !is_integer(raw.as_bytes()) {
        return Err(ParseError::NumberOutOfRange(raw.to_owned()));
    }
    // A leading '+' would be accepted by FromStr but is never JSON.
    if raw.starts_with('+') {
        return Err(ParseError::NumberOutOfRange(raw.to_owned()));
    }
    T::from_str(raw).map_err(|_| ParseError::NumberOutOfRange(raw.to_owned()))
}

/// Converts an integer number to `i64`; fractions, exponents and overflow are errors.
pub fn to_i64(raw: &str) -> Result<i64, ParseError> {
    parse_integer(raw)
}

/// Converts a non-negative integer number to `u64`.
pub fn to_u64(raw: &str) -> Result<u64, ParseError> {
    parse_integer(raw)
}

/// Converts any number to `f64`. Values outside the finite `f64` range are errors.
pub fn to_f64(raw: &str) -> Result<f64, ParseError> {
    match f64::from_str(raw) {
        Ok(val) if val.is_finite() => Ok(val),
        _ => Err(ParseError::NumberOutOfRange(raw.to_owned())),
    }
}
