// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use crate::parse_error::ParseError;

/// Shared utilities for encoding and decoding JSON string literals.
///
/// These are pure functions used by the parser (to check literals), by values
/// (to decode strings on read and re-quote keys), and by the iterator.
pub struct EscapeProcessor;

impl EscapeProcessor {
    /// Process a simple escape sequence character and return the unescaped char.
    ///
    /// # Arguments
    /// * `escape_char` - The character following the backslash in an escape sequence
    ///
    /// # Returns
    /// The unescaped character, or an error if the escape sequence is invalid.
    pub fn process_simple_escape(escape_char: u8) -> Result<char, ParseError> {
        match escape_char {
            b'n' => Ok('\n'),
            b't' => Ok('\t'),
            b'r' => Ok('\r'),
            b'\\' => Ok('\\'),
            b'"' => Ok('"'),
            b'/' => Ok('/'),
            b'b' => Ok('\u{08}'),
            b'f' => Ok('\u{0C}'),
            other => Err(ParseError::InvalidEscapeSequence(char::from(other))),
        }
    }

    /// Validate that a byte represents a valid hexadecimal digit.
    ///
    /// # Returns
    /// The numeric value (0-15) of the hex digit, or an error if invalid.
    pub fn validate_hex_digit(byte: u8) -> Result<u32, ParseError> {
        match byte {
            b'0'..=b'9' => Ok((byte - b'0') as u32),
            b'a'..=b'f' => Ok((byte - b'a' + 10) as u32),
            b'A'..=b'F' => Ok((byte - b'A' + 10) as u32),
            _ => Err(ParseError::InvalidUnicodeHex),
        }
    }

    /// Decode the four hex digits of a `\uXXXX` escape.
    pub fn parse_hex4(hex_slice: &[u8]) -> Result<u32, ParseError> {
        if hex_slice.len() != 4 {
            return Err(ParseError::InvalidUnicodeHex);
        }
        hex_slice.iter().try_fold(0u32, |codepoint, &byte| {
            Ok((codepoint << 4) | Self::validate_hex_digit(byte)?)
        })
    }

    /// Check if a Unicode codepoint is a high surrogate (0xD800-0xDBFF)
    pub fn is_high_surrogate(codepoint: u32) -> bool {
        (0xD800..=0xDBFF).contains(&codepoint)
    }

    /// Check if a Unicode codepoint is a low surrogate (0xDC00-0xDFFF)
    pub fn is_low_surrogate(codepoint: u32) -> bool {
        (0xDC00..=0xDFFF).contains(&codepoint)
    }

    /// Combine a high and low surrogate pair into a single Unicode codepoint
    pub fn combine_surrogate_pair(high: u32, low: u32) -> Result<char, ParseError> {
        if !Self::is_high_surrogate(high) {
            return Err(ParseError::InvalidUnicodeCodepoint("unexpected low surrogate"));
        }
        if !Self::is_low_surrogate(low) {
            return Err(ParseError::InvalidUnicodeCodepoint(
                "low surrogate out of range",
            ));
        }
        let codepoint = 0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF);
        char::from_u32(codepoint).ok_or(ParseError::InvalidUnicodeCodepoint("out of range"))
    }

    /// Strips the surrounding quotes of a string literal.
    pub fn literal_content(literal: &str) -> Result<&str, ParseError> {
        let bytes = literal.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
            return Err(ParseError::InvalidQuotedString(literal.to_owned()));
        }
        Ok(&literal[1..literal.len() - 1])
    }

    /// Walks the escapes of literal content (without quotes), writing the
    /// decoded text to `out` when one is given.
    ///
    /// Running without an output buffer validates the escapes without allocating.
    pub fn unescape(mut content: &str, mut out: Option<&mut String>) -> Result<(), ParseError> {
        loop {
            let Some(i) = memchr::memchr(b'\\', content.as_bytes()) else {
                if let Some(out) = out.as_deref_mut() {
                    out.push_str(content);
                }
                return Ok(());
            };
            if let Some(out) = out.as_deref_mut() {
                out.push_str(&content[..i]);
            }
            let rest = &content.as_bytes()[i + 1..];
            let Some(&escape_char) = rest.first() else {
                return Err(ParseError::UnterminatedEscape);
            };
            let (decoded, consumed) = if escape_char == b'u' {
                Self::unicode_escape(rest)?
            } else {
                (Self::process_simple_escape(escape_char)?, 1)
            };
            if let Some(out) = out.as_deref_mut() {
                out.push(decoded);
            }
            content = &content[i + 1 + consumed..];
        }
    }

    /// Decodes `uXXXX` (optionally followed by `\uXXXX` for a surrogate pair)
    /// at the start of `rest`. Returns the char and the number of bytes consumed.
    fn unicode_escape(rest: &[u8]) -> Result<(char, usize), ParseError> {
        let hex = rest.get(1..5).ok_or(ParseError::InvalidUnicodeHex)?;
        let high = Self::parse_hex4(hex)?;
        if Self::is_low_surrogate(high) {
            return Err(ParseError::InvalidUnicodeCodepoint("unexpected low surrogate"));
        }
        if !Self::is_high_surrogate(high) {
            let ch = char::from_u32(high).ok_or(ParseError::InvalidUnicodeCodepoint("out of range"))?;
            return Ok((ch, 5));
        }
        match rest.get(5..11) {
            Some([b'\\', b'u', low @ ..]) => {
                let low = Self::parse_hex4(low)?;
                Ok((Self::combine_surrogate_pair(high, low)?, 11))
            }
            _ => Err(ParseError::InvalidUnicodeCodepoint("missing low surrogate")),
        }
    }

    /// Checks a string literal token the way the parser requires: matching
    /// quotes, decodable escapes, and no raw control characters.
    pub(crate) fn check_literal(literal: &str) -> Result<(), ParseError> {
        let content = Self::literal_content(literal)?;
        if let Some(&control) = content.as_bytes().iter().find(|&&b| b < 0x20) {
            return Err(ParseError::ControlCharacter(control));
        }
        Self::unescape(content, None)
    }

    /// Returns the short escape for bytes that have one.
    fn short_escape(byte: u8) -> Option<&'static str> {
        match byte {
            b'"' => Some("\\\""),
            b'\\' => Some("\\\\"),
            b'\n' => Some("\\n"),
            b'\r' => Some("\\r"),
            b'\t' => Some("\\t"),
            0x08 => Some("\\b"),
            0x0C => Some("\\f"),
            _ => None,
        }
    }
}

#[inline]
fn needs_escape(byte: u8) -> bool {
    byte < 0x20 || byte == b'"' || byte == b'\\'
}

/// Returns the JSON string literal for `s`.
///
/// ```
/// assert_eq!(jsonspan::quote("say \"hi\"\n"), r#""say \"hi\"\n""#);
/// ```
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    append_quote(&mut out, s);
    out
}

/// Appends the JSON string literal for `s` to `out`.
///
/// Quotes, backslashes and control characters are escaped; everything else,
/// including `/` and non-ASCII text, is copied verbatim.
pub fn append_quote(out: &mut String, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    out.push('"');
    let bytes = s.as_bytes();
    let mut copied = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if !needs_escape(byte) {
            continue;
        }
        out.push_str(&s[copied..i]);
        match EscapeProcessor::short_escape(byte) {
            Some(escape) => out.push_str(escape),
            None => {
                out.push_str("\\u00");
                out.push(char::from(HEX[(byte >> 4) as usize]));
                out.push(char::from(HEX[(byte & 0xF) as usize]));
            }
        }
        copied = i + 1;
    }
    out.push_str(&s[copied..]);
    out.push('"');
}

/// Decodes a JSON string literal, borrowing from it when it holds no escapes.
///
/// ```
/// assert_eq!(jsonspan::unquote(r#""😀""#).unwrap(), "\u{1F600}");
/// assert!(jsonspan::unquote(r#""\ud83d""#).is_err());
/// ```
pub fn unquote(literal: &str) -> Result<Cow<'_, str>, ParseError> {
    let content = EscapeProcessor::literal_content(literal)?;
    if memchr::memchr(b'\\', content.as_bytes()).is_none() {
        return Ok(Cow::Borrowed(content));
    }
    let mut out = String::with_capacity(content.len());
    EscapeProcessor::unescape(content, Some(&mut out))?;
    Ok(Cow::Owned(out))
}

/// Appends the decoded text of a JSON string literal to `out`.
///
/// On error `out` may hold a decoded prefix of the literal.
pub fn append_unquote(out: &mut String, literal: &str) -> Result<(), ParseError> {
    let content = EscapeProcessor::literal_content(literal)?;
    EscapeProcessor::unescape(content, Some(out))
}
