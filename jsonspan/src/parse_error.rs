// SPDX-License-Identifier: Apache-2.0

use crate::value::Kind;

/// Errors that can occur during JSON parsing, iteration, or value conversion.
///
/// Syntax errors carry the byte offset of the offending token in the input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The input held no JSON value at all.
    #[error("empty input")]
    EmptyInput,
    /// Input ended while a value, key, or closing bracket was still expected.
    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEnd { context: &'static str },
    /// A token that cannot start or continue the current production.
    #[error("invalid token {token:?} at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },
    /// A complete root value was followed by more content.
    #[error("unexpected token after root value {token:?} at offset {offset}")]
    TrailingContent { token: String, offset: usize },
    /// A comma directly followed by a closing bracket.
    #[error("unexpected {token:?} after ',' at offset {offset}")]
    TrailingComma { token: String, offset: usize },
    /// An array or object element was followed by something other than `,` or the closing bracket.
    #[error("expected ',' or {closing:?}, got {token:?} at offset {offset}")]
    ExpectedSeparator {
        closing: char,
        token: String,
        offset: usize,
    },
    /// An object key position held something other than a string.
    #[error("expected string key, got {token:?} at offset {offset}")]
    ExpectedKey { token: String, offset: usize },
    /// An object key was not followed by `:`.
    #[error("{key:?} → expected ':', got {token:?} at offset {offset}")]
    ExpectedColon {
        key: String,
        token: String,
        offset: usize,
    },
    /// A closing bracket that does not match the innermost open container.
    #[error("mismatched closing bracket {token:?} at offset {offset}")]
    MismatchedBracket { token: String, offset: usize },
    /// A token starting like a number that is not a valid JSON number.
    #[error("invalid number {token:?} at offset {offset}")]
    InvalidNumber { token: String, offset: usize },
    /// A string literal that failed to decode or holds raw control characters.
    #[error("invalid string {token:?} at offset {offset}: {source}")]
    InvalidString {
        token: String,
        offset: usize,
        source: Box<ParseError>,
    },
    /// The literal is not wrapped in a matching pair of double quotes.
    #[error("invalid quoted string: {0}")]
    InvalidQuotedString(String),
    /// Unknown character after a backslash.
    #[error("invalid escape character {0:?}")]
    InvalidEscapeSequence(char),
    /// A backslash with nothing after it before the closing quote.
    #[error("invalid escape sequence at end of string")]
    UnterminatedEscape,
    /// Fewer than four hex digits, or non-hex characters, after `\u`.
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeHex,
    /// A surrogate escape that is not part of a valid high/low pair.
    #[error("invalid surrogate pair: {0}")]
    InvalidUnicodeCodepoint(&'static str),
    /// An unescaped control character inside a string literal.
    #[error("unescaped control character {0:#04x} in string")]
    ControlCharacter(u8),
    /// Arrays and objects nested deeper than [`MAX_NESTING`](crate::MAX_NESTING) levels.
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
    /// The iterator has no current value: before the first `next`, or after the end or an error.
    #[error("no current value")]
    NoCurrentValue,
    /// The iterator's current array or object was already read to its end.
    #[error("container at offset {offset} was already consumed")]
    AlreadyConsumed { offset: usize },
    /// A typed accessor was used on a value of a different kind.
    #[error("expected {expected}, found {found}")]
    KindMismatch { expected: &'static str, found: Kind },
    /// A number that does not fit the requested numeric type, or is not of its form.
    #[error("number {0:?} cannot be represented as the requested type")]
    NumberOutOfRange(String),
    /// A string that is not one of the accepted boolean spellings.
    #[error("invalid boolean {0:?}")]
    InvalidBool(String),
    /// A string that is not a duration in unit-suffix form.
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
    /// A string that is not an RFC 3339 timestamp, or a number out of timestamp range.
    #[error("invalid time {0:?}")]
    InvalidTime(String),
}

impl ParseError {
    pub(crate) fn unexpected_token(token: &str, offset: usize) -> Self {
        ParseError::UnexpectedToken {
            token: token.to_owned(),
            offset,
        }
    }

    pub(crate) fn kind_mismatch(expected: &'static str, found: Kind) -> Self {
        ParseError::KindMismatch { expected, found }
    }

    /// Byte offset in the input where a syntax error was detected, if the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { offset, .. }
            | ParseError::TrailingContent { offset, .. }
            | ParseError::TrailingComma { offset, .. }
            | ParseError::ExpectedSeparator { offset, .. }
            | ParseError::ExpectedKey { offset, .. }
            | ParseError::ExpectedColon { offset, .. }
            | ParseError::MismatchedBracket { offset, .. }
            | ParseError::InvalidNumber { offset, .. }
            | ParseError::InvalidString { offset, .. }
            | ParseError::NestingTooDeep { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_token_and_offset() {
        let error = ParseError::unexpected_token("nul", 7);
        assert_eq!(error.to_string(), r#"invalid token "nul" at offset 7"#);
        assert_eq!(error.offset(), Some(7));
    }

    #[test]
    fn test_string_error_keeps_codec_cause() {
        let error = ParseError::InvalidString {
            token: r#""\x""#.to_owned(),
            offset: 3,
            source: Box::new(ParseError::InvalidEscapeSequence('x')),
        };
        let message = error.to_string();
        assert!(message.contains("offset 3"), "{message}");
        assert!(message.contains("'x'"), "{message}");
        match std::error::Error::source(&error) {
            Some(cause) => assert_eq!(cause.to_string(), "invalid escape character 'x'"),
            None => panic!("Expected a source error"),
        }
    }

    #[test]
    fn test_nesting_error_reports_offset() {
        let error = ParseError::NestingTooDeep {
            limit: 128,
            offset: 128,
        };
        assert_eq!(error.to_string(), "nesting deeper than 128 levels at offset 128");
        assert_eq!(error.offset(), Some(128));
        assert_eq!(ParseError::NoCurrentValue.offset(), None);
    }

    #[test]
    fn test_kind_mismatch_has_no_offset() {
        let error = ParseError::kind_mismatch("number", Kind::Array);
        assert_eq!(error.to_string(), "expected number, found array");
        assert_eq!(error.offset(), None);
    }
}
