// SPDX-License-Identifier: Apache-2.0

//! Grammar checking without building values.
//!
//! The same walker validates whole documents for [`valid`] and captures
//! deferred objects for depth-limited parsing, where it also has to confirm
//! that the captured text will parse later.

use crate::escape_processor::EscapeProcessor;
use crate::json_number::is_valid_number;
use crate::tokenizer::Tokenizer;
use crate::ParseError;

/// Checks a string literal token, returning the codec error on failure.
pub(crate) type StringCheck = fn(&str) -> Result<(), ParseError>;

/// Literal check matching standard validators: escapes must be well formed but
/// `\u` surrogates are not paired up.
pub(crate) fn check_literal_unpaired(literal: &str) -> Result<(), ParseError> {
    let content = EscapeProcessor::literal_content(literal)?;
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let escape_char = *bytes.get(i + 1).ok_or(ParseError::UnterminatedEscape)?;
                if escape_char == b'u' {
                    let hex = bytes.get(i + 2..i + 6).ok_or(ParseError::InvalidUnicodeHex)?;
                    EscapeProcessor::parse_hex4(hex)?;
                    i += 6;
                } else {
                    EscapeProcessor::process_simple_escape(escape_char)?;
                    i += 2;
                }
            }
            control if control < 0x20 => return Err(ParseError::ControlCharacter(control)),
            _ => i += 1,
        }
    }
    Ok(())
}

/// Checks a token that is not a container opener: a literal, a string or a number.
pub(crate) fn check_scalar(
    token: &str,
    offset: usize,
    check_string: StringCheck,
) -> Result<(), ParseError> {
    match token.as_bytes().first() {
        Some(b'n') if token == "null" => Ok(()),
        Some(b't') if token == "true" => Ok(()),
        Some(b'f') if token == "false" => Ok(()),
        Some(b'"') => check_string(token).map_err(|source| ParseError::InvalidString {
            token: token.to_owned(),
            offset,
            source: Box::new(source),
        }),
        Some(b'-' | b'0'..=b'9') => {
            if is_valid_number(token.as_bytes()) {
                Ok(())
            } else {
                Err(ParseError::InvalidNumber {
                    token: token.to_owned(),
                    offset,
                })
            }
        }
        _ => Err(ParseError::unexpected_token(token, offset)),
    }
}

/// What the walker accepts next.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    /// First array element, or `]`.
    ElementOrClose,
    /// Array element after a comma.
    Element,
    /// Object value after a colon.
    Value,
    /// First object key, or `}`.
    KeyOrClose,
    /// Object key after a comma.
    Key,
    /// The colon after `key`.
    Colon,
    /// `,` or the closing bracket of the innermost container.
    SeparatorOrClose,
}

fn container_name(closer: u8) -> &'static str {
    if closer == b']' {
        "array"
    } else {
        "object"
    }
}

/// Consumes the rest of a container whose opening bracket `open` has just been
/// read from `tokens`, checking the grammar of everything inside it.
///
/// On success the tokenizer sits just past the matching closing bracket.
/// At most `max_nesting` containers, the opening one included, may be open at once.
pub(crate) fn skip_container(
    tokens: &mut Tokenizer<'_>,
    open: u8,
    check_string: StringCheck,
    max_nesting: usize,
) -> Result<(), ParseError> {
    let (mut closers, mut expect) = match open {
        b'[' => (vec![b']'], Expect::ElementOrClose),
        _ => (vec![b'}'], Expect::KeyOrClose),
    };
    let mut key = "";

    while let Some(&closer) = closers.last() {
        let token = tokens.next().ok_or(ParseError::UnexpectedEnd {
            context: container_name(closer),
        })?;
        let offset = tokens.token_start();
        let first = token.as_bytes()[0];

        expect = match expect {
            Expect::ElementOrClose | Expect::KeyOrClose if first == closer => {
                closers.pop();
                Expect::SeparatorOrClose
            }
            Expect::Element if first == b']' || first == b'}' => {
                return Err(ParseError::TrailingComma {
                    token: token.to_owned(),
                    offset,
                });
            }
            Expect::ElementOrClose | Expect::Element | Expect::Value => match first {
                b'[' | b'{' if closers.len() >= max_nesting => {
                    return Err(ParseError::NestingTooDeep {
                        limit: crate::MAX_NESTING,
                        offset,
                    });
                }
                b'[' => {
                    closers.push(b']');
                    Expect::ElementOrClose
                }
                b'{' => {
                    closers.push(b'}');
                    Expect::KeyOrClose
                }
                _ => {
                    check_scalar(token, offset, check_string)?;
                    Expect::SeparatorOrClose
                }
            },
            Expect::Key if first == b'}' => {
                return Err(ParseError::TrailingComma {
                    token: token.to_owned(),
                    offset,
                });
            }
            Expect::KeyOrClose | Expect::Key => {
                if first != b'"' {
                    return Err(ParseError::ExpectedKey {
                        token: token.to_owned(),
                        offset,
                    });
                }
                check_scalar(token, offset, check_string)?;
                key = token;
                Expect::Colon
            }
            Expect::Colon => {
                if token != ":" {
                    return Err(ParseError::ExpectedColon {
                        key: key.to_owned(),
                        token: token.to_owned(),
                        offset,
                    });
                }
                Expect::Value
            }
            Expect::SeparatorOrClose => match first {
                b',' if closer == b']' => Expect::Element,
                b',' => Expect::Key,
                _ if first == closer => {
                    closers.pop();
                    Expect::SeparatorOrClose
                }
                b']' | b'}' => {
                    return Err(ParseError::MismatchedBracket {
                        token: token.to_owned(),
                        offset,
                    });
                }
                _ => {
                    return Err(ParseError::ExpectedSeparator {
                        closing: char::from(closer),
                        token: token.to_owned(),
                        offset,
                    });
                }
            },
        };
    }
    Ok(())
}

/// Consumes and checks exactly one value from `tokens`.
pub(crate) fn skip_value(
    tokens: &mut Tokenizer<'_>,
    check_string: StringCheck,
) -> Result<(), ParseError> {
    let token = tokens
        .next()
        .ok_or(ParseError::UnexpectedEnd { context: "value" })?;
    match token.as_bytes()[0] {
        open @ (b'[' | b'{') => skip_container(tokens, open, check_string, usize::MAX),
        _ => check_scalar(token, tokens.token_start(), check_string),
    }
}

/// Reports whether `input` is a single well-formed JSON value, optionally
/// surrounded by whitespace.
///
/// Like standard validators, `\u` escapes are checked for hex digits but
/// surrogate halves are not paired up, so `"\ud800"` is valid here even though
/// [`parse`](crate::parse) rejects it.
///
/// ```
/// assert!(jsonspan::valid(r#"{"a": [1, 2.5e3, null]}"#));
/// assert!(!jsonspan::valid("[01]"));
/// assert!(!jsonspan::valid("1 2"));
/// assert!(!jsonspan::valid("  "));
/// ```
pub fn valid(input: &str) -> bool {
    let mut tokens = Tokenizer::new(input);
    match skip_value(&mut tokens, check_literal_unpaired) {
        Ok(()) => tokens.is_exhausted(),
        Err(error) => {
            log::debug!("invalid JSON: {error}");
            false
        }
    }
}
