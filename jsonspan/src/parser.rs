// SPDX-License-Identifier: Apache-2.0

use crate::escape_processor::{unquote, EscapeProcessor};
use crate::tokenizer::Tokenizer;
use crate::valid::{check_scalar, skip_container};
use crate::value::{Array, Field, Object, Value};
use crate::ParseError;

/// Deepest nesting of arrays and objects [`parse`] and [`parse_max_depth`] accept.
///
/// Counts every container, deferred ones included, so trees built from a
/// parsed document stay within this depth. [`valid`](crate::valid) and the
/// iterator walk deeper documents without a limit.
pub const MAX_NESTING: usize = 128;

/// A recursive-descent parser building [`Value`] trees from a token stream.
///
/// The parser borrows a [`Tokenizer`] so that callers holding one (such as
/// the streaming iterator) can hand over the rest of a subtree and continue
/// scanning where the parser stopped.
///
/// Lifetime 't is the tokenizer borrow, 'a is the input text lifetime.
pub struct Parser<'t, 'a> {
    tokens: &'t mut Tokenizer<'a>,
    /// Objects nested this deep (not counting arrays) are captured unparsed.
    max_depth: Option<usize>,
    /// Containers currently open, arrays included.
    nesting: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    /// Creates a parser that builds the complete tree.
    ///
    /// # Example
    /// ```
    /// use jsonspan::{Parser, Tokenizer};
    ///
    /// let mut tokens = Tokenizer::new("[1, 2] [3]");
    /// let first = Parser::new(&mut tokens).parse_value().unwrap();
    /// assert_eq!(first.len().unwrap(), 2);
    /// assert_eq!(tokens.next(), Some("["));
    /// ```
    pub fn new(tokens: &'t mut Tokenizer<'a>) -> Self {
        Parser {
            tokens,
            max_depth: None,
            nesting: 0,
        }
    }

    /// Creates a parser that defers objects nested `max_depth` or more objects deep.
    ///
    /// # Arguments
    /// * `tokens` - The token stream to read from.
    /// * `max_depth` - Number of object levels to parse eagerly; `0` defers the root object.
    pub fn with_max_depth(tokens: &'t mut Tokenizer<'a>, max_depth: usize) -> Self {
        Parser {
            tokens,
            max_depth: Some(max_depth),
            nesting: 0,
        }
    }

    /// Parses one complete value from the token stream.
    pub fn parse_value(&mut self) -> Result<Value<'a>, ParseError> {
        let token = self
            .tokens
            .next()
            .ok_or(ParseError::UnexpectedEnd { context: "value" })?;
        self.parse_token(token, 0)
    }

    /// Parses a value that must make up the whole input.
    fn parse_document(&mut self) -> Result<Value<'a>, ParseError> {
        let token = self.tokens.next().ok_or(ParseError::EmptyInput)?;
        let value = self.parse_token(token, 0)?;
        if let Some(extra) = self.tokens.next() {
            return Err(ParseError::TrailingContent {
                token: extra.to_owned(),
                offset: self.tokens.token_start(),
            });
        }
        Ok(value)
    }

    /// Builds a scalar value from a token already checked against the grammar.
    pub(crate) fn scalar(token: &'a str, offset: usize) -> Result<Value<'a>, ParseError> {
        check_scalar(token, offset, EscapeProcessor::check_literal)?;
        Ok(match token.as_bytes()[0] {
            b'n' => Value::Null,
            b't' => Value::True,
            b'f' => Value::False,
            b'"' => Value::String(token),
            _ => Value::Number(token),
        })
    }

    /// Parses the value starting with `token`, which the tokenizer just returned.
    fn parse_token(&mut self, token: &'a str, depth: usize) -> Result<Value<'a>, ParseError> {
        let start = self.tokens.token_start();
        match token.as_bytes()[0] {
            open @ (b'[' | b'{') => self.parse_container(open, start, depth),
            _ => Self::scalar(token, start),
        }
    }

    /// Parses the rest of an array or object whose opening bracket `open` at
    /// byte offset `start` has already been consumed.
    pub(crate) fn parse_container(
        &mut self,
        open: u8,
        start: usize,
        depth: usize,
    ) -> Result<Value<'a>, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                offset: start,
            });
        }
        self.nesting += 1;
        let value = self.parse_open_container(open, start, depth);
        self.nesting -= 1;
        value
    }

    fn parse_open_container(
        &mut self,
        open: u8,
        start: usize,
        depth: usize,
    ) -> Result<Value<'a>, ParseError> {
        if open == b'[' {
            return self.parse_array(start, depth);
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            let room = MAX_NESTING - self.nesting + 1;
            skip_container(self.tokens, b'{', EscapeProcessor::check_literal, room)?;
            let raw = self.tokens.span_from(start);
            log::trace!("deferring object at offset {start} ({} bytes)", raw.len());
            return Ok(Value::Object(Object::deferred(raw)));
        }
        let fields = self.parse_fields(depth)?;
        Ok(Value::Object(Object::new(self.tokens.span_from(start), fields)))
    }

    fn next_in(&mut self, context: &'static str) -> Result<&'a str, ParseError> {
        self.tokens
            .next()
            .ok_or(ParseError::UnexpectedEnd { context })
    }

    fn parse_array(&mut self, start: usize, depth: usize) -> Result<Value<'a>, ParseError> {
        let mut elements = Vec::new();
        let mut token = self.next_in("array")?;
        if token != "]" {
            loop {
                elements.push(self.parse_token(token, depth)?);
                let separator = self.next_in("array")?;
                match separator {
                    "]" => break,
                    "," => {}
                    _ => return Err(self.bad_separator(separator, ']')),
                }
                token = self.next_in("array")?;
                if token == "]" || token == "}" {
                    return Err(ParseError::TrailingComma {
                        token: token.to_owned(),
                        offset: self.tokens.token_start(),
                    });
                }
            }
        }
        Ok(Value::Array(Array::new(self.tokens.span_from(start), elements)))
    }

    /// Parses `key: value` pairs up to the closing brace, in document order.
    fn parse_fields(&mut self, depth: usize) -> Result<Vec<Field<'a>>, ParseError> {
        let mut fields = Vec::new();
        let mut token = self.next_in("object")?;
        if token == "}" {
            return Ok(fields);
        }
        loop {
            let offset = self.tokens.token_start();
            if !token.starts_with('"') {
                return Err(ParseError::ExpectedKey {
                    token: token.to_owned(),
                    offset,
                });
            }
            check_scalar(token, offset, EscapeProcessor::check_literal)?;
            let key = unquote(token)?;

            let colon = self.next_in("object")?;
            if colon != ":" {
                return Err(ParseError::ExpectedColon {
                    key: key.into_owned(),
                    token: colon.to_owned(),
                    offset: self.tokens.token_start(),
                });
            }
            let value_token = self.next_in("object")?;
            let value = self.parse_token(value_token, depth + 1)?;
            fields.push(Field { key, value });

            let separator = self.next_in("object")?;
            match separator {
                "}" => return Ok(fields),
                "," => {}
                _ => return Err(self.bad_separator(separator, '}')),
            }
            token = self.next_in("object")?;
            if token == "}" {
                return Err(ParseError::TrailingComma {
                    token: token.to_owned(),
                    offset: self.tokens.token_start(),
                });
            }
        }
    }

    fn bad_separator(&self, token: &str, closing: char) -> ParseError {
        let offset = self.tokens.token_start();
        if token == "]" || token == "}" {
            ParseError::MismatchedBracket {
                token: token.to_owned(),
                offset,
            }
        } else {
            ParseError::ExpectedSeparator {
                closing,
                token: token.to_owned(),
                offset,
            }
        }
    }
}

/// Parses the fields of a deferred object's captured text, one level deep.
///
/// Nested objects are deferred again so each level is parsed only when reached.
pub(crate) fn parse_deferred_object(raw: &str) -> Result<Vec<Field<'_>>, ParseError> {
    let mut tokens = Tokenizer::new(raw);
    match tokens.next() {
        Some("{") => Parser::with_max_depth(&mut tokens, 1).parse_fields(0),
        Some(token) => Err(ParseError::unexpected_token(token, tokens.token_start())),
        None => Err(ParseError::UnexpectedEnd { context: "object" }),
    }
}

/// Parses a complete JSON document.
///
/// The input must hold exactly one value; empty input and trailing content
/// are errors. Documents nested deeper than [`MAX_NESTING`] fail with
/// [`ParseError::NestingTooDeep`]. The returned value borrows from `input`.
///
/// ```
/// let value = jsonspan::parse("[1,2,3]").unwrap();
/// assert_eq!(value.len().unwrap(), 3);
/// assert_eq!(value.get(1).unwrap().unwrap().as_i64().unwrap(), 2);
///
/// assert!(jsonspan::parse(r#"{"a":1,}"#).is_err());
/// ```
pub fn parse(input: &str) -> Result<Value<'_>, ParseError> {
    let mut tokens = Tokenizer::new(input);
    Parser::new(&mut tokens)
        .parse_document()
        .inspect_err(|error| log::debug!("parse failed: {error}"))
}

/// Parses a document, deferring objects nested `max_depth` or more objects deep.
///
/// Arrays do not count toward the depth. Deferred objects keep only their
/// source text until their fields are first needed; the grammar of the whole
/// document is still checked up front.
///
/// ```
/// let value = jsonspan::parse_max_depth(r#"{"a": {"b": 2}}"#, 1).unwrap();
/// let a = value.lookup("a").unwrap().unwrap();
/// assert_eq!(a.json(), r#"{"b": 2}"#);
/// assert_eq!(a.lookup("b").unwrap().unwrap().as_i64().unwrap(), 2);
/// ```
pub fn parse_max_depth(input: &str, max_depth: usize) -> Result<Value<'_>, ParseError> {
    let mut tokens = Tokenizer::new(input);
    Parser::with_max_depth(&mut tokens, max_depth)
        .parse_document()
        .inspect_err(|error| log::debug!("parse failed: {error}"))
}
