// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use crate::convert;
use crate::escape_processor::{unquote, EscapeProcessor};
use crate::parser::Parser;
use crate::tokenizer::Tokenizer;
use crate::valid::check_scalar;
use crate::value::{Kind, Value};
use crate::ParseError;

#[cfg(feature = "time")]
use time::{Duration, OffsetDateTime};

/// Position inside a container relative to its separators.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    /// Right after the opening bracket.
    First,
    /// After an element; a comma or the closing bracket must follow.
    Separator,
    /// After a comma; another element must follow.
    Next,
}

/// One entry of the container stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Array(Slot),
    /// Inside an object, where a key (or the closing brace) comes next.
    ObjectKey(Slot),
    /// Inside an object, between a key's colon and its value.
    ObjectValue,
}

/// Outcome of reading one value-level token.
enum Step {
    /// A value was read and is now current.
    Value,
    /// The innermost container was closed.
    Closed,
    /// The input ended after a complete root value.
    End,
}

/// A pull cursor over a JSON document that never builds more than asked for.
///
/// [`next`](Iter::next) moves to the next value in document order, entering
/// arrays and objects. Scalars can be read with the typed readers, and the
/// current value (including a whole array or object) can be materialized with
/// [`value`](Iter::value).
///
/// [`array`](Iter::array) and [`object`](Iter::object) return walkers that
/// visit the children of the current container. Before moving to the next
/// child, a walker drains whatever the caller left unread of the previous one,
/// so a loop body may read only the fields it cares about.
///
/// ```
/// let mut it = jsonspan::iterate(r#"{"a": [1, 2], "b": {"x": 1}, "c": 3}"#);
/// assert!(it.next());
/// let mut fields = it.object().unwrap();
/// let mut c = None;
/// while let Some(key) = fields.next(&mut it).unwrap() {
///     if key == "c" {
///         c = Some(it.int().unwrap());
///     }
/// }
/// assert_eq!(c, Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    tokens: Tokenizer<'a>,
    token: &'a str,
    token_start: usize,
    kind: Kind,
    key: Option<Cow<'a, str>>,
    err: Option<ParseError>,
    frames: Vec<Frame>,
    root_done: bool,
    /// The current value is an array or object whose contents are unread.
    container_open: bool,
    /// A value is current: `next` returned true and nothing has ended or failed since.
    current: bool,
}

impl<'a> Iter<'a> {
    pub fn new(input: &'a str) -> Self {
        Iter {
            tokens: Tokenizer::new(input),
            token: "",
            token_start: 0,
            kind: Kind::Null,
            key: None,
            err: None,
            frames: Vec::new(),
            root_done: false,
            container_open: false,
            current: false,
        }
    }

    /// Restarts on new input, keeping the frame stack's allocation.
    pub fn reset(&mut self, input: &'a str) {
        self.tokens = Tokenizer::new(input);
        self.token = "";
        self.token_start = 0;
        self.kind = Kind::Null;
        self.key = None;
        self.err = None;
        self.frames.clear();
        self.root_done = false;
        self.container_open = false;
        self.current = false;
    }

    /// Kind of the current value; `Null` when there is none.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Key of the current value when it is an object field.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Number of open arrays and objects, counting the current value if it is one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The error that stopped the iteration, if any.
    pub fn err(&self) -> Option<&ParseError> {
        self.err.as_ref()
    }

    fn fail(&mut self, error: ParseError) -> ParseError {
        log::debug!("iteration failed: {error}");
        self.clear_current();
        self.err = Some(error.clone());
        error
    }

    fn clear_current(&mut self) {
        self.current = false;
        self.kind = Kind::Null;
        self.token = "";
        self.key = None;
        self.container_open = false;
    }

    fn check_err(&self) -> Result<(), ParseError> {
        match &self.err {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Fails with the stored error, or when no value is current.
    fn check_current(&self) -> Result<(), ParseError> {
        self.check_err()?;
        if self.current {
            Ok(())
        } else {
            Err(ParseError::NoCurrentValue)
        }
    }

    /// Advances to the next value in document order.
    ///
    /// Returns false at the end of the document or on error; see [`Iter::err`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }
        loop {
            match self.step() {
                Ok(Step::Value) => return true,
                Ok(Step::Closed) => continue,
                Ok(Step::End) => return false,
                Err(error) => {
                    self.fail(error);
                    return false;
                }
            }
        }
    }

    fn set_top(&mut self, frame: Frame) {
        if let Some(top) = self.frames.last_mut() {
            *top = frame;
        }
    }

    fn close(&mut self) {
        self.frames.pop();
        self.container_open = false;
    }

    fn separator_error(token: &str, offset: usize, closing: char) -> ParseError {
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

    /// Reads tokens until a value is current or a container closes.
    fn step(&mut self) -> Result<Step, ParseError> {
        loop {
            let frame = self.frames.last().copied();
            let Some(token) = self.tokens.next() else {
                return match frame {
                    None => {
                        self.clear_current();
                        Ok(Step::End)
                    }
                    Some(Frame::Array(_)) => Err(ParseError::UnexpectedEnd { context: "array" }),
                    Some(_) => Err(ParseError::UnexpectedEnd { context: "object" }),
                };
            };
            let offset = self.tokens.token_start();
            let first = token.as_bytes()[0];

            match frame {
                None if self.root_done => {
                    return Err(ParseError::TrailingContent {
                        token: token.to_owned(),
                        offset,
                    });
                }
                None => {
                    self.root_done = true;
                    self.key = None;
                }
                Some(Frame::Array(slot)) => match (first, slot) {
                    (b']', Slot::First | Slot::Separator) => {
                        self.close();
                        return Ok(Step::Closed);
                    }
                    (b']' | b'}', Slot::Next) => {
                        return Err(ParseError::TrailingComma {
                            token: token.to_owned(),
                            offset,
                        });
                    }
                    (b',', Slot::Separator) => {
                        self.set_top(Frame::Array(Slot::Next));
                        continue;
                    }
                    (_, Slot::Separator) => return Err(Self::separator_error(token, offset, ']')),
                    _ => {
                        self.set_top(Frame::Array(Slot::Separator));
                        self.key = None;
                    }
                },
                Some(Frame::ObjectKey(slot)) => {
                    match (first, slot) {
                        (b'}', Slot::First | Slot::Separator) => {
                            self.close();
                            return Ok(Step::Closed);
                        }
                        (b'}', Slot::Next) => {
                            return Err(ParseError::TrailingComma {
                                token: token.to_owned(),
                                offset,
                            });
                        }
                        (b',', Slot::Separator) => {
                            self.set_top(Frame::ObjectKey(Slot::Next));
                            continue;
                        }
                        (_, Slot::Separator) => {
                            return Err(Self::separator_error(token, offset, '}'));
                        }
                        (b'"', _) => {}
                        _ => {
                            return Err(ParseError::ExpectedKey {
                                token: token.to_owned(),
                                offset,
                            });
                        }
                    }
                    check_scalar(token, offset, EscapeProcessor::check_literal)?;
                    let key = unquote(token)?;
                    match self.tokens.next() {
                        Some(":") => {}
                        Some(other) => {
                            return Err(ParseError::ExpectedColon {
                                key: key.into_owned(),
                                token: other.to_owned(),
                                offset: self.tokens.token_start(),
                            });
                        }
                        None => return Err(ParseError::UnexpectedEnd { context: "object" }),
                    }
                    self.key = Some(key);
                    self.set_top(Frame::ObjectValue);
                    continue;
                }
                Some(Frame::ObjectValue) => self.set_top(Frame::ObjectKey(Slot::Separator)),
            }

            self.accept(token, offset)?;
            return Ok(Step::Value);
        }
    }

    /// Makes `token` the current value, entering it if it is a container.
    fn accept(&mut self, token: &'a str, offset: usize) -> Result<(), ParseError> {
        let kind = match token.as_bytes()[0] {
            b'[' => {
                self.frames.push(Frame::Array(Slot::First));
                Kind::Array
            }
            b'{' => {
                self.frames.push(Frame::ObjectKey(Slot::First));
                Kind::Object
            }
            first => {
                check_scalar(token, offset, EscapeProcessor::check_literal)?;
                match first {
                    b'n' => Kind::Null,
                    b't' => Kind::True,
                    b'f' => Kind::False,
                    b'"' => Kind::String,
                    _ => Kind::Number,
                }
            }
        };
        self.kind = kind;
        self.token = token;
        self.token_start = offset;
        self.container_open = matches!(kind, Kind::Array | Kind::Object);
        self.current = true;
        Ok(())
    }

    /// Materializes the current value.
    ///
    /// For an array or object this parses the rest of it, so the iterator
    /// continues after its closing bracket.
    /// The subtree may nest at most [`MAX_NESTING`](crate::MAX_NESTING) levels.
    pub fn value(&mut self) -> Result<Value<'a>, ParseError> {
        self.check_current()?;
        match self.kind {
            Kind::Array | Kind::Object if self.container_open => {
                self.close();
                let open = self.token.as_bytes()[0];
                let parsed = Parser::new(&mut self.tokens).parse_container(open, self.token_start, 0);
                parsed.map_err(|error| self.fail(error))
            }
            Kind::Array | Kind::Object => Err(ParseError::AlreadyConsumed {
                offset: self.token_start,
            }),
            _ => Parser::scalar(self.token, self.token_start),
        }
    }

    /// The current scalar as a value, for the typed readers.
    fn scalar(&self, expected: &'static str) -> Result<Value<'a>, ParseError> {
        self.check_current()?;
        Ok(match self.kind {
            Kind::Null => Value::Null,
            Kind::True => Value::True,
            Kind::False => Value::False,
            Kind::Number => Value::Number(self.token),
            Kind::String => Value::String(self.token),
            kind => return Err(ParseError::kind_mismatch(expected, kind)),
        })
    }

    /// Returns true if the current value is `null`.
    pub fn null(&self) -> bool {
        self.current && self.kind == Kind::Null
    }

    /// Reads a boolean; strings holding `1 t T TRUE true True` (or the false
    /// counterparts) are accepted too.
    pub fn bool(&self) -> Result<bool, ParseError> {
        convert::to_bool(&self.scalar("bool")?)
    }

    /// Reads an integer from a number or a string holding one.
    pub fn int(&self) -> Result<i64, ParseError> {
        convert::to_i64(&self.scalar("int")?)
    }

    pub fn uint(&self) -> Result<u64, ParseError> {
        convert::to_u64(&self.scalar("uint")?)
    }

    pub fn float(&self) -> Result<f64, ParseError> {
        convert::to_f64(&self.scalar("float")?)
    }

    /// Reads a decoded string. Only strings (and `null`) are accepted.
    pub fn string(&self) -> Result<Cow<'a, str>, ParseError> {
        convert::to_string(&self.scalar("string")?)
    }

    /// Reads a duration: numbers are seconds, strings look like `1h30m`.
    #[cfg(feature = "time")]
    pub fn duration(&self) -> Result<Duration, ParseError> {
        convert::to_duration(&self.scalar("duration")?)
    }

    /// Reads a UTC timestamp: numbers are Unix seconds, strings are RFC 3339.
    /// `null` reads as the Unix epoch.
    #[cfg(feature = "time")]
    pub fn time(&self) -> Result<OffsetDateTime, ParseError> {
        convert::to_time(&self.scalar("time")?)
    }

    fn walk_depth(&self, expected: Kind) -> Result<Option<usize>, ParseError> {
        self.check_current()?;
        if self.kind == Kind::Null {
            return Ok(None);
        }
        if self.kind != expected {
            return Err(ParseError::kind_mismatch(expected.as_str(), self.kind));
        }
        if !self.container_open {
            return Err(ParseError::AlreadyConsumed {
                offset: self.token_start,
            });
        }
        Ok(Some(self.frames.len()))
    }

    /// Returns a walker over the elements of the current array.
    ///
    /// A `null` is walked as an empty array; other kinds are an error.
    pub fn array(&self) -> Result<ArrayWalk, ParseError> {
        Ok(ArrayWalk {
            walk: Walk::new(self.walk_depth(Kind::Array)?),
            index: 0,
        })
    }

    /// Returns a walker over the fields of the current object.
    ///
    /// A `null` is walked as an empty object; other kinds are an error.
    pub fn object(&self) -> Result<ObjectWalk, ParseError> {
        Ok(ObjectWalk {
            walk: Walk::new(self.walk_depth(Kind::Object)?),
        })
    }
}

/// Shared state of the array and object walkers.
#[derive(Debug, Clone)]
struct Walk {
    /// Stack depth of the walked container; `None` once finished.
    depth: Option<usize>,
}

impl Walk {
    fn new(depth: Option<usize>) -> Self {
        Walk { depth }
    }

    /// Moves `it` to the next child of the walked container.
    ///
    /// Returns false once the container's closing bracket has been read.
    fn advance(&mut self, it: &mut Iter<'_>) -> Result<bool, ParseError> {
        let Some(depth) = self.depth else {
            return Ok(false);
        };
        it.check_err()?;
        if it.frames.len() > depth {
            log::trace!("skipping unread child at offset {}", it.token_start);
        }
        while it.frames.len() > depth {
            match it.step() {
                Ok(Step::Value | Step::Closed) => {}
                Ok(Step::End) => break,
                Err(error) => return Err(it.fail(error)),
            }
        }
        if it.frames.len() < depth {
            self.depth = None;
            return Ok(false);
        }
        match it.step() {
            Ok(Step::Value) => Ok(true),
            Ok(Step::Closed | Step::End) => {
                self.depth = None;
                Ok(false)
            }
            Err(error) => Err(it.fail(error)),
        }
    }
}

/// Walks the elements of an array; see [`Iter::array`].
#[derive(Debug, Clone)]
pub struct ArrayWalk {
    walk: Walk,
    index: usize,
}

impl ArrayWalk {
    /// Moves to the next element and returns its index, or `None` after the last one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, it: &mut Iter<'_>) -> Result<Option<usize>, ParseError> {
        if !self.walk.advance(it)? {
            return Ok(None);
        }
        let index = self.index;
        self.index += 1;
        Ok(Some(index))
    }
}

/// Walks the fields of an object; see [`Iter::object`].
#[derive(Debug, Clone)]
pub struct ObjectWalk {
    walk: Walk,
}

impl ObjectWalk {
    /// Moves to the next field's value and returns its key, or `None` after the last one.
    #[allow(clippy::should_implement_trait)]
    pub fn next<'a>(&mut self, it: &mut Iter<'a>) -> Result<Option<Cow<'a, str>>, ParseError> {
        if !self.walk.advance(it)? {
            return Ok(None);
        }
        Ok(it.key.clone())
    }
}
