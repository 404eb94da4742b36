// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use crate::escape_processor::{append_quote, unquote};
use crate::json_number::{self, number_type_of, NumberType};
use crate::parser::parse_deferred_object;
use crate::ParseError;

/// Objects with at most this many fields are searched linearly.
const LINEAR_LOOKUP_MAX: usize = 16;

/// The type of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    True,
    False,
    Number,
    String,
    Object,
    Array,
}

impl Kind {
    /// Lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::True => "true",
            Kind::False => "false",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Object => "object",
            Kind::Array => "array",
        }
    }

    /// Returns true for `True` and `False`.
    pub fn is_bool(self) -> bool {
        matches!(self, Kind::True | Kind::False)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed JSON value borrowing from the input text.
///
/// Scalars keep their exact source text. Containers own their children and
/// remember the span of input they were parsed from, so [`Value::append_to`]
/// reproduces the source byte for byte without walking the tree.
///
/// Values are immutable and `Send + Sync`.
///
/// # Example
/// ```
/// let value = jsonspan::parse(r#"{"name": "jsonspan", "tags": ["fast", "lazy"]}"#).unwrap();
/// let tags = value.lookup("tags").unwrap().unwrap();
/// assert_eq!(tags.len().unwrap(), 2);
/// assert_eq!(tags.get(1).unwrap().unwrap().as_str().unwrap(), "lazy");
/// ```
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Null,
    True,
    False,
    /// Raw numeric text, never pre-converted.
    Number(&'a str),
    /// Raw string literal including its quotes.
    String(&'a str),
    Array(Array<'a>),
    Object(Object<'a>),
}

/// A key/value pair of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// The decoded key.
    pub key: Cow<'a, str>,
    pub value: Value<'a>,
}

/// Elements of a JSON array plus the source text they came from.
#[derive(Debug, Clone)]
pub struct Array<'a> {
    raw: &'a str,
    elements: Vec<Value<'a>>,
}

impl<'a> Array<'a> {
    pub(crate) fn new(raw: &'a str, elements: Vec<Value<'a>>) -> Self {
        Array { raw, elements }
    }

    /// The exact source text, brackets and whitespace included.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn elements(&self) -> &[Value<'a>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value<'a>> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value<'a>> {
        self.elements.iter()
    }
}

impl PartialEq for Array<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<'a, 'v> IntoIterator for &'v Array<'a> {
    type Item = &'v Value<'a>;
    type IntoIter = std::slice::Iter<'v, Value<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Fields of a JSON object, sorted by key, plus the source text.
///
/// An object produced by depth-limited parsing may be deferred: it only holds
/// its source text until a structural accessor needs the fields. The text of a
/// deferred object is validated when it is captured, so the later parse does
/// not fail for documents accepted by [`parse_max_depth`](crate::parse_max_depth).
#[derive(Debug, Clone)]
pub struct Object<'a> {
    raw: &'a str,
    fields: OnceLock<Vec<Field<'a>>>,
}

impl<'a> Object<'a> {
    /// Builds an object from fields in document order.
    pub(crate) fn new(raw: &'a str, mut fields: Vec<Field<'a>>) -> Self {
        // Stable, so duplicate keys keep their document order.
        fields.sort_by(|a, b| a.key.cmp(&b.key));
        Object {
            raw,
            fields: OnceLock::from(fields),
        }
    }

    /// Builds a placeholder that parses `raw` on first structural access.
    pub(crate) fn deferred(raw: &'a str) -> Self {
        Object {
            raw,
            fields: OnceLock::new(),
        }
    }

    /// The exact source text, braces and whitespace included.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Returns true while the fields have not been parsed yet.
    pub fn is_deferred(&self) -> bool {
        self.fields.get().is_none()
    }

    /// Fields sorted by key, parsing a deferred object on first use.
    pub fn fields(&self) -> Result<&[Field<'a>], ParseError> {
        if let Some(fields) = self.fields.get() {
            return Ok(fields);
        }
        log::trace!("parsing deferred object of {} bytes", self.raw.len());
        let parsed = parse_deferred_object(self.raw)?;
        Ok(self.fields.get_or_init(|| parsed))
    }

    pub fn len(&self) -> Result<usize, ParseError> {
        Ok(self.fields()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ParseError> {
        Ok(self.fields()?.is_empty())
    }

    /// Finds the value of the first field named `key`.
    ///
    /// Small objects are scanned in order; larger ones are binary searched.
    /// Either way, the first of several duplicate keys is returned.
    pub fn lookup(&self, key: &str) -> Result<Option<&Value<'a>>, ParseError> {
        let fields = self.fields()?;
        let found = if fields.len() <= LINEAR_LOOKUP_MAX {
            fields.iter().find(|field| field.key == key)
        } else {
            let index = fields.partition_point(|field| &*field.key < key);
            fields.get(index).filter(|field| field.key == key)
        };
        Ok(found.map(|field| &field.value))
    }
}

impl PartialEq for Object<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.fields(), other.fields()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::True => Kind::True,
            Value::False => Kind::False,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The exact JSON text of this value.
    ///
    /// Never parses a deferred object.
    pub fn json(&self) -> &'a str {
        match self {
            Value::Null => "null",
            Value::True => "true",
            Value::False => "false",
            Value::Number(raw) | Value::String(raw) => *raw,
            Value::Array(array) => array.raw,
            Value::Object(object) => object.raw,
        }
    }

    /// Appends the exact JSON text of this value to `out`.
    pub fn append_to(&self, out: &mut String) {
        out.push_str(self.json());
    }

    /// Appends a whitespace-free rendering rebuilt from the parsed structure.
    ///
    /// Keys are re-quoted, so escapes in keys come out in canonical form;
    /// numbers and string values keep their source text.
    pub fn compact_to(&self, out: &mut String) -> Result<(), ParseError> {
        match self {
            Value::Array(array) => {
                out.push('[');
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    element.compact_to(out)?;
                }
                out.push(']');
            }
            Value::Object(object) => {
                out.push('{');
                for (i, field) in object.fields()?.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    append_quote(out, &field.key);
                    out.push(':');
                    field.value.compact_to(out)?;
                }
                out.push('}');
            }
            scalar => scalar.append_to(out),
        }
        Ok(())
    }

    /// Returns the compact rendering as a new string.
    pub fn compact(&self) -> Result<String, ParseError> {
        let mut out = String::with_capacity(self.json().len());
        self.compact_to(&mut out)?;
        Ok(out)
    }

    fn mismatch<T>(&self, expected: &'static str) -> Result<T, ParseError> {
        Err(ParseError::kind_mismatch(expected, self.kind()))
    }

    /// Number of elements or fields, or the byte length of a string literal
    /// without its quotes or of a number's digits.
    pub fn len(&self) -> Result<usize, ParseError> {
        match self {
            Value::Array(array) => Ok(array.len()),
            Value::Object(object) => object.len(),
            Value::String(raw) => Ok(raw.len().saturating_sub(2)),
            Value::Number(raw) => Ok(raw.len()),
            _ => self.mismatch("array, object, string or number"),
        }
    }

    pub fn is_empty(&self) -> Result<bool, ParseError> {
        Ok(self.len()? == 0)
    }

    /// The elements of an array.
    pub fn array(&self) -> Result<&[Value<'a>], ParseError> {
        match self {
            Value::Array(array) => Ok(&array.elements),
            _ => self.mismatch("array"),
        }
    }

    /// The array element at `index`.
    pub fn get(&self, index: usize) -> Result<Option<&Value<'a>>, ParseError> {
        Ok(self.array()?.get(index))
    }

    /// The fields of an object, sorted by key.
    pub fn fields(&self) -> Result<&[Field<'a>], ParseError> {
        match self {
            Value::Object(object) => object.fields(),
            _ => self.mismatch("object"),
        }
    }

    /// Looks up a field of an object by key. See [`Object::lookup`].
    pub fn lookup(&self, key: &str) -> Result<Option<&Value<'a>>, ParseError> {
        match self {
            Value::Object(object) => object.lookup(key),
            _ => self.mismatch("object"),
        }
    }

    fn number(&self) -> Result<&'a str, ParseError> {
        match self {
            Value::Number(raw) => Ok(*raw),
            _ => self.mismatch("number"),
        }
    }

    pub fn number_type(&self) -> Result<NumberType, ParseError> {
        Ok(number_type_of(self.number()?))
    }

    pub fn as_i64(&self) -> Result<i64, ParseError> {
        json_number::to_i64(self.number()?)
    }

    pub fn as_u64(&self) -> Result<u64, ParseError> {
        json_number::to_u64(self.number()?)
    }

    pub fn as_f64(&self) -> Result<f64, ParseError> {
        json_number::to_f64(self.number()?)
    }

    /// The decoded content of a string, borrowed when it has no escapes.
    pub fn as_str(&self) -> Result<Cow<'a, str>, ParseError> {
        match self {
            Value::String(raw) => unquote(*raw),
            _ => self.mismatch("string"),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ParseError> {
        match self {
            Value::True => Ok(true),
            Value::False => Ok(false),
            _ => self.mismatch("bool"),
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null)
            | (Value::True, Value::True)
            | (Value::False, Value::False) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => {
                a == b || matches!((unquote(a), unquote(b)), (Ok(a), Ok(b)) if a == b)
            }
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json())
    }
}
