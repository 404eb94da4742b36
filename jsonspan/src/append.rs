// SPDX-License-Identifier: Apache-2.0

//! Writing JSON text into a `String`.
//!
//! Container appenders take the items to write and a function that appends
//! one item, so nested structures compose from closures:
//!
//! ```
//! use jsonspan::append::{append_array, append_int, append_object};
//!
//! let rows = [("a", vec![1, 2]), ("b", vec![])];
//! let mut out = String::new();
//! append_object(&mut out, rows, |out, row| append_array(out, row, append_int));
//! assert_eq!(out, r#"{"a":[1,2],"b":[]}"#);
//! ```

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::escape_processor::append_quote;

#[cfg(feature = "time")]
use crate::ParseError;
#[cfg(feature = "time")]
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Two spaces per nesting level.
pub fn indent(level: usize) -> Cow<'static, str> {
    const SPACES: &str = "                                ";
    match SPACES.get(..2 * level) {
        Some(spaces) => Cow::Borrowed(spaces),
        None => Cow::Owned(" ".repeat(2 * level)),
    }
}

/// Appends `[` items `]`, writing each item with `append`.
pub fn append_array<T, F>(out: &mut String, items: impl IntoIterator<Item = T>, mut append: F)
where
    F: FnMut(&mut String, T),
{
    out.push('[');
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        append(out, item);
    }
    out.push(']');
}

/// Appends an array with one element per line.
///
/// `level` is the nesting depth of the array itself; elements are indented
/// with `indent(level + 1)`. An empty array is written as `[]`.
pub fn append_indent_array<T, F, I, S>(
    out: &mut String,
    items: impl IntoIterator<Item = T>,
    mut append: F,
    level: usize,
    indent: I,
) where
    F: FnMut(&mut String, T),
    I: Fn(usize) -> S,
    S: AsRef<str>,
{
    out.push('[');
    let mut written = 0;
    for item in items {
        if written > 0 {
            out.push(',');
        }
        out.push('\n');
        out.push_str(indent(level + 1).as_ref());
        append(out, item);
        written += 1;
    }
    if written > 0 {
        out.push('\n');
        out.push_str(indent(level).as_ref());
    }
    out.push(']');
}

/// Appends `{` fields `}`. Keys are quoted; values are written with `append`.
pub fn append_object<K, T, F>(
    out: &mut String,
    fields: impl IntoIterator<Item = (K, T)>,
    mut append: F,
) where
    K: AsRef<str>,
    F: FnMut(&mut String, T),
{
    out.push('{');
    for (i, (key, value)) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        append_quote(out, key.as_ref());
        out.push(':');
        append(out, value);
    }
    out.push('}');
}

/// Appends an object with one `"key": value` pair per line.
///
/// Indentation works as in [`append_indent_array`].
pub fn append_indent_object<K, T, F, I, S>(
    out: &mut String,
    fields: impl IntoIterator<Item = (K, T)>,
    mut append: F,
    level: usize,
    indent: I,
) where
    K: AsRef<str>,
    F: FnMut(&mut String, T),
    I: Fn(usize) -> S,
    S: AsRef<str>,
{
    out.push('{');
    let mut written = 0;
    for (key, value) in fields {
        if written > 0 {
            out.push(',');
        }
        out.push('\n');
        out.push_str(indent(level + 1).as_ref());
        append_quote(out, key.as_ref());
        out.push_str(": ");
        append(out, value);
        written += 1;
    }
    if written > 0 {
        out.push('\n');
        out.push_str(indent(level).as_ref());
    }
    out.push('}');
}

pub fn append_null(out: &mut String) {
    out.push_str("null");
}

pub fn append_bool(out: &mut String, value: bool) {
    out.push_str(if value { "true" } else { "false" });
}

pub fn append_int(out: &mut String, n: i64) {
    out.push_str(itoa::Buffer::new().format(n));
}

pub fn append_uint(out: &mut String, n: u64) {
    out.push_str(itoa::Buffer::new().format(n));
}

/// Appends the shortest text that reads back as `f`.
///
/// Whole numbers drop the trailing `.0`. NaN and infinities have no JSON
/// form and are written as `null`.
pub fn append_float(out: &mut String, f: f64) {
    if !f.is_finite() {
        append_null(out);
        return;
    }
    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(f);
    out.push_str(text.strip_suffix(".0").unwrap_or(text));
}

/// Appends `t` as a quoted RFC 3339 timestamp with as many fraction digits as needed.
///
/// Fails for timestamps RFC 3339 cannot express, such as years past 9999.
#[cfg(feature = "time")]
pub fn append_time(out: &mut String, t: OffsetDateTime) -> Result<(), ParseError> {
    let text = t
        .format(&Rfc3339)
        .map_err(|error| ParseError::InvalidTime(error.to_string()))?;
    out.push('"');
    out.push_str(&text);
    out.push('"');
    Ok(())
}

/// Appends `data` as a quoted, padded standard base64 string.
pub fn append_bytes(out: &mut String, data: &[u8]) {
    out.push('"');
    BASE64_STANDARD.encode_string(data, out);
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Kind};
    use test_log::test;

    fn array_of<T>(items: impl IntoIterator<Item = T>, append: fn(&mut String, T)) -> String {
        let mut out = String::new();
        append_array(&mut out, items, append);
        out
    }

    #[test]
    fn test_array_of_scalars() {
        assert_eq!(array_of(Vec::<i64>::new(), append_int), "[]");
        assert_eq!(array_of([42], append_int), "[42]");
        assert_eq!(array_of([1, 2, 3], append_int), "[1,2,3]");
        assert_eq!(array_of([1.5, 2.5, 3.5], append_float), "[1.5,2.5,3.5]");
        assert_eq!(array_of([true, false, true], append_bool), "[true,false,true]");
        assert_eq!(array_of(["hello", "world"], append_quote), r#"["hello","world"]"#);
        assert_eq!(
            array_of(["hello\nworld", "quote\"here"], append_quote),
            r#"["hello\nworld","quote\"here"]"#
        );
    }

    #[test]
    fn test_nested_arrays() {
        let rows = [vec![1, 2], vec![3, 4]];
        let mut out = String::new();
        append_array(&mut out, &rows, |out, row| {
            append_array(out, row.iter().copied(), append_int)
        });
        assert_eq!(out, "[[1,2],[3,4]]");
    }

    #[test]
    fn test_appends_after_existing_text() {
        let mut out = String::from("prefix:");
        append_array(&mut out, [1, 2, 3], append_int);
        assert_eq!(out, "prefix:[1,2,3]");

        let mut out = String::from("data=");
        append_object(&mut out, [("x", 1)], append_int);
        assert_eq!(out, r#"data={"x":1}"#);
    }

    #[test]
    fn test_objects() {
        let mut out = String::new();
        append_object(&mut out, Vec::<(&str, i64)>::new(), append_int);
        assert_eq!(out, "{}");

        let mut out = String::new();
        append_object(&mut out, [("a", 1), ("b", 2)], append_int);
        assert_eq!(out, r#"{"a":1,"b":2}"#);

        let mut out = String::new();
        append_object(&mut out, [("name", "Alice"), ("city", "NYC")], append_quote);
        assert_eq!(out, r#"{"name":"Alice","city":"NYC"}"#);

        let mut out = String::new();
        append_object(&mut out, [("outer", 42)], |out, n| {
            append_object(out, [("inner", n)], append_int)
        });
        assert_eq!(out, r#"{"outer":{"inner":42}}"#);
    }

    #[test]
    fn test_object_keys_are_escaped() {
        let mut out = String::new();
        append_object(&mut out, [("hello\nworld", 1), ("quote\"key", 2)], append_int);
        assert_eq!(out, r#"{"hello\nworld":1,"quote\"key":2}"#);
        let value = parse(&out).unwrap();
        assert_eq!(value.lookup("quote\"key").unwrap().unwrap().as_i64(), Ok(2));
    }

    #[test]
    fn test_array_reads_back() {
        let numbers = [1, 2, 3, 4, 5];
        let text = array_of(numbers, append_int);
        let value = parse(&text).unwrap();
        assert_eq!(value.kind(), Kind::Array);
        let parsed: Vec<i64> = value
            .array()
            .unwrap()
            .iter()
            .map(|element| element.as_i64().unwrap())
            .collect();
        assert_eq!(parsed, numbers);
    }

    #[test]
    fn test_object_reads_back() {
        let mut out = String::new();
        append_object(&mut out, [("hello", "world"), ("foo", "bar")], append_quote);
        let value = parse(&out).unwrap();
        assert_eq!(value.kind(), Kind::Object);
        assert_eq!(value.lookup("hello").unwrap().unwrap().as_str().unwrap(), "world");
        assert_eq!(value.lookup("foo").unwrap().unwrap().as_str().unwrap(), "bar");
    }

    #[test]
    fn test_scalars() {
        let mut out = String::new();
        append_null(&mut out);
        assert_eq!(out, "null");

        for (n, expected) in [
            (0, "0"),
            (42, "42"),
            (-42, "-42"),
            (i64::MAX, "9223372036854775807"),
            (i64::MIN, "-9223372036854775808"),
        ] {
            let mut out = String::new();
            append_int(&mut out, n);
            assert_eq!(out, expected);
        }

        for (n, expected) in [(0, "0"), (42, "42"), (u64::MAX, "18446744073709551615")] {
            let mut out = String::new();
            append_uint(&mut out, n);
            assert_eq!(out, expected);
        }

        for (f, expected) in [
            (0.0, "0"),
            (1.5, "1.5"),
            (-2.75, "-2.75"),
            (100.0, "100"),
            (f64::NAN, "null"),
            (f64::INFINITY, "null"),
        ] {
            let mut out = String::new();
            append_float(&mut out, f);
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn test_float_text_reads_back() {
        for f in [1e300, -2.5e-8, 0.1, 123456.789] {
            let mut out = String::new();
            append_float(&mut out, f);
            assert_eq!(parse(&out).unwrap().as_f64(), Ok(f), "{out}");
        }
    }

    #[test]
    fn test_bytes_are_base64() {
        for (data, expected) in [
            (&b""[..], r#""""#),
            (&b"f"[..], r#""Zg==""#),
            (&b"foobar"[..], r#""Zm9vYmFy""#),
            (&[0xff, 0xfe, 0x00][..], r#""//4A""#),
        ] {
            let mut out = String::new();
            append_bytes(&mut out, data);
            assert_eq!(out, expected);
        }
    }

    #[cfg(feature = "time")]
    #[test]
    fn test_time_is_rfc3339() {
        let t = OffsetDateTime::from_unix_timestamp(1_705_314_600).unwrap();
        let mut out = String::new();
        append_time(&mut out, t).unwrap();
        assert_eq!(out, r#""2024-01-15T10:30:00Z""#);

        let t = t.replace_nanosecond(500_000_000).unwrap();
        let mut out = String::new();
        append_time(&mut out, t).unwrap();
        assert_eq!(out, r#""2024-01-15T10:30:00.5Z""#);

        let value = parse(&out).unwrap();
        assert_eq!(crate::coerce::as_time(Some(&value)), Some(t));
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "  ");
        assert_eq!(indent(3), "      ");
        assert_eq!(indent(20).len(), 40);
        assert!(matches!(indent(16), Cow::Borrowed(_)));
    }

    #[test]
    fn test_indented_containers() {
        let mut out = String::new();
        append_indent_array(&mut out, Vec::<i64>::new(), append_int, 0, indent);
        assert_eq!(out, "[]");

        let mut out = String::new();
        append_indent_array(&mut out, [1, 2, 3], append_int, 0, indent);
        assert_eq!(out, "[\n  1,\n  2,\n  3\n]");

        let mut out = String::new();
        append_indent_object(&mut out, Vec::<(&str, i64)>::new(), append_int, 0, indent);
        assert_eq!(out, "{}");

        let mut out = String::new();
        append_indent_object(&mut out, [("a", 1), ("b", 2)], append_int, 0, indent);
        assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn test_nested_indentation() {
        let mut out = String::new();
        append_indent_object(
            &mut out,
            [("list", vec![1, 2]), ("empty", vec![])],
            |out, list| append_indent_array(out, list, append_int, 1, indent),
            0,
            indent,
        );
        assert_eq!(
            out,
            "{\n  \"list\": [\n    1,\n    2\n  ],\n  \"empty\": []\n}"
        );
        assert!(parse(&out).is_ok());

        let mut out = String::new();
        append_indent_array(&mut out, ["x"], append_quote, 1, |level| "\t".repeat(level));
        assert_eq!(out, "[\n\t\t\"x\"\n\t]");
    }
}
