// SPDX-License-Identifier: Apache-2.0

//! Lenient conversions that never fail.
//!
//! Each function accepts an optional value, so the result of a
//! [`lookup`](crate::Value::lookup) can be passed straight in, and falls back
//! to the zero value of the target type when the value is missing, `null`,
//! of an unconvertible kind, or malformed.
//!
//! ```
//! use jsonspan::coerce;
//!
//! let config = jsonspan::parse(r#"{"retries": "3", "verbose": 1}"#).unwrap();
//! let retries = config.lookup("retries").unwrap();
//! assert_eq!(coerce::as_int(retries), 3);
//! assert!(coerce::as_bool(config.lookup("verbose").unwrap()));
//! assert_eq!(coerce::as_int(config.lookup("missing").unwrap()), 0);
//! ```

use std::borrow::Cow;

use crate::json_number;
use crate::value::Value;

#[cfg(feature = "time")]
use crate::convert::{duration_from_seconds, parse_duration, parse_rfc3339, time_from_unix_seconds};
#[cfg(feature = "time")]
use time::{Duration, OffsetDateTime};

/// The text a number-like coercion reads: raw numbers, decoded strings.
fn numeric_text<'a>(value: &Value<'a>) -> Option<Cow<'a, str>> {
    match value {
        Value::Number(raw) => Some(Cow::Borrowed(*raw)),
        Value::String(_) => value.as_str().ok(),
        _ => None,
    }
}

/// `true` for `true`, non-zero numbers, and non-empty strings, arrays and objects.
pub fn as_bool(value: Option<&Value<'_>>) -> bool {
    match value {
        Some(Value::True) => true,
        Some(Value::Number(raw)) => json_number::to_f64(raw).is_ok_and(|f| f != 0.0),
        Some(value @ (Value::String(_) | Value::Array(_) | Value::Object(_))) => {
            value.len().is_ok_and(|len| len > 0)
        }
        _ => false,
    }
}

/// Decoded text for strings, `""` for null, and the JSON text of anything else.
pub fn as_string<'a>(value: Option<&Value<'a>>) -> Cow<'a, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(value @ Value::String(_)) => value.as_str().unwrap_or_default(),
        Some(value) => Cow::Borrowed(value.json()),
    }
}

/// Integer value of numbers and numeric strings; fractions are truncated.
pub fn as_int(value: Option<&Value<'_>>) -> i64 {
    match value {
        Some(Value::True) => 1,
        Some(value) => numeric_text(value)
            .and_then(|text| {
                json_number::to_i64(&text)
                    .or_else(|_| json_number::to_f64(&text).map(|f| f as i64))
                    .ok()
            })
            .unwrap_or(0),
        None => 0,
    }
}

/// Like [`as_int`], with negative values mapped to zero.
pub fn as_uint(value: Option<&Value<'_>>) -> u64 {
    match value {
        Some(Value::True) => 1,
        Some(value) => numeric_text(value)
            .and_then(|text| {
                json_number::to_u64(&text).ok().or_else(|| {
                    json_number::to_f64(&text)
                        .ok()
                        .filter(|f| *f >= 0.0)
                        .map(|f| f as u64)
                })
            })
            .unwrap_or(0),
        None => 0,
    }
}

pub fn as_float(value: Option<&Value<'_>>) -> f64 {
    match value {
        Some(Value::True) => 1.0,
        Some(value) => numeric_text(value)
            .and_then(|text| json_number::to_f64(&text).ok())
            .unwrap_or(0.0),
        None => 0.0,
    }
}

/// Numbers are seconds; strings use the unit-suffix syntax such as `1h30m`.
#[cfg(feature = "time")]
pub fn as_duration(value: Option<&Value<'_>>) -> Duration {
    let converted = match value {
        Some(Value::True) => Ok(Duration::SECOND),
        Some(Value::Number(raw)) => duration_from_seconds(raw),
        Some(value @ Value::String(_)) => value.as_str().and_then(|s| parse_duration(&s)),
        _ => Ok(Duration::ZERO),
    };
    converted.unwrap_or(Duration::ZERO)
}

/// Numbers are Unix seconds; strings are RFC 3339. Results are in UTC.
///
/// Returns `None` where no timestamp can be derived.
#[cfg(feature = "time")]
pub fn as_time(value: Option<&Value<'_>>) -> Option<OffsetDateTime> {
    match value {
        Some(Value::Number(raw)) => time_from_unix_seconds(raw).ok(),
        Some(value @ Value::String(_)) => value.as_str().and_then(|s| parse_rfc3339(&s)).ok(),
        _ => None,
    }
}
