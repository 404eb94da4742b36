// SPDX-License-Identifier: Apache-2.0

//! Scalar conversions shared by the iterator's typed readers and the
//! lenient coercions in [`crate::coerce`].
//!
//! Every function takes the value to convert and treats `null` as the zero
//! value of the target type. Arrays and objects are kind mismatches.

use std::borrow::Cow;

use crate::json_number;
use crate::value::Value;
use crate::ParseError;

#[cfg(feature = "time")]
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, UtcOffset};

/// Parses the boolean spellings `1 t T TRUE true True 0 f F FALSE false False`.
pub(crate) fn parse_bool_str(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

pub(crate) fn to_bool(value: &Value<'_>) -> Result<bool, ParseError> {
    match value {
        Value::Null | Value::False => Ok(false),
        Value::True => Ok(true),
        Value::String(_) => {
            let content = value.as_str()?;
            parse_bool_str(&content).ok_or_else(|| ParseError::InvalidBool(content.into_owned()))
        }
        other => Err(ParseError::kind_mismatch("bool", other.kind())),
    }
}

pub(crate) fn to_i64(value: &Value<'_>) -> Result<i64, ParseError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(raw) => json_number::to_i64(raw),
        Value::String(_) => json_number::to_i64(&value.as_str()?),
        other => Err(ParseError::kind_mismatch("int", other.kind())),
    }
}

pub(crate) fn to_u64(value: &Value<'_>) -> Result<u64, ParseError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(raw) => json_number::to_u64(raw),
        Value::String(_) => json_number::to_u64(&value.as_str()?),
        other => Err(ParseError::kind_mismatch("uint", other.kind())),
    }
}

pub(crate) fn to_f64(value: &Value<'_>) -> Result<f64, ParseError> {
    match value {
        Value::Null => Ok(0.0),
        Value::Number(raw) => json_number::to_f64(raw),
        Value::String(_) => json_number::to_f64(&value.as_str()?),
        other => Err(ParseError::kind_mismatch("float", other.kind())),
    }
}

pub(crate) fn to_string<'a>(value: &Value<'a>) -> Result<Cow<'a, str>, ParseError> {
    match value {
        Value::Null => Ok(Cow::Borrowed("")),
        Value::String(_) => value.as_str(),
        other => Err(ParseError::kind_mismatch("string", other.kind())),
    }
}

/// Nanoseconds per duration unit suffix.
#[cfg(feature = "time")]
fn unit_nanos(unit: &str) -> Option<i128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60_000_000_000,
        "h" => 3_600_000_000_000,
        _ => return None,
    })
}

/// Parses a duration such as `300ms`, `-1.5h` or `2h45m`.
///
/// The syntax is an optional sign followed by one or more decimal numbers,
/// each with a unit suffix. A bare `0` is also accepted. The total must fit
/// in a signed 64-bit count of nanoseconds.
#[cfg(feature = "time")]
pub(crate) fn parse_duration(s: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::InvalidDuration(s.to_owned());
    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(invalid)?;
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        rest = tail;

        let scale = unit_nanos(unit).ok_or_else(invalid)?;
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        // Digits past nanosecond precision of an hour are dropped.
        let (numerator, denominator) = fraction
            .bytes()
            .take(18)
            .fold((0i128, 1i128), |(n, d), b| (n * 10 + i128::from(b - b'0'), d * 10));
        let nanos = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(numerator * scale / denominator))
            .ok_or_else(invalid)?;
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    let total = if negative { -total } else { total };
    let nanos = i64::try_from(total).map_err(|_| invalid())?;
    Ok(Duration::nanoseconds(nanos))
}

/// Converts a number of seconds, possibly fractional, to a duration.
#[cfg(feature = "time")]
pub(crate) fn duration_from_seconds(raw: &str) -> Result<Duration, ParseError> {
    let seconds = json_number::to_f64(raw)?;
    Duration::checked_seconds_f64(seconds).ok_or_else(|| ParseError::InvalidDuration(raw.to_owned()))
}

#[cfg(feature = "time")]
pub(crate) fn to_duration(value: &Value<'_>) -> Result<Duration, ParseError> {
    match value {
        Value::Null => Ok(Duration::ZERO),
        Value::Number(raw) => duration_from_seconds(raw),
        Value::String(_) => parse_duration(&value.as_str()?),
        other => Err(ParseError::kind_mismatch("duration", other.kind())),
    }
}

/// Converts Unix seconds, possibly fractional, to a UTC timestamp.
#[cfg(feature = "time")]
pub(crate) fn time_from_unix_seconds(raw: &str) -> Result<OffsetDateTime, ParseError> {
    let invalid = || ParseError::InvalidTime(raw.to_owned());
    let seconds = json_number::to_f64(raw).map_err(|_| invalid())?;
    let whole = seconds.trunc();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return Err(invalid());
    }
    let nanos = (seconds.fract() * 1e9).trunc() as i64;
    OffsetDateTime::from_unix_timestamp(whole as i64)
        .ok()
        .and_then(|time| time.checked_add(Duration::nanoseconds(nanos)))
        .ok_or_else(invalid)
}

/// Parses an RFC 3339 timestamp and converts it to UTC.
#[cfg(feature = "time")]
pub(crate) fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, ParseError> {
    OffsetDateTime::parse(s, &Rfc3339)
        .map(|time| time.to_offset(UtcOffset::UTC))
        .map_err(|_| ParseError::InvalidTime(s.to_owned()))
}

#[cfg(feature = "time")]
pub(crate) fn to_time(value: &Value<'_>) -> Result<OffsetDateTime, ParseError> {
    match value {
        Value::Null => Ok(OffsetDateTime::UNIX_EPOCH),
        Value::Number(raw) => time_from_unix_seconds(raw),
        Value::String(_) => parse_rfc3339(&value.as_str()?),
        other => Err(ParseError::kind_mismatch("time", other.kind())),
    }
}
