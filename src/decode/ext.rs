//! Extension-tag classification.
//!
//! Partition streams wrap temporal scalars in small tagged maps: one marker
//! key names the shape, and the textual payload sits under `as_str`. Every
//! map the unpacker produces must be one of these wrappers; a map with no
//! known marker means the stream is not trustworthy and decoding fails
//! loudly instead of passing a dict-shaped value through.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::DecodeError;
use crate::value::Value;

const DATETIME_MARKER: &str = "__datetime__";
const TIME_MARKER: &str = "__time__";
const DATE_MARKER: &str = "__date__";

const PAYLOAD_KEY: &str = "as_str";

/// Convert a decoded map into the temporal scalar it wraps.
///
/// Marker precedence is datetime, then time, then date; the first marker
/// present wins.
pub(super) fn classify(entries: Vec<(Value, Value)>) -> Result<Value, DecodeError> {
    if has_marker(&entries, DATETIME_MARKER) {
        return parse_datetime(payload(&entries)?).map(Value::DateTime);
    }
    if has_marker(&entries, TIME_MARKER) {
        return parse_time(payload(&entries)?).map(Value::Time);
    }
    if has_marker(&entries, DATE_MARKER) {
        return parse_date(payload(&entries)?).map(Value::Date);
    }

    let keys = entries.iter().map(|(key, _)| key_repr(key)).collect();
    Err(DecodeError::UnknownExtension(keys))
}

/// Marker keys arrive as str or bin depending on who packed the partition;
/// both spellings match.
fn key_is(key: &Value, name: &str) -> bool {
    match key {
        Value::String(s) => s == name,
        Value::Binary(b) => b.as_slice() == name.as_bytes(),
        _ => false,
    }
}

fn has_marker(entries: &[(Value, Value)], name: &str) -> bool {
    entries.iter().any(|(key, _)| key_is(key, name))
}

fn payload(entries: &[(Value, Value)]) -> Result<&str, DecodeError> {
    entries
        .iter()
        .find(|(key, _)| key_is(key, PAYLOAD_KEY))
        .and_then(|(_, value)| value.as_str())
        .ok_or(DecodeError::MissingPayload)
}

fn key_repr(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Binary(b) => String::from_utf8_lossy(b).into_owned(),
        other => format!("<{}>", other.kind()),
    }
}

/// Two attempts only: the plain format first, then the lingering
/// microsecond-precision variant some older bundles still carry.
fn parse_datetime(payload: &str) -> Result<NaiveDateTime, DecodeError> {
    NaiveDateTime::parse_from_str(payload, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(payload, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| DecodeError::BadTemporal {
            kind: "datetime",
            value: payload.to_owned(),
        })
}

fn parse_time(payload: &str) -> Result<NaiveTime, DecodeError> {
    NaiveTime::parse_from_str(payload, "%H:%M:%S").map_err(|_| DecodeError::BadTemporal {
        kind: "time",
        value: payload.to_owned(),
    })
}

fn parse_date(payload: &str) -> Result<NaiveDate, DecodeError> {
    NaiveDate::parse_from_str(payload, "%Y-%m-%d").map_err(|_| DecodeError::BadTemporal {
        kind: "date",
        value: payload.to_owned(),
    })
}
