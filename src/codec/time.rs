//! chrono date and duration codecs.

use std::any::Any;
use std::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeDelta, Utc};

use crate::codec::scalar::{millis_value, parse_millis, ScalarTable};
use crate::codec::{mismatch, Codec};
use crate::error::{Error, Result};
use crate::json::Value;
use crate::shape::downcast_ref;

const NAIVE: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn register(table: &mut ScalarTable) {
    table.insert_factory::<DateTime<Utc>>(|desc| {
        let format = desc.date_format;
        Codec::new(
            move |v| encode_utc(downcast_ref(v)?, format),
            move |j| Ok(Box::new(decode_utc(j, format)?) as Box<dyn Any>),
        )
    });
    table.insert_factory::<DateTime<FixedOffset>>(|desc| {
        let format = desc.date_format;
        Codec::new(
            move |v| encode_fixed(downcast_ref(v)?, format),
            move |j| Ok(Box::new(decode_fixed(j, format)?) as Box<dyn Any>),
        )
    });
    table.insert_factory::<NaiveDateTime>(|desc| {
        let format = desc.date_format.unwrap_or(NAIVE);
        Codec::new(
            move |v| custom(downcast_ref::<NaiveDateTime>(v)?.format(format), format),
            move |j| Ok(Box::new(decode_naive(j, format)?) as Box<dyn Any>),
        )
    });
    table.insert_plain::<TimeDelta>(encode_delta, decode_delta);
}

/// Formats with a strftime string; a bad string fails instead of panicking.
fn custom(display: impl std::fmt::Display, format: &str) -> Result<Value> {
    let mut out = String::new();
    write!(out, "{}", display).map_err(|_| {
        Error::encode_mismatch("date", format!("invalid date format `{}`", format))
    })?;
    Ok(Value::String(out))
}

fn date_text<'a>(ty: &'static str, j: &'a Value) -> Result<Option<&'a str>> {
    match j {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => mismatch(ty, j, "expected a date string"),
    }
}

fn encode_utc(dt: &DateTime<Utc>, format: Option<&str>) -> Result<Value> {
    match format {
        Some(format) => custom(dt.format(format), format),
        None => Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
    }
}

fn decode_utc(j: &Value, format: Option<&str>) -> Result<DateTime<Utc>> {
    let text = match date_text("DateTime<Utc>", j)? {
        Some(text) => text,
        None => return Ok(DateTime::default()),
    };
    let parsed = match format {
        Some(format) => DateTime::parse_from_str(text, format)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(text, format).map(|dt| dt.and_utc())),
        // RFC 3339 also covers the millisecond form browsers write.
        None => DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)),
    };
    parsed.or_else(|e| mismatch("DateTime<Utc>", j, &e.to_string()))
}

fn encode_fixed(dt: &DateTime<FixedOffset>, format: Option<&str>) -> Result<Value> {
    match format {
        Some(format) => custom(dt.format(format), format),
        None => Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))),
    }
}

fn decode_fixed(j: &Value, format: Option<&str>) -> Result<DateTime<FixedOffset>> {
    let text = match date_text("DateTime<FixedOffset>", j)? {
        Some(text) => text,
        None => return Ok(DateTime::default()),
    };
    let parsed = match format {
        Some(format) => DateTime::parse_from_str(text, format),
        None => DateTime::parse_from_rfc3339(text),
    };
    parsed.or_else(|e| mismatch("DateTime<FixedOffset>", j, &e.to_string()))
}

fn decode_naive(j: &Value, format: &str) -> Result<NaiveDateTime> {
    match date_text("NaiveDateTime", j)? {
        Some(text) => NaiveDateTime::parse_from_str(text, format)
            .or_else(|e| mismatch("NaiveDateTime", j, &e.to_string())),
        None => Ok(NaiveDateTime::default()),
    }
}

fn encode_delta(v: &dyn Any) -> Result<Value> {
    let delta = downcast_ref::<TimeDelta>(v)?;
    millis_value(
        delta.num_milliseconds() as i128,
        (delta.subsec_nanos() % 1_000_000) as i64,
    )
}

fn decode_delta(j: &Value) -> Result<Box<dyn Any>> {
    let nanos = parse_millis("TimeDelta", j)?;
    let delta = i64::try_from(nanos / 1_000_000_000)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|secs| secs.checked_add(&TimeDelta::nanoseconds((nanos % 1_000_000_000) as i64)));
    match delta {
        Some(delta) => Ok(Box::new(delta)),
        None => mismatch("TimeDelta", j, "duration out of range"),
    }
}
