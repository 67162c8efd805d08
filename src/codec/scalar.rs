//! Codecs for leaf types, keyed by concrete type.
//!
//! Numbers are written and parsed with `itoa`/`ryu` and `str::parse`, none
//! of which look at the host locale: `1234.5` is always `1234.5`. A `null`
//! (or a missing field) decodes to the type's zero value.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use paste::paste;

use crate::codec::{mismatch, Codec, TypeDescriptor};
use crate::error::{Error, Result};
use crate::json::{number, Value};
use crate::shape::downcast_ref;

macro_rules! integer_codecs {
    ($($ty:ident)*) => { paste! { $(
        fn [<encode_ $ty>](v: &dyn Any) -> Result<Value> {
            Ok(Value::Number(number::format_int(*downcast_ref::<$ty>(v)?)))
        }

        fn [<decode_ $ty>](j: &Value) -> Result<Box<dyn Any>> {
            Ok(Box::new(parse_number::<$ty>(j)?))
        }
    )* } };
}

macro_rules! register_integers {
    ($table:ident; $($ty:ident)*) => { paste! { $(
        $table.insert_plain::<$ty>([<encode_ $ty>], [<decode_ $ty>]);
    )* } };
}

type MakeCodec = dyn Fn(&TypeDescriptor) -> Codec + Send + Sync;

/// Scalar codecs by `TypeId`.
///
/// Entries are factories because some scalars (dates) depend on the
/// declaration site through the descriptor's date format.
#[derive(Clone, Default)]
pub struct ScalarTable {
    entries: HashMap<TypeId, Arc<MakeCodec>>,
}

impl ScalarTable {
    pub fn new() -> Self {
        ScalarTable::default()
    }

    /// All built-in scalars.
    pub fn builtin() -> Self {
        let mut table = ScalarTable::new();
        table.register_builtin();
        table
    }

    pub fn insert_factory<T: Any>(
        &mut self,
        make: impl Fn(&TypeDescriptor) -> Codec + Send + Sync + 'static,
    ) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(make));
    }

    /// Registers a codec that ignores the declaration site.
    pub fn insert_plain<T: Any>(
        &mut self,
        encode: fn(&dyn Any) -> Result<Value>,
        decode: fn(&Value) -> Result<Box<dyn Any>>,
    ) {
        self.insert_factory::<T>(move |_| Codec::new(encode, decode));
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn codec(&self, desc: &TypeDescriptor) -> Option<Codec> {
        self.entries.get(&desc.ty.id()).map(|make| make(desc))
    }

    fn register_builtin(&mut self) {
        self.insert_plain::<()>(encode_unit, decode_unit);
        self.insert_plain::<bool>(encode_bool, decode_bool);
        self.insert_plain::<char>(encode_char, decode_char);
        self.insert_plain::<String>(encode_string, decode_string);
        self.insert_plain::<f32>(encode_f32, decode_f32);
        self.insert_plain::<f64>(encode_f64, decode_f64);
        self.insert_plain::<Duration>(encode_duration, decode_duration);
        register_integers!(self; i8 i16 i32 i64 i128 isize u8 u16 u32 u64 u128 usize);

        #[cfg(feature = "chrono")]
        crate::codec::time::register(self);

        #[cfg(feature = "uuid")]
        self.insert_plain::<uuid::Uuid>(encode_uuid, decode_uuid);

        #[cfg(feature = "decimal")]
        self.insert_plain::<rust_decimal::Decimal>(encode_decimal, decode_decimal);
    }
}

integer_codecs!(i8 i16 i32 i64 i128 isize u8 u16 u32 u64 u128 usize);

/// Parses the literal of a `Number`; `null` is zero.
pub(crate) fn parse_number<T: FromStr + Default>(j: &Value) -> Result<T> {
    match j {
        Value::Null => Ok(T::default()),
        Value::Number(text) => text
            .parse()
            .or_else(|_| mismatch(type_name::<T>(), j, "number out of range")),
        _ => mismatch(type_name::<T>(), j, "expected a number"),
    }
}

fn encode_unit(v: &dyn Any) -> Result<Value> {
    downcast_ref::<()>(v)?;
    Ok(Value::Null)
}

fn decode_unit(j: &Value) -> Result<Box<dyn Any>> {
    match j {
        Value::Null => Ok(Box::new(())),
        _ => mismatch("()", j, "expected null"),
    }
}

fn encode_bool(v: &dyn Any) -> Result<Value> {
    Ok(Value::bool(*downcast_ref::<bool>(v)?))
}

fn decode_bool(j: &Value) -> Result<Box<dyn Any>> {
    match j {
        Value::True => Ok(Box::new(true)),
        Value::False | Value::Null => Ok(Box::new(false)),
        _ => mismatch("bool", j, "expected a boolean"),
    }
}

fn encode_char(v: &dyn Any) -> Result<Value> {
    Ok(Value::String(downcast_ref::<char>(v)?.to_string()))
}

fn decode_char(j: &Value) -> Result<Box<dyn Any>> {
    match j {
        Value::Null => Ok(Box::new('\0')),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Box::new(c)),
                _ => mismatch("char", j, "expected a single character"),
            }
        }
        _ => mismatch("char", j, "expected a string"),
    }
}

fn encode_string(v: &dyn Any) -> Result<Value> {
    Ok(Value::String(downcast_ref::<String>(v)?.clone()))
}

fn decode_string(j: &Value) -> Result<Box<dyn Any>> {
    match j {
        Value::Null => Ok(Box::new(String::new())),
        Value::String(s) => Ok(Box::new(s.clone())),
        _ => mismatch("String", j, "expected a string"),
    }
}

fn non_finite(ty: &'static str) -> Error {
    Error::encode_mismatch(ty, "non-finite float has no JSON number literal")
}

fn encode_f32(v: &dyn Any) -> Result<Value> {
    let n = *downcast_ref::<f32>(v)?;
    number::format_f32(n)
        .map(Value::Number)
        .ok_or_else(|| non_finite("f32"))
}

fn decode_f32(j: &Value) -> Result<Box<dyn Any>> {
    Ok(Box::new(parse_number::<f32>(j)?))
}

fn encode_f64(v: &dyn Any) -> Result<Value> {
    let n = *downcast_ref::<f64>(v)?;
    number::format_f64(n)
        .map(Value::Number)
        .ok_or_else(|| non_finite("f64"))
}

fn decode_f64(j: &Value) -> Result<Box<dyn Any>> {
    Ok(Box::new(parse_number::<f64>(j)?))
}

/// Total milliseconds, integral when there is no sub-millisecond part.
pub(crate) fn millis_value(whole_millis: i128, sub_nanos: i64) -> Result<Value> {
    if sub_nanos == 0 {
        return Ok(Value::Number(number::format_int(whole_millis)));
    }
    let millis = whole_millis as f64 + sub_nanos as f64 / 1_000_000.0;
    number::format_f64(millis)
        .map(Value::Number)
        .ok_or_else(|| non_finite("duration"))
}

/// Nanoseconds in a millisecond `Number`, exact for integral literals.
pub(crate) fn parse_millis(ty: &'static str, j: &Value) -> Result<i128> {
    match j {
        Value::Null => Ok(0),
        Value::Number(text) => {
            if let Ok(millis) = text.parse::<i128>() {
                return millis
                    .checked_mul(1_000_000)
                    .map_or_else(|| mismatch(ty, j, "duration out of range"), Ok);
            }
            match text.parse::<f64>() {
                Ok(millis) if millis.is_finite() => Ok((millis * 1_000_000.0).round() as i128),
                _ => mismatch(ty, j, "duration out of range"),
            }
        }
        _ => mismatch(ty, j, "expected milliseconds"),
    }
}

fn encode_duration(v: &dyn Any) -> Result<Value> {
    let d = downcast_ref::<Duration>(v)?;
    millis_value(
        d.as_millis() as i128,
        (d.subsec_nanos() % 1_000_000) as i64,
    )
}

fn decode_duration(j: &Value) -> Result<Box<dyn Any>> {
    let nanos = parse_millis("Duration", j)?;
    if nanos < 0 || nanos > u64::MAX as i128 * 1_000_000_000 {
        return mismatch("Duration", j, "duration out of range");
    }
    let secs = (nanos / 1_000_000_000) as u64;
    let sub = (nanos % 1_000_000_000) as u32;
    Ok(Box::new(Duration::new(secs, sub)))
}

#[cfg(feature = "uuid")]
fn encode_uuid(v: &dyn Any) -> Result<Value> {
    Ok(Value::String(
        downcast_ref::<uuid::Uuid>(v)?.hyphenated().to_string(),
    ))
}

#[cfg(feature = "uuid")]
fn decode_uuid(j: &Value) -> Result<Box<dyn Any>> {
    match j {
        Value::Null => Ok(Box::new(uuid::Uuid::nil())),
        Value::String(s) => uuid::Uuid::parse_str(s)
            .map(|u| Box::new(u) as Box<dyn Any>)
            .or_else(|e| mismatch("Uuid", j, &e.to_string())),
        _ => mismatch("Uuid", j, "expected a string"),
    }
}

#[cfg(feature = "decimal")]
fn encode_decimal(v: &dyn Any) -> Result<Value> {
    Ok(Value::String(
        downcast_ref::<rust_decimal::Decimal>(v)?.to_string(),
    ))
}

#[cfg(feature = "decimal")]
fn decode_decimal(j: &Value) -> Result<Box<dyn Any>> {
    use rust_decimal::Decimal;

    let parsed = match j {
        Value::Null => Ok(Decimal::ZERO),
        // Numbers are accepted too, written by clients that do not quote.
        Value::String(text) | Value::Number(text) => {
            Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))
        }
        _ => return mismatch("Decimal", j, "expected a string"),
    };
    parsed
        .map(|d| Box::new(d) as Box<dyn Any>)
        .or_else(|e| mismatch("Decimal", j, &e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{unbox, TypeRef, Wire};

    fn roundtrip<T: Wire + PartialEq + std::fmt::Debug>(value: T, expected: &str) {
        let table = ScalarTable::builtin();
        let codec = table.codec(&TypeDescriptor::of(TypeRef::of::<T>())).unwrap();
        let j = codec.encode(&value).unwrap();
        assert_eq!(crate::json::to_string(&j).unwrap(), expected);
        assert_eq!(unbox::<T>(codec.decode(&j).unwrap()).unwrap(), value);
    }

    fn zero<T: Wire + PartialEq + std::fmt::Debug>(expected: T) {
        let table = ScalarTable::builtin();
        let codec = table.codec(&TypeDescriptor::of(TypeRef::of::<T>())).unwrap();
        assert_eq!(unbox::<T>(codec.decode(&Value::Null).unwrap()).unwrap(), expected);
    }

    #[test]
    fn integers_of_every_width() {
        roundtrip(-128i8, "-128");
        roundtrip(65535u16, "65535");
        roundtrip(i64::MIN, "-9223372036854775808");
        roundtrip(u128::MAX, "340282366920938463463374607431768211455");
        roundtrip(7usize, "7");
    }

    #[test]
    fn floats_use_a_dot() {
        roundtrip(1234.5f64, "1234.5");
        roundtrip(0.1f32, "0.1");
        roundtrip(-2.5e-8f64, "-2.5e-8");
    }

    #[test]
    fn non_finite_float_is_an_encode_error() {
        let table = ScalarTable::builtin();
        let codec = table
            .codec(&TypeDescriptor::of(TypeRef::of::<f64>()))
            .unwrap();
        assert!(matches!(
            codec.encode(&f64::INFINITY),
            Err(Error::EncodeMismatch { .. })
        ));
    }

    #[test]
    fn text_scalars() {
        roundtrip('é', r#""é""#);
        roundtrip("a/b".to_owned(), r#""a\/b""#);
        roundtrip(true, "true");
        roundtrip((), "null");
    }

    #[test]
    fn durations_in_milliseconds() {
        roundtrip(Duration::from_millis(1500), "1500");
        roundtrip(Duration::from_micros(2500), "2.5");
    }

    #[test]
    fn null_is_zero() {
        zero(0i32);
        zero(0.0f64);
        zero(false);
        zero(String::new());
        zero('\0');
        zero(Duration::default());
    }

    #[test]
    fn out_of_range_is_a_mismatch() {
        let table = ScalarTable::builtin();
        let codec = table.codec(&TypeDescriptor::of(TypeRef::of::<u8>())).unwrap();
        let err = codec.decode(&Value::Number("256".to_owned())).unwrap_err();
        assert!(matches!(err, Error::DecodeMismatch { .. }));
        let err = codec.decode(&Value::string("1")).unwrap_err();
        assert!(matches!(err, Error::DecodeMismatch { .. }));
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn uuid_as_canonical_string() {
        let id = uuid::Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        roundtrip(id, r#""01234567-89ab-cdef-0123-456789abcdef""#);
    }

    #[cfg(feature = "decimal")]
    #[test]
    fn decimal_as_string() {
        let d = rust_decimal::Decimal::from_str("12345678901234567890.0001").unwrap();
        roundtrip(d, r#""12345678901234567890.0001""#);
    }
}
