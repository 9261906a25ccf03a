/// PostgreSQL Row Value Types
use std::fmt;

use crate::constant::{FormatCode, oid};
use crate::error::Result;
use crate::protocol::primitive::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// NULL value
    Null,
    /// bool
    Bool(bool),
    /// int2 / smallint
    Int2(i16),
    /// int4 / integer
    Int4(i32),
    /// int8 / bigint
    Int8(i64),
    /// float4 / real
    Float4(f32),
    /// float8 / double precision
    Float8(f64),
    /// text, varchar, name, ..
    Text(&'a str),
    /// bytea
    Bytea(&'a [u8]),
    #[cfg(feature = "with-uuid")]
    Uuid(uuid::Uuid),
    #[cfg(feature = "with-chrono")]
    Date(chrono::NaiveDate),
    #[cfg(feature = "with-chrono")]
    Timestamp(chrono::NaiveDateTime),
}

impl Value<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The built-in type OID matching this value, `None` for NULL
    pub fn type_oid(&self) -> Option<u32> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(oid::BOOL),
            Value::Int2(_) => Some(oid::INT2),
            Value::Int4(_) => Some(oid::INT4),
            Value::Int8(_) => Some(oid::INT8),
            Value::Float4(_) => Some(oid::FLOAT4),
            Value::Float8(_) => Some(oid::FLOAT8),
            Value::Text(_) => Some(oid::TEXT),
            Value::Bytea(_) => Some(oid::BYTEA),
            #[cfg(feature = "with-uuid")]
            Value::Uuid(_) => Some(oid::UUID),
            #[cfg(feature = "with-chrono")]
            Value::Date(_) => Some(oid::DATE),
            #[cfg(feature = "with-chrono")]
            Value::Timestamp(_) => Some(oid::TIMESTAMP),
        }
    }

    /// Encode the value (without its length prefix)
    ///
    /// Only called for non-NULL values.
    pub fn encode(&self, format: FormatCode, out: &mut Vec<u8>) -> Result<()> {
        match format {
            FormatCode::Text => self.encode_text(out),
            FormatCode::Binary => self.encode_binary(out),
        }
        Ok(())
    }

    fn encode_text(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => {}
            Value::Bool(v) => write_int_1(out, if *v { b't' } else { b'f' }),
            Value::Int2(v) => write_bytes_fix(out, v.to_string().as_bytes()),
            Value::Int4(v) => write_bytes_fix(out, v.to_string().as_bytes()),
            Value::Int8(v) => write_bytes_fix(out, v.to_string().as_bytes()),
            Value::Float4(v) => write_float_text(out, *v, FLOAT4_MAX_FIXED_EXPONENT),
            Value::Float8(v) => write_float_text(out, *v, FLOAT8_MAX_FIXED_EXPONENT),
            Value::Text(v) => write_bytes_fix(out, v.as_bytes()),
            Value::Bytea(v) => write_bytea_hex(out, v),
            #[cfg(feature = "with-uuid")]
            Value::Uuid(v) => write_bytes_fix(out, v.hyphenated().to_string().as_bytes()),
            #[cfg(feature = "with-chrono")]
            Value::Date(v) => write_bytes_fix(out, v.format("%Y-%m-%d").to_string().as_bytes()),
            #[cfg(feature = "with-chrono")]
            Value::Timestamp(v) => write_bytes_fix(
                out,
                v.format("%Y-%m-%d %H:%M:%S%.f").to_string().as_bytes(),
            ),
        }
    }

    fn encode_binary(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => {}
            Value::Bool(v) => write_int_1(out, u8::from(*v)),
            Value::Int2(v) => write_int_2(out, *v),
            Value::Int4(v) => write_int_4(out, *v),
            Value::Int8(v) => write_int_8(out, *v),
            Value::Float4(v) => write_bytes_fix(out, &v.to_bits().to_be_bytes()),
            Value::Float8(v) => write_bytes_fix(out, &v.to_bits().to_be_bytes()),
            Value::Text(v) => write_bytes_fix(out, v.as_bytes()),
            Value::Bytea(v) => write_bytes_fix(out, v),
            #[cfg(feature = "with-uuid")]
            Value::Uuid(v) => write_bytes_fix(out, v.as_bytes()),
            #[cfg(feature = "with-chrono")]
            Value::Date(v) => {
                let days = v.signed_duration_since(pg_epoch().date()).num_days();
                write_int_4(out, days as i32);
            }
            #[cfg(feature = "with-chrono")]
            Value::Timestamp(v) => {
                let micros = v
                    .signed_duration_since(pg_epoch())
                    .num_microseconds()
                    .unwrap_or(i64::MAX);
                write_int_8(out, micros);
            }
        }
    }
}

/// Decimal exponents from this value on are printed in exponent form
const FLOAT4_MAX_FIXED_EXPONENT: i32 = 6;
const FLOAT8_MAX_FIXED_EXPONENT: i32 = 15;

/// Shortest round-trip digits, in exponent form (`1e+20`, `1.5e-05`) when the
/// decimal exponent is below -4 or at least `max_fixed_exponent`
fn write_float_text<F>(out: &mut Vec<u8>, v: F, max_fixed_exponent: i32)
where
    F: Copy + Into<f64> + fmt::Display + fmt::LowerExp,
{
    let wide: f64 = v.into();
    if wide.is_nan() {
        write_bytes_fix(out, b"NaN");
        return;
    }
    if wide.is_infinite() {
        let text: &[u8] = if wide.is_sign_positive() {
            b"Infinity"
        } else {
            b"-Infinity"
        };
        write_bytes_fix(out, text);
        return;
    }

    let scientific = format!("{v:e}");
    let exponent = scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)));
    match exponent {
        Some((mantissa, exponent)) if exponent < -4 || exponent >= max_fixed_exponent => {
            let sign = if exponent < 0 { '-' } else { '+' };
            write_bytes_fix(out, mantissa.as_bytes());
            write_bytes_fix(out, format!("e{sign}{:02}", exponent.unsigned_abs()).as_bytes());
        }
        _ => write_bytes_fix(out, v.to_string().as_bytes()),
    }
}

fn write_bytea_hex(out: &mut Vec<u8>, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    out.reserve(2 + data.len() * 2);
    write_bytes_fix(out, b"\\x");
    for byte in data {
        out.push(HEX[usize::from(byte >> 4)]);
        out.push(HEX[usize::from(byte & 0x0f)]);
    }
}

#[cfg(feature = "with-chrono")]
fn pg_epoch() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value<'_> {
    fn from(v: i16) -> Self {
        Value::Int2(v)
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::Int4(v)
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::Int8(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::Float4(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Float8(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Text(v)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(v: &'a String) -> Self {
        Value::Text(v.as_str())
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Bytea(v)
    }
}

#[cfg(feature = "with-uuid")]
impl From<uuid::Uuid> for Value<'_> {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

#[cfg(feature = "with-chrono")]
impl From<chrono::NaiveDate> for Value<'_> {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::Date(v)
    }
}

#[cfg(feature = "with-chrono")]
impl From<chrono::NaiveDateTime> for Value<'_> {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
