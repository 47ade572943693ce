//! Encode/decode rules between native values and the JSON wire value.
//!
//! Every kind except `Byte` and `Short` round-trips losslessly. `Byte` and
//! `Short` are carried as `Int32` on the wire and narrowed by the receiver:
//! the low-order 8 (resp. 16) bits of the wire integer are reinterpreted as
//! two's-complement, silently. An out-of-range wire value is not an error;
//! `200` decoded as a byte yields `-56`.

use crate::types::TypeKind;
use crate::{Body, WireValue};
use thiserror::Error;

/// A wire value did not have the shape the receiver expected.
///
/// For a stub/dispatcher pair produced by the generator this is a contract
/// violation: generation guarantees both sides agree on every kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The request body has no parameter under this name.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// The wire value cannot represent the expected kind.
    #[error("expected {expected} wire value, found {found}")]
    KindMismatch {
        expected: TypeKind,
        found: &'static str,
    },
}

fn mismatch(expected: TypeKind, value: &WireValue) -> WireError {
    let found = match value {
        WireValue::Null => "null",
        WireValue::Bool(_) => "bool",
        WireValue::Number(_) => "number",
        WireValue::String(_) => "string",
        WireValue::Array(_) => "array",
        WireValue::Object(_) => "object",
    };
    WireError::KindMismatch { expected, found }
}

// ---------------------------------------------------------------------------
// Encoding: native -> wire
// ---------------------------------------------------------------------------

pub fn encode_bool(v: bool) -> WireValue {
    WireValue::Bool(v)
}

/// Bytes travel as `Int32`; the receiver narrows.
pub fn encode_byte(v: i8) -> WireValue {
    WireValue::from(i32::from(v))
}

/// Shorts travel as `Int32`; the receiver narrows.
pub fn encode_short(v: i16) -> WireValue {
    WireValue::from(i32::from(v))
}

pub fn encode_i32(v: i32) -> WireValue {
    WireValue::from(v)
}

pub fn encode_i64(v: i64) -> WireValue {
    WireValue::from(v)
}

pub fn encode_f32(v: f32) -> WireValue {
    WireValue::from(v)
}

pub fn encode_f64(v: f64) -> WireValue {
    WireValue::from(v)
}

pub fn encode_string(v: impl Into<String>) -> WireValue {
    WireValue::String(v.into())
}

pub fn encode_object(v: Body) -> WireValue {
    WireValue::Object(v)
}

pub fn encode_array(v: Vec<WireValue>) -> WireValue {
    WireValue::Array(v)
}

// ---------------------------------------------------------------------------
// Decoding: wire -> native
// ---------------------------------------------------------------------------

pub fn decode_bool(v: &WireValue) -> Result<bool, WireError> {
    v.as_bool().ok_or_else(|| mismatch(TypeKind::Bool, v))
}

/// Narrow a wire `Int32` to a byte: low 8 bits, two's-complement.
pub fn decode_byte(v: &WireValue) -> Result<i8, WireError> {
    let wide = v
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| mismatch(TypeKind::Byte, v))?;
    Ok(wide as i8)
}

/// Narrow a wire `Int32` to a short: low 16 bits, two's-complement.
pub fn decode_short(v: &WireValue) -> Result<i16, WireError> {
    let wide = v
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| mismatch(TypeKind::Short, v))?;
    Ok(wide as i16)
}

pub fn decode_i32(v: &WireValue) -> Result<i32, WireError> {
    v.as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| mismatch(TypeKind::Int32, v))
}

pub fn decode_i64(v: &WireValue) -> Result<i64, WireError> {
    v.as_i64().ok_or_else(|| mismatch(TypeKind::Int64, v))
}

pub fn decode_f32(v: &WireValue) -> Result<f32, WireError> {
    v.as_f64()
        .map(|n| n as f32)
        .ok_or_else(|| mismatch(TypeKind::Float32, v))
}

pub fn decode_f64(v: &WireValue) -> Result<f64, WireError> {
    v.as_f64().ok_or_else(|| mismatch(TypeKind::Float64, v))
}

pub fn decode_string(v: &WireValue) -> Result<String, WireError> {
    v.as_str()
        .map(str::to_owned)
        .ok_or_else(|| mismatch(TypeKind::String, v))
}

pub fn decode_object(v: &WireValue) -> Result<Body, WireError> {
    v.as_object()
        .cloned()
        .ok_or_else(|| mismatch(TypeKind::Object, v))
}

pub fn decode_array(v: &WireValue) -> Result<Vec<WireValue>, WireError> {
    v.as_array()
        .cloned()
        .ok_or_else(|| mismatch(TypeKind::Array, v))
}

/// Decode a wire value as `kind`, returning the value normalized for that
/// kind (narrowed integers are re-widened to their wire form).
pub fn decode_value(kind: TypeKind, v: &WireValue) -> Result<WireValue, WireError> {
    match kind {
        TypeKind::Bool => decode_bool(v).map(encode_bool),
        TypeKind::Byte => decode_byte(v).map(encode_byte),
        TypeKind::Short => decode_short(v).map(encode_short),
        TypeKind::Int32 => decode_i32(v).map(encode_i32),
        TypeKind::Int64 => decode_i64(v).map(encode_i64),
        TypeKind::Float32 => decode_f32(v).map(encode_f32),
        TypeKind::Float64 => decode_f64(v).map(encode_f64),
        TypeKind::String => decode_string(v).map(encode_string),
        TypeKind::Object => decode_object(v).map(encode_object),
        TypeKind::Array => decode_array(v).map(encode_array),
    }
}

// ---------------------------------------------------------------------------
// Body accessors: parameter lookup + decode in one step
// ---------------------------------------------------------------------------

fn field<'a>(body: &'a Body, key: &str) -> Result<&'a WireValue, WireError> {
    body.get(key)
        .ok_or_else(|| WireError::MissingParameter(key.to_owned()))
}

pub fn get_bool(body: &Body, key: &str) -> Result<bool, WireError> {
    decode_bool(field(body, key)?)
}

pub fn get_byte(body: &Body, key: &str) -> Result<i8, WireError> {
    decode_byte(field(body, key)?)
}

pub fn get_short(body: &Body, key: &str) -> Result<i16, WireError> {
    decode_short(field(body, key)?)
}

pub fn get_i32(body: &Body, key: &str) -> Result<i32, WireError> {
    decode_i32(field(body, key)?)
}

pub fn get_i64(body: &Body, key: &str) -> Result<i64, WireError> {
    decode_i64(field(body, key)?)
}

pub fn get_f32(body: &Body, key: &str) -> Result<f32, WireError> {
    decode_f32(field(body, key)?)
}

pub fn get_f64(body: &Body, key: &str) -> Result<f64, WireError> {
    decode_f64(field(body, key)?)
}

pub fn get_string(body: &Body, key: &str) -> Result<String, WireError> {
    decode_string(field(body, key)?)
}

pub fn get_object(body: &Body, key: &str) -> Result<Body, WireError> {
    decode_object(field(body, key)?)
}

pub fn get_array(body: &Body, key: &str) -> Result<Vec<WireValue>, WireError> {
    decode_array(field(body, key)?)
}
