//! Array-aware JSON tree codec.
//!
//! [`Value`] trees are mapped onto plain JSON. Values JSON cannot carry
//! directly are written as single-purpose tagged objects:
//!
//! ```text
//! {"__ndarray__": "<base64 little-endian bytes>", "dtype": "float64", "shape": [2, 4]}
//! {"__complex__": [1.0, -0.5]}
//! {"__float__": "nan"}
//! ```
//!
//! A map that itself uses one of the tag names as a key is wrapped as
//! `{"__map__": {...}}` so it never reads back as a tagged record.
//! Object key order is preserved in both directions.
//!
//! Array records carry one of the dtypes of [`DType`]. Records of other
//! element types (`float16`, `complex64`, `int16`, ...) are rejected.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value as Json};

use crate::error::{Result, SweepError};
use crate::model::{Complex, DType, NdArray, Value, ValueMap};

pub const ARRAY_TAG: &str = "__ndarray__";
pub const DTYPE_KEY: &str = "dtype";
pub const SHAPE_KEY: &str = "shape";
pub const COMPLEX_TAG: &str = "__complex__";
pub const FLOAT_TAG: &str = "__float__";
pub const MAP_TAG: &str = "__map__";

const RESERVED_KEYS: [&str; 4] = [ARRAY_TAG, COMPLEX_TAG, FLOAT_TAG, MAP_TAG];

/// Encode a value tree into a JSON tree
#[must_use]
pub fn encode(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => encode_f64(*f),
        Value::Complex(c) => tagged(
            COMPLEX_TAG,
            Json::Array(vec![encode_f64(c.re), encode_f64(c.im)]),
        ),
        Value::Str(s) => Json::String(s.clone()),
        Value::Array(a) => encode_array(a),
        Value::List(items) => Json::Array(items.iter().map(encode).collect()),
        Value::Map(m) => {
            let obj = Json::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), encode(v)))
                    .collect::<Map<_, _>>(),
            );
            if RESERVED_KEYS.iter().any(|k| m.contains_key(*k)) {
                tagged(MAP_TAG, obj)
            } else {
                obj
            }
        }
    }
}

fn tagged(tag: &str, payload: Json) -> Json {
    let mut obj = Map::new();
    obj.insert(tag.to_string(), payload);
    Json::Object(obj)
}

fn encode_f64(f: f64) -> Json {
    match Number::from_f64(f) {
        Some(n) => Json::Number(n),
        None => {
            let name = if f.is_nan() {
                "nan"
            } else if f > 0.0 {
                "inf"
            } else {
                "-inf"
            };
            tagged(FLOAT_TAG, Json::String(name.to_string()))
        }
    }
}

fn encode_array(array: &NdArray) -> Json {
    let mut obj = Map::new();
    obj.insert(
        ARRAY_TAG.to_string(),
        Json::String(STANDARD.encode(array.to_le_bytes())),
    );
    obj.insert(
        DTYPE_KEY.to_string(),
        Json::String(array.dtype().tag().to_string()),
    );
    obj.insert(
        SHAPE_KEY.to_string(),
        Json::Array(array.shape().iter().map(|&d| Json::from(d)).collect()),
    );
    Json::Object(obj)
}

/// Decode a JSON tree, rebuilding every tagged record.
///
/// An object carrying one of the tags but otherwise malformed is an error.
pub fn decode(json: Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Str(s),
        Json::Array(items) => Value::List(items.into_iter().map(decode).collect::<Result<_>>()?),
        Json::Object(obj) => {
            if obj.contains_key(MAP_TAG) {
                Value::Map(decode_escaped_map(obj)?)
            } else if obj.contains_key(ARRAY_TAG) {
                Value::Array(decode_array(obj)?)
            } else if obj.contains_key(COMPLEX_TAG) {
                Value::Complex(decode_complex(obj)?)
            } else if obj.contains_key(FLOAT_TAG) {
                Value::Float(decode_float_record(obj)?)
            } else {
                Value::Map(decode_entries(obj)?)
            }
        }
    })
}

fn decode_entries(obj: Map<String, Json>) -> Result<ValueMap> {
    obj.into_iter()
        .map(|(k, v)| decode(v).map(|v| (k, v)))
        .collect()
}

fn malformed(what: &str, detail: impl std::fmt::Display) -> SweepError {
    SweepError::Serialization(format!("malformed {what} record: {detail}"))
}

fn decode_array(obj: Map<String, Json>) -> Result<NdArray> {
    let payload = obj
        .get(ARRAY_TAG)
        .and_then(Json::as_str)
        .ok_or_else(|| malformed("array", "payload is not a string"))?;
    let tag = obj
        .get(DTYPE_KEY)
        .and_then(Json::as_str)
        .ok_or_else(|| malformed("array", "missing dtype"))?;
    let dtype =
        DType::from_tag(tag).ok_or_else(|| malformed("array", format!("unknown dtype '{tag}'")))?;
    let shape = obj
        .get(SHAPE_KEY)
        .and_then(Json::as_array)
        .ok_or_else(|| malformed("array", "missing shape"))?
        .iter()
        .map(|d| {
            d.as_u64()
                .and_then(|d| usize::try_from(d).ok())
                .ok_or_else(|| malformed("array", format!("invalid dimension {d}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| malformed("array", e))?;
    NdArray::from_le_bytes(dtype, shape, &bytes)
}

fn decode_escaped_map(mut obj: Map<String, Json>) -> Result<ValueMap> {
    if obj.len() != 1 {
        return Err(malformed("map", "unexpected extra keys"));
    }
    match obj.remove(MAP_TAG) {
        Some(Json::Object(inner)) => decode_entries(inner),
        _ => Err(malformed("map", "payload is not an object")),
    }
}

fn decode_complex(obj: Map<String, Json>) -> Result<Complex> {
    if obj.len() != 1 {
        return Err(malformed("complex", "unexpected extra keys"));
    }
    match obj.get(COMPLEX_TAG).and_then(Json::as_array).map(Vec::as_slice) {
        Some([re, im]) => Ok(Complex::new(decode_f64(re)?, decode_f64(im)?)),
        _ => Err(malformed("complex", "expected [re, im]")),
    }
}

fn decode_float_record(obj: Map<String, Json>) -> Result<f64> {
    if obj.len() != 1 {
        return Err(malformed("float", "unexpected extra keys"));
    }
    match obj.get(FLOAT_TAG).and_then(Json::as_str) {
        Some("nan") => Ok(f64::NAN),
        Some("inf") => Ok(f64::INFINITY),
        Some("-inf") => Ok(f64::NEG_INFINITY),
        other => Err(malformed("float", format!("{other:?}"))),
    }
}

fn decode_f64(json: &Json) -> Result<f64> {
    match json {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| malformed("complex", "component out of range")),
        Json::Object(obj) => decode_float_record(obj.clone()),
        other => Err(malformed("complex", format!("component {other}"))),
    }
}

/// Encode to compact JSON text
pub fn to_string(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&encode(value))?)
}

/// Encode to indented JSON text
pub fn to_string_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&encode(value))?)
}

/// Decode from JSON text
pub fn from_str(text: &str) -> Result<Value> {
    decode(serde_json::from_str(text)?)
}

/// Encode into a byte sink as indented JSON
pub fn dump<W: Write>(value: &Value, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &encode(value))?;
    Ok(())
}

/// Decode from a byte source
pub fn load<R: Read>(reader: R) -> Result<Value> {
    decode(serde_json::from_reader(reader)?)
}
