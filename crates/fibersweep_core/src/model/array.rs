//! Typed n-dimensional numeric arrays
//!
//! Storage is a flat row-major buffer plus a shape. A zero-dimensional array
//! (shape `[]`) holds exactly one element. The raw byte form used by the codec
//! is little-endian.

use serde::{Deserialize, Serialize};

use super::value::Complex;
use crate::error::{Result, SweepError};

/// Element type of an [`NdArray`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    UInt8,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex128,
}

impl DType {
    pub const ALL: [DType; 7] = [
        DType::Bool,
        DType::UInt8,
        DType::Int32,
        DType::Int64,
        DType::Float32,
        DType::Float64,
        DType::Complex128,
    ];

    /// Tag written into serialized array records
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::UInt8 => "uint8",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex128 => "complex128",
        }
    }

    /// Parse a dtype tag. Accepts the plain names and the little-endian
    /// array-protocol descriptors (`<f8`, `<c16`, ...).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let dtype = match tag {
            "bool" | "|b1" => DType::Bool,
            "uint8" | "|u1" => DType::UInt8,
            "int32" | "<i4" => DType::Int32,
            "int64" | "<i8" => DType::Int64,
            "float32" | "<f4" => DType::Float32,
            "float64" | "<f8" => DType::Float64,
            "complex128" | "<c16" => DType::Complex128,
            _ => return None,
        };
        Some(dtype)
    }

    /// Bytes per element
    #[must_use]
    pub fn item_size(self) -> usize {
        match self {
            DType::Bool | DType::UInt8 => 1,
            DType::Int32 | DType::Float32 => 4,
            DType::Int64 | DType::Float64 => 8,
            DType::Complex128 => 16,
        }
    }
}

/// Flat element buffer of an [`NdArray`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayData {
    Bool(Vec<bool>),
    UInt8(Vec<u8>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex128(Vec<Complex>),
}

impl ArrayData {
    #[must_use]
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Bool(_) => DType::Bool,
            ArrayData::UInt8(_) => DType::UInt8,
            ArrayData::Int32(_) => DType::Int32,
            ArrayData::Int64(_) => DType::Int64,
            ArrayData::Float32(_) => DType::Float32,
            ArrayData::Float64(_) => DType::Float64,
            ArrayData::Complex128(_) => DType::Complex128,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Bool(v) => v.len(),
            ArrayData::UInt8(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::Int64(v) => v.len(),
            ArrayData::Float32(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
            ArrayData::Complex128(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of elements covered by `shape`, failing on overflow
fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            SweepError::Serialization(format!("shape {shape:?} overflows the element count"))
        })
}

/// Typed numeric array with an explicit shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArray")]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

/// Unchecked wire form; deserialization goes through [`NdArray::new`]
#[derive(Deserialize)]
struct RawArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl TryFrom<RawArray> for NdArray {
    type Error = SweepError;

    fn try_from(raw: RawArray) -> Result<Self> {
        Self::new(raw.shape, raw.data)
    }
}

impl NdArray {
    /// Build an array, checking that the shape covers the buffer exactly.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Result<Self> {
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(SweepError::Serialization(format!(
                "shape {shape:?} needs {expected} elements but {} were given",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Zero-dimensional array holding a single element
    pub fn scalar(data: ArrayData) -> Result<Self> {
        Self::new(Vec::new(), data)
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[must_use]
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    #[must_use]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Real-valued elements widened to `f64`. `None` for complex and bool arrays.
    #[must_use]
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match &self.data {
            ArrayData::UInt8(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            ArrayData::Int32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            ArrayData::Int64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ArrayData::Float32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            ArrayData::Float64(v) => Some(v.clone()),
            ArrayData::Bool(_) | ArrayData::Complex128(_) => None,
        }
    }

    /// Raw little-endian element bytes in row-major order
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * self.dtype().item_size());
        match &self.data {
            ArrayData::Bool(v) => out.extend(v.iter().map(|&b| u8::from(b))),
            ArrayData::UInt8(v) => out.extend_from_slice(v),
            ArrayData::Int32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            ArrayData::Int64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            ArrayData::Float32(v) => {
                v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes()));
            }
            ArrayData::Float64(v) => {
                v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes()));
            }
            ArrayData::Complex128(v) => {
                for c in v {
                    out.extend_from_slice(&c.re.to_le_bytes());
                    out.extend_from_slice(&c.im.to_le_bytes());
                }
            }
        }
        out
    }

    /// Rebuild an array from raw little-endian bytes.
    ///
    /// Fails when the byte count does not match `product(shape) * item_size`.
    pub fn from_le_bytes(dtype: DType, shape: Vec<usize>, bytes: &[u8]) -> Result<Self> {
        let expected = element_count(&shape)?
            .checked_mul(dtype.item_size())
            .ok_or_else(|| {
                SweepError::Serialization(format!(
                    "{} array of shape {shape:?} is too large",
                    dtype.tag()
                ))
            })?;
        if bytes.len() != expected {
            return Err(SweepError::Serialization(format!(
                "{} array of shape {shape:?} needs {expected} bytes, payload has {}",
                dtype.tag(),
                bytes.len()
            )));
        }

        let data = match dtype {
            DType::Bool => ArrayData::Bool(bytes.iter().map(|&b| b != 0).collect()),
            DType::UInt8 => ArrayData::UInt8(bytes.to_vec()),
            DType::Int32 => ArrayData::Int32(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            DType::Int64 => ArrayData::Int64(bytes.chunks_exact(8).map(read_i64).collect()),
            DType::Float32 => ArrayData::Float32(
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            DType::Float64 => ArrayData::Float64(bytes.chunks_exact(8).map(read_f64).collect()),
            DType::Complex128 => ArrayData::Complex128(
                bytes
                    .chunks_exact(16)
                    .map(|c| Complex::new(read_f64(&c[..8]), read_f64(&c[8..])))
                    .collect(),
            ),
        };

        Self::new(shape, data)
    }
}

fn read_i64(chunk: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(chunk);
    i64::from_le_bytes(buf)
}

fn read_f64(chunk: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(chunk);
    f64::from_le_bytes(buf)
}

impl From<Vec<f64>> for NdArray {
    fn from(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            data: ArrayData::Float64(values),
        }
    }
}

impl From<Vec<Complex>> for NdArray {
    fn from(values: Vec<Complex>) -> Self {
        Self {
            shape: vec![values.len()],
            data: ArrayData::Complex128(values),
        }
    }
}
