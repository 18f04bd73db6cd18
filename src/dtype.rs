//! Element scalar types and byte order, matching common ENVI data-type codes.

use byteorder::{BigEndian, ByteOrder as ByteOrderExt, LittleEndian};
use serde::{Deserialize, Serialize};

/// Element scalar type of a cube's stored samples.
///
/// Codes follow the common ENVI convention referenced by header parsers that
/// populate a [`crate::cube::Cube`] before `open` is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum DataType {
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Float32 = 4,
    Float64 = 5,
    UInt16 = 12,
    UInt32 = 13,
    Int64 = 14,
    UInt64 = 15,
}

impl DataType {
    /// Parse from a raw ENVI data-type code.
    pub fn from_code(code: i32) -> Result<Self, String> {
        match code {
            1 => Ok(Self::Int8),
            2 => Ok(Self::Int16),
            3 => Ok(Self::Int32),
            4 => Ok(Self::Float32),
            5 => Ok(Self::Float64),
            12 => Ok(Self::UInt16),
            13 => Ok(Self::UInt32),
            14 => Ok(Self::Int64),
            15 => Ok(Self::UInt64),
            _ => Err(format!("invalid data type code: {code}")),
        }
    }

    /// Raw ENVI data-type code for this type.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Size in bytes of a single element.
    pub fn item_size(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Whether this type is an integer type (used by `guess_scale_factor`).
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64)
    }
}

impl Default for DataType {
    /// Default element type used by `create_cube` when the caller does not specify one.
    fn default() -> Self {
        Self::Int16
    }
}

/// On-disk byte order of a cube's stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Parse from a raw ENVI byte-order code (0 = little, 1 = big).
    pub fn from_code(code: i32) -> Result<Self, String> {
        match code {
            0 => Ok(Self::Little),
            1 => Ok(Self::Big),
            _ => Err(format!("invalid byte order code: {code}")),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }

    /// The process-wide host byte order, derived once.
    pub fn host() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    pub fn is_host(self) -> bool {
        self == Self::host()
    }
}

/// A single decoded pixel value, tagged by its source [`DataType`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CubeValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
}

impl CubeValue {
    /// Widen to `f64` for arithmetic (extrema tracking, bbl masking, wavelength math).
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int8(v) => v as f64,
            Self::Int16(v) => v as f64,
            Self::Int32(v) => v as f64,
            Self::Int64(v) => v as f64,
            Self::UInt16(v) => v as f64,
            Self::UInt32(v) => v as f64,
            Self::UInt64(v) => v as f64,
            Self::Float32(v) => v as f64,
            Self::Float64(v) => v,
        }
    }

    pub fn data_type(self) -> DataType {
        match self {
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
        }
    }
}

/// An owned, host-order buffer of cube samples, one variant per [`DataType`].
///
/// Every "copy"/"not in place" accessor on [`crate::reader::Reader`] returns a
/// `CubeBuffer`; raw in-place accessors instead decode straight from the
/// mapped byte source each reader holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CubeBuffer {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl CubeBuffer {
    /// An empty, typed buffer with `capacity` reserved, ready for `push`.
    pub fn with_capacity(dtype: DataType, capacity: usize) -> Self {
        match dtype {
            DataType::Int8 => Self::Int8(Vec::with_capacity(capacity)),
            DataType::Int16 => Self::Int16(Vec::with_capacity(capacity)),
            DataType::Int32 => Self::Int32(Vec::with_capacity(capacity)),
            DataType::Int64 => Self::Int64(Vec::with_capacity(capacity)),
            DataType::UInt16 => Self::UInt16(Vec::with_capacity(capacity)),
            DataType::UInt32 => Self::UInt32(Vec::with_capacity(capacity)),
            DataType::UInt64 => Self::UInt64(Vec::with_capacity(capacity)),
            DataType::Float32 => Self::Float32(Vec::with_capacity(capacity)),
            DataType::Float64 => Self::Float64(Vec::with_capacity(capacity)),
        }
    }

    /// Append a value decoded elsewhere onto this buffer.
    ///
    /// Panics if `value`'s type does not match the buffer's type; callers
    /// always push values decoded with the same `dtype` used in `with_capacity`.
    pub fn push(&mut self, value: CubeValue) {
        match (self, value) {
            (Self::Int8(v), CubeValue::Int8(x)) => v.push(x),
            (Self::Int16(v), CubeValue::Int16(x)) => v.push(x),
            (Self::Int32(v), CubeValue::Int32(x)) => v.push(x),
            (Self::Int64(v), CubeValue::Int64(x)) => v.push(x),
            (Self::UInt16(v), CubeValue::UInt16(x)) => v.push(x),
            (Self::UInt32(v), CubeValue::UInt32(x)) => v.push(x),
            (Self::UInt64(v), CubeValue::UInt64(x)) => v.push(x),
            (Self::Float32(v), CubeValue::Float32(x)) => v.push(x),
            (Self::Float64(v), CubeValue::Float64(x)) => v.push(x),
            _ => unreachable!("CubeBuffer::push type mismatch"),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
        }
    }

    /// Fetch element `i` widened to `f64`.
    pub fn get_f64(&self, i: usize) -> f64 {
        match self {
            Self::Int8(v) => v[i] as f64,
            Self::Int16(v) => v[i] as f64,
            Self::Int32(v) => v[i] as f64,
            Self::Int64(v) => v[i] as f64,
            Self::UInt16(v) => v[i] as f64,
            Self::UInt32(v) => v[i] as f64,
            Self::UInt64(v) => v[i] as f64,
            Self::Float32(v) => v[i] as f64,
            Self::Float64(v) => v[i],
        }
    }

    pub fn get(&self, i: usize) -> CubeValue {
        match self {
            Self::Int8(v) => CubeValue::Int8(v[i]),
            Self::Int16(v) => CubeValue::Int16(v[i]),
            Self::Int32(v) => CubeValue::Int32(v[i]),
            Self::Int64(v) => CubeValue::Int64(v[i]),
            Self::UInt16(v) => CubeValue::UInt16(v[i]),
            Self::UInt32(v) => CubeValue::UInt32(v[i]),
            Self::UInt64(v) => CubeValue::UInt64(v[i]),
            Self::Float32(v) => CubeValue::Float32(v[i]),
            Self::Float64(v) => CubeValue::Float64(v[i]),
        }
    }

    /// Reverse the byte order of every element in place.
    ///
    /// Swapping the bytes of a value decoded assuming the wrong endianness
    /// yields exactly the value that decoding with the correct endianness
    /// would have produced, so this is what lets raw (host-order) accessors
    /// become honestly byte-order-correct cooked ones without ever touching
    /// the underlying mapping again.
    pub fn byteswap_in_place(&mut self) {
        match self {
            Self::Int8(_) => {}
            Self::Int16(v) => v.iter_mut().for_each(|x| *x = x.swap_bytes()),
            Self::Int32(v) => v.iter_mut().for_each(|x| *x = x.swap_bytes()),
            Self::Int64(v) => v.iter_mut().for_each(|x| *x = x.swap_bytes()),
            Self::UInt16(v) => v.iter_mut().for_each(|x| *x = x.swap_bytes()),
            Self::UInt32(v) => v.iter_mut().for_each(|x| *x = x.swap_bytes()),
            Self::UInt64(v) => v.iter_mut().for_each(|x| *x = x.swap_bytes()),
            Self::Float32(v) => v
                .iter_mut()
                .for_each(|x| *x = f32::from_bits(x.to_bits().swap_bytes())),
            Self::Float64(v) => v
                .iter_mut()
                .for_each(|x| *x = f64::from_bits(x.to_bits().swap_bytes())),
        }
    }

    /// Minimum and maximum of the buffer, widened to `f64`. `None` if empty.
    pub fn min_max_f64(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut min = self.get_f64(0);
        let mut max = min;
        for i in 1..self.len() {
            let v = self.get_f64(i);
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        Some((min, max))
    }

    /// Multiply every element by a 0/1 mask (the bad-band list), in place.
    ///
    /// Used by the cooked spectrum accessor, where the buffer is one value per band.
    pub fn apply_bbl(&mut self, bbl: &[u8]) {
        self.apply_bbl_rows(bbl, 1);
    }

    /// Multiply each contiguous `row_len`-element row by the corresponding
    /// `bbl` entry, in place. Used by the cooked line-of-spectra accessor,
    /// where the buffer is `bands` rows of `samples` elements each and the
    /// mask is indexed by band (row), not by element.
    pub fn apply_bbl_rows(&mut self, bbl: &[u8], row_len: usize) {
        debug_assert_eq!(self.len(), bbl.len() * row_len);
        let expanded: Vec<u8> = bbl.iter().flat_map(|&m| std::iter::repeat(m).take(row_len)).collect();
        match self {
            Self::Int8(v) => apply_mask(v, &expanded, |x, m| x * m as i8),
            Self::Int16(v) => apply_mask(v, &expanded, |x, m| x * m as i16),
            Self::Int32(v) => apply_mask(v, &expanded, |x, m| x * m as i32),
            Self::Int64(v) => apply_mask(v, &expanded, |x, m| x * m as i64),
            Self::UInt16(v) => apply_mask(v, &expanded, |x, m| x * m as u16),
            Self::UInt32(v) => apply_mask(v, &expanded, |x, m| x * m as u32),
            Self::UInt64(v) => apply_mask(v, &expanded, |x, m| x * m as u64),
            Self::Float32(v) => apply_mask(v, &expanded, |x, m| x * m as f32),
            Self::Float64(v) => apply_mask(v, &expanded, |x, m| x * m as f64),
        }
    }

    /// Decode `count` elements of `dtype` starting at `byte_offset` in `bytes`,
    /// honoring `order`, into a freshly owned host-order buffer.
    pub fn decode(bytes: &[u8], byte_offset: usize, dtype: DataType, order: ByteOrder, count: usize) -> Self {
        macro_rules! decode_ints {
            ($read:ident, $variant:ident, $ty:ty) => {{
                let mut out = Vec::with_capacity(count);
                for i in 0..count {
                    let start = byte_offset + i * dtype.item_size();
                    let chunk = &bytes[start..start + dtype.item_size()];
                    let v = match order {
                        ByteOrder::Little => LittleEndian::$read(chunk),
                        ByteOrder::Big => BigEndian::$read(chunk),
                    };
                    out.push(v as $ty);
                }
                Self::$variant(out)
            }};
        }
        match dtype {
            DataType::Int8 => {
                let mut out = Vec::with_capacity(count);
                for i in 0..count {
                    out.push(bytes[byte_offset + i] as i8);
                }
                Self::Int8(out)
            }
            DataType::Int16 => decode_ints!(read_i16, Int16, i16),
            DataType::UInt16 => decode_ints!(read_u16, UInt16, u16),
            DataType::Int32 => decode_ints!(read_i32, Int32, i32),
            DataType::UInt32 => decode_ints!(read_u32, UInt32, u32),
            DataType::Int64 => decode_ints!(read_i64, Int64, i64),
            DataType::UInt64 => decode_ints!(read_u64, UInt64, u64),
            DataType::Float32 => {
                let mut out = Vec::with_capacity(count);
                for i in 0..count {
                    let start = byte_offset + i * dtype.item_size();
                    let chunk = &bytes[start..start + dtype.item_size()];
                    let v = match order {
                        ByteOrder::Little => LittleEndian::read_f32(chunk),
                        ByteOrder::Big => BigEndian::read_f32(chunk),
                    };
                    out.push(v);
                }
                Self::Float32(out)
            }
            DataType::Float64 => {
                let mut out = Vec::with_capacity(count);
                for i in 0..count {
                    let start = byte_offset + i * dtype.item_size();
                    let chunk = &bytes[start..start + dtype.item_size()];
                    let v = match order {
                        ByteOrder::Little => LittleEndian::read_f64(chunk),
                        ByteOrder::Big => BigEndian::read_f64(chunk),
                    };
                    out.push(v);
                }
                Self::Float64(out)
            }
        }
    }

    /// Decode `count` contiguous elements starting at `byte_offset` and append
    /// them to this buffer. Used to assemble a gathered buffer one contiguous
    /// run at a time (e.g. one line's worth of samples per band).
    pub fn extend_decode(&mut self, bytes: &[u8], byte_offset: usize, order: ByteOrder, count: usize) {
        let dtype = self.data_type();
        let decoded = Self::decode(bytes, byte_offset, dtype, order, count);
        match (self, decoded) {
            (Self::Int8(v), Self::Int8(d)) => v.extend(d),
            (Self::Int16(v), Self::Int16(d)) => v.extend(d),
            (Self::Int32(v), Self::Int32(d)) => v.extend(d),
            (Self::Int64(v), Self::Int64(d)) => v.extend(d),
            (Self::UInt16(v), Self::UInt16(d)) => v.extend(d),
            (Self::UInt32(v), Self::UInt32(d)) => v.extend(d),
            (Self::UInt64(v), Self::UInt64(d)) => v.extend(d),
            (Self::Float32(v), Self::Float32(d)) => v.extend(d),
            (Self::Float64(v), Self::Float64(d)) => v.extend(d),
            _ => unreachable!("extend_decode type mismatch"),
        }
    }

    /// Decode a single element at flat index `index` (0-based, counted in elements).
    pub fn decode_one(bytes: &[u8], data_offset: usize, dtype: DataType, order: ByteOrder, index: usize) -> CubeValue {
        let offset = data_offset + index * dtype.item_size();
        Self::decode(bytes, offset, dtype, order, 1).get(0)
    }

    /// Re-encode every element in native byte order.
    ///
    /// Raw accessors always decode assuming host order (see
    /// [`byteswap_in_place`](Self::byteswap_in_place)'s doc comment), so
    /// encoding back with native order reproduces the exact on-disk bytes:
    /// this is what lets the streaming re-interleaver reshuffle axis order
    /// without ever touching endianness.
    pub fn encode_host(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * self.data_type().item_size());
        match self {
            Self::Int8(v) => v.iter().for_each(|x| out.push(*x as u8)),
            Self::Int16(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::Int32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::Int64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::UInt16(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::UInt32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::UInt64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::Float32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
            Self::Float64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_ne_bytes())),
        }
        out
    }

    /// Reshape a `(rows, cols)` row-major buffer into `(cols, rows)`.
    pub fn transpose(&self, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(self.len(), rows * cols);
        let mut out = Self::with_capacity(self.data_type(), rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                out.push(self.get(r * cols + c));
            }
        }
        out
    }
}

fn apply_mask<T: Copy>(v: &mut [T], mask: &[u8], f: impl Fn(T, u8) -> T) {
    for (x, m) in v.iter_mut().zip(mask.iter()) {
        *x = f(*x, *m);
    }
}
