//! Element decoding for one PMP column body.
//!
//! Type codes (from the 20-byte header):
//!   0 | 6 = NUL-terminated strings
//!   1 | 7 = u32 LE
//!   2     = f64 LE
//!   3     = u8
//!   4     = u64 LE
//!   5     = u16 LE
//!
//! The decoder never pads: it returns what the stream really holds and the
//! caller compares `len()` with the declared size.

use byteorder::{LittleEndian as LE, ReadBytesExt};
use serde::Serialize;
use std::fmt;
use std::io::{self, BufRead};

// upper bound on up-front allocation; a corrupt size field must not reserve gigabytes
const PREALLOC_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Str,
    U32,
    F64,
    U8,
    U64,
    U16,
}

impl ColumnKind {
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0 | 6 => ColumnKind::Str,
            1 | 7 => ColumnKind::U32,
            2 => ColumnKind::F64,
            3 => ColumnKind::U8,
            4 => ColumnKind::U64,
            5 => ColumnKind::U16,
            _ => return None,
        })
    }

    /// Element width in bytes; `None` for variable-length strings.
    pub fn width(self) -> Option<usize> {
        match self {
            ColumnKind::Str => None,
            ColumnKind::U8 => Some(1),
            ColumnKind::U16 => Some(2),
            ColumnKind::U32 => Some(4),
            ColumnKind::U64 | ColumnKind::F64 => Some(8),
        }
    }
}

/// One decoded cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F64(f64),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(v) => Some(v as u64),
            Value::U16(v) => Some(v as u64),
            Value::U32(v) => Some(v as u64),
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
        }
    }
}

/// Decoded column body, one typed vector per element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Strings(Vec<String>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F64(Vec<f64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Strings(v) => v.len(),
            ColumnData::U8(v) => v.len(),
            ColumnData::U16(v) => v.len(),
            ColumnData::U32(v) => v.len(),
            ColumnData::U64(v) => v.len(),
            ColumnData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Strings(_) => ColumnKind::Str,
            ColumnData::U8(_) => ColumnKind::U8,
            ColumnData::U16(_) => ColumnKind::U16,
            ColumnData::U32(_) => ColumnKind::U32,
            ColumnData::U64(_) => ColumnKind::U64,
            ColumnData::F64(_) => ColumnKind::F64,
        }
    }

    pub fn get(&self, i: usize) -> Option<Value> {
        match self {
            ColumnData::Strings(v) => v.get(i).cloned().map(Value::Str),
            ColumnData::U8(v) => v.get(i).copied().map(Value::U8),
            ColumnData::U16(v) => v.get(i).copied().map(Value::U16),
            ColumnData::U32(v) => v.get(i).copied().map(Value::U32),
            ColumnData::U64(v) => v.get(i).copied().map(Value::U64),
            ColumnData::F64(v) => v.get(i).copied().map(Value::F64),
        }
    }
}

/// Decode a column body.
///
/// Strings are read until the stream ends, so the result may hold more or
/// fewer elements than `declared`. Fixed-width kinds read at most `declared`
/// elements and stop at the first incomplete one.
pub fn decode_column<R: BufRead>(r: &mut R, kind: ColumnKind, declared: u32) -> io::Result<ColumnData> {
    let cap = (declared as usize).min(PREALLOC_LIMIT);
    Ok(match kind {
        ColumnKind::Str => ColumnData::Strings(read_strings(r, cap)?),
        ColumnKind::U8 => ColumnData::U8(read_fixed(r, declared, cap, |r| r.read_u8())?),
        ColumnKind::U16 => ColumnData::U16(read_fixed(r, declared, cap, |r| r.read_u16::<LE>())?),
        ColumnKind::U32 => ColumnData::U32(read_fixed(r, declared, cap, |r| r.read_u32::<LE>())?),
        ColumnKind::U64 => ColumnData::U64(read_fixed(r, declared, cap, |r| r.read_u64::<LE>())?),
        ColumnKind::F64 => ColumnData::F64(read_fixed(r, declared, cap, |r| r.read_f64::<LE>())?),
    })
}

fn read_strings<R: BufRead>(r: &mut R, cap: usize) -> io::Result<Vec<String>> {
    let mut out = Vec::with_capacity(cap);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if r.read_until(0, &mut buf)? == 0 {
            break;
        }
        if buf.pop() != Some(0) {
            // unterminated tail
            break;
        }
        out.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(out)
}

fn read_fixed<R, T, F>(r: &mut R, declared: u32, cap: usize, mut read_one: F) -> io::Result<Vec<T>>
where
    R: BufRead,
    F: FnMut(&mut R) -> io::Result<T>,
{
    let mut out = Vec::with_capacity(cap);
    for _ in 0..declared {
        match read_one(r) {
            Ok(v) => out.push(v),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}
