//! PMP tables: one file per column, `<table>_<column>.pmp`.
//!
//! Header (LE, 20 bytes):
//!   magic[4]   = 0x3fcccccd
//!   type1[2]   = column type code (see `column`)
//!   c1[2]      = 0x1332
//!   c2[4]      = 0x00000002
//!   type2[2]   = type1
//!   c3[2]      = 0x1332
//!   size[4]    = declared element count
//!
//! Columns grow independently, so a table is ragged: every column keeps its
//! own size and a row may exist in one column but not in another.

use crate::column::{decode_column, ColumnData, ColumnKind, Value};
use crate::consts::{PMP_CONST_SHORT, PMP_CONST_WORD, PMP_EXTENSION, PMP_HDR_SIZE, PMP_MAGIC};
use crate::errors::{PicasaError, Result};
use crate::utils::{map_file, u16_at, u32_at};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PmpHeader {
    pub type_code: u16,
    pub kind: ColumnKind,
    pub size: u32,
}

impl PmpHeader {
    /// Validate the fixed preamble of `file`; `bytes` is the whole file.
    pub fn parse(bytes: &[u8], file: &Path) -> Result<Self> {
        if bytes.len() < PMP_HDR_SIZE {
            return Err(PicasaError::TruncatedHeader { file: file.to_path_buf(), len: bytes.len() });
        }
        let magic = u32_at(bytes, 0);
        let type1 = u16_at(bytes, 4);
        let c1 = u16_at(bytes, 6);
        let c2 = u32_at(bytes, 8);
        let type2 = u16_at(bytes, 12);
        let c3 = u16_at(bytes, 14);
        let size = u32_at(bytes, 16);

        let bad = |field: &'static str, expected: u32, found: u32| PicasaError::BadHeader {
            file: file.to_path_buf(),
            field,
            expected,
            found,
        };
        if magic != PMP_MAGIC { return Err(bad("magic", PMP_MAGIC, magic)); }
        if c1 != PMP_CONST_SHORT { return Err(bad("c1", PMP_CONST_SHORT as u32, c1 as u32)); }
        if c2 != PMP_CONST_WORD { return Err(bad("c2", PMP_CONST_WORD, c2)); }
        if c3 != PMP_CONST_SHORT { return Err(bad("c3", PMP_CONST_SHORT as u32, c3 as u32)); }
        if type1 != type2 {
            return Err(PicasaError::TypeMismatch { file: file.to_path_buf(), type1, type2 });
        }
        let kind = ColumnKind::from_code(type1)
            .ok_or_else(|| PicasaError::UnknownType { file: file.to_path_buf(), code: type1 })?;
        Ok(Self { type_code: type1, kind, size })
    }
}

#[derive(Debug, Clone)]
pub struct PmpColumn {
    pub name: String,
    pub path: PathBuf,
    pub header: PmpHeader,
    pub data: ColumnData,
}

impl PmpColumn {
    /// Declared row count from the header (equal to the decoded count after a load).
    pub fn size(&self) -> u32 { self.header.size }

    pub fn get(&self, row: usize) -> Option<Value> {
        if row < self.header.size as usize { self.data.get(row) } else { None }
    }
}

/// One cell of a row lookup; `value` is `None` where the column has no such row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field<'a> {
    pub column: &'a str,
    pub value: Option<Value>,
}

/// A whole table, decoded eagerly and read-only afterwards.
#[derive(Debug, Clone)]
pub struct PmpTable {
    name: String,
    columns: Vec<PmpColumn>,
}

impl PmpTable {
    /// Load every `<table>_*.pmp` in `dir`. Any bad column fails the whole table.
    pub fn load(dir: impl AsRef<Path>, table: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let files = discover(dir, table)?;
        if files.is_empty() {
            warn!(table, dir = %dir.display(), "no column files found");
        }
        let mut columns = Vec::with_capacity(files.len());
        for (name, path) in files {
            columns.push(load_column(table, name, path)?);
        }
        debug!(table, columns = columns.len(), "pmp table loaded");
        Ok(Self { name: table.to_string(), columns })
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn columns(&self) -> &[PmpColumn] { &self.columns }

    pub fn column(&self, name: &str) -> Option<&PmpColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// `(column, declared size)` in discovery order.
    pub fn column_sizes(&self) -> Vec<(&str, u32)> {
        self.columns.iter().map(|c| (c.name.as_str(), c.size())).collect()
    }

    /// Every column's value at `row`. `None` stands for "no such row" and
    /// yields an entry with every field empty.
    pub fn get_entry(&self, row: Option<usize>) -> Vec<Field<'_>> {
        self.columns
            .iter()
            .map(|c| Field { column: c.name.as_str(), value: row.and_then(|r| c.get(r)) })
            .collect()
    }

    pub fn value(&self, column: &str, row: usize) -> Option<Value> {
        self.column(column).and_then(|c| c.get(row))
    }
}

fn discover(dir: &Path, table: &str) -> Result<Vec<(String, PathBuf)>> {
    let prefix = format!("{table}_");
    let mut out = Vec::new();
    for ent in fs::read_dir(dir)? {
        let ent = ent?;
        if !ent.file_type()?.is_file() { continue; }
        let path = ent.path();
        if path.extension().and_then(|e| e.to_str()) != Some(PMP_EXTENSION) { continue; }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
        if let Some(column) = stem.strip_prefix(&prefix) {
            if !column.is_empty() {
                out.push((column.to_string(), path.clone()));
            }
        }
    }
    out.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(out)
}

fn load_column(table: &str, name: String, path: PathBuf) -> Result<PmpColumn> {
    let map = map_file(&path)?;
    let header = PmpHeader::parse(&map, &path)?;
    let mut body = &map[PMP_HDR_SIZE..];
    let data = decode_column(&mut body, header.kind, header.size)?;
    if data.len() != header.size as usize {
        return Err(PicasaError::SizeMismatch {
            file: path,
            table: table.to_string(),
            column: name,
            expected: header.size,
            actual: data.len(),
        });
    }
    if !body.is_empty() {
        warn!(file = %path.display(), trailing = body.len(), "ignoring bytes after last element");
    }
    debug!(column = %name, kind = ?header.kind, size = header.size, "column decoded");
    Ok(PmpColumn { name, path, header, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(type1: u16, type2: u16, size: u32) -> Vec<u8> {
        let mut h = Vec::with_capacity(PMP_HDR_SIZE);
        h.extend_from_slice(&PMP_MAGIC.to_le_bytes());
        h.extend_from_slice(&type1.to_le_bytes());
        h.extend_from_slice(&PMP_CONST_SHORT.to_le_bytes());
        h.extend_from_slice(&PMP_CONST_WORD.to_le_bytes());
        h.extend_from_slice(&type2.to_le_bytes());
        h.extend_from_slice(&PMP_CONST_SHORT.to_le_bytes());
        h.extend_from_slice(&size.to_le_bytes());
        h
    }

    #[test]
    fn parses_valid_header() {
        let h = PmpHeader::parse(&header(7, 7, 42), Path::new("t_c.pmp")).unwrap();
        assert_eq!(h.kind, ColumnKind::U32);
        assert_eq!(h.type_code, 7);
        assert_eq!(h.size, 42);
    }

    #[test]
    fn rejects_each_constant() {
        let p = Path::new("t_c.pmp");
        for (off, field) in [(0usize, "magic"), (6, "c1"), (8, "c2"), (14, "c3")] {
            let mut h = header(1, 1, 0);
            h[off] ^= 0x01;
            match PmpHeader::parse(&h, p) {
                Err(PicasaError::BadHeader { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field}: {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_type_disagreement_and_unknown_type() {
        let p = Path::new("t_c.pmp");
        assert!(matches!(
            PmpHeader::parse(&header(1, 3, 0), p),
            Err(PicasaError::TypeMismatch { type1: 1, type2: 3, .. })
        ));
        let err = PmpHeader::parse(&header(9, 9, 0), p).unwrap_err();
        assert!(matches!(err, PicasaError::UnknownType { code: 9, .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn short_header() {
        let err = PmpHeader::parse(&header(1, 1, 0)[..19], Path::new("x.pmp")).unwrap_err();
        assert!(matches!(err, PicasaError::TruncatedHeader { len: 19, .. }));
    }
}
