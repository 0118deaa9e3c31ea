//! `thumbindex.db`: the flat path index shared by every PMP table.
//!
//! Layout (LE):
//!   magic[4] = 0x40466666
//!   count[4] = number of records
//!   repeat count * {
//!     name bytes, terminated by 0x00 or 0xff
//!     reserved[26]
//!     parent[4]  (record index of the containing directory, or 0xffffffff)
//!   }
//!
//! Directory records hold their full path with a trailing `/`; file records
//! hold a basename and point at their directory. A record with an empty name
//! was removed: its parent is forced to the sentinel and the original parent
//! goes into the children map instead. Record numbers are 0-based and equal
//! the row numbers of the PMP tables.

use crate::consts::{NO_PARENT, THUMB_HDR_SIZE, THUMB_MAGIC, THUMB_RESERVED_LEN};
use crate::errors::{PicasaError, Result};
use crate::utils::{dir_and_base, join_path, map_file, u32_at};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const RECORD_TAIL: usize = THUMB_RESERVED_LEN + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntryKind {
    /// Top-level directory: named, no parent.
    Directory,
    /// Named record with a live parent.
    File { parent: u32 },
    /// Removed record still linked to its former parent through the children map.
    Detached { original_parent: u32 },
    /// Removed record with no recoverable parent.
    Vacant,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo<'a> {
    pub index: usize,
    pub name: &'a str,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub original_parent: u32,
    pub parent_name: Option<&'a str>,
    pub reserved: &'a [u8; THUMB_RESERVED_LEN],
}

#[derive(Debug, Clone)]
pub struct ThumbIndex {
    declared: u32,
    names: Vec<String>,
    reserved: Vec<[u8; THUMB_RESERVED_LEN]>,
    original_parents: Vec<u32>,
    parents: Vec<u32>,
    children: HashMap<u32, Vec<usize>>,
}

impl ThumbIndex {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let map = map_file(path)?;
        Self::from_bytes(&map, path)
    }

    /// Parse a complete thumbindex image; `origin` only labels errors.
    pub fn from_bytes(bytes: &[u8], origin: &Path) -> Result<Self> {
        if bytes.len() < THUMB_HDR_SIZE {
            return Err(PicasaError::TruncatedHeader { file: origin.to_path_buf(), len: bytes.len() });
        }
        let magic = u32_at(bytes, 0);
        if magic != THUMB_MAGIC {
            return Err(PicasaError::ThumbMagic { file: origin.to_path_buf(), expected: THUMB_MAGIC, found: magic });
        }
        let declared = u32_at(bytes, 4);

        let cap = (declared as usize).min(bytes.len() / (RECORD_TAIL + 1));
        let mut idx = Self {
            declared,
            names: Vec::with_capacity(cap),
            reserved: Vec::with_capacity(cap),
            original_parents: Vec::with_capacity(cap),
            parents: Vec::with_capacity(cap),
            children: HashMap::new(),
        };

        let mut rest = &bytes[THUMB_HDR_SIZE..];
        while !rest.is_empty() {
            let Some(end) = rest.iter().position(|&b| b == 0x00 || b == 0xff) else { break };
            let tail = &rest[end + 1..];
            if tail.len() < RECORD_TAIL {
                break;
            }
            let name = String::from_utf8_lossy(&rest[..end]).into_owned();
            let mut reserved = [0u8; THUMB_RESERVED_LEN];
            reserved.copy_from_slice(&tail[..THUMB_RESERVED_LEN]);
            let parent = u32_at(tail, THUMB_RESERVED_LEN);
            idx.push(name, reserved, parent);
            rest = &tail[RECORD_TAIL..];
        }

        if idx.names.len() != declared as usize {
            return Err(PicasaError::ThumbTruncated {
                file: origin.to_path_buf(),
                expected: declared,
                found: idx.names.len(),
            });
        }
        debug!(entries = declared, detached_parents = idx.children.len(), "thumbindex loaded");
        Ok(idx)
    }

    fn push(&mut self, name: String, reserved: [u8; THUMB_RESERVED_LEN], parent: u32) {
        let index = self.names.len();
        let live = if name.is_empty() {
            if parent != NO_PARENT {
                self.children.entry(parent).or_default().push(index);
            }
            NO_PARENT
        } else {
            parent
        };
        self.names.push(name);
        self.reserved.push(reserved);
        self.original_parents.push(parent);
        self.parents.push(live);
    }

    /// Number of records (equal to the declared count after a successful load).
    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn declared_entries(&self) -> u32 { self.declared }

    /// First live record whose name is the basename of `full_path` and whose
    /// parent directory record equals its dirname plus `/`. Linear scan.
    pub fn index_of_file(&self, full_path: &str) -> Option<usize> {
        let (dir, base) = dir_and_base(full_path);
        (0..self.names.len()).find(|&i| {
            let p = self.parents[i];
            p != NO_PARENT
                && self.names[i] == base
                && self.names.get(p as usize).is_some_and(|d| *d == dir)
        })
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.names.len() {
            Ok(())
        } else {
            Err(PicasaError::OutOfRange { index, len: self.names.len() })
        }
    }

    /// Directory of a record; empty for top-level directories and removed records.
    pub fn image_path(&self, index: usize) -> Result<&str> {
        self.check(index)?;
        let p = self.parents[index];
        if p == NO_PARENT {
            return Ok("");
        }
        Ok(self.names.get(p as usize).map_or("", String::as_str))
    }

    pub fn image_name(&self, index: usize) -> Result<&str> {
        self.check(index)?;
        Ok(&self.names[index])
    }

    pub fn image_full_name(&self, index: usize) -> Result<String> {
        Ok(join_path(self.image_path(index)?, self.image_name(index)?))
    }

    /// Removed records whose parent (before removal) was `original_parent`.
    pub fn children_of(&self, original_parent: u32) -> &[usize] {
        self.children.get(&original_parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, original_parent: u32) -> bool {
        self.children.contains_key(&original_parent)
    }

    pub fn original_parent(&self, index: usize) -> Result<u32> {
        self.check(index)?;
        Ok(self.original_parents[index])
    }

    pub fn reserved(&self, index: usize) -> Result<&[u8; THUMB_RESERVED_LEN]> {
        self.check(index)?;
        Ok(&self.reserved[index])
    }

    pub fn entry_kind(&self, index: usize) -> Result<EntryKind> {
        self.check(index)?;
        Ok(self.kind_unchecked(index))
    }

    fn kind_unchecked(&self, index: usize) -> EntryKind {
        let orig = self.original_parents[index];
        match (self.names[index].is_empty(), orig == NO_PARENT) {
            (false, true) => EntryKind::Directory,
            (false, false) => EntryKind::File { parent: orig },
            (true, false) => EntryKind::Detached { original_parent: orig },
            (true, true) => EntryKind::Vacant,
        }
    }

    pub fn iter_kinds(&self) -> impl Iterator<Item = EntryKind> + '_ {
        (0..self.names.len()).map(|i| self.kind_unchecked(i))
    }

    /// Everything known about one record, for diagnostics.
    pub fn entry_info(&self, index: usize) -> Result<EntryInfo<'_>> {
        self.check(index)?;
        let original_parent = self.original_parents[index];
        let parent_name = if original_parent == NO_PARENT {
            None
        } else {
            self.names.get(original_parent as usize).map(String::as_str)
        };
        Ok(EntryInfo {
            index,
            name: &self.names[index],
            kind: self.kind_unchecked(index),
            original_parent,
            parent_name,
            reserved: &self.reserved[index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(records: &[(&str, u32)], declared: u32) -> Vec<u8> {
        let mut b = THUMB_MAGIC.to_le_bytes().to_vec();
        b.extend_from_slice(&declared.to_le_bytes());
        for (i, (name, parent)) in records.iter().enumerate() {
            b.extend_from_slice(name.as_bytes());
            b.push(0);
            b.extend_from_slice(&[i as u8; THUMB_RESERVED_LEN]);
            b.extend_from_slice(&parent.to_le_bytes());
        }
        b
    }

    fn sample() -> ThumbIndex {
        let recs = [
            ("/a/b/", NO_PARENT),
            ("c.jpg", 0),
            ("", 1),
            ("", 1),
            ("d.jpg", 0),
            ("", NO_PARENT),
        ];
        ThumbIndex::from_bytes(&image(&recs, 6), Path::new("thumbindex.db")).unwrap()
    }

    #[test]
    fn resolves_paths() {
        let idx = sample();
        assert_eq!(idx.len(), 6);
        assert_eq!(idx.index_of_file("/a/b/c.jpg"), Some(1));
        assert_eq!(idx.index_of_file("/a/b/d.jpg"), Some(4));
        assert_eq!(idx.index_of_file("/a/x/c.jpg"), None);
        assert_eq!(idx.index_of_file("/a/b/"), None);
        assert_eq!(idx.image_full_name(1).unwrap(), "/a/b/c.jpg");
        assert_eq!(idx.image_full_name(0).unwrap(), "/a/b/");
        assert_eq!(idx.image_path(2).unwrap(), "");
        assert!(matches!(idx.image_name(6), Err(PicasaError::OutOfRange { index: 6, len: 6 })));
    }

    #[test]
    fn removed_records_feed_children_map() {
        let idx = sample();
        assert_eq!(idx.children_of(1), &[2, 3]);
        assert!(idx.children_of(0).is_empty());
        assert!(idx.has_children(1));
        assert_eq!(idx.original_parent(2).unwrap(), 1);
        assert_eq!(idx.entry_kind(2).unwrap(), EntryKind::Detached { original_parent: 1 });
        assert_eq!(idx.entry_kind(5).unwrap(), EntryKind::Vacant);
        assert_eq!(idx.entry_kind(0).unwrap(), EntryKind::Directory);
        assert_eq!(idx.entry_kind(4).unwrap(), EntryKind::File { parent: 0 });
    }

    #[test]
    fn ff_terminates_names() {
        let mut b = image(&[], 1);
        b.extend_from_slice(b"x.jpg");
        b.push(0xff);
        b.extend_from_slice(&[0u8; THUMB_RESERVED_LEN]);
        b.extend_from_slice(&NO_PARENT.to_le_bytes());
        let idx = ThumbIndex::from_bytes(&b, Path::new("t")).unwrap();
        assert_eq!(idx.image_name(0).unwrap(), "x.jpg");
    }

    #[test]
    fn reserved_bytes_kept_verbatim() {
        let idx = sample();
        assert_eq!(idx.reserved(4).unwrap(), &[4u8; THUMB_RESERVED_LEN]);
        let info = idx.entry_info(1).unwrap();
        assert_eq!(info.parent_name, Some("/a/b/"));
        assert_eq!(info.reserved, &[1u8; THUMB_RESERVED_LEN]);
    }

    #[test]
    fn count_must_match() {
        let recs = [("/a/", NO_PARENT), ("b.jpg", 0)];
        let err = ThumbIndex::from_bytes(&image(&recs, 3), Path::new("t")).unwrap_err();
        assert!(matches!(err, PicasaError::ThumbTruncated { expected: 3, found: 2, .. }));

        let mut short = image(&recs, 2);
        short.truncate(short.len() - 1);
        let err = ThumbIndex::from_bytes(&short, Path::new("t")).unwrap_err();
        assert!(matches!(err, PicasaError::ThumbTruncated { expected: 2, found: 1, .. }));
    }

    #[test]
    fn bad_magic() {
        let mut b = image(&[], 0);
        b[0] ^= 0x80;
        assert!(matches!(
            ThumbIndex::from_bytes(&b, Path::new("t")),
            Err(PicasaError::ThumbMagic { expected: THUMB_MAGIC, .. })
        ));
    }
}
