#![allow(dead_code)]

use byteorder::{LittleEndian as LE, WriteBytesExt};
use picasa_db::consts::{NO_PARENT, PMP_CONST_SHORT, PMP_CONST_WORD, PMP_MAGIC, THUMB_MAGIC, THUMB_RESERVED_LEN};
use std::fs;
use std::path::{Path, PathBuf};

pub fn pmp_header(type_code: u16, size: u32) -> Vec<u8> {
    let mut h = Vec::new();
    h.write_u32::<LE>(PMP_MAGIC).unwrap();
    h.write_u16::<LE>(type_code).unwrap();
    h.write_u16::<LE>(PMP_CONST_SHORT).unwrap();
    h.write_u32::<LE>(PMP_CONST_WORD).unwrap();
    h.write_u16::<LE>(type_code).unwrap();
    h.write_u16::<LE>(PMP_CONST_SHORT).unwrap();
    h.write_u32::<LE>(size).unwrap();
    h
}

pub fn write_pmp(dir: &Path, table: &str, column: &str, type_code: u16, size: u32, body: &[u8]) -> PathBuf {
    let path = dir.join(format!("{table}_{column}.pmp"));
    let mut bytes = pmp_header(type_code, size);
    bytes.extend_from_slice(body);
    fs::write(&path, bytes).unwrap();
    path
}

pub fn strings(items: &[&str]) -> Vec<u8> {
    let mut b = Vec::new();
    for s in items {
        b.extend_from_slice(s.as_bytes());
        b.push(0);
    }
    b
}

pub fn u32s(items: &[u32]) -> Vec<u8> {
    let mut b = Vec::new();
    for v in items {
        b.write_u32::<LE>(*v).unwrap();
    }
    b
}

pub fn u64s(items: &[u64]) -> Vec<u8> {
    let mut b = Vec::new();
    for v in items {
        b.write_u64::<LE>(*v).unwrap();
    }
    b
}

pub fn f64s(items: &[f64]) -> Vec<u8> {
    let mut b = Vec::new();
    for v in items {
        b.write_f64::<LE>(*v).unwrap();
    }
    b
}

pub fn thumbindex(records: &[(&str, u32)]) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u32::<LE>(THUMB_MAGIC).unwrap();
    b.write_u32::<LE>(records.len() as u32).unwrap();
    for (name, parent) in records {
        b.extend_from_slice(name.as_bytes());
        b.push(0);
        b.extend_from_slice(&[0u8; THUMB_RESERVED_LEN]);
        b.write_u32::<LE>(*parent).unwrap();
    }
    b
}

/// Two directories, three live images, two removed face records, one vacant slot.
///
/// | # | name            | parent |
/// |---|-----------------|--------|
/// | 0 | /photos/2010/   | -      |
/// | 1 | a.jpg           | 0      |
/// | 2 | b.jpg           | 0      |
/// | 3 | /photos/2011/   | -      |
/// | 4 | c.jpg           | 3      |
/// | 5 | (removed)       | 1      |
/// | 6 | (removed)       | 1      |
/// | 7 | (vacant)        | -      |
pub fn library_records() -> Vec<(&'static str, u32)> {
    vec![
        ("/photos/2010/", NO_PARENT),
        ("a.jpg", 0),
        ("b.jpg", 0),
        ("/photos/2011/", NO_PARENT),
        ("c.jpg", 3),
        ("", 1),
        ("", 1),
        ("", NO_PARENT),
    ]
}

/// `imagedata` columns matching `library_records`; `crop64` and `filters`
/// stop before the last rows.
pub fn write_library(dir: &Path) {
    fs::write(dir.join("thumbindex.db"), thumbindex(&library_records())).unwrap();
    let captions = ["", "Christmas 1978", "beach", "", "snow", "", "", ""];
    write_pmp(dir, "imagedata", "caption", 0, 8, &strings(&captions));
    write_pmp(dir, "imagedata", "rotate", 3, 8, &[0, 1, 0, 0, 3, 0, 0, 0]);
    write_pmp(dir, "imagedata", "crop64", 4, 3, &u64s(&[0, 0x08c2_0842_f6d7_fed1, 0]));
    write_pmp(
        dir,
        "imagedata",
        "filters",
        6,
        2,
        &strings(&["", "autolight=1;crop64=1,8c20842f6d7fed1;fill=1,0.289720;tilt=1,0.5,0.000000;bogus=;"]),
    );
    write_pmp(dir, "imagedata", "date", 2, 8, &f64s(&[0.0, 28849.332685, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0]));
    // unrelated table and stray files must be ignored
    write_pmp(dir, "albumdata", "name", 0, 1, &strings(&["Album"]));
    fs::write(dir.join("imagedata_notes.txt"), b"not a column").unwrap();
}
