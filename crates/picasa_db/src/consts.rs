// crates/picasa_db/src/consts.rs

use core::mem::size_of;

/// First word of every `<table>_<column>.pmp` file.
pub const PMP_MAGIC: u32 = 0x3fcc_cccd;
/// Fixed short found at offsets 6 and 14 of a PMP header.
pub const PMP_CONST_SHORT: u16 = 0x1332;
/// Fixed word found at offset 8 of a PMP header.
pub const PMP_CONST_WORD: u32 = 0x0000_0002;
pub const PMP_HDR_SIZE: usize = 20;
pub const PMP_EXTENSION: &str = "pmp";

pub const THUMB_MAGIC: u32 = 0x4046_6666;
pub const THUMB_HDR_SIZE: usize = 8;
/// Opaque bytes between a record's name and its parent index.
pub const THUMB_RESERVED_LEN: usize = 26;
/// Parent index of a top-level directory or of an invalidated record.
pub const NO_PARENT: u32 = 0xFFFF_FFFF;

pub const DEFAULT_TABLE: &str = "imagedata";
pub const THUMBINDEX_FILE: &str = "thumbindex.db";

const _: () = {
    assert!(size_of::<u32>() + 2 * size_of::<u16>() + size_of::<u32>() + 2 * size_of::<u16>() + size_of::<u32>() == PMP_HDR_SIZE);
    assert!(2 * size_of::<u32>() == THUMB_HDR_SIZE);
};
