use byteorder::{ByteOrder, LittleEndian as LE};
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

pub fn u16_at(buf: &[u8], off: usize) -> u16 { LE::read_u16(&buf[off..off + 2]) }
pub fn u32_at(buf: &[u8], off: usize) -> u32 { LE::read_u32(&buf[off..off + 4]) }

/// Read-only map of a whole file. The handle is closed once the map exists.
pub fn map_file(path: &Path) -> io::Result<Mmap> {
    let f = File::open(path)?;
    unsafe { Mmap::map(&f) }
}

/// Split a lookup path the way the thumbindex stores it:
/// `("/a/b/", "c.jpg")` for `/a/b/c.jpg`, `("/", "c.jpg")` for a bare name.
pub fn dir_and_base(path: &str) -> (String, &str) {
    match path.rsplit_once('/') {
        Some((dir, base)) => (format!("{dir}/"), base),
        None => ("/".to_string(), path),
    }
}

/// POSIX-style join: an absolute `name` or empty `dir` wins outright.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() || name.starts_with('/') {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
