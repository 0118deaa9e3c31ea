use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PicasaError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Time format: {0}")]
    TimeFormat(#[from] time::error::Format),

    #[error("{}: header truncated ({len} bytes)", file.display())]
    TruncatedHeader { file: PathBuf, len: usize },

    #[error("{}: failed {field}: expected {expected:#x}, found {found:#x}", file.display())]
    BadHeader {
        file: PathBuf,
        field: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("{}: type1 ({type1:#x}) not equal to type2 ({type2:#x})", file.display())]
    TypeMismatch { file: PathBuf, type1: u16, type2: u16 },

    #[error("{}: unknown column type {code}", file.display())]
    UnknownType { file: PathBuf, code: u16 },

    #[error("{}: expected {expected} entries in {table}/{column} but read {actual}", file.display())]
    SizeMismatch {
        file: PathBuf,
        table: String,
        column: String,
        expected: u32,
        actual: usize,
    },

    #[error("{}: magic bytes {found:#x} != {expected:#x}", file.display())]
    ThumbMagic { file: PathBuf, expected: u32, found: u32 },

    #[error("{}: expected {expected} entries but found {found}", file.display())]
    ThumbTruncated { file: PathBuf, expected: u32, found: usize },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("index {index} out of range (entries={len})")]
    OutOfRange { index: usize, len: usize },

    #[error("bad rect64 value: {0}")]
    InvalidRect64(String),

    #[error("variant time {0} has no calendar date")]
    InvalidVariantTime(f64),

    #[error("bad filter: {0}")]
    InvalidFilter(String),

    #[error("bad path rewrite: {0} (want local:recorded)")]
    InvalidRewrite(String),
}

impl PicasaError {
    /// Errors that abort a PMP table load: the file is not a valid column.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PicasaError::TruncatedHeader { .. }
                | PicasaError::BadHeader { .. }
                | PicasaError::TypeMismatch { .. }
                | PicasaError::UnknownType { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PicasaError>;
