use crate::consts::{DEFAULT_TABLE, THUMBINDEX_FILE};
use crate::errors::{PicasaError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Maps a path prefix on this machine to the prefix Picasa recorded at scan
/// time, for libraries that were copied or are mounted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewrite {
    pub local: String,
    pub recorded: String,
}

impl PathRewrite {
    pub fn apply<'a>(&self, path: &'a str) -> Cow<'a, str> {
        match path.strip_prefix(self.local.as_str()) {
            Some(rest) if !self.local.is_empty() => Cow::Owned(format!("{}{rest}", self.recorded)),
            _ => Cow::Borrowed(path),
        }
    }
}

impl FromStr for PathRewrite {
    type Err = PicasaError;

    /// `local:recorded`
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((local, recorded)) if !local.is_empty() && !recorded.is_empty() => Ok(Self {
                local: local.to_string(),
                recorded: recorded.to_string(),
            }),
            _ => Err(PicasaError::InvalidRewrite(s.to_string())),
        }
    }
}

fn default_table() -> String { DEFAULT_TABLE.to_string() }

/// Where a Picasa database lives and how to address it.
///
/// JSON form:
/// ```json
/// { "db_dir": "/home/me/Picasa3/db3", "table": "imagedata",
///   "rewrite": { "local": "/mnt/photos", "recorded": "/home/me/Pictures" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub db_dir: PathBuf,
    /// Defaults to `<db_dir>/thumbindex.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbindex: Option<PathBuf>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<PathRewrite>,
}

impl CatalogConfig {
    pub fn new(db_dir: impl Into<PathBuf>) -> Self {
        Self { db_dir: db_dir.into(), thumbindex: None, table: default_table(), rewrite: None }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    pub fn thumbindex_path(&self) -> PathBuf {
        self.thumbindex.clone().unwrap_or_else(|| self.db_dir.join(THUMBINDEX_FILE))
    }
}
