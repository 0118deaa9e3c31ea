//! A loaded table plus the thumbindex that numbers its rows.

use crate::codecs::decode_rect64;
use crate::column::Value;
use crate::config::{CatalogConfig, PathRewrite};
use crate::errors::Result;
use crate::filters::{parse_filters, FilterValue};
use crate::pmp::PmpTable;
use crate::thumbindex::ThumbIndex;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Ordered `key:value` metadata lines for one image path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub index: Option<usize>,
    pub lines: Vec<(String, String)>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.lines {
            writeln!(f, "{k}:{v}")?;
        }
        Ok(())
    }
}

pub struct Catalog {
    table: PmpTable,
    index: ThumbIndex,
    rewrite: Option<PathRewrite>,
}

impl Catalog {
    pub fn new(table: PmpTable, index: ThumbIndex, rewrite: Option<PathRewrite>) -> Self {
        Self { table, index, rewrite }
    }

    pub fn open(cfg: &CatalogConfig) -> Result<Self> {
        let table = PmpTable::load(&cfg.db_dir, &cfg.table)?;
        let index = ThumbIndex::load(cfg.thumbindex_path())?;
        info!(table = %cfg.table, columns = table.columns().len(), entries = index.len(), "catalog opened");
        Ok(Self::new(table, index, cfg.rewrite.clone()))
    }

    pub fn table(&self) -> &PmpTable { &self.table }

    pub fn index(&self) -> &ThumbIndex { &self.index }

    /// Row of `path`, after rewriting its local prefix to the recorded one.
    pub fn lookup(&self, path: &str) -> Option<usize> {
        match &self.rewrite {
            Some(rw) => self.index.index_of_file(&rw.apply(path)),
            None => self.index.index_of_file(path),
        }
    }

    pub fn record(&self, path: &str) -> Record {
        let index = self.lookup(path);
        let mut lines = Vec::new();
        let shown = index.map_or_else(|| "-1".to_string(), |i| i.to_string());
        lines.push(("pmp.index".to_string(), shown));

        for field in self.table.get_entry(index) {
            let key = format!("pmp.{}", field.column);
            let text = field.value.as_ref().map(Value::to_string).unwrap_or_default();
            lines.push((key.clone(), text));
            match (field.column, &field.value) {
                ("crop64", Some(v)) => {
                    if let Some(packed) = v.as_u64().filter(|p| *p != 0) {
                        lines.push((format!("{key}.xy"), decode_rect64(packed).to_string()));
                    }
                }
                ("filters", Some(Value::Str(s))) => push_filters(&key, s, &mut lines),
                _ => {}
            }
        }
        Record { index, lines }
    }
}

fn push_filters(key: &str, text: &str, lines: &mut Vec<(String, String)>) {
    for f in parse_filters(text) {
        match f.interpret() {
            Ok(FilterValue::Tilt { degrees }) => lines.push((format!("{key}.tilt"), format!("{degrees:.6}"))),
            Ok(FilterValue::Fill(amount)) => lines.push((format!("{key}.fill"), amount)),
            Ok(FilterValue::Crop(r)) => lines.push((format!("{key}.crop64xy"), r.to_string())),
            Ok(FilterValue::Other(args)) => lines.push((format!("{key}.{}", f.name), args)),
            Err(e) => debug!(error = %e, "skipping filter"),
        }
    }
}
