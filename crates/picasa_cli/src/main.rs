use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use picasa_db::{
    codecs::{decode_variant_time, format_timestamp, parse_rect64},
    consts::NO_PARENT,
    Catalog, CatalogConfig, EntryInfo, EntryKind, PathRewrite, PmpTable, ThumbIndex,
};

#[derive(Parser)]
#[command(name = "picasa-meta", about = "Read metadata out of a Picasa 3 database")]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args, Clone)]
struct DbArgs {
    /// Picasa3 db3 directory
    #[arg(long)]
    db: Option<PathBuf>,
    /// Table name prefix of the .pmp files (default: imagedata)
    #[arg(long)]
    table: Option<String>,
    /// thumbindex.db location (default: <db>/thumbindex.db)
    #[arg(long)]
    thumbindex: Option<PathBuf>,
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Map a local path prefix to the one Picasa recorded
    #[arg(long, value_name = "LOCAL:RECORDED")]
    tweak: Option<PathRewrite>,
}

impl DbArgs {
    fn resolve(&self) -> Result<CatalogConfig> {
        let mut cfg = match (&self.config, &self.db) {
            (Some(p), _) => CatalogConfig::load(p)?,
            (None, Some(db)) => CatalogConfig::new(db),
            (None, None) => return Err(anyhow!("either --db or --config is required")),
        };
        if let (Some(_), Some(db)) = (&self.config, &self.db) {
            cfg.db_dir = db.clone();
        }
        if let Some(t) = &self.table {
            cfg.table = t.clone();
        }
        if let Some(t) = &self.thumbindex {
            cfg.thumbindex = Some(t.clone());
        }
        if let Some(rw) = &self.tweak {
            cfg.rewrite = Some(rw.clone());
        }
        Ok(cfg)
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Declared size of every column
    Columns {
        #[command(flatten)]
        db: DbArgs,
    },

    /// All column values of one row (negative = no row)
    Entry {
        #[command(flatten)]
        db: DbArgs,
        #[arg(long, allow_negative_numbers = true)]
        row: i64,
    },

    /// thumbindex row of a file path
    Lookup {
        #[command(flatten)]
        db: DbArgs,
        path: String,
    },

    /// key:value metadata lines for image paths
    Record {
        #[command(flatten)]
        db: DbArgs,
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Diagnostic view of one thumbindex record
    Dump {
        #[command(flatten)]
        db: DbArgs,
        #[arg(long)]
        index: usize,
    },

    /// Removed records that belonged to a parent record
    Children {
        #[command(flatten)]
        db: DbArgs,
        #[arg(long)]
        parent: u32,
    },

    /// Decode a packed rect64 (hex or rect64(hex))
    Rect64 { value: String },

    /// Decode an OLE variant time
    Vtime {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_index(db: &DbArgs) -> Result<(CatalogConfig, ThumbIndex)> {
    let cfg = db.resolve()?;
    let idx = ThumbIndex::load(cfg.thumbindex_path())?;
    Ok((cfg, idx))
}

fn render_kind(kind: EntryKind) -> String {
    match kind {
        EntryKind::Directory => "dir".to_string(),
        EntryKind::File { parent } => format!("file parent={parent}"),
        EntryKind::Detached { original_parent } => format!("detached parent={original_parent}"),
        EntryKind::Vacant => "vacant".to_string(),
    }
}

fn print_info(info: &EntryInfo<'_>) {
    let parent = match info.parent_name {
        Some(name) => format!(" ({name})"),
        None if info.original_parent == NO_PARENT => String::new(),
        None => " (dangling)".to_string(),
    };
    println!("[{:06} / {:#08x}] {} [{}]{parent}", info.index, info.index, render_kind(info.kind), info.name);
    println!("reserved: {}", hex::encode(info.reserved));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Cmd::Columns { db } => {
            let cfg = db.resolve()?;
            let table = PmpTable::load(&cfg.db_dir, &cfg.table)?;
            if cli.json {
                let cols: Vec<_> = table
                    .columns()
                    .iter()
                    .map(|c| json!({ "name": c.name, "kind": c.header.kind, "type": c.header.type_code, "size": c.size() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&cols)?);
            } else {
                for c in table.columns() {
                    println!("{}\t{:?}\t{}", c.name, c.header.kind, c.size());
                }
            }
        }
        Cmd::Entry { db, row } => {
            let cfg = db.resolve()?;
            let table = PmpTable::load(&cfg.db_dir, &cfg.table)?;
            let row = usize::try_from(row).ok();
            let entry = table.get_entry(row);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                for f in &entry {
                    let v = f.value.as_ref().map(|v| v.to_string()).unwrap_or_default();
                    println!("{}:{}", f.column, v);
                }
            }
        }
        Cmd::Lookup { db, path } => {
            let (cfg, idx) = open_index(&db)?;
            let wanted = match &cfg.rewrite {
                Some(rw) => rw.apply(&path).into_owned(),
                None => path.clone(),
            };
            let found = idx.index_of_file(&wanted);
            let full = found.map(|i| idx.image_full_name(i)).transpose()?;
            if cli.json {
                println!("{}", json!({ "path": wanted, "index": found, "full_name": full }));
            } else {
                match (found, full) {
                    (Some(i), Some(name)) => println!("{i}\t{name}"),
                    _ => println!("-1\t{wanted}"),
                }
            }
        }
        Cmd::Record { db, paths } => {
            let catalog = Catalog::open(&db.resolve()?)?;
            let records: Vec<_> = paths.iter().map(|p| catalog.record(p)).collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for (p, rec) in paths.iter().zip(&records) {
                    println!("# {p}");
                    print!("{rec}");
                }
            }
        }
        Cmd::Dump { db, index } => {
            let (_cfg, idx) = open_index(&db)?;
            let info = idx.entry_info(index)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print_info(&info);
            }
        }
        Cmd::Children { db, parent } => {
            let (_cfg, idx) = open_index(&db)?;
            let kids = idx.children_of(parent);
            if cli.json {
                println!("{}", serde_json::to_string(kids)?);
            } else if kids.is_empty() {
                println!("no children for #{parent}");
            } else {
                for k in kids {
                    println!("{k}");
                }
            }
        }
        Cmd::Rect64 { value } => {
            let r = parse_rect64(&value)?;
            if cli.json {
                println!("{}", serde_json::to_string(&r)?);
            } else {
                println!("{r}");
            }
        }
        Cmd::Vtime { value } => {
            let ts = format_timestamp(&decode_variant_time(value)?)?;
            if cli.json {
                println!("{}", json!({ "value": value, "timestamp": ts }));
            } else {
                println!("{ts}");
            }
        }
    }
    Ok(())
}
