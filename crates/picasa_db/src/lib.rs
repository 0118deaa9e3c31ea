pub mod consts;
pub mod errors;
pub mod utils;
pub mod column;
pub mod pmp;
pub mod thumbindex;
pub mod codecs;
pub mod filters;
pub mod config;
pub mod catalog;

pub use catalog::{Catalog, Record};
pub use codecs::{decode_rect64, decode_variant_time, format_timestamp, parse_rect64, Rect64};
pub use column::{decode_column, ColumnData, ColumnKind, Value};
pub use config::{CatalogConfig, PathRewrite};
pub use errors::{PicasaError, Result};
pub use filters::{parse_filters, Filter, FilterValue};
pub use pmp::{Field, PmpColumn, PmpHeader, PmpTable};
pub use thumbindex::{EntryInfo, EntryKind, ThumbIndex};
