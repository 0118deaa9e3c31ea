//! The `filters` column: Picasa's edit stack as `name=arg,arg;name=arg;...`.

use crate::codecs::{parse_rect64, Rect64};
use crate::errors::{PicasaError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub name: String,
    /// Everything after `=`, verbatim.
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterValue {
    /// Straighten angle in degrees (the stored value is -1.0..=1.0 for ±10°).
    Tilt { degrees: f64 },
    Fill(String),
    Crop(Rect64),
    Other(String),
}

pub fn parse_filters(text: &str) -> Vec<Filter> {
    text.split(';')
        .filter_map(|item| {
            let (name, args) = item.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Filter { name: name.to_string(), args: args.to_string() })
        })
        .collect()
}

impl Filter {
    fn invalid(&self) -> PicasaError {
        PicasaError::InvalidFilter(format!("{}={}", self.name, self.args))
    }

    /// The args after the leading `1,` enable flag.
    fn enabled_args(&self) -> Result<&str> {
        match self.args.split_once(',') {
            Some(("1", rest)) => Ok(rest),
            _ => Err(self.invalid()),
        }
    }

    pub fn interpret(&self) -> Result<FilterValue> {
        match self.name.as_str() {
            "tilt" => {
                let (angle, tail) = self.enabled_args()?.split_once(',').ok_or_else(|| self.invalid())?;
                if tail != "0.000000" {
                    return Err(self.invalid());
                }
                let a: f64 = angle.parse().map_err(|_| self.invalid())?;
                Ok(FilterValue::Tilt { degrees: -10.0 * a })
            }
            "fill" => {
                let amount = self.enabled_args()?;
                if amount.contains(',') {
                    return Err(self.invalid());
                }
                Ok(FilterValue::Fill(amount.to_string()))
            }
            "crop64" => {
                let hex = self.enabled_args()?;
                parse_rect64(hex).map(FilterValue::Crop).map_err(|_| self.invalid())
            }
            _ => Ok(FilterValue::Other(self.args.clone())),
        }
    }
}
