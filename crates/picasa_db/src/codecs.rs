//! Value codecs for columns whose raw type hides their meaning.

use crate::errors::{PicasaError, Result};
use serde::Serialize;
use std::fmt;
use time::format_description::FormatItem;
use time::macros::{date, datetime, format_description};
use time::{Date, Duration, PrimitiveDateTime, Time};

const RECT_MAX: f64 = 65535.0;

/// Normalized rectangle packed into 64 bits as four big-endian-ordered u16
/// fields, x1 in the top 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect64 {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl fmt::Display for Rect64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6},{:.6},{:.6}", self.x1, self.y1, self.x2, self.y2)
    }
}

pub fn decode_rect64(packed: u64) -> Rect64 {
    let field = |shift: u32| ((packed >> shift) & 0xffff) as f64 / RECT_MAX;
    Rect64 { x1: field(48), y1: field(32), x2: field(16), y2: field(0) }
}

/// Accepts `8c20842f6d7fed1` or `rect64(8c20842f6d7fed1)`.
pub fn parse_rect64(text: &str) -> Result<Rect64> {
    let t = text.trim();
    let hex = t
        .strip_prefix("rect64(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(t)
        .trim();
    let packed = u64::from_str_radix(hex, 16).map_err(|_| PicasaError::InvalidRect64(text.to_string()))?;
    Ok(decode_rect64(packed))
}

/// Calendar date of variant day zero; also what a null (0.0) timestamp renders as.
const VARIANT_DAY0: Date = date!(1899 - 12 - 30);
const VARIANT_NULL: PrimitiveDateTime = datetime!(1899-12-30 0:00);
// keeps Duration::days far from overflow; the calendar range is checked after
const VARIANT_MAX_DAYS: f64 = 1.0e7;

const ISO_SECONDS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Decode an OLE variant time: days counted from 1899-12-30T24:00, fraction
/// is time of day. A negative fraction counts back from the next midnight and
/// is normalized by borrowing a day before splitting into h/m/s. Sub-second
/// remainders are truncated. `0.0` is the null date, 1899-12-30T00:00:00.
pub fn decode_variant_time(v: f64) -> Result<PrimitiveDateTime> {
    if !v.is_finite() || v.abs() > VARIANT_MAX_DAYS {
        return Err(PicasaError::InvalidVariantTime(v));
    }
    if v == 0.0 {
        return Ok(VARIANT_NULL);
    }

    let mut day = v.trunc() as i64;
    let mut frac = v.fract();
    if frac < 0.0 {
        frac += 1.0;
        day -= 1;
    }
    if frac >= 1.0 {
        frac = 0.0;
        day += 1;
    }

    // +1: the origin is the end of day zero
    let date = VARIANT_DAY0
        .checked_add(Duration::days(day + 1))
        .ok_or(PicasaError::InvalidVariantTime(v))?;

    let hours = 24.0 * frac;
    let minutes = 60.0 * hours.fract();
    let seconds = 60.0 * minutes.fract();
    let time = Time::from_hms(hours.trunc() as u8, minutes.trunc() as u8, seconds.trunc() as u8)
        .map_err(|_| PicasaError::InvalidVariantTime(v))?;
    Ok(PrimitiveDateTime::new(date, time))
}

/// `YYYY-MM-DDTHH:MM:SS`
pub fn format_timestamp(ts: &PrimitiveDateTime) -> Result<String> {
    Ok(ts.format(ISO_SECONDS)?)
}
