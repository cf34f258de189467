//! Value coercion for spreadsheet cells.
//!
//! Both coercers follow the same rule: a malformed cell never fails. Dates
//! that cannot be understood pass through as text, numbers that cannot be
//! understood become zero.

use crate::cell::Cell;
use crate::record::{Amount, NumericKind};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest serial a spreadsheet can represent (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Whole days above this count include the phantom 1900-02-29.
const LEAP_BUG_SERIAL: i64 = 59;

const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y.%m.%d", "%Y%m%d", "%m/%d/%Y", "%Y. %m. %d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Normalize a cell to a `YYYY-MM-DD` string.
pub fn normalize_date(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::DateTime(dt) => dt.format("%Y-%m-%d").to_string(),
        Cell::Number(n) => match serial_to_datetime(*n) {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => cell.to_string(),
        },
        Cell::Bool(_) => cell.to_string(),
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return String::new();
            }
            if s.len() == 10 && s.matches('-').count() == 2 {
                return s.to_string();
            }
            match parse_date_str(s) {
                Some(d) => d.format("%Y-%m-%d").to_string(),
                None => s.to_string(),
            }
        }
    }
}

/// Convert a 1900-epoch serial day count to a date-time.
///
/// Serial 1 is 1900-01-01. Serial 60 is the nonexistent 1900-02-29, so every
/// serial past 59 is shifted back one day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }

    let mut days = serial.trunc() as i64;
    if days > LEAP_BUG_SERIAL {
        days -= 1;
    }
    let seconds = (serial.fract() * 86_400.0).round() as i64;

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 31)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(seconds))
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a cell as a float. `None` means the cell held something that is
/// not a number; blank cells are `Some(0.0)`.
pub fn parse_float(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Bool(b) => f64::from(u8::from(*b)),
        Cell::DateTime(_) => return None,
        Cell::Text(s) => {
            let cleaned = s.replace(',', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                0.0
            } else {
                cleaned.parse::<f64>().ok()?
            }
        }
    };

    value.is_finite().then_some(value)
}

/// Normalize a cell to a float, defaulting to zero.
pub fn normalize_float(cell: &Cell) -> f64 {
    parse_float(cell).unwrap_or(0.0)
}

/// Normalize a cell to an integer, truncating toward zero and defaulting to
/// zero.
pub fn normalize_int(cell: &Cell) -> i64 {
    parse_float(cell).map(|n| n.trunc() as i64).unwrap_or(0)
}

/// Normalize a cell to the amount type declared by a layout.
pub fn normalize_amount(cell: &Cell, kind: NumericKind) -> Amount {
    match kind {
        NumericKind::Int => Amount::Int(normalize_int(cell)),
        NumericKind::Float => Amount::Float(normalize_float(cell)),
    }
}
