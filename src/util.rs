/// Utility helpers used by both pipelines.
///
/// This module contains:
/// - Locale-aware numeric cleaning for scraped cell text
/// - Time helpers
///
/// IMPORTANT:
/// - No pipeline-specific business logic should live here.
/// - This module must remain lightweight and deterministic.
///
use chrono::{Datelike, Local};

/// Cleans and parses a number written in Brazilian locale format.
///
/// Rules:
/// - '.' is a thousands separator and is stripped
/// - ',' is the decimal separator and becomes '.'
/// - Surrounding whitespace is ignored
/// - Anything unparseable resolves to 0.0 rather than failing
///
/// Examples:
/// - "1.234,56" -> 1234.56
/// - "3,405"    -> 3.405
/// - ""         -> 0.0
///
/// DESIGN NOTES:
/// - Falling back to 0.0 keeps a single malformed cell from killing
///   a whole-page extraction; the row count is the integrity signal.
///
pub fn clean_number(raw: &str) -> f64 {
    raw.trim()
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Current local calendar date as (year, month, day).
///
/// Used to stamp every extracted row with the capture date. All rows
/// of one run carry the same date unless the run crosses midnight.
pub fn today_ymd() -> (i32, u32, u32) {
    let now = Local::now();
    (now.year(), now.month(), now.day())
}
