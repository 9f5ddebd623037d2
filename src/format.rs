use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::ChartInput;

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// `D° M' S"` with each step truncated, never rounded.
pub fn format_degree(degree: f64) -> String {
    let deg = degree.floor();
    let min_decimal = (degree - deg) * 60.0;
    let min = min_decimal.floor();
    let sec = ((min_decimal - min) * 60.0).floor();
    format!("{}° {}' {}\"", deg as i64, min as i64, sec as i64)
}

/// Two decimals and a degree glyph, as printed in report tables.
pub fn format_decimal_degree(degree: f64) -> String {
    format!("{degree:.2}°")
}

pub fn format_time(hour: u32, minute: u32, second: u32) -> String {
    format!("{hour:02}:{minute:02}:{second:02}")
}

pub fn format_date_numeric(year: i32, month: u32, day: u32) -> String {
    format!("{day:02}/{month:02}/{year}")
}

/// `M/D/YYYY`, the short form used in the report footer.
pub fn format_date_short(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}°, {longitude:.4}°")
}

pub fn birth_date(input: &ChartInput) -> String {
    format_date_numeric(input.year, input.month, input.day)
}

pub fn birth_time(input: &ChartInput) -> String {
    format_time(input.hour, input.minute, input.second)
}

/// Replaces every whitespace run with a single underscore.
pub fn sanitize_file_stem(name: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(name, "_").into_owned()
}
