//! Permissive release-date parsing
//!
//! Playlist exports mix full dates, year-month pairs, bare years and the
//! occasional localized format. Everything that cannot be read yields
//! `None` instead of failing the upload.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Full-date layouts tried in order; day-first wins over month-first on
/// ambiguous slash dates
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Extract the release year from a free-form date string
///
/// # Examples
/// ```
/// use songgame_common::release_date::parse_release_year;
///
/// assert_eq!(parse_release_year("2020-01-01"), Some(2020));
/// assert_eq!(parse_release_year("1999"), Some(1999));
/// assert_eq!(parse_release_year("not a date"), None);
/// ```
pub fn parse_release_year(raw: &str) -> Option<i32> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.year());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.year());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.year());
        }
    }

    // Year-month ("1987-06") and bare year ("1987") precision
    if let Some((year, month)) = value.split_once('-') {
        let month_ok = month.parse::<u32>().map(|m| (1..=12).contains(&m)).unwrap_or(false);
        if month_ok {
            return parse_bare_year(year);
        }
        return None;
    }

    parse_bare_year(value)
}

fn parse_bare_year(value: &str) -> Option<i32> {
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
