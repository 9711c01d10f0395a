use chrono::NaiveDate;

use crate::process::utils::non_blank;

/// Numeric layouts read day-before-month. Two-digit years go first: `%Y` would
/// happily accept `20` as the year 20 AD. `%y` pivots at 70: `00..=69` is 20xx,
/// `70..=99` is 19xx.
const DAY_FIRST: &[&str] = &[
    "%d.%m.%y", "%d/%m/%y", "%d-%m-%y", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y",
];

/// Only tried once the day-first reading is impossible (e.g. `03/25/2021`).
const MONTH_FIRST: &[&str] = &[
    "%m.%d.%y", "%m/%d/%y", "%m-%d-%y", "%m.%d.%Y", "%m/%d/%Y", "%m-%d-%Y",
];

const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const TEXTUAL: &[&str] = &[
    "%d %B %Y", "%d %b %Y", "%d-%b-%Y", "%d %B, %Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y",
    "%b %d %Y",
];

/// Disclosure date → `"YYYY-MM-DD"`, or `None` when the cell is blank or unparseable.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    let raw = non_blank(raw)?;
    parse_day_first(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Best-effort calendar date parse with the day-first convention.
///
/// A time-of-day suffix (`05.03.2020 10:15`, `2020-03-05T10:15:00`) is ignored
/// for numeric layouts.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let date_part = s.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(s);

    parse_numeric(date_part).or_else(|| parse_with(s, TEXTUAL))
}

fn parse_numeric(s: &str) -> Option<NaiveDate> {
    if !s.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Some(d) = parse_compact(s) {
        return Some(d);
    }
    // A leading 4-digit group can only be a year.
    let leading_digits = s.chars().take_while(char::is_ascii_digit).count();
    if leading_digits == 4 {
        return parse_with(s, YEAR_FIRST);
    }
    parse_with(s, DAY_FIRST).or_else(|| parse_with(s, MONTH_FIRST))
}

/// `YYYYMMDD`; chrono's greedy `%Y` cannot split this on its own.
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_with(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
