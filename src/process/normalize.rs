//! Per-field normalizers. Every function here is total: a value that cannot be
//! made sense of becomes `None`, never an error or a panic.

use crate::process::utils::{collapse_whitespace, non_blank, none_if_empty};

pub use crate::process::date_parser::normalize_date;

/// Owner name → `"Surname I.P."`.
///
/// Names that already carry initials in the second token are only cleaned;
/// `Surname Name Patronymic` and `Surname Name` are reduced to initials; any
/// other shape is returned cleaned and period-terminated.
pub fn normalize_fio(raw: Option<&str>) -> Option<String> {
    let raw = non_blank(raw)?;

    let fio = collapse_whitespace(raw).replace(". ", ".");
    let parts: Vec<&str> = fio.split(' ').collect();
    let terminated = || {
        if fio.ends_with('.') {
            fio.clone()
        } else {
            format!("{fio}.")
        }
    };

    if parts.len() > 1 && parts[1].contains('.') {
        return Some(terminated());
    }

    let initial = |token: &str| token.chars().next().map(String::from).unwrap_or_default();
    let rewritten = match parts.as_slice() {
        [surname, name, patronymic] => {
            format!("{} {}.{}.", surname, initial(*name), initial(*patronymic))
        }
        [surname, name] => format!("{} {}.", surname, initial(*name)),
        _ => terminated(),
    };
    Some(rewritten)
}

/// Company name with `"` removed and whitespace collapsed.
pub fn normalize_company(raw: Option<&str>) -> Option<String> {
    let raw = non_blank(raw)?;
    none_if_empty(collapse_whitespace(&raw.replace('"', "")))
}

/// Tax id kept verbatim as text so leading zeros and long digit runs survive.
pub fn normalize_inn(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_string)
}

/// Ownership share on a 0–100 scale.
///
/// Spaces and `%` are dropped and a decimal comma is accepted. Values `<= 1`
/// are read as fractions (`"0.35"` → `35.0`).
pub fn normalize_ownership(raw: Option<&str>) -> Option<f64> {
    let raw = non_blank(raw)?;
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let value: f64 = cleaned.parse().ok()?;
    if value.is_nan() {
        return None;
    }
    Some(if value <= 1.0 { value * 100.0 } else { value })
}

/// Region and source are carried as-is; only an empty cell becomes `None`.
pub fn pass_through(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}
