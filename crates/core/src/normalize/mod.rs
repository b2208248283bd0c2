//! Field normalization at the backend boundary.
//!
//! Raw rows arrive with numbers as locale-formatted strings, dates in ISO or
//! German notation, and key names that differ between backend generations.
//! Every function here degrades to `None` instead of failing: a malformed
//! field must never take a dashboard down.

pub mod aliases;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::raw::RawRow;

pub use aliases::{LogicalField, ALIAS_TABLE_VERSION};

/// Parse an arbitrary JSON value into a finite number.
///
/// - `null` → `None`
/// - a JSON number → itself (if finite)
/// - a string → see [`parse_number_str`]
/// - anything else → `None`
#[must_use]
pub fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

/// Parse a possibly locale-formatted numeric string.
///
/// Everything except ASCII digits, `.`, `,` and `-` is stripped. When both
/// separators are present the rightmost one is the decimal point and the
/// other is a thousands separator (`"1.234,56"` and `"1,234.56"` both give
/// `1234.56`). A lone comma is a decimal point, so `"1,234"` gives `1.234`.
#[must_use]
pub fn parse_number_str(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let canonical = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Look up the first present, non-null value among `candidates`.
///
/// Each candidate is tried verbatim, then in snake_case, then all-lowercase,
/// before moving on to the next candidate.
#[must_use]
pub fn resolve_field<'a>(row: &'a RawRow, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|key| {
        key_variants(key)
            .iter()
            .find_map(|variant| row.get(variant.as_str()).filter(|v| !v.is_null()))
    })
}

/// Resolve a logical field through its alias table.
#[must_use]
pub fn resolve<'a>(row: &'a RawRow, field: LogicalField) -> Option<&'a Value> {
    resolve_field(row, field.aliases())
}

/// Resolve a logical field and parse it as a number.
#[must_use]
pub fn resolve_number(row: &RawRow, field: LogicalField) -> Option<f64> {
    resolve(row, field).and_then(parse_number)
}

/// Resolve a logical field as trimmed, non-empty text.
///
/// Numbers are rendered with their JSON representation so that numeric ids
/// (`{"id": 42}`) still come through.
#[must_use]
pub fn resolve_text(row: &RawRow, field: LogicalField) -> Option<String> {
    let text = match resolve(row, field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Resolve a logical field and parse it as a calendar date.
#[must_use]
pub fn resolve_date(row: &RawRow, field: LogicalField) -> Option<NaiveDate> {
    match resolve(row, field)? {
        Value::String(s) => parse_date(Some(s)),
        _ => None,
    }
}

/// Parse a date string to milliseconds since the Unix epoch.
///
/// `None` plays the role of "not a number": callers treat it as absent and
/// apply their own fallback.
#[must_use]
pub fn parse_date_ms(raw: Option<&str>) -> Option<i64> {
    parse_datetime(raw).map(|dt| dt.timestamp_millis())
}

/// Parse a date string into a UTC timestamp.
///
/// Standard notations are tried first (RFC 3339, Postgres `timestamptz`,
/// naive ISO date-times read as UTC, plain `YYYY-MM-DD`, RFC 2822). If none
/// match, the German `DD.MM.YYYY` form is tried at UTC midnight.
#[must_use]
pub fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    parse_standard(s).or_else(|| parse_german(s))
}

/// Parse a date string into a calendar date (UTC).
#[must_use]
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    parse_datetime(raw).map(|dt| dt.date_naive())
}

/// Lower-case and trim an e-mail address. Non-strings normalize to `""`.
#[must_use]
pub fn normalize_email(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.trim().to_lowercase(),
        _ => String::new(),
    }
}

/// Convert `camelCase` / `PascalCase` to `snake_case`.
///
/// Runs of capitals are kept together, so `"NAV"` becomes `"nav"` and
/// `"portfolioValue"` becomes `"portfolio_value"`.
#[must_use]
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for ch in key.chars() {
        if ch.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}

fn key_variants(key: &str) -> [String; 3] {
    [key.to_string(), to_snake_case(key), key.to_lowercase()]
}

const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_standard(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return utc_midnight(date);
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_german(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .ok()
        .and_then(utc_midnight)
}

pub(crate) fn utc_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
