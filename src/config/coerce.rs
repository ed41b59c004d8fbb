//! Type Coercion
//!
//! Pure conversions from raw option strings into typed values. Each
//! failure is a [`CoerceError`] whose kind decides the policy: integer
//! failures are recoverable, everything else aborts startup.

use regex::Regex;

use super::types::MimeTypes;
use crate::types::{CoerceError, CoerceKind};

/// Parse a base-10 integer, comparing the value rather than the text
///
/// Surrounding whitespace is ignored. The leading integer prefix must equal
/// the whole input read as a number, so `"12"`, `" 12"`, `"12."` and
/// `"12.0"` give 12 while `"12px"`, `"12.5"`, `"1e3"`, `"0x10"` and `""` are
/// rejected.
pub fn strict_int(field: &'static str, raw: &str) -> Result<i64, CoerceError> {
    let invalid =
        |reason: &str| CoerceError::new(field, CoerceKind::Integer, raw, reason.to_string());

    let trimmed = raw.trim();
    let unsigned = trimmed
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(trimmed);
    let prefix_len = trimmed.len() - unsigned.len()
        + unsigned.bytes().take_while(u8::is_ascii_digit).count();

    let value: i64 = trimmed[..prefix_len]
        .parse()
        .map_err(|_| invalid("not an integer"))?;
    if prefix_len == trimmed.len() {
        return Ok(value);
    }

    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() && number == value as f64 => Ok(value),
        _ => Err(invalid("not a whole number")),
    }
}

/// Accept a JSON number only when it is whole and fits in an `i64`
pub fn whole_number(field: &'static str, number: f64) -> Result<i64, CoerceError> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if number.is_finite()
        && number.fract() == 0.0
        && number >= i64::MIN as f64
        && number < i64::MAX as f64
    {
        Ok(number as i64)
    } else {
        Err(CoerceError::new(
            field,
            CoerceKind::Integer,
            number.to_string(),
            "not a whole number",
        ))
    }
}

/// Compile a plain pattern source; no flag modifiers
pub fn compile_pattern(field: &'static str, raw: &str) -> Result<Regex, CoerceError> {
    Regex::new(raw)
        .map_err(|e| CoerceError::new(field, CoerceKind::Pattern, raw, e.to_string()))
}

/// Split on `,` keeping empty segments and surrounding whitespace
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(String::from).collect()
}

/// Parse a mimetypes object, accepting single quotes in place of double quotes
pub fn parse_mimetypes(field: &'static str, raw: &str) -> Result<MimeTypes, CoerceError> {
    let normalized = raw.replace('\'', "\"");
    serde_json::from_str(&normalized)
        .map_err(|e| CoerceError::new(field, CoerceKind::MimeTypes, raw, e.to_string()))
}

/// Merge `incoming` over `existing`; keys in `incoming` replace existing ones
pub fn merge_mimetypes(existing: Option<MimeTypes>, incoming: MimeTypes) -> MimeTypes {
    let mut merged = existing.unwrap_or_default();
    merged.extend(incoming);
    merged
}

/// Split `ROUTE:TARGET` on the first `:` only
///
/// Further colons stay in the target (`C:\files`, `http://host:1234`).
/// Both halves must be non-empty.
pub fn split_route_pair(field: &'static str, raw: &str) -> Result<(String, String), CoerceError> {
    match raw.split_once(':') {
        Some((route, target)) if !route.is_empty() && !target.is_empty() => {
            Ok((route.to_string(), target.to_string()))
        }
        _ => Err(CoerceError::new(
            field,
            CoerceKind::RoutePair,
            raw,
            "expected ROUTE:TARGET",
        )),
    }
}
