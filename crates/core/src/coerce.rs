//! Field Coercion & Alias Resolution
//!
//! Helpers for reading loosely-shaped agent payloads: canonicalized key
//! lookup across historically-observed spellings, numeric coercion of
//! formatted strings ("$97.7B", "~73", "9.2%"), and confidence/margin
//! normalization onto the [0,1] scale.

use std::collections::HashMap;

use serde_json::Value;

/// Lowercase a key and strip everything that is not an ASCII alphanumeric.
///
/// "Operating Margin", "operating_margin", and "OPERATING-MARGIN" all
/// canonicalize to "operatingmargin".
pub fn canonicalize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Resolve a field by trying alias spellings in priority order.
///
/// Exact key matches win over canonicalized matches, and an earlier alias
/// wins over a later one within each pass. Values that are present but falsy
/// (explicit 0, empty string, null) are still returned; interpreting them is
/// the caller's business.
pub fn value_by_aliases<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let map = record.as_object()?;

    for alias in aliases {
        if let Some(value) = map.get(*alias) {
            return Some(value);
        }
    }

    let canonical: HashMap<String, &Value> = map
        .iter()
        .map(|(key, value)| (canonicalize_key(key), value))
        .collect();

    for alias in aliases {
        if let Some(value) = canonical.get(&canonicalize_key(alias)) {
            return Some(value);
        }
    }

    None
}

/// Coerce a value to a finite number.
///
/// Numbers pass through. Strings are stripped of every character outside
/// `0-9`, `.`, `-` before parsing, which absorbs currency symbols, unit
/// suffixes, percent signs, and approximation markers. Everything else is
/// no-value.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => str_to_number(text),
        _ => None,
    }
}

/// String half of [`to_number`], exposed for map keys (year-keyed income
/// statements) that never arrive as JSON values.
pub fn str_to_number(text: &str) -> Option<f64> {
    let normalized: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if normalized.is_empty() {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Normalize a confidence-like value onto [0,1].
///
/// Values above 1 are read as percentages and divided by 100; the result is
/// clamped to [0,1]. Absent or unparseable input is no-value so callers can
/// layer their own default.
pub fn normalize_confidence(value: Option<&Value>) -> Option<f64> {
    let numeric = value.and_then(to_number)?;
    let ratio = if numeric > 1.0 {
        numeric / 100.0
    } else {
        numeric
    };

    Some(ratio.clamp(0.0, 1.0))
}

/// Truthiness of a JSON value, matching the upstream agent contract:
/// null, false, 0, and the empty string are falsy; arrays and objects are
/// always truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a scalar for display: strings pass through, numbers and booleans
/// are formatted, containers fall back to compact JSON.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Display form of an optional field, falling back when the value is absent
/// or falsy.
pub fn display_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(value) if is_truthy(value) => display_string(value),
        _ => default.to_string(),
    }
}
