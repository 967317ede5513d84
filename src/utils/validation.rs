//! Input sanitization and numeric coercion
//!
//! Request fields arrive as loosely typed JSON or form values. Text fields go
//! through [`sanitize_text`]; numeric fields go through either the lenient
//! [`absint`] (creation) or the strict [`numeric`] (partial update).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Complete markup tags; a `<` without a closing `>` is plain text
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Percent-encoded octets such as `%0A`
static OCTET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[a-fA-F0-9]{2}").unwrap());

/// Runs of whitespace, line breaks included
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A complete numeric string: optional sign, decimal digits, optional exponent
static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").unwrap()
});

/// The numeric prefix of a string, used for lenient integer parsing
static LEADING_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").unwrap()
});

/// Clean a single-line text field.
///
/// Strips markup tags and percent-encoded octets, collapses whitespace runs to
/// one space, drops remaining control characters and trims both ends.
pub fn sanitize_text(input: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(input, "");
    let without_octets = OCTET_REGEX.replace_all(&without_tags, "");
    let collapsed = WHITESPACE_REGEX.replace_all(&without_octets, " ");

    collapsed
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Render a scalar request value as text, if it has a textual form
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Lenient absolute-integer coercion.
///
/// Uses the leading number of a string (`"12abc"` is 12), takes the absolute
/// value and truncates fractions. Anything without a numeric prefix is 0 and
/// values beyond `u32::MAX` saturate.
pub fn absint(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n.as_f64().map(float_to_u32).unwrap_or(0),
        Value::String(s) => LEADING_NUMBER_REGEX
            .find(s)
            .and_then(|m| m.as_str().trim().parse::<f64>().ok())
            .map(float_to_u32)
            .unwrap_or(0),
        Value::Bool(b) => u32::from(*b),
        _ => 0,
    }
}

/// Strict numeric check followed by absolute-integer conversion.
///
/// Accepts JSON numbers and strings that are numeric in their entirety.
/// Returns `None` for anything else, including values that do not fit `u32`.
pub fn numeric(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if NUMERIC_REGEX.is_match(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let magnitude = number.abs().trunc();
    if !magnitude.is_finite() || magnitude > f64::from(u32::MAX) {
        return None;
    }
    Some(magnitude as u32)
}

fn float_to_u32(number: f64) -> u32 {
    let magnitude = number.abs().trunc();
    if magnitude.is_nan() {
        0
    } else if magnitude >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        magnitude as u32
    }
}
