use serde_json::{Map, Value as JsonValue};
use unicode_normalization::UnicodeNormalization;

/// Maximum number of chars kept for a string field of a payload
pub const MAX_TEXT_LENGTH: usize = 1000;
/// Maximum number of chars kept for each element of an array field of a payload
pub const MAX_ARRAY_ITEM_LENGTH: usize = 200;

/// Cleans a payload before it is stored next to a vector.
///
/// - strings: typographic quotes, dashes and ellipsis are replaced by their ASCII equivalents,
///   control characters are removed, the result is NFC normalized and truncated to `MAX_TEXT_LENGTH` chars
/// - numbers and booleans: kept as is
/// - arrays: each element is turned into a string truncated to `MAX_ARRAY_ITEM_LENGTH` chars
/// - anything else (null, objects): rendered as a string, then cleaned like a string
///
/// Never fails, and sanitizing an already sanitized payload returns it unchanged.
/// Lengths are counted in chars (Unicode scalar values), not bytes.
pub fn sanitize(payload: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    payload
        .iter()
        .map(|(key, value)| (key.clone(), sanitize_value(value)))
        .collect()
}

fn sanitize_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(text) => JsonValue::String(sanitize_text(text)),
        JsonValue::Number(_) | JsonValue::Bool(_) => value.clone(),
        JsonValue::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| JsonValue::String(truncate(&render(item), MAX_ARRAY_ITEM_LENGTH)))
                .collect(),
        ),
        JsonValue::Null | JsonValue::Object(_) => JsonValue::String(sanitize_text(&render(value))),
    }
}

/// Control characters are removed before normalizing: removing them afterwards
/// could leave a base char next to a combining mark that NFC would compose.
fn sanitize_text(text: &str) -> String {
    let mut replaced = String::with_capacity(text.len());
    for c in text.chars().filter(|c| !c.is_control()) {
        match c {
            '\u{2018}' | '\u{2019}' => replaced.push('\''),
            '\u{201C}' | '\u{201D}' => replaced.push('"'),
            '\u{2013}' | '\u{2014}' => replaced.push('-'),
            '\u{2026}' => replaced.push_str("..."),
            other => replaced.push(other),
        }
    }

    truncate(&replaced.nfc().collect::<String>(), MAX_TEXT_LENGTH)
}

/// Strings are rendered without their JSON quotes
fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
