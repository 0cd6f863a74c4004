use crate::domain::model::{AttributeEntry, AttributeList};
use crate::utils::error::{DiscoveryError, Result};
use serde_json::Value;

pub const DEFAULT_WEIGHT: u8 = 5;

/// Decodes a stored attribute blob (services or languages) into a uniform
/// label set. Storage holds three encodings side by side:
/// (a) a native JSON array,
/// (b) JSON-array text inside a string,
/// (c) comma-separated text where a token may rate itself as `label:N⭐`.
///
/// `Null` decodes to the empty list (no data); any other non-list shape is an
/// error so callers can tell "nothing stored" from "stored garbage".
pub fn parse_attributes(raw: &Value) -> Result<AttributeList> {
    match raw {
        Value::Null => Ok(AttributeList::default()),
        Value::Array(items) => Ok(collect_entries(items.iter().map(value_to_label))),
        Value::String(text) => parse_attribute_text(text),
        other => Err(DiscoveryError::AttributeDecodeError {
            reason: format!("unsupported attribute encoding: {}", json_type_name(other)),
        }),
    }
}

/// String form: JSON-array text first, comma-separated fallback.
pub fn parse_attribute_text(text: &str) -> Result<AttributeList> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(AttributeList::default());
    }

    // 看起來像 JSON 陣列就先解析，失敗再退回逗號切割
    if trimmed.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return Ok(collect_entries(items.iter().map(value_to_label)));
        }
    }

    Ok(collect_entries(trimmed.split(',').map(str::to_string)))
}

fn collect_entries<I>(tokens: I) -> AttributeList
where
    I: IntoIterator<Item = String>,
{
    use regex::Regex;
    let weight_re = Regex::new(r"^(.*):([0-9]{1,2})⭐$").unwrap();

    let mut entries: Vec<AttributeEntry> = Vec::new();
    for token in tokens {
        if let Some(entry) = normalize_token(&token, &weight_re) {
            // first occurrence of a label wins
            if !entries.iter().any(|e| e.label == entry.label) {
                entries.push(entry);
            }
        }
    }
    AttributeList { entries }
}

/// One token -> (label, weight). Strips the `srv:`/`opt:` category tags and
/// the optional trailing star rating; blank tokens are dropped.
fn normalize_token(token: &str, weight_re: &regex::Regex) -> Option<AttributeEntry> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (label_part, weight) = match weight_re.captures(trimmed) {
        Some(caps) => {
            let weight = caps[2].parse::<u8>().unwrap_or(DEFAULT_WEIGHT);
            (caps[1].trim().to_string(), weight)
        }
        None => (trimmed.to_string(), DEFAULT_WEIGHT),
    };

    let label = label_part
        .strip_prefix("srv:")
        .or_else(|| label_part.strip_prefix("opt:"))
        .unwrap_or(&label_part)
        .trim()
        .to_string();

    if label.is_empty() {
        None
    } else {
        Some(AttributeEntry { label, weight })
    }
}

fn value_to_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
