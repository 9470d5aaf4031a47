use serde_json::Value;

/// String field of a JSON object; `None` for null, missing or non-string values.
pub fn str_field<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(|x| x.as_str())
}

/// Nested object field; `None` for null, missing or non-object values.
pub fn object_field<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key).filter(|x| x.is_object())
}

/// Timestamp-like field: strings pass through, integers become their decimal text
/// (so numeric epochs reach the date parser).
pub fn timestamp_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_i64().map(|n| n.to_string()),
        _ => None,
    }
}
