//! JSON envelope rendering.
//!
//! Every document is a pretty-printed (2-space) object with a top-level
//! `status` field; optional data is omitted rather than serialized as null
//! (the schema types already skip absent fields).

use serde_json::{Map, Value, json};

/// Success envelope with extra top-level fields merged in.
pub fn success(fields: Map<String, Value>) -> String {
    let mut obj = Map::new();
    obj.insert("status".to_string(), json!("success"));
    obj.extend(fields);
    pretty(&Value::Object(obj))
}

/// Shorthand for a single-field success payload.
pub fn success_with(key: &str, value: Value) -> String {
    let mut fields = Map::new();
    fields.insert(key.to_string(), value);
    success(fields)
}

/// Error envelope: one human-readable string.
pub fn error(message: &str) -> String {
    pretty(&json!({ "status": "error", "error": message }))
}

fn pretty(value: &Value) -> String {
    // serde_json's pretty printer is 2-space indented.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_carry_status() {
        let out = success_with("count", json!(3));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["count"], 3);

        let v: Value = serde_json::from_str(&error("nope")).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["error"], "nope");
    }

    #[test]
    fn output_is_two_space_indented() {
        let out = success_with("a", json!(1));
        assert!(out.contains("\n  \"a\""));
    }
}
