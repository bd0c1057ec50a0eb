//! Request body rewriting
//!
//! The proxy pins the outbound `model` field to the provider's configured
//! identifier. Rewriting is best-effort: a body that does not parse as a
//! JSON object is forwarded untouched rather than rejected.

use bytes::Bytes;
use serde_json::Value;

/// Overwrite the `model` field of a JSON object body.
///
/// Returns the original bytes unchanged when the body is empty, is not
/// JSON, or is JSON but not an object.
pub fn override_model(body: &Bytes, model: &str) -> Bytes {
    if body.is_empty() {
        return body.clone();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => {
            map.insert("model".to_string(), Value::String(model.to_string()));
            serde_json::to_vec(&Value::Object(map))
                .map(Bytes::from)
                .unwrap_or_else(|_| body.clone())
        }
        _ => body.clone(),
    }
}

/// Pretty-print a body for logs when it is JSON; lossy UTF-8 otherwise.
pub fn pretty(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned()),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Extract the `usage` object from an upstream response body, if present.
pub fn extract_usage(body: &[u8]) -> Option<Value> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("usage")
        .filter(|u| !u.is_null())
        .cloned()
}
