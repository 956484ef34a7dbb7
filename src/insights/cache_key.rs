//! Canonical cache-key derivation.
//!
//! Keys combine the operation name with a canonicalized serialization of
//! the operation's cache-relevant parameters. Object keys are emitted in
//! sorted order at every nesting level, so semantically identical inputs
//! produce identical keys no matter how the caller assembled them.

use serde_json::Value;

/// Derive the cache key for `operation` with the given parameters.
pub fn cache_key(operation: &str, params: &Value) -> String {
    let mut out = String::with_capacity(operation.len() + 32);
    out.push_str(operation);
    out.push(':');
    write_canonical(params, &mut out);
    out
}

/// Serialize `value` with sorted object keys at every level.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Object keys and string values share JSON string escaping
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
