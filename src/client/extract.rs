//! First-balanced-JSON extraction from free model text.
//!
//! Models are asked for strict JSON but routinely wrap it in prose or
//! code fences. The scanner below pulls the first balanced array or
//! object out of the reply and parses it; anything else is a malformed
//! response. No attempt is made to repair broken JSON: the fallback path
//! handles that case.

use crate::error::{InsightError, InsightResult};
use serde_json::Value;

/// Extract and parse the first balanced JSON array or object in `text`.
pub fn extract_json(text: &str) -> InsightResult<Value> {
    let candidate = first_balanced_json(text).ok_or_else(|| {
        InsightError::MalformedResponse("no JSON array or object found in model reply".to_string())
    })?;

    serde_json::from_str(candidate)
        .map_err(|e| InsightError::MalformedResponse(format!("extracted JSON failed to parse: {e}")))
}

/// Locate the first balanced `[...]` or `{...}` substring.
///
/// Depth counting is string- and escape-aware so braces inside string
/// literals do not confuse the scan.
fn first_balanced_json(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'[' || b == b'{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
