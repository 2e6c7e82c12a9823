use serde_json::{Map, Value};

use crate::CanonError;

/// `serde_json::Value` is a tree, not a graph, so a true cycle cannot occur;
/// this bound instead catches pathologically deep structures and gives them
/// the same deterministic error spec'd for cyclic input.
const MAX_DEPTH: usize = 512;

/// Produces canonical UTF-8 JSON bytes for `value`: object keys sorted by
/// Unicode code point at every depth, arrays left in input order, no
/// insignificant whitespace.
pub fn canonicalize_value(value: &Value) -> Result<Vec<u8>, CanonError> {
    let sorted = sort_recursive(value, 0)?;
    Ok(serde_json::to_vec(&sorted)?)
}

fn sort_recursive(value: &Value, depth: usize) -> Result<Value, CanonError> {
    if depth > MAX_DEPTH {
        return Err(CanonError::DepthExceeded);
    }
    match value {
        Value::Object(map) => {
            let mut sorted_keys: Vec<&String> = map.keys().collect();
            sorted_keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            let mut out = Map::with_capacity(map.len());
            for key in sorted_keys {
                let child = sort_recursive(&map[key], depth + 1)?;
                out.insert(key.clone(), child);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(sort_recursive(item, depth + 1)?);
            }
            Ok(Value::Array(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_at_every_nesting_depth() {
        let v = json!({"z": {"b": 1, "a": 2}, "a": 1});
        let out = canonicalize_value(&v).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s, r#"{"a":1,"z":{"a":2,"b":1}}"#);
    }

    #[test]
    fn depth_guard_rejects_pathological_nesting() {
        let mut v = json!(1);
        for _ in 0..(MAX_DEPTH + 10) {
            v = json!({"n": v});
        }
        assert!(matches!(canonicalize_value(&v), Err(CanonError::DepthExceeded)));
    }
}
