//! Content hashing for dedup and cache identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 digest (lowercase hex) of a canonicalized value.
///
/// Object keys are sorted before hashing, so two values with the same fields
/// hash identically no matter in which order the fields were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw bytes.
    pub fn digest(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    /// Hash a text body.
    pub fn of_text(text: &str) -> Self {
        Self::digest(text.as_bytes())
    }

    /// Hash a JSON value in canonical form.
    pub fn of_value(value: &Value) -> Self {
        let canonical = canonicalize(value).to_string();
        Self::digest(canonical.as_bytes())
    }

    /// Hash a flat set of named fields.
    pub fn of_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let map: Map<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::of_value(&Value::Object(map))
    }

    /// Wrap an already computed hex digest (e.g. read back from the cache).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading `len` hex digits, used for short file name suffixes.
    pub fn prefix(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rebuild a value with every object's keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_order_does_not_matter() {
        let a = ContentHash::of_fields([
            ("title", json!("Annual report")),
            ("org", json!("Acme")),
            ("id", Value::Null),
        ]);
        let b = ContentHash::of_fields([
            ("id", Value::Null),
            ("org", json!("Acme")),
            ("title", json!("Annual report")),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nested_objects_are_canonical() {
        let a = json!({"outer": {"b": 1, "a": 2}, "z": [ {"y": 1, "x": 2} ]});
        let b = json!({"z": [ {"x": 2, "y": 1} ], "outer": {"a": 2, "b": 1}});
        assert_eq!(ContentHash::of_value(&a), ContentHash::of_value(&b));
    }

    #[test]
    fn test_different_values_differ() {
        let a = ContentHash::of_fields([("org", json!("Acme"))]);
        let b = ContentHash::of_fields([("org", json!("Acme Ltd"))]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let hash = ContentHash::of_text("");
        assert_eq!(
            hash.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash.prefix(6), "e3b0c4");
        assert_eq!(hash.prefix(100).len(), 64);
    }
}
