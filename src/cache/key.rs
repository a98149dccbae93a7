//! Cache key generation.
//!
//! A key is the canonical JSON text of the semantic input fields followed by
//! the canonical serialization of the effective parameters. Object keys are
//! sorted at every nesting level, so parameter sets that differ only in
//! insertion order produce identical keys. Keys compare by that text; the
//! SHA-256 digest only names files on disk.

use crate::types::InvocationParameters;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    canonical: String,
}

impl CacheKey {
    /// Key for a chat completion: `(user_input, system_prompt, params)`.
    pub fn completion(
        user_input: &str,
        system_prompt: &str,
        params: &InvocationParameters,
    ) -> Result<Self> {
        Self::from_parts(&[user_input, system_prompt], params)
    }

    /// Key for a single embedding: `(input_text, params)`.
    pub fn embedding(input_text: &str, params: &InvocationParameters) -> Result<Self> {
        Self::from_parts(&[input_text], params)
    }

    pub fn from_parts(inputs: &[&str], params: &InvocationParameters) -> Result<Self> {
        let params_json = canonical_json(&serde_json::to_value(params)?)?;
        let mut parts: Vec<&str> = inputs.to_vec();
        parts.push(&params_json);
        Ok(Self {
            canonical: serde_json::to_string(&parts)?,
        })
    }

    /// Rebuild a key from text previously returned by [`CacheKey::as_str`].
    pub fn from_canonical(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Lowercase hex SHA-256 of the canonical text.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

/// Serialize `value` with object keys sorted lexicographically at every level.
///
/// Does not rely on `serde_json::Map` ordering, which changes when the
/// `preserve_order` feature is enabled anywhere in the dependency graph.
pub fn canonical_json(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        // -0.0 equals 0.0 and must map to the same key.
        Value::Number(n) if n.as_f64() == Some(0.0) && n.is_f64() => out.push_str("0.0"),
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JsonSchemaFormat, ResponseFormat};
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"b": 1, "a": {"z": [1, {"y": 2, "x": 3}], "c": null}});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"a":{"c":null,"z":[1,{"x":3,"y":2}]},"b":1}"#
        );
    }

    #[test]
    fn test_canonical_json_ignores_map_insertion_order() {
        let mut forward = serde_json::Map::new();
        forward.insert("temperature".into(), json!(0.5));
        forward.insert("model".into(), json!("m"));
        let mut reverse = serde_json::Map::new();
        reverse.insert("model".into(), json!("m"));
        reverse.insert("temperature".into(), json!(0.5));
        assert_eq!(
            canonical_json(&Value::Object(forward)).unwrap(),
            canonical_json(&Value::Object(reverse)).unwrap()
        );
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let defaults = InvocationParameters::chat_defaults();
        assert_eq!(
            CacheKey::completion("q", "s", &defaults.clone().temperature(-0.0)).unwrap(),
            CacheKey::completion("q", "s", &defaults).unwrap()
        );
        assert_eq!(canonical_json(&json!([-0.0, 0.0, 0])).unwrap(), "[0.0,0.0,0]");
    }

    #[test]
    fn test_insertion_order_does_not_change_key() {
        let a = InvocationParameters::from_json(json!({"temperature": 0.5, "model": "m", "seed": 7}))
            .unwrap();
        let b = InvocationParameters::from_json(json!({"seed": 7, "model": "m", "temperature": 0.5}))
            .unwrap();
        assert_eq!(
            CacheKey::completion("hi", "sys", &a).unwrap(),
            CacheKey::completion("hi", "sys", &b).unwrap()
        );
    }

    #[test]
    fn test_nested_schema_order_does_not_change_key() {
        let schema_a = json!({"type": "object", "properties": {"b": {"type": "string"}, "a": {"type": "number"}}});
        let schema_b = json!({"properties": {"a": {"type": "number"}, "b": {"type": "string"}}, "type": "object"});
        let params = |schema| {
            InvocationParameters::new().response_format(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: "out".into(),
                    schema,
                    strict: Some(true),
                },
            })
        };
        assert_eq!(
            CacheKey::completion("q", "s", &params(schema_a)).unwrap(),
            CacheKey::completion("q", "s", &params(schema_b)).unwrap()
        );
    }

    #[test]
    fn test_keys_differ_on_any_field() {
        let params = InvocationParameters::chat_defaults();
        let base = CacheKey::completion("hello", "sys", &params).unwrap();
        assert_ne!(base, CacheKey::completion("hello", "sys2", &params).unwrap());
        assert_ne!(base, CacheKey::completion("hello!", "sys", &params).unwrap());
        assert_ne!(
            base,
            CacheKey::completion("hello", "sys", &params.clone().temperature(0.7)).unwrap()
        );
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let params = InvocationParameters::new();
        let a = CacheKey::completion("ab", "c", &params).unwrap();
        let b = CacheKey::completion("a", "bc", &params).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_completion_key_layout() {
        let key = CacheKey::completion("hi", "sys", &InvocationParameters::new().seed(1)).unwrap();
        assert_eq!(key.as_str(), r#"["hi","sys","{\"seed\":1}"]"#);
        assert_eq!(key.digest().len(), 64);
        assert_eq!(CacheKey::from_canonical(key.as_str()), key);
    }
}
