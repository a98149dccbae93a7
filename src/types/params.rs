//! Invocation parameters sent alongside every remote call.
//!
//! The field set is closed: deserializing a mapping with an unknown option name
//! fails, so every value that reaches a cache key has a known type and a
//! deterministic serialization.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: u32 = 1536;

/// Response format hint for chat completions, serialized as `{"type": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// Generation/embedding options. Unset fields are omitted from both the request
/// body and the cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl InvocationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for chat completions. Everything except `model` and
    /// `temperature` matches the API's own defaults; they are spelled out so
    /// they always take part in the cache key.
    pub fn chat_defaults() -> Self {
        Self {
            model: Some(DEFAULT_CHAT_MODEL.to_string()),
            temperature: Some(0.0),
            max_tokens: Some(200),
            seed: Some(1234),
            response_format: Some(ResponseFormat::Text),
            top_p: Some(1.0),
            n: Some(1),
            frequency_penalty: Some(0.0),
            presence_penalty: Some(0.0),
            ..Self::default()
        }
    }

    pub fn embedding_defaults() -> Self {
        Self {
            model: Some(DEFAULT_EMBEDDING_MODEL.to_string()),
            dimensions: Some(DEFAULT_EMBEDDING_DIMENSIONS),
            ..Self::default()
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Parse overrides from a JSON object, rejecting unknown option names.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::invalid_argument_with_context(
                format!("invalid invocation parameters: {}", e),
                ErrorContext::new().with_source("params"),
            )
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow merge: every field set in `overrides` replaces the one in `self`.
    pub fn merge(&self, overrides: &InvocationParameters) -> InvocationParameters {
        InvocationParameters {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            seed: overrides.seed.or(self.seed),
            response_format: overrides
                .response_format
                .clone()
                .or_else(|| self.response_format.clone()),
            top_p: overrides.top_p.or(self.top_p),
            n: overrides.n.or(self.n),
            frequency_penalty: overrides.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: overrides.presence_penalty.or(self.presence_penalty),
            stop: overrides.stop.clone().or_else(|| self.stop.clone()),
            dimensions: overrides.dimensions.or(self.dimensions),
            user: overrides.user.clone().or_else(|| self.user.clone()),
        }
    }

    /// Reject values without a stable serialization. NaN and infinities would
    /// all serialize as `null` and collide in the cache key.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("temperature", self.temperature),
            ("top_p", self.top_p),
            ("frequency_penalty", self.frequency_penalty),
            ("presence_penalty", self.presence_penalty),
        ];
        for (name, value) in floats {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(Error::invalid_argument_with_context(
                        "parameter must be a finite number",
                        ErrorContext::new()
                            .with_field_path(name)
                            .with_details(v.to_string()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Request body fragment: the set fields as a JSON object.
    pub fn to_json(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_override_wins() {
        let defaults = InvocationParameters::chat_defaults();
        let merged = defaults.merge(&InvocationParameters::new().temperature(0.7).model("gpt-4"));
        assert_eq!(merged.temperature, Some(0.7));
        assert_eq!(merged.model.as_deref(), Some("gpt-4"));
        assert_eq!(merged.max_tokens, Some(200));
        assert_eq!(merged.seed, Some(1234));
    }

    #[test]
    fn test_merge_empty_overrides_is_identity() {
        let defaults = InvocationParameters::embedding_defaults();
        assert_eq!(defaults.merge(&InvocationParameters::new()), defaults);
    }

    #[test]
    fn test_merge_is_shallow_for_response_format() {
        let defaults = InvocationParameters::chat_defaults();
        let merged = defaults.merge(&InvocationParameters::new().response_format(ResponseFormat::JsonObject));
        assert_eq!(merged.response_format, Some(ResponseFormat::JsonObject));
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = InvocationParameters::from_json(json!({"temprature": 0.5})).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        let ok = InvocationParameters::from_json(json!({"temperature": 0.5, "n": 2})).unwrap();
        assert_eq!(ok.temperature, Some(0.5));
        assert_eq!(ok.n, Some(2));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let params = InvocationParameters::new().temperature(f64::NAN);
        let err = params.validate().unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("temperature")
        );
        assert!(InvocationParameters::chat_defaults().validate().is_ok());
    }

    #[test]
    fn test_to_json_omits_unset_fields() {
        let body = InvocationParameters::embedding_defaults().to_json().unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body["model"], json!(DEFAULT_EMBEDDING_MODEL));
        assert_eq!(body["dimensions"], json!(1536));
    }

    #[test]
    fn test_response_format_wire_shape() {
        let value = serde_json::to_value(ResponseFormat::Text).unwrap();
        assert_eq!(value, json!({"type": "text"}));
        let value = serde_json::to_value(ResponseFormat::JsonObject).unwrap();
        assert_eq!(value, json!({"type": "json_object"}));
    }
}
