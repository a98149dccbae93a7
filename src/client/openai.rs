use super::{ChatCompletionApi, EmbeddingApi};
use crate::config::ClientConfig;
use crate::credentials::ApiKey;
use crate::transport::HttpTransport;
use crate::types::{InvocationParameters, Message};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// OpenAI-compatible client for `/chat/completions` and `/embeddings`.
pub struct OpenAiClient {
    transport: HttpTransport,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(config: &ClientConfig, api_key: ApiKey) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, api_key)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    fn body_with(params: &InvocationParameters, field: &str, value: Value) -> Result<Value> {
        let mut body = params.to_json()?;
        body.insert(field.to_string(), value);
        Ok(Value::Object(body))
    }
}

impl ChatCompletionApi for OpenAiClient {
    fn create_chat_completion(
        &self,
        messages: &[Message],
        params: &InvocationParameters,
    ) -> Result<Vec<String>> {
        let body = Self::body_with(params, "messages", serde_json::to_value(messages)?)?;
        let raw = self.transport.post_json("/chat/completions", &body)?;
        let response: ChatCompletionResponse = serde_json::from_value(raw).map_err(|e| {
            Error::remote(None, format!("unexpected chat completion response: {}", e))
        })?;
        if response.choices.is_empty() {
            return Err(Error::remote(None, "chat completion returned no choices"));
        }
        Ok(response
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect())
    }
}

impl EmbeddingApi for OpenAiClient {
    fn create_embedding(&self, text: &str, params: &InvocationParameters) -> Result<Vec<f32>> {
        let body = Self::body_with(params, "input", serde_json::json!([text]))?;
        let raw = self.transport.post_json("/embeddings", &body)?;
        let response: EmbeddingResponse = serde_json::from_value(raw)
            .map_err(|e| Error::remote(None, format!("unexpected embedding response: {}", e)))?;
        let count = response.data.len();
        let mut data = response.data.into_iter();
        match (data.next(), count) {
            (Some(item), 1) => Ok(item.embedding),
            _ => Err(Error::remote(
                None,
                format!("expected exactly one embedding, got {}", count),
            )),
        }
    }
}
