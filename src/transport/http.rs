use crate::config::ClientConfig;
use crate::credentials::ApiKey;
use crate::{Error, ErrorContext, Result};
use reqwest::blocking::Client;
use reqwest::Proxy;

/// Blocking JSON-over-HTTP transport with bearer authentication.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: ApiKey,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, api_key: ApiKey) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| Error::Configuration {
                message: format!("invalid proxy URL: {}", e),
                context: ErrorContext::new()
                    .with_field_path("proxy")
                    .with_source("transport"),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `{base_url}{path}` and decode the JSON reply.
    ///
    /// Any non-2xx status becomes [`Error::Remote`] with the provider's error
    /// message when the body carries one.
    pub fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::remote(Some(status.as_u16()), error_message(&text)));
        }
        serde_json::from_str(&text).map_err(|e| {
            Error::remote(
                Some(status.as_u16()),
                format!("invalid JSON in response: {}", e),
            )
        })
    }
}

/// `error.message` from an OpenAI-style error body, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
