//! Memoized single-turn chat completions.

use crate::cache::{CacheConfig, CacheKey, CacheKeyedInvoker, CacheStore};
use crate::client::{ChatCompletionApi, OpenAiClient};
use crate::config::ClientConfig;
use crate::credentials::AuthMode;
use crate::types::{InvocationParameters, Message};
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";
pub const DEFAULT_COMPLETION_CACHE_DIR: &str = "gpt_cache";

/// Chat completion wrapper that answers repeated identical requests from its
/// cache.
///
/// # Example
///
/// ```rust,no_run
/// use cachegpt::{AuthMode, MemoizedCompletion};
///
/// let gpt = MemoizedCompletion::builder()
///     .auth(AuthMode::env("OPENAI_KEY"))
///     .cache_dir("gpt_cache")
///     .build()?;
/// let reply = gpt.complete("Translate to French: 'Hello, world!'")?;
/// # Ok::<(), cachegpt::Error>(())
/// ```
pub struct MemoizedCompletion<R = OpenAiClient> {
    remote: R,
    cache: Option<CacheStore>,
    defaults: InvocationParameters,
}

impl MemoizedCompletion<OpenAiClient> {
    pub fn builder() -> MemoizedCompletionBuilder {
        MemoizedCompletionBuilder::new()
    }
}

impl<R: ChatCompletionApi> MemoizedCompletion<R> {
    /// `overrides` are layered over [`InvocationParameters::chat_defaults`]
    /// once, here; per-call overrides are layered over the result.
    pub fn with_remote(
        remote: R,
        cache: Option<CacheStore>,
        overrides: &InvocationParameters,
    ) -> Result<Self> {
        let defaults = InvocationParameters::chat_defaults().merge(overrides);
        defaults.validate()?;
        Ok(Self {
            remote,
            cache,
            defaults,
        })
    }

    /// Complete `user_input` with the default system prompt and parameters.
    pub fn complete(&self, user_input: &str) -> Result<String> {
        self.complete_with(user_input, DEFAULT_SYSTEM_PROMPT, &InvocationParameters::new())
    }

    pub fn complete_with(
        &self,
        user_input: &str,
        system_prompt: &str,
        overrides: &InvocationParameters,
    ) -> Result<String> {
        let params = self.effective_parameters(overrides)?;
        let key = CacheKey::completion(user_input, system_prompt, &params)?;
        CacheKeyedInvoker::new(self.cache.as_ref()).invoke(&key, || {
            let messages = [Message::system(system_prompt), Message::user(user_input)];
            let candidates = self.remote.create_chat_completion(&messages, &params)?;
            candidates
                .into_iter()
                .next()
                .ok_or_else(|| Error::remote(None, "chat completion returned no choices"))
        })
    }

    /// Construction defaults merged with `overrides`; exactly what is sent.
    pub fn effective_parameters(
        &self,
        overrides: &InvocationParameters,
    ) -> Result<InvocationParameters> {
        let params = self.defaults.merge(overrides);
        params.validate()?;
        Ok(params)
    }

    pub fn defaults(&self) -> &InvocationParameters {
        &self.defaults
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }
}

/// Builder for [`MemoizedCompletion`]. Caches under `gpt_cache` with no
/// expiry unless told otherwise.
pub struct MemoizedCompletionBuilder {
    auth: AuthMode,
    client: Option<ClientConfig>,
    cache: CacheConfig,
    overrides: InvocationParameters,
}

impl MemoizedCompletionBuilder {
    pub fn new() -> Self {
        Self {
            auth: AuthMode::default(),
            client: None,
            cache: CacheConfig::new(DEFAULT_COMPLETION_CACHE_DIR),
            overrides: InvocationParameters::new(),
        }
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.auth(AuthMode::explicit(key))
    }

    /// HTTP settings. Defaults to [`ClientConfig::from_env`] at build time.
    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client = Some(config);
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.dir = Some(dir.into());
        self
    }

    /// Disable caching: every call reaches the remote API.
    pub fn no_cache(mut self) -> Self {
        self.cache.dir = None;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = Some(ttl);
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Construction-time parameter overrides, e.g. a different model.
    pub fn defaults(mut self, overrides: InvocationParameters) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve the credential, then build the HTTP client and open the cache.
    pub fn build(self) -> Result<MemoizedCompletion<OpenAiClient>> {
        let api_key = self.auth.resolve()?;
        let config = self.client.clone().unwrap_or_else(ClientConfig::from_env);
        let remote = OpenAiClient::new(&config, api_key)?;
        self.build_with(remote)
    }

    /// Build around an existing remote; the credential mode is not consulted.
    pub fn build_with<R: ChatCompletionApi>(self, remote: R) -> Result<MemoizedCompletion<R>> {
        let cache = self.cache.open()?;
        MemoizedCompletion::with_remote(remote, cache, &self.overrides)
    }
}

impl Default for MemoizedCompletionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
