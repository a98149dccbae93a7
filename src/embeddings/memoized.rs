use super::format::{format_embeddings, EmbeddingOutput, OutputFormat};
use crate::cache::{CacheConfig, CacheKey, CacheKeyedInvoker, CacheStore};
use crate::client::{EmbeddingApi, OpenAiClient};
use crate::config::ClientConfig;
use crate::credentials::AuthMode;
use crate::types::InvocationParameters;
use crate::Result;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EMBEDDING_CACHE_DIR: &str = "embedding_cache";

/// Embedding wrapper that caches each input text's vector separately.
///
/// A batch is a sequence of single-text lookups: only the texts missing from
/// the cache reach the remote API, one request each, in input order.
pub struct MemoizedEmbedding<R = OpenAiClient> {
    remote: R,
    cache: Option<CacheStore>,
    defaults: InvocationParameters,
    default_format: OutputFormat,
}

impl MemoizedEmbedding<OpenAiClient> {
    pub fn builder() -> MemoizedEmbeddingBuilder {
        MemoizedEmbeddingBuilder::new()
    }
}

impl<R: EmbeddingApi> MemoizedEmbedding<R> {
    pub fn with_remote(
        remote: R,
        cache: Option<CacheStore>,
        overrides: &InvocationParameters,
    ) -> Result<Self> {
        let defaults = InvocationParameters::embedding_defaults().merge(overrides);
        defaults.validate()?;
        Ok(Self {
            remote,
            cache,
            defaults,
            default_format: OutputFormat::default(),
        })
    }

    pub fn with_default_format(mut self, format: OutputFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Embed `inputs` in the wrapper's default output format.
    pub fn embed<S: AsRef<str>>(&self, inputs: &[S]) -> Result<EmbeddingOutput> {
        self.embed_with(inputs, self.default_format, &InvocationParameters::new())
    }

    /// Embed `inputs` with per-call overrides applied to every item.
    ///
    /// The first remote failure aborts the batch; items embedded before it
    /// stay cached.
    pub fn embed_with<S: AsRef<str>>(
        &self,
        inputs: &[S],
        format: OutputFormat,
        overrides: &InvocationParameters,
    ) -> Result<EmbeddingOutput> {
        let params = self.effective_parameters(overrides)?;
        let invoker = CacheKeyedInvoker::new(self.cache.as_ref());
        let mut vectors = Vec::with_capacity(inputs.len());
        for input in inputs {
            let text = input.as_ref();
            let key = CacheKey::embedding(text, &params)?;
            let vector: Vec<f32> =
                invoker.invoke(&key, || self.remote.create_embedding(text, &params))?;
            vectors.push(vector);
        }
        format_embeddings(inputs, vectors, format)
    }

    /// Like [`embed_with`](Self::embed_with) but with a format name (`df`,
    /// `df_c`, `df_r`, `array`, `list`). An unknown name fails before any
    /// lookup or remote call.
    pub fn embed_as<S: AsRef<str>>(
        &self,
        inputs: &[S],
        format: &str,
        overrides: &InvocationParameters,
    ) -> Result<EmbeddingOutput> {
        let format: OutputFormat = format.parse()?;
        self.embed_with(inputs, format, overrides)
    }

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

    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }
}

/// Builder for [`MemoizedEmbedding`]. Caches under `embedding_cache` with no
/// expiry unless told otherwise.
pub struct MemoizedEmbeddingBuilder {
    auth: AuthMode,
    client: Option<ClientConfig>,
    cache: CacheConfig,
    overrides: InvocationParameters,
    format: OutputFormat,
}

impl MemoizedEmbeddingBuilder {
    pub fn new() -> Self {
        Self {
            auth: AuthMode::default(),
            client: None,
            cache: CacheConfig::new(DEFAULT_EMBEDDING_CACHE_DIR),
            overrides: InvocationParameters::new(),
            format: OutputFormat::default(),
        }
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.auth(AuthMode::explicit(key))
    }

    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client = Some(config);
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.dir = Some(dir.into());
        self
    }

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

    pub fn defaults(mut self, overrides: InvocationParameters) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn build(self) -> Result<MemoizedEmbedding<OpenAiClient>> {
        let api_key = self.auth.resolve()?;
        let config = self.client.clone().unwrap_or_else(ClientConfig::from_env);
        let remote = OpenAiClient::new(&config, api_key)?;
        self.build_with(remote)
    }

    pub fn build_with<R: EmbeddingApi>(self, remote: R) -> Result<MemoizedEmbedding<R>> {
        let cache = self.cache.open()?;
        Ok(MemoizedEmbedding::with_remote(remote, cache, &self.overrides)?
            .with_default_format(self.format))
    }
}

impl Default for MemoizedEmbeddingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
