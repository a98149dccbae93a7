//! # cachegpt
//!
//! Persistent memoization for OpenAI chat completions and embeddings.
//!
//! Every call is keyed by its semantic input (user input and system prompt,
//! or a single text to embed) plus the full set of effective parameters. A
//! repeated call with the same key is answered from an on-disk cache without
//! touching the network; only successful results are cached.
//!
//! ## Key Features
//!
//! - **Completions**: [`MemoizedCompletion`] wraps a single-turn system + user exchange
//! - **Embeddings**: [`MemoizedEmbedding`] caches each text's vector individually
//! - **Deterministic keys**: parameters are serialized with sorted keys, see [`cache::CacheKey`]
//! - **Pluggable storage**: on-disk or in-memory via [`cache::CacheBackend`]
//! - **Explicit credentials**: [`AuthMode`] is resolved once, at construction
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cachegpt::{InvocationParameters, MemoizedCompletion, MemoizedEmbedding, OutputFormat};
//!
//! fn main() -> cachegpt::Result<()> {
//!     let gpt = MemoizedCompletion::builder().cache_dir("gpt_cache").build()?;
//!     let reply = gpt.complete_with(
//!         "Translate the following English text to French: 'Hello, world!'",
//!         "You are a language expert",
//!         &InvocationParameters::new().model("gpt-4"),
//!     )?;
//!     println!("{}", reply);
//!
//!     let embeddings = MemoizedEmbedding::builder().build()?;
//!     let table = embeddings.embed_with(
//!         &["apple", "banana", "Mexico"],
//!         OutputFormat::ColumnsPerText,
//!         &InvocationParameters::new(),
//!     )?;
//!     println!("{:?}", table.as_table().and_then(|t| t.correlation("apple", "banana")));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache keys, stores, backends and the cache-keyed invoker |
//! | [`completion`] | Memoized chat completions |
//! | [`embeddings`] | Memoized embeddings and output formats |
//! | [`client`] | Remote API traits and the OpenAI HTTP client |
//! | [`credentials`] | API key acquisition |
//! | [`types`] | Messages and invocation parameters |

pub mod cache;
pub mod client;
pub mod completion;
pub mod config;
pub mod credentials;
pub mod embeddings;
pub mod transport;
pub mod types;

pub use cache::{CacheConfig, CacheKey, CacheKeyedInvoker, CacheStore};
pub use client::{ChatCompletionApi, EmbeddingApi, OpenAiClient};
pub use completion::{MemoizedCompletion, MemoizedCompletionBuilder, DEFAULT_SYSTEM_PROMPT};
pub use config::ClientConfig;
pub use credentials::{ApiKey, AuthMode};
pub use embeddings::{EmbeddingOutput, MemoizedEmbedding, MemoizedEmbeddingBuilder, OutputFormat};
pub use types::{InvocationParameters, Message, MessageRole, ResponseFormat};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
