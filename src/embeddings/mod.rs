//! Memoized text embeddings.
//!
//! This module provides:
//! - [`MemoizedEmbedding`], caching one vector per input text
//! - [`OutputFormat`] and [`format_embeddings`] for table, array and list output

mod format;
mod memoized;

pub use format::{
    format_embeddings, EmbeddingArray, EmbeddingOutput, EmbeddingTable, OutputFormat,
};
pub use memoized::{MemoizedEmbedding, MemoizedEmbeddingBuilder, DEFAULT_EMBEDDING_CACHE_DIR};
