//! # Response Caching Module
//!
//! Persistent memoization of remote calls. A call is addressed by a
//! [`CacheKey`] built from its semantic input and effective parameters; the
//! [`CacheKeyedInvoker`] consults a [`CacheStore`] and only reaches the network
//! on a miss.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKeyedInvoker`] | Lookup, compute on miss, write after success |
//! | [`CacheKey`] | Canonical key from input fields plus sorted parameters |
//! | [`CacheStore`] | Typed store with hit/miss statistics |
//! | [`CacheConfig`] | Directory and global TTL; no directory disables caching |
//! | [`CacheBackend`] | Trait for byte-level backends |
//! | [`DiskCache`] | One JSON file per entry under a directory |
//! | [`MemoryCache`] | In-process map, for tests and ephemeral use |
//!
//! ## Example
//!
//! ```rust
//! use cachegpt::cache::{CacheKey, CacheKeyedInvoker, CacheStore};
//! use cachegpt::types::InvocationParameters;
//!
//! let store = CacheStore::in_memory(None);
//! let invoker = CacheKeyedInvoker::new(Some(&store));
//! let key = CacheKey::embedding("apple", &InvocationParameters::embedding_defaults())?;
//!
//! let first: Vec<f32> = invoker.invoke(&key, || Ok(vec![0.1, 0.2]))?;
//! let second: Vec<f32> = invoker.invoke(&key, || unreachable!("served from cache"))?;
//! assert_eq!(first, second);
//! # Ok::<(), cachegpt::Error>(())
//! ```

mod backend;
mod invoker;
mod key;
mod manager;

pub use backend::{CacheBackend, DiskCache, MemoryCache};
pub use invoker::CacheKeyedInvoker;
pub use key::{canonical_json, CacheKey};
pub use manager::{CacheConfig, CacheStats, CacheStore};
