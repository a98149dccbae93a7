//! Cache-keyed invocation: look up, compute on miss, write after success.

use super::key::CacheKey;
use super::manager::CacheStore;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Runs a remote computation at most once per [`CacheKey`] for a given store.
///
/// With no store every call is a miss and the computation always runs.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeyedInvoker<'a> {
    store: Option<&'a CacheStore>,
}

impl<'a> CacheKeyedInvoker<'a> {
    pub fn new(store: Option<&'a CacheStore>) -> Self {
        Self { store }
    }

    pub fn uncached() -> Self {
        Self { store: None }
    }

    /// Return the cached value for `key`, or run `compute`, persist its result
    /// and return it. An error from `compute` is returned as-is and nothing is
    /// written.
    pub fn invoke<T, F>(&self, key: &CacheKey, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(store) = self.store {
            if let Some(hit) = store.get::<T>(key)? {
                tracing::debug!(key = %key.digest(), "Cache hit");
                return Ok(hit);
            }
            tracing::debug!(key = %key.digest(), "Cache miss");
        }

        let value = compute()?;

        if let Some(store) = self.store {
            store.set(key, &value)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvocationParameters;
    use crate::Error;
    use std::cell::Cell;

    fn key(text: &str) -> CacheKey {
        CacheKey::embedding(text, &InvocationParameters::new()).unwrap()
    }

    #[test]
    fn test_second_call_served_from_store() {
        let store = CacheStore::in_memory(None);
        let invoker = CacheKeyedInvoker::new(Some(&store));
        let calls = Cell::new(0);
        let compute = || -> Result<String> {
            calls.set(calls.get() + 1);
            Ok("result".to_string())
        };
        let first: String = invoker.invoke(&key("a"), compute).unwrap();
        let second: String = invoker.invoke(&key("a"), compute).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_uncached_always_computes() {
        let invoker = CacheKeyedInvoker::uncached();
        let calls = Cell::new(0);
        for _ in 0..3 {
            let _: u32 = invoker
                .invoke(&key("a"), || {
                    calls.set(calls.get() + 1);
                    Ok(7)
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_failure_is_not_written() {
        let store = CacheStore::in_memory(None);
        let invoker = CacheKeyedInvoker::new(Some(&store));
        let err = invoker
            .invoke::<String, _>(&key("a"), || Err(Error::remote(Some(500), "boom")))
            .unwrap_err();
        assert!(err.is_remote());
        assert!(!store.contains(&key("a")).unwrap());

        let ok: String = invoker.invoke(&key("a"), || Ok("fine".into())).unwrap();
        assert_eq!(ok, "fine");
        assert_eq!(store.get::<String>(&key("a")).unwrap().as_deref(), Some("fine"));
    }

    #[test]
    fn test_unbounded_ttl_serves_from_store() {
        let store = CacheStore::in_memory(Some(std::time::Duration::MAX));
        let invoker = CacheKeyedInvoker::new(Some(&store));
        let calls = Cell::new(0);
        let compute = || -> Result<Vec<f32>> {
            calls.set(calls.get() + 1);
            Ok(vec![1.0])
        };
        let first = invoker.invoke(&key("a"), compute).unwrap();
        let second = invoker.invoke(&key("a"), compute).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }
}
