//! Typed cache store over a byte backend.

use super::backend::{CacheBackend, DiskCache, MemoryCache};
use super::key::CacheKey;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Where a wrapper keeps its cache. `dir: None` disables caching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    pub dir: Option<PathBuf>,
    /// Global entry lifetime, applied to every write. `None` keeps entries forever.
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ttl: None,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Open the configured store, or `None` when caching is disabled.
    pub fn open(&self) -> Result<Option<CacheStore>> {
        self.dir
            .as_ref()
            .map(|dir| CacheStore::open(dir, self.ttl))
            .transpose()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Durable mapping from [`CacheKey`] to a JSON-encoded value.
pub struct CacheStore {
    backend: Box<dyn CacheBackend>,
    stats: AtomicStats,
}

impl CacheStore {
    pub fn new(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            backend,
            stats: AtomicStats::default(),
        }
    }

    /// Open (creating if needed) an on-disk store at `dir`.
    pub fn open(dir: impl AsRef<Path>, ttl: Option<Duration>) -> Result<Self> {
        let backend = DiskCache::open(dir.as_ref(), ttl)?;
        tracing::info!(dir = %dir.as_ref().display(), ttl_secs = ?ttl.map(|t| t.as_secs()), "Opened cache store");
        Ok(Self::new(Box::new(backend)))
    }

    pub fn in_memory(ttl: Option<Duration>) -> Self {
        Self::new(Box::new(MemoryCache::new(ttl)))
    }

    pub fn contains(&self, key: &CacheKey) -> Result<bool> {
        self.track(self.backend.exists(key))
    }

    /// Typed lookup. An entry that no longer decodes as `T` counts as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        match self.backend.get(key) {
            Ok(Some(data)) => match serde_json::from_slice(&data) {
                Ok(val) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(val))
                }
                Err(e) => {
                    tracing::warn!(key = %key.digest(), error = %e, "Cached value has unexpected shape, treating as miss");
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.track(self.backend.set(key, &data))?;
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn delete(&self, key: &CacheKey) -> Result<bool> {
        self.track(self.backend.delete(key))
    }

    pub fn clear(&self) -> Result<()> {
        self.track(self.backend.clear())
    }

    pub fn len(&self) -> Result<usize> {
        self.track(self.backend.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.stats.errors.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("backend", &self.backend.name())
            .field("stats", &self.stats.to_stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvocationParameters;

    fn key(text: &str) -> CacheKey {
        CacheKey::embedding(text, &InvocationParameters::new()).unwrap()
    }

    #[test]
    fn test_typed_roundtrip_and_stats() {
        let store = CacheStore::in_memory(None);
        assert_eq!(store.get::<String>(&key("a")).unwrap(), None);
        store.set(&key("a"), &"bonjour".to_string()).unwrap();
        assert!(store.contains(&key("a")).unwrap());
        assert_eq!(
            store.get::<String>(&key("a")).unwrap().as_deref(),
            Some("bonjour")
        );
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wrong_shape_is_a_miss() {
        let store = CacheStore::in_memory(None);
        store.set(&key("a"), &"text").unwrap();
        assert_eq!(store.get::<Vec<f32>>(&key("a")).unwrap(), None);
        assert_eq!(store.stats().errors, 1);
    }

    #[test]
    fn test_config_disabled_opens_nothing() {
        assert!(CacheConfig::disabled().open().unwrap().is_none());
        assert!(!CacheConfig::disabled().is_enabled());
    }

    #[test]
    fn test_config_opens_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig::new(dir.path()).with_ttl(Duration::from_secs(60));
        let store = config.open().unwrap().unwrap();
        assert_eq!(store.backend_name(), "disk");
        store.set(&key("x"), &vec![0.5f32, 1.5]).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.get::<Vec<f32>>(&key("x")).unwrap(),
            Some(vec![0.5, 1.5])
        );
    }
}
