//! Cache backend implementations.

use super::key::CacheKey;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Byte-level key-value store. Expiry is a property of the backend, fixed when
/// it is opened, not of individual writes.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &CacheKey, value: &[u8]) -> Result<()>;
    fn delete(&self, key: &CacheKey) -> Result<bool>;
    fn exists(&self, key: &CacheKey) -> Result<bool>;
    fn clear(&self) -> Result<()>;
    fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
struct MemoryEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |t| Instant::now() >= t)
    }
}

pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, MemoryEntry>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|e| e.data.clone()))
    }

    fn set(&self, key: &CacheKey, value: &[u8]) -> Result<()> {
        // A TTL past the representable horizon means the entry never expires.
        let expires_at = self.ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                key.clone(),
                MemoryEntry {
                    data: value.to_vec(),
                    expires_at,
                },
            );
        Ok(())
    }

    fn delete(&self, key: &CacheKey) -> Result<bool> {
        Ok(self
            .entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
            .is_some())
    }

    fn exists(&self, key: &CacheKey) -> Result<bool> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).map(|e| !e.is_expired()).unwrap_or(false))
    }

    fn clear(&self) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|e| !e.is_expired())
            .count())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// On-disk envelope. `key` holds the full canonical key so a digest collision
/// reads as a miss instead of returning another entry's value.
#[derive(Serialize, Deserialize)]
struct DiskEntry {
    key: String,
    /// Unix time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
    value: String,
}

impl DiskEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |t| unix_now_ms() >= t)
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

const ENTRY_EXTENSION: &str = "json";

/// One JSON file per entry, named by key digest, under a single directory.
///
/// Files are opened per operation, so the only long-lived resource is the
/// directory path. Writes go through a temp file and a rename so concurrent
/// readers see either the old or the new entry, never a partial one.
pub struct DiskCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl DiskCache {
    pub fn open(dir: impl AsRef<Path>, ttl: Option<Duration>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::cache_with_context(
                format!("failed to create cache directory: {}", e),
                ErrorContext::new()
                    .with_details(dir.display().to_string())
                    .with_source("disk_cache"),
            )
        })?;
        Ok(Self { dir, ttl })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key.digest(), ENTRY_EXTENSION))
    }

    fn read_entry(&self, path: &Path) -> Result<Option<DiskEntry>> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<DiskEntry>(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    fn remove_file(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for item in fs::read_dir(&self.dir)? {
            let path = item?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Load the live entry for `key`, dropping it from disk if it has expired.
    fn live_entry(&self, key: &CacheKey) -> Result<Option<DiskEntry>> {
        let path = self.entry_path(key);
        let entry = match self.read_entry(&path)? {
            Some(entry) => entry,
            None => return Ok(None),
        };
        if entry.key != key.as_str() {
            return Ok(None);
        }
        if entry.is_expired() {
            Self::remove_file(&path)?;
            return Ok(None);
        }
        Ok(Some(entry))
    }
}

impl CacheBackend for DiskCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(self.live_entry(key)?.map(|e| e.value.into_bytes()))
    }

    fn set(&self, key: &CacheKey, value: &[u8]) -> Result<()> {
        let value = String::from_utf8(value.to_vec()).map_err(|e| {
            Error::cache_with_context(
                format!("cache values must be UTF-8: {}", e),
                ErrorContext::new().with_source("disk_cache"),
            )
        })?;
        let entry = DiskEntry {
            key: key.as_str().to_string(),
            expires_at: self.ttl.map(|ttl| {
                let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
                unix_now_ms().saturating_add(ttl_ms)
            }),
            value,
        };
        let path = self.entry_path(key);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", key.digest(), uuid::Uuid::new_v4()));
        fs::write(&tmp, serde_json::to_vec(&entry)?)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn delete(&self, key: &CacheKey) -> Result<bool> {
        Self::remove_file(&self.entry_path(key))
    }

    fn exists(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.live_entry(key)?.is_some())
    }

    fn clear(&self) -> Result<()> {
        for path in self.entry_files()? {
            Self::remove_file(&path)?;
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let mut count = 0;
        for path in self.entry_files()? {
            if let Some(entry) = self.read_entry(&path)? {
                if !entry.is_expired() {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
