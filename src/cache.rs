//! Durable deployment cache.
//!
//! The cache maps a resource name to the last-known service URL and the
//! configuration that produced it, persisted as a single JSON document in a
//! dot-prefixed cache directory next to the working directory. A warm cache
//! lets a repeat deployment resolve without any network round trip.
//!
//! Sessions are the only way to touch the backing file: a session loads the
//! document once, serves reads and writes in memory, and persists exactly
//! once on exit, and only when a write actually changed a value. An
//! unparsable document is discarded and replaced with an empty one; a cold
//! cache is always a safe fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::ConfigMap;
use crate::error::{Error, Result};

/// Last-known deployment for a resource name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Service URL returned by the vendor.
    pub url: String,
    /// Configuration the vendor reported as deployed.
    pub config: ConfigMap,
}

/// File-backed cache store.
///
/// Concurrent sessions within one process are serialized by an internal
/// mutex so two load-mutate-persist cycles cannot interleave and lose a
/// write. Processes sharing the same file are not coordinated; a lost
/// update across processes is an accepted limitation.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    lock: Mutex<()>,
}

/// In-memory view of the cache document for the duration of one session.
#[derive(Debug)]
pub struct CacheSession {
    entries: BTreeMap<String, CacheEntry>,
    dirty: bool,
}

impl CacheSession {
    /// Look up the entry for a resource name.
    pub fn get(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    /// Record the entry for a resource name.
    ///
    /// Writing a value identical to the stored one does not mark the
    /// session dirty, so a no-op session never rewrites the file.
    pub fn set(&mut self, name: &str, entry: CacheEntry) {
        if self.entries.get(name) == Some(&entry) {
            return;
        }
        self.entries.insert(name.to_string(), entry);
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl CacheStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store at the default location: `.cache/modelport.json`
    /// under the current working directory.
    pub fn default_location() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(PathBuf::new(), e))?;
        Ok(Self::new(cwd.join(".cache").join("modelport.json")))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside a scoped cache session.
    ///
    /// The document is loaded once before `f` runs and persisted once after
    /// it returns, if and only if at least one `set` changed a value. A
    /// failed persist is logged and does not fail the session: the vendor
    /// remains the source of truth for a resource that is already live.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut CacheSession) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = CacheSession {
            entries: self.load(),
            dirty: false,
        };
        let result = f(&mut session)?;

        if session.is_dirty() {
            if let Err(e) = self.persist(&session.entries) {
                log::warn!("Failed to persist cache to {}: {}", self.path.display(), e);
            }
        }
        Ok(result)
    }

    /// One-shot lookup of a single entry.
    pub fn get(&self, name: &str) -> Option<CacheEntry> {
        self.with_session(|session| Ok(session.get(name).cloned()))
            .unwrap_or(None)
    }

    /// One-shot write of a single entry.
    pub fn set(&self, name: &str, entry: CacheEntry) -> Result<()> {
        self.with_session(|session| {
            session.set(name, entry);
            Ok(())
        })
    }

    fn load(&self) -> BTreeMap<String, CacheEntry> {
        if !self.path.exists() {
            log::debug!("Cache file does not exist, starting cold");
            return BTreeMap::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read cache file {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => {
                log::debug!("Loaded cache from {}", self.path.display());
                entries
            }
            Err(e) => {
                // Unparsable document: discard and start cold rather than
                // surfacing a parse error to the caller.
                log::warn!(
                    "Cache file {} is corrupt ({}), reinitializing",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    fn persist(&self, entries: &BTreeMap<String, CacheEntry>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        let content = serde_json::to_string(entries)
            .map_err(|e| Error::config(format!("failed to serialize cache: {}", e)))?;
        fs::write(&self.path, content).map_err(|e| Error::io(&self.path, e))?;
        log::debug!("Saved cache to {}", self.path.display());
        Ok(())
    }
}
