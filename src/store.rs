//! # Document Store
//!
//! Every collection is one JSON file under the data root, addressed by a
//! relative key like `"content/blog.json"`. The store owns three guarantees:
//!
//! 1. **Atomic persistence**: documents are replaced via temp-file-and-
//!    rename ([`crate::atomic`]), so readers never see a torn file.
//! 2. **Serialized writes**: one key maps to one lock queue
//!    ([`crate::lock`]); read-modify-write cycles go through [`DocumentStore::update`]
//!    (or a manual [`DocumentStore::with_lock`] section) and cannot lose updates.
//! 3. **Lazy initialization**: [`DocumentStore::read_or_init`] seeds a missing collection
//!    from a template, after first checking whether the data still lives at
//!    the collection's legacy flat path and relocating it verbatim.
//!
//! The store does structural (de)serialization only; what the fields mean
//! is the repositories' business. Plain [`DocumentStore::read`]s are not serialized
//! against writers: a reader sees the pre- or post-write document depending
//! on timing, but always a complete one.
//!
//! ## On-disk format
//!
//! UTF-8 JSON, two-space indentation, trailing newline, at
//! `<data-root>/<collection-key>`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::lock::LockManager;

pub struct DocumentStore {
    config: StoreConfig,
    locks: LockManager,
}

impl DocumentStore {
    /// Open a store over the configured data root, creating the root
    /// directory if needed.
    pub fn open(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_root)?;
        let locks = LockManager::new(config.lock_timeout);
        Ok(Self { config, locks })
    }

    pub fn data_root(&self) -> &Path {
        &self.config.data_root
    }

    /// Map a collection key to its absolute location under the data root.
    /// Pure; performs no I/O.
    pub fn resolve(&self, key: &str) -> PathBuf {
        debug_assert!(
            !key.starts_with('/') && !key.contains(".."),
            "collection keys are relative, traversal-free paths"
        );
        self.config.data_root.join(key)
    }

    /// Run `f` inside the key's critical section. Same-key sections run
    /// strictly one at a time in arrival order; other keys are unaffected.
    pub fn with_lock<T, F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.locks.with_lock(key, f)
    }

    /// Load and parse the collection at `key`; a missing file yields
    /// `fallback` and creates nothing on disk.
    pub fn read<T>(&self, key: &str, fallback: T) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(self.load(key)?.unwrap_or(fallback))
    }

    /// Load the collection at `key`, initializing it on first access.
    ///
    /// A missing file triggers, in order: a re-check under the key's lock
    /// (another caller may have won the race), the one-time legacy
    /// relocation, and finally `init()`, whose result is persisted and
    /// returned. Concurrent first calls therefore observe the seed exactly
    /// once and all return the same document.
    pub fn read_or_init<T, F>(&self, key: &str, init: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(doc) = self.load(key)? {
            return Ok(doc);
        }
        self.with_lock(key, || self.load_or_init_locked(key, init))
    }

    /// Persist `doc` as pretty-printed JSON with a trailing newline.
    ///
    /// For read-modify-write cycles this must run inside the key's
    /// [`with_lock`](Self::with_lock) section; [`update`](Self::update)
    /// packages that discipline.
    pub fn write<T>(&self, key: &str, doc: &T) -> Result<()>
    where
        T: Serialize,
    {
        let mut payload = serde_json::to_string_pretty(doc)?;
        payload.push('\n');
        write_atomic(&self.resolve(key), payload.as_bytes())?;
        debug!(key, bytes = payload.len(), "collection written");
        Ok(())
    }

    /// One locked load-or-init, mutate, persist cycle.
    ///
    /// `f`'s error aborts the cycle before anything is written, so a
    /// repository-level rejection (duplicate slug, missing entity) never
    /// leaves a half-applied document behind.
    pub fn update<T, R, I, F>(&self, key: &str, init: I, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        I: FnOnce() -> T,
        F: FnOnce(&mut T) -> Result<R>,
    {
        self.with_lock(key, || {
            let mut doc = self.load_or_init_locked(key, init)?;
            let out = f(&mut doc)?;
            self.write(key, &doc)?;
            Ok(out)
        })
    }

    /// Load-or-init body. Caller must hold the key's lock.
    pub(crate) fn load_or_init_locked<T, F>(&self, key: &str, init: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(doc) = self.load(key)? {
            return Ok(doc);
        }
        if let Some(doc) = self.migrate_legacy(key)? {
            return Ok(doc);
        }
        let doc = init();
        self.write(key, &doc)?;
        debug!(key, "collection seeded");
        Ok(doc)
    }

    /// Read and parse `key`'s file. `Ok(None)` when absent; corrupt JSON is
    /// a [`StoreError::Decode`] carrying the key, never silently replaced.
    fn load<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = self.resolve(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let doc = serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(doc))
    }

    /// One-time relocation from the flat legacy layout.
    ///
    /// Collections used to live directly at the data root under their
    /// basename (`blog.json` for `content/blog.json`). If the nested file is
    /// missing but the flat one exists, its bytes are copied verbatim to the
    /// nested path and the parsed document returned. The legacy file stays
    /// put; once the nested file exists it is never consulted again.
    /// Caller must hold the key's lock.
    fn migrate_legacy<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let nested = Path::new(key);
        let Some(basename) = nested.file_name() else {
            return Ok(None);
        };
        // Keys already at the root have no flat predecessor.
        if nested.parent().map_or(true, |p| p.as_os_str().is_empty()) {
            return Ok(None);
        }

        let legacy_path = self.config.data_root.join(basename);
        let raw = match fs::read(&legacy_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // Parse before relocating so a corrupt legacy file surfaces as
        // Decode instead of being copied forward.
        let doc = serde_json::from_slice(&raw).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;
        write_atomic(&self.resolve(key), &raw)?;
        debug!(key, from = %legacy_path.display(), "legacy collection relocated");
        Ok(Some(doc))
    }
}
