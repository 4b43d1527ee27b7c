//! # Blob Store
//!
//! Immutable binary uploads, content-addressed by SHA-256. Metadata lives
//! in a manifest collection (`private/uploads.json`) persisted through the
//! [`DocumentStore`], which gives it per-key locking, atomic replacement,
//! and the legacy relocation for free; the bytes live one file per id under
//! `private/uploads/`, named by the decimal id with no extension.
//!
//! Ingestion is idempotent: putting bytes whose hash already appears in the
//! manifest returns the existing entry without touching disk. Entries are
//! append-only; the engine defines no blob deletion.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::atomic::write_atomic;
use crate::error::Result;
use crate::store::DocumentStore;

/// Collection key of the upload manifest.
pub const MANIFEST_KEY: &str = "private/uploads.json";

/// Directory (under the data root) holding one bytes file per blob id.
pub const BYTES_DIR: &str = "private/uploads";

/// One manifest row. `content_hash` is unique across the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobEntry {
    pub id: u64,
    pub content_type: String,
    pub byte_size: u64,
    pub content_hash: String,
    pub original_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobManifest {
    pub next_id: u64,
    pub entries: Vec<BlobEntry>,
    pub updated_at: DateTime<Utc>,
}

impl BlobManifest {
    fn seed() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// A blob with both halves present: manifest entry and bytes.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub entry: BlobEntry,
    pub bytes: Vec<u8>,
}

/// Outcome of a [`BlobStore::verify`] sweep. Reporting only; nothing is
/// repaired or deleted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BlobReport {
    pub entries: usize,
    /// Ids whose manifest entry has no bytes file.
    pub missing_bytes: Vec<u64>,
    /// Files in the bytes directory no manifest entry points at.
    pub stray_files: Vec<String>,
}

pub struct BlobStore {
    store: Arc<DocumentStore>,
}

impl BlobStore {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    fn bytes_path(&self, id: u64) -> PathBuf {
        self.store.data_root().join(BYTES_DIR).join(id.to_string())
    }

    /// Idempotently create an empty manifest. Called during process warm-up
    /// so later `put`/`get` calls never race on first creation.
    pub fn ensure_index(&self) -> Result<()> {
        self.store
            .read_or_init(MANIFEST_KEY, BlobManifest::seed)
            .map(|_| ())
    }

    /// Ingest `bytes`, deduplicating by content hash.
    ///
    /// Identical content yields the same entry every time; new content gets
    /// the next id, its bytes file, and a manifest row, in that order: a
    /// bytes file without its row is invisible, the reverse is not possible.
    pub fn put(&self, bytes: &[u8], content_type: &str, original_name: &str) -> Result<BlobEntry> {
        let content_hash = hex::encode(Sha256::digest(bytes));

        self.store.with_lock(MANIFEST_KEY, || {
            let mut manifest = self
                .store
                .load_or_init_locked(MANIFEST_KEY, BlobManifest::seed)?;

            if let Some(existing) = manifest
                .entries
                .iter()
                .find(|e| e.content_hash == content_hash)
            {
                debug!(id = existing.id, %content_hash, "blob dedup hit");
                return Ok(existing.clone());
            }

            let entry = BlobEntry {
                id: manifest.next_id,
                content_type: content_type.to_string(),
                byte_size: bytes.len() as u64,
                content_hash: content_hash.clone(),
                original_name: original_name.to_string(),
                created_at: Utc::now(),
            };

            write_atomic(&self.bytes_path(entry.id), bytes)?;

            manifest.next_id += 1;
            manifest.entries.push(entry.clone());
            manifest.updated_at = Utc::now();
            self.store.write(MANIFEST_KEY, &manifest)?;

            debug!(id = entry.id, size = entry.byte_size, "blob stored");
            Ok(entry)
        })
    }

    /// Fetch a blob by id. A blob is present only when both the manifest
    /// entry and the bytes file exist; a dangling entry is `None`, never
    /// partial metadata.
    pub fn get(&self, id: u64) -> Result<Option<StoredBlob>> {
        let manifest: BlobManifest = self.store.read(MANIFEST_KEY, BlobManifest::seed())?;
        let Some(entry) = manifest.entries.iter().find(|e| e.id == id) else {
            return Ok(None);
        };

        match fs::read(self.bytes_path(id)) {
            Ok(bytes) => Ok(Some(StoredBlob {
                entry: entry.clone(),
                bytes,
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(id, "manifest entry has no bytes file");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Read-only consistency sweep over the manifest and the bytes
    /// directory.
    pub fn verify(&self) -> Result<BlobReport> {
        let manifest: BlobManifest = self.store.read(MANIFEST_KEY, BlobManifest::seed())?;
        let mut report = BlobReport {
            entries: manifest.entries.len(),
            ..BlobReport::default()
        };

        for entry in &manifest.entries {
            if !self.bytes_path(entry.id).exists() {
                report.missing_bytes.push(entry.id);
            }
        }

        let bytes_dir = self.store.data_root().join(BYTES_DIR);
        if bytes_dir.exists() {
            for dir_entry in fs::read_dir(&bytes_dir)? {
                let name = dir_entry?.file_name().to_string_lossy().into_owned();
                let known = name
                    .parse::<u64>()
                    .ok()
                    .map_or(false, |id| manifest.entries.iter().any(|e| e.id == id));
                if !known {
                    report.stray_files.push(name);
                }
            }
        }
        report.stray_files.sort();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use std::path::Path;
    use tempfile::tempdir;

    fn open(dir: &Path) -> BlobStore {
        let store = DocumentStore::open(StoreConfig::with_data_root(dir)).unwrap();
        BlobStore::new(Arc::new(store))
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        let entry = blobs
            .put(b"\x89PNG\r\n\x1a\n", "image/png", "logo.png")
            .unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.byte_size, 8);
        assert_eq!(entry.original_name, "logo.png");

        let blob = blobs.get(entry.id).unwrap().unwrap();
        assert_eq!(blob.bytes, b"\x89PNG\r\n\x1a\n");
        assert_eq!(blob.entry.content_type, "image/png");
    }

    #[test]
    fn test_put_is_deduplicating_and_idempotent() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        let first = blobs.put(b"same bytes", "image/png", "a.png").unwrap();
        let second = blobs.put(b"same bytes", "image/jpeg", "b.jpg").unwrap();

        // Same id, original entry untouched.
        assert_eq!(first, second);
        assert_eq!(second.original_name, "a.png");

        let manifest: BlobManifest = blobs
            .store
            .read(MANIFEST_KEY, BlobManifest::seed())
            .unwrap();
        assert_eq!(manifest.entries.len(), 1);
        assert_eq!(manifest.next_id, 2);

        let files: Vec<_> = fs::read_dir(dir.path().join(BYTES_DIR))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_distinct_content_gets_distinct_ids() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        let a = blobs.put(b"aaa", "text/plain", "a.txt").unwrap();
        let b = blobs.put(b"bbb", "text/plain", "b.txt").unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_ne!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());
        assert!(blobs.get(99).unwrap().is_none());
    }

    #[test]
    fn test_entry_without_bytes_is_none() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        let entry = blobs.put(b"payload", "text/plain", "p.txt").unwrap();
        fs::remove_file(dir.path().join(BYTES_DIR).join(entry.id.to_string())).unwrap();

        assert!(blobs.get(entry.id).unwrap().is_none());
    }

    #[test]
    fn test_ensure_index_is_idempotent() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        blobs.ensure_index().unwrap();
        let before = fs::read_to_string(dir.path().join(MANIFEST_KEY)).unwrap();
        blobs.ensure_index().unwrap();
        let after = fs::read_to_string(dir.path().join(MANIFEST_KEY)).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_verify_reports_missing_and_stray() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        let kept = blobs.put(b"kept", "text/plain", "kept.txt").unwrap();
        let broken = blobs.put(b"broken", "text/plain", "broken.txt").unwrap();
        fs::remove_file(dir.path().join(BYTES_DIR).join(broken.id.to_string())).unwrap();
        fs::write(dir.path().join(BYTES_DIR).join("999"), b"stray").unwrap();

        let report = blobs.verify().unwrap();
        assert_eq!(report.entries, 2);
        assert_eq!(report.missing_bytes, vec![broken.id]);
        assert_eq!(report.stray_files, vec!["999".to_string()]);

        // Verify never repairs.
        assert!(blobs.get(kept.id).unwrap().is_some());
        assert!(dir.path().join(BYTES_DIR).join("999").exists());
    }

    #[test]
    fn test_concurrent_puts_never_collide_on_ids() {
        let dir = tempdir().unwrap();
        let blobs = open(dir.path());

        let ids: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8u8)
                .map(|i| {
                    let blobs = &blobs;
                    s.spawn(move || {
                        blobs
                            .put(&[i; 16], "application/octet-stream", "blob.bin")
                            .unwrap()
                            .id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 8, "distinct content must get distinct ids");

        let manifest: BlobManifest = blobs
            .store
            .read(MANIFEST_KEY, BlobManifest::seed())
            .unwrap();
        assert_eq!(manifest.next_id, 9);
    }
}
