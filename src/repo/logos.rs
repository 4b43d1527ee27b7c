//! Partner logos. Each logo's image is a blob-store upload; the repository
//! only tracks the reference and the display order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::Logo;
use crate::store::DocumentStore;

pub const KEY: &str = "content/logos.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogosDoc {
    pub next_id: u64,
    pub logos: Vec<Logo>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> LogosDoc {
    LogosDoc {
        next_id: 1,
        logos: Vec::new(),
        updated_at: Utc::now(),
    }
}

pub struct LogoRepo {
    store: Arc<DocumentStore>,
}

impl LogoRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Logos in display order.
    pub fn list(&self) -> Result<Vec<Logo>> {
        let mut logos = self.store.read_or_init(KEY, seed)?.logos;
        logos.sort_by_key(|l| l.position);
        Ok(logos)
    }

    /// Appends at the end of the display order.
    pub fn create(&self, name: &str, upload_id: u64) -> Result<Logo> {
        let name = name.to_string();
        self.store.update(KEY, seed, |doc: &mut LogosDoc| {
            let position = doc.logos.iter().map(|l| l.position).max().unwrap_or(0) + 1;
            let logo = Logo {
                id: doc.next_id,
                name,
                upload_id,
                position,
            };
            doc.next_id += 1;
            doc.logos.push(logo.clone());
            doc.updated_at = Utc::now();
            Ok(logo)
        })
    }

    /// Replace the display order with the given id sequence. Every current
    /// logo must appear exactly once.
    pub fn reorder(&self, order: &[u64]) -> Result<Vec<Logo>> {
        self.store.update(KEY, seed, |doc: &mut LogosDoc| {
            let mut known: Vec<u64> = doc.logos.iter().map(|l| l.id).collect();
            known.sort_unstable();
            let mut requested = order.to_vec();
            requested.sort_unstable();
            if known != requested {
                return Err(StoreError::Conflict(
                    "reorder must list every logo id exactly once".to_string(),
                ));
            }
            for (rank, id) in order.iter().enumerate() {
                if let Some(logo) = doc.logos.iter_mut().find(|l| l.id == *id) {
                    logo.position = rank as u32 + 1;
                }
            }
            doc.updated_at = Utc::now();
            let mut logos = doc.logos.clone();
            logos.sort_by_key(|l| l.position);
            Ok(logos)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut LogosDoc| {
            let before = doc.logos.len();
            doc.logos.retain(|l| l.id != id);
            if doc.logos.len() == before {
                return Err(StoreError::NotFound(format!("logo {id}")));
            }
            doc.updated_at = Utc::now();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tempfile::tempdir;

    fn repo(dir: &std::path::Path) -> LogoRepo {
        let store = DocumentStore::open(StoreConfig::with_data_root(dir)).unwrap();
        LogoRepo::new(Arc::new(store))
    }

    #[test]
    fn test_create_appends_in_order() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        repo.create("Acme", 1).unwrap();
        repo.create("Globex", 2).unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Acme", "Globex"]);
    }

    #[test]
    fn test_reorder_rewrites_positions() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let a = repo.create("Acme", 1).unwrap();
        let b = repo.create("Globex", 2).unwrap();
        let c = repo.create("Initech", 3).unwrap();

        let ordered = repo.reorder(&[c.id, a.id, b.id]).unwrap();
        let names: Vec<&str> = ordered.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Initech", "Acme", "Globex"]);
    }

    #[test]
    fn test_reorder_rejects_partial_lists() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let a = repo.create("Acme", 1).unwrap();
        repo.create("Globex", 2).unwrap();

        let err = repo.reorder(&[a.id]).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_positions_stay_dense_after_reorder_but_not_delete() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let a = repo.create("Acme", 1).unwrap();
        repo.create("Globex", 2).unwrap();
        repo.delete(a.id).unwrap();

        // Deleting leaves a gap; the next create still lands at the end.
        let c = repo.create("Initech", 3).unwrap();
        assert_eq!(c.position, 3);
    }
}
