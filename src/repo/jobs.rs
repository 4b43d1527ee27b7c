//! Job postings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::{Job, Localized};
use crate::store::DocumentStore;

pub const KEY: &str = "content/jobs.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsDoc {
    pub next_id: u64,
    pub jobs: Vec<Job>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> JobsDoc {
    JobsDoc {
        next_id: 1,
        jobs: Vec::new(),
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub slug: String,
    pub title: Localized,
    pub description: Localized,
    pub location: String,
}

#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<Localized>,
    pub description: Option<Localized>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

pub struct JobRepo {
    store: Arc<DocumentStore>,
}

impl JobRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Job>> {
        Ok(self.store.read_or_init(KEY, seed)?.jobs)
    }

    /// Openings shown on the public site.
    pub fn list_active(&self) -> Result<Vec<Job>> {
        Ok(self.list()?.into_iter().filter(|j| j.active).collect())
    }

    pub fn get(&self, id: u64) -> Result<Job> {
        self.list()?
            .into_iter()
            .find(|j| j.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("job {id}")))
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Job>> {
        Ok(self.list()?.into_iter().find(|j| j.slug == slug))
    }

    /// New jobs start active.
    pub fn create(&self, new: NewJob) -> Result<Job> {
        self.store.update(KEY, seed, |doc: &mut JobsDoc| {
            if doc.jobs.iter().any(|j| j.slug == new.slug) {
                return Err(StoreError::Conflict(format!(
                    "job slug '{}' already exists",
                    new.slug
                )));
            }
            let now = Utc::now();
            let job = Job {
                id: doc.next_id,
                slug: new.slug,
                title: new.title,
                description: new.description,
                location: new.location,
                active: true,
                created_at: now,
            };
            doc.next_id += 1;
            doc.jobs.push(job.clone());
            doc.updated_at = now;
            Ok(job)
        })
    }

    pub fn update(&self, id: u64, patch: JobPatch) -> Result<Job> {
        self.store.update(KEY, seed, |doc: &mut JobsDoc| {
            let job = doc
                .jobs
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("job {id}")))?;
            if let Some(title) = patch.title {
                job.title = title;
            }
            if let Some(description) = patch.description {
                job.description = description;
            }
            if let Some(location) = patch.location {
                job.location = location;
            }
            if let Some(active) = patch.active {
                job.active = active;
            }
            let updated = job.clone();
            doc.updated_at = Utc::now();
            Ok(updated)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut JobsDoc| {
            let before = doc.jobs.len();
            doc.jobs.retain(|j| j.id != id);
            if doc.jobs.len() == before {
                return Err(StoreError::NotFound(format!("job {id}")));
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

    fn repo(dir: &std::path::Path) -> JobRepo {
        let store = DocumentStore::open(StoreConfig::with_data_root(dir)).unwrap();
        JobRepo::new(Arc::new(store))
    }

    fn opening(slug: &str) -> NewJob {
        NewJob {
            slug: slug.to_string(),
            title: Localized::new("Engineer", "Ingenieur:in"),
            description: Localized::default(),
            location: "Berlin".to_string(),
        }
    }

    #[test]
    fn test_new_jobs_are_active() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let job = repo.create(opening("engineer")).unwrap();
        assert!(job.active);
        assert_eq!(repo.list_active().unwrap().len(), 1);
    }

    #[test]
    fn test_deactivated_jobs_leave_the_public_list() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let job = repo.create(opening("engineer")).unwrap();

        repo.update(
            job.id,
            JobPatch {
                active: Some(false),
                ..JobPatch::default()
            },
        )
        .unwrap();

        assert!(repo.list_active().unwrap().is_empty());
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_slug_conflict() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        repo.create(opening("engineer")).unwrap();

        let err = repo.create(opening("engineer")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_delete_does_not_recycle_ids() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        repo.create(opening("a")).unwrap();
        let b = repo.create(opening("b")).unwrap();
        repo.delete(b.id).unwrap();

        let c = repo.create(opening("c")).unwrap();
        assert_eq!(c.id, 3);
    }
}
