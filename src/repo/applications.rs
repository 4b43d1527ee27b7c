//! Job applications. Created by the public site, read and cleared from the
//! admin panel; the attached CV is a blob-store upload referenced by id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::JobApplication;
use crate::store::DocumentStore;

pub const KEY: &str = "private/applications.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsDoc {
    pub next_id: u64,
    pub applications: Vec<JobApplication>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> ApplicationsDoc {
    ApplicationsDoc {
        next_id: 1,
        applications: Vec::new(),
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: u64,
    pub name: String,
    pub email: String,
    pub cover_note: String,
    pub upload_id: Option<u64>,
}

pub struct ApplicationRepo {
    store: Arc<DocumentStore>,
}

impl ApplicationRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<JobApplication>> {
        Ok(self.store.read_or_init(KEY, seed)?.applications)
    }

    pub fn list_for_job(&self, job_id: u64) -> Result<Vec<JobApplication>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|a| a.job_id == job_id)
            .collect())
    }

    pub fn get(&self, id: u64) -> Result<JobApplication> {
        self.list()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))
    }

    pub fn create(&self, new: NewApplication) -> Result<JobApplication> {
        self.store.update(KEY, seed, |doc: &mut ApplicationsDoc| {
            let now = Utc::now();
            let application = JobApplication {
                id: doc.next_id,
                job_id: new.job_id,
                name: new.name,
                email: new.email,
                cover_note: new.cover_note,
                upload_id: new.upload_id,
                created_at: now,
            };
            doc.next_id += 1;
            doc.applications.push(application.clone());
            doc.updated_at = now;
            Ok(application)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut ApplicationsDoc| {
            let before = doc.applications.len();
            doc.applications.retain(|a| a.id != id);
            if doc.applications.len() == before {
                return Err(StoreError::NotFound(format!("application {id}")));
            }
            doc.updated_at = Utc::now();
            Ok(())
        })
    }
}
