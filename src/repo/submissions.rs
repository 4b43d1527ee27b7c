//! Contact-form inbox.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::Submission;
use crate::store::DocumentStore;

pub const KEY: &str = "private/submissions.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionsDoc {
    pub next_id: u64,
    pub submissions: Vec<Submission>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> SubmissionsDoc {
    SubmissionsDoc {
        next_id: 1,
        submissions: Vec::new(),
        updated_at: Utc::now(),
    }
}

pub struct SubmissionRepo {
    store: Arc<DocumentStore>,
}

impl SubmissionRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Submission>> {
        Ok(self.store.read_or_init(KEY, seed)?.submissions)
    }

    pub fn create(&self, name: &str, email: &str, message: &str) -> Result<Submission> {
        let (name, email, message) = (name.to_string(), email.to_string(), message.to_string());
        self.store.update(KEY, seed, |doc: &mut SubmissionsDoc| {
            let now = Utc::now();
            let submission = Submission {
                id: doc.next_id,
                name,
                email,
                message,
                created_at: now,
            };
            doc.next_id += 1;
            doc.submissions.push(submission.clone());
            doc.updated_at = now;
            Ok(submission)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut SubmissionsDoc| {
            let before = doc.submissions.len();
            doc.submissions.retain(|s| s.id != id);
            if doc.submissions.len() == before {
                return Err(StoreError::NotFound(format!("submission {id}")));
            }
            doc.updated_at = Utc::now();
            Ok(())
        })
    }
}
