//! Domain entities persisted by the repositories.
//!
//! Field names serialize in camelCase because that is what lives in the
//! collection files on disk. Every entity carries a `u64` id allocated from
//! its collection's `nextId` counter; ids are never reused.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bilingual text value. The site serves English and German.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub de: String,
}

impl Localized {
    pub fn new<E: Into<String>, D: Into<String>>(en: E, de: D) -> Self {
        Self {
            en: en.into(),
            de: de.into(),
        }
    }
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub slug: String,
    pub title: Localized,
    pub body: Localized,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fixed site page (home, about, the legal pages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: u64,
    pub slug: String,
    pub title: Localized,
    pub body: Localized,
    pub updated_at: DateTime<Utc>,
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u64,
    pub slug: String,
    pub title: Localized,
    pub description: Localized,
    pub location: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// An application submitted for a job; the CV lives in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: u64,
    pub job_id: u64,
    pub name: String,
    pub email: String,
    pub cover_note: String,
    pub upload_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// A contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A press or media mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: u64,
    pub title: Localized,
    pub source: String,
    pub url: String,
    pub published_on: NaiveDate,
}

/// A partner logo shown on the site, ordered by `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    pub id: u64,
    pub name: String,
    pub upload_id: u64,
    pub position: u32,
}

/// An admin panel account. The password hash is opaque to the store;
/// hashing and verification happen in the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
