//! # Repositories
//!
//! One repository per collection. Each one owns its collection key, its
//! document shape (the `{ nextId, <entities>, updatedAt }` envelope on
//! disk), its seed template, and its business rules (slug and username
//! uniqueness, id allocation). Locking, atomic persistence, lazy
//! seeding, and legacy relocation all come from the
//! [`DocumentStore`](crate::store::DocumentStore) they are built on.
//!
//! Mutations run as one locked read-modify-write cycle via
//! `DocumentStore::update`; reads are unserialized snapshots. Ids come from
//! the document's `nextId` counter, which only increases, so a deleted
//! entity's id is never handed out again.

use std::sync::Arc;

use crate::blob::BlobStore;
use crate::error::Result;
use crate::store::DocumentStore;

pub mod admin_users;
pub mod applications;
pub mod jobs;
pub mod logos;
pub mod media;
pub mod pages;
pub mod posts;
pub mod submissions;

pub use admin_users::AdminUserRepo;
pub use applications::ApplicationRepo;
pub use jobs::JobRepo;
pub use logos::LogoRepo;
pub use media::MediaRepo;
pub use pages::PageRepo;
pub use posts::PostRepo;
pub use submissions::SubmissionRepo;

/// Every repository over one shared store. This is the handle the
/// application layer keeps around.
pub struct Repositories {
    pub posts: PostRepo,
    pub pages: PageRepo,
    pub jobs: JobRepo,
    pub applications: ApplicationRepo,
    pub submissions: SubmissionRepo,
    pub media: MediaRepo,
    pub logos: LogoRepo,
    pub admin_users: AdminUserRepo,
    pub uploads: BlobStore,
}

impl Repositories {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            posts: PostRepo::new(store.clone()),
            pages: PageRepo::new(store.clone()),
            jobs: JobRepo::new(store.clone()),
            applications: ApplicationRepo::new(store.clone()),
            submissions: SubmissionRepo::new(store.clone()),
            media: MediaRepo::new(store.clone()),
            logos: LogoRepo::new(store.clone()),
            admin_users: AdminUserRepo::new(store.clone()),
            uploads: BlobStore::new(store),
        }
    }

    /// Touch every collection once so later requests never hit the
    /// first-creation path. Also migrates any legacy flat files found.
    pub fn warm_up(&self) -> Result<()> {
        self.posts.list()?;
        self.pages.list()?;
        self.jobs.list()?;
        self.applications.list()?;
        self.submissions.list()?;
        self.media.list()?;
        self.logos.list()?;
        self.admin_users.list()?;
        self.uploads.ensure_index()?;
        Ok(())
    }
}
