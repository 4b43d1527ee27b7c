//! Site pages. The seed template ships the fixed pages every deployment
//! starts with; their bodies are filled in through the admin panel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::{Localized, Page};
use crate::store::DocumentStore;

pub const KEY: &str = "content/pages.json";

/// Slugs present in a freshly seeded collection.
pub const SEED_SLUGS: [&str; 4] = ["home", "about", "imprint", "privacy"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesDoc {
    pub next_id: u64,
    pub pages: Vec<Page>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> PagesDoc {
    let now = Utc::now();
    let pages = SEED_SLUGS
        .iter()
        .enumerate()
        .map(|(i, slug)| Page {
            id: i as u64 + 1,
            slug: slug.to_string(),
            title: Localized::default(),
            body: Localized::default(),
            updated_at: now,
        })
        .collect();
    PagesDoc {
        next_id: SEED_SLUGS.len() as u64 + 1,
        pages,
        updated_at: now,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    pub title: Option<Localized>,
    pub body: Option<Localized>,
}

pub struct PageRepo {
    store: Arc<DocumentStore>,
}

impl PageRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Page>> {
        Ok(self.store.read_or_init(KEY, seed)?.pages)
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        Ok(self.list()?.into_iter().find(|p| p.slug == slug))
    }

    /// Add a page beyond the seeded set.
    pub fn create(&self, slug: &str, title: Localized, body: Localized) -> Result<Page> {
        let slug = slug.to_string();
        self.store.update(KEY, seed, |doc: &mut PagesDoc| {
            if doc.pages.iter().any(|p| p.slug == slug) {
                return Err(StoreError::Conflict(format!(
                    "page slug '{slug}' already exists"
                )));
            }
            let now = Utc::now();
            let page = Page {
                id: doc.next_id,
                slug,
                title,
                body,
                updated_at: now,
            };
            doc.next_id += 1;
            doc.pages.push(page.clone());
            doc.updated_at = now;
            Ok(page)
        })
    }

    /// Pages are edited by slug; that is how the admin panel addresses them.
    pub fn update(&self, slug: &str, patch: PagePatch) -> Result<Page> {
        self.store.update(KEY, seed, |doc: &mut PagesDoc| {
            let page = doc
                .pages
                .iter_mut()
                .find(|p| p.slug == slug)
                .ok_or_else(|| StoreError::NotFound(format!("page '{slug}'")))?;
            if let Some(title) = patch.title {
                page.title = title;
            }
            if let Some(body) = patch.body {
                page.body = body;
            }
            page.updated_at = Utc::now();
            let updated = page.clone();
            doc.updated_at = updated.updated_at;
            Ok(updated)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut PagesDoc| {
            let before = doc.pages.len();
            doc.pages.retain(|p| p.id != id);
            if doc.pages.len() == before {
                return Err(StoreError::NotFound(format!("page {id}")));
            }
            doc.updated_at = Utc::now();
            Ok(())
        })
    }
}
