//! Press and media mentions.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::{Localized, MediaItem};
use crate::store::DocumentStore;

pub const KEY: &str = "content/media.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDoc {
    pub next_id: u64,
    pub items: Vec<MediaItem>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> MediaDoc {
    MediaDoc {
        next_id: 1,
        items: Vec::new(),
        updated_at: Utc::now(),
    }
}

pub struct MediaRepo {
    store: Arc<DocumentStore>,
}

impl MediaRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Mentions, newest first.
    pub fn list(&self) -> Result<Vec<MediaItem>> {
        let mut items = self.store.read_or_init(KEY, seed)?.items;
        items.sort_by(|a, b| b.published_on.cmp(&a.published_on));
        Ok(items)
    }

    pub fn create(
        &self,
        title: Localized,
        source: &str,
        url: &str,
        published_on: NaiveDate,
    ) -> Result<MediaItem> {
        let (source, url) = (source.to_string(), url.to_string());
        self.store.update(KEY, seed, |doc: &mut MediaDoc| {
            let item = MediaItem {
                id: doc.next_id,
                title,
                source,
                url,
                published_on,
            };
            doc.next_id += 1;
            doc.items.push(item.clone());
            doc.updated_at = Utc::now();
            Ok(item)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut MediaDoc| {
            let before = doc.items.len();
            doc.items.retain(|m| m.id != id);
            if doc.items.len() == before {
                return Err(StoreError::NotFound(format!("media item {id}")));
            }
            doc.updated_at = Utc::now();
            Ok(())
        })
    }
}
