//! Blog posts: slug-addressed, bilingual, draft/published.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::{Localized, Post};
use crate::store::DocumentStore;

pub const KEY: &str = "content/blog.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsDoc {
    pub next_id: u64,
    pub posts: Vec<Post>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> PostsDoc {
    PostsDoc {
        next_id: 1,
        posts: Vec::new(),
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: String,
    pub title: Localized,
    pub body: Localized,
    pub published: bool,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub slug: Option<String>,
    pub title: Option<Localized>,
    pub body: Option<Localized>,
    pub published: Option<bool>,
}

pub struct PostRepo {
    store: Arc<DocumentStore>,
}

impl PostRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Post>> {
        Ok(self.store.read_or_init(KEY, seed)?.posts)
    }

    /// Posts visible on the public site.
    pub fn list_published(&self) -> Result<Vec<Post>> {
        Ok(self.list()?.into_iter().filter(|p| p.published).collect())
    }

    pub fn get(&self, id: u64) -> Result<Post> {
        self.list()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("post {id}")))
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self.list()?.into_iter().find(|p| p.slug == slug))
    }

    pub fn create(&self, new: NewPost) -> Result<Post> {
        self.store.update(KEY, seed, |doc: &mut PostsDoc| {
            if doc.posts.iter().any(|p| p.slug == new.slug) {
                return Err(StoreError::Conflict(format!(
                    "post slug '{}' already exists",
                    new.slug
                )));
            }
            let now = Utc::now();
            let post = Post {
                id: doc.next_id,
                slug: new.slug,
                title: new.title,
                body: new.body,
                published: new.published,
                created_at: now,
                updated_at: now,
            };
            doc.next_id += 1;
            doc.posts.push(post.clone());
            doc.updated_at = now;
            Ok(post)
        })
    }

    pub fn update(&self, id: u64, patch: PostPatch) -> Result<Post> {
        self.store.update(KEY, seed, |doc: &mut PostsDoc| {
            if let Some(slug) = &patch.slug {
                if doc.posts.iter().any(|p| p.slug == *slug && p.id != id) {
                    return Err(StoreError::Conflict(format!(
                        "post slug '{slug}' already exists"
                    )));
                }
            }
            let post = doc
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("post {id}")))?;
            if let Some(slug) = patch.slug {
                post.slug = slug;
            }
            if let Some(title) = patch.title {
                post.title = title;
            }
            if let Some(body) = patch.body {
                post.body = body;
            }
            if let Some(published) = patch.published {
                post.published = published;
            }
            post.updated_at = Utc::now();
            let updated = post.clone();
            doc.updated_at = updated.updated_at;
            Ok(updated)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut PostsDoc| {
            let before = doc.posts.len();
            doc.posts.retain(|p| p.id != id);
            if doc.posts.len() == before {
                return Err(StoreError::NotFound(format!("post {id}")));
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

    fn repo(dir: &std::path::Path) -> PostRepo {
        let store = DocumentStore::open(StoreConfig::with_data_root(dir)).unwrap();
        PostRepo::new(Arc::new(store))
    }

    fn draft(slug: &str) -> NewPost {
        NewPost {
            slug: slug.to_string(),
            title: Localized::new("Title", "Titel"),
            body: Localized::new("Body", "Text"),
            published: false,
        }
    }

    #[test]
    fn test_create_allocates_sequential_ids() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let a = repo.create(draft("first")).unwrap();
        let b = repo.create(draft("second")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.list().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_slug_is_a_conflict() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        repo.create(draft("launch")).unwrap();

        let err = repo.create(draft("launch")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_deleted_ids_are_never_reissued() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        for slug in ["a", "b", "c"] {
            repo.create(draft(slug)).unwrap();
        }
        repo.delete(3).unwrap();

        let next = repo.create(draft("d")).unwrap();
        assert_eq!(next.id, 4);
    }

    #[test]
    fn test_update_patches_selected_fields() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let post = repo.create(draft("hello")).unwrap();

        let updated = repo
            .update(
                post.id,
                PostPatch {
                    published: Some(true),
                    ..PostPatch::default()
                },
            )
            .unwrap();

        assert!(updated.published);
        assert_eq!(updated.slug, "hello");
        assert_eq!(repo.list_published().unwrap().len(), 1);
    }

    #[test]
    fn test_update_rejects_stealing_a_slug() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        repo.create(draft("one")).unwrap();
        let two = repo.create(draft("two")).unwrap();

        let err = repo
            .update(
                two.id,
                PostPatch {
                    slug: Some("one".to_string()),
                    ..PostPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_update_keeps_own_slug_without_conflict() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let post = repo.create(draft("keep")).unwrap();

        let updated = repo
            .update(
                post.id,
                PostPatch {
                    slug: Some("keep".to_string()),
                    ..PostPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.slug, "keep");
    }

    #[test]
    fn test_get_and_find_by_slug() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let post = repo.create(draft("findme")).unwrap();

        assert_eq!(repo.get(post.id).unwrap().slug, "findme");
        assert!(repo.find_by_slug("findme").unwrap().is_some());
        assert!(repo.find_by_slug("absent").unwrap().is_none());
        assert!(matches!(
            repo.get(99).unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn test_delete_missing_post_is_not_found() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        assert!(matches!(
            repo.delete(1).unwrap_err(),
            StoreError::NotFound(_)
        ));
    }
}
