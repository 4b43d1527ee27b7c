//! Admin panel accounts.
//!
//! The repository stores an opaque password hash; producing and verifying
//! it is the authentication layer's job. Usernames are unique.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::AdminUser;
use crate::store::DocumentStore;

pub const KEY: &str = "private/admin-users.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUsersDoc {
    pub next_id: u64,
    pub users: Vec<AdminUser>,
    pub updated_at: DateTime<Utc>,
}

fn seed() -> AdminUsersDoc {
    AdminUsersDoc {
        next_id: 1,
        users: Vec::new(),
        updated_at: Utc::now(),
    }
}

pub struct AdminUserRepo {
    store: Arc<DocumentStore>,
}

impl AdminUserRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<AdminUser>> {
        Ok(self.store.read_or_init(KEY, seed)?.users)
    }

    /// Login lookup.
    pub fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        Ok(self.list()?.into_iter().find(|u| u.username == username))
    }

    pub fn create(&self, username: &str, password_hash: &str) -> Result<AdminUser> {
        let (username, password_hash) = (username.to_string(), password_hash.to_string());
        self.store.update(KEY, seed, |doc: &mut AdminUsersDoc| {
            if doc.users.iter().any(|u| u.username == username) {
                return Err(StoreError::Conflict(format!(
                    "admin username '{username}' already exists"
                )));
            }
            let now = Utc::now();
            let user = AdminUser {
                id: doc.next_id,
                username,
                password_hash,
                created_at: now,
            };
            doc.next_id += 1;
            doc.users.push(user.clone());
            doc.updated_at = now;
            Ok(user)
        })
    }

    pub fn set_password_hash(&self, id: u64, password_hash: &str) -> Result<()> {
        let password_hash = password_hash.to_string();
        self.store.update(KEY, seed, |doc: &mut AdminUsersDoc| {
            let user = doc
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("admin user {id}")))?;
            user.password_hash = password_hash;
            doc.updated_at = Utc::now();
            Ok(())
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.update(KEY, seed, |doc: &mut AdminUsersDoc| {
            let before = doc.users.len();
            doc.users.retain(|u| u.id != id);
            if doc.users.len() == before {
                return Err(StoreError::NotFound(format!("admin user {id}")));
            }
            doc.updated_at = Utc::now();
            Ok(())
        })
    }
}
