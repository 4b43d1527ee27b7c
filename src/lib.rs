//! # sitedb
//!
//! An embedded document store for a file-backed content site. Every logical
//! collection is one JSON file under a data root; binary uploads live in a
//! content-addressed blob store next to them. The crate provides
//! database-ish guarantees (no partial writes, no lost updates, no
//! duplicate ids, idempotent upload ingestion) out of nothing but the
//! filesystem and in-process coordination.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Repositories (repo/)                                    │
//! │  - one per collection: posts, pages, jobs, uploads, …    │
//! │  - document shapes, id allocation, uniqueness rules      │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  DocumentStore (store.rs)  +  BlobStore (blob.rs)        │
//! │  - read / read_or_init / write / update                  │
//! │  - lazy seeding, legacy relocation, content dedup        │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  LockManager (lock.rs)  +  atomic writer (atomic.rs)     │
//! │  - one FIFO queue per collection key                     │
//! │  - temp-file-and-rename replacement                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine assumes a single writer process. The per-key locks serialize
//! threads inside this process; they provide nothing across processes
//! sharing a data directory.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitedb::{DocumentStore, StoreConfig};
//! use sitedb::repo::Repositories;
//!
//! # fn main() -> sitedb::Result<()> {
//! let store = Arc::new(DocumentStore::open(StoreConfig::from_env())?);
//! let repos = Repositories::new(store);
//! repos.warm_up()?;
//!
//! for post in repos.posts.list_published()? {
//!     println!("{}: {}", post.slug, post.title.en);
//! }
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod blob;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod repo;
pub mod store;

pub use blob::{BlobEntry, BlobStore, StoredBlob};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::DocumentStore;
