//! # Record Store Contract
//!
//! The collaborator every service reads from and writes to.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RecordStore<Entity = E>                            │
//! │                                                                         │
//! │  find_all(page)                  → Page<E>   (all rows, paginated)     │
//! │  find_by_name_like(pattern, page)→ Page<E>   (name contains, no case)  │
//! │  count()                         → u64                                  │
//! │  count_by_name_like(pattern)     → u64                                  │
//! │  find_by_id(id)                  → Option<E>                            │
//! │  save(entity)                    → E          (insert or update)        │
//! │  delete(id)                      → ()                                   │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │  • MemoryStore<E>            (this crate, in-process)                  │
//! │  • *Repository               (bakery-db, SQLite)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores filter and paginate themselves. Ordering is the page request's
//! sort (if any) followed by the primary key, so pages partition the result
//! set without gaps or overlaps.

pub mod memory;

use async_trait::async_trait;

use crate::filter::NamePattern;
use crate::page::{Page, PageRequest};
use crate::types::Entity;

pub use memory::{MemoryStore, MemoryStoreError};

/// Query-by-filter and query-by-id access to one entity kind.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Entity: Entity;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every record, paginated.
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Self::Entity>, Self::Error>;

    /// Records whose name matches `pattern`, paginated.
    async fn find_by_name_like(
        &self,
        pattern: &NamePattern,
        page: &PageRequest,
    ) -> Result<Page<Self::Entity>, Self::Error>;

    async fn count(&self) -> Result<u64, Self::Error>;

    async fn count_by_name_like(&self, pattern: &NamePattern) -> Result<u64, Self::Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Self::Entity>, Self::Error>;

    /// Inserts when the entity has no id (assigning one), updates otherwise.
    async fn save(&self, entity: Self::Entity) -> Result<Self::Entity, Self::Error>;

    async fn delete(&self, id: i64) -> Result<(), Self::Error>;
}
