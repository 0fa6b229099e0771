//! # In-Memory Record Store
//!
//! A [`RecordStore`] over a vector, for tests and previews.
//!
//! Sortable properties: `id` and `name`. Name ordering is byte-wise, the
//! same as SQLite's default `BINARY` collation.

use std::cmp::Ordering;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use super::RecordStore;
use crate::filter::NamePattern;
use crate::page::{Direction, Page, PageRequest};
use crate::types::Entity;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("Cannot sort by '{0}'")]
    UnknownSortProperty(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct Records<E> {
    rows: Vec<E>,
    next_id: i64,
}

/// Vector-backed record store.
#[derive(Debug)]
pub struct MemoryStore<E> {
    records: RwLock<Records<E>>,
}

impl<E: Entity> MemoryStore<E> {
    /// Creates a store holding `entities`. Entities without an id get one.
    pub fn new(entities: impl IntoIterator<Item = E>) -> Self {
        let mut rows: Vec<E> = entities.into_iter().collect();
        let mut next_id = rows.iter().filter_map(Entity::id).max().unwrap_or(0) + 1;
        for row in rows.iter_mut().filter(|r| r.id().is_none()) {
            row.set_id(next_id);
            next_id += 1;
        }

        MemoryStore {
            records: RwLock::new(Records { rows, next_id }),
        }
    }

    pub fn empty() -> Self {
        MemoryStore::new(Vec::new())
    }

    /// Filters, sorts and slices under a read lock.
    fn query(
        &self,
        pattern: Option<&NamePattern>,
        request: &PageRequest,
    ) -> Result<Page<E>, MemoryStoreError> {
        let records = self.records.read().map_err(|_| MemoryStoreError::Poisoned)?;

        let mut matching: Vec<&E> = records
            .rows
            .iter()
            .filter(|r| pattern.map_or(true, |p| p.matches(r.name())))
            .collect();

        let by_id = |a: &&E, b: &&E| a.id().cmp(&b.id());
        match request.sort() {
            None => matching.sort_by(by_id),
            Some(sort) => {
                let primary: fn(&E, &E) -> Ordering = match sort.property.as_str() {
                    "id" => |a, b| a.id().cmp(&b.id()),
                    "name" => |a, b| a.name().cmp(b.name()),
                    other => return Err(MemoryStoreError::UnknownSortProperty(other.to_string())),
                };
                let direction = sort.direction;
                matching.sort_by(|a, b| {
                    let ordering = match direction {
                        Direction::Asc => primary(a, b),
                        Direction::Desc => primary(b, a),
                    };
                    ordering.then_with(|| by_id(a, b))
                });
            }
        }

        let total = matching.len() as u64;
        let content = matching
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, request, total))
    }

    fn count_where(&self, pattern: Option<&NamePattern>) -> Result<u64, MemoryStoreError> {
        let records = self.records.read().map_err(|_| MemoryStoreError::Poisoned)?;
        let count = records
            .rows
            .iter()
            .filter(|r| pattern.map_or(true, |p| p.matches(r.name())))
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl<E: Entity> RecordStore for MemoryStore<E> {
    type Entity = E;
    type Error = MemoryStoreError;

    async fn find_all(&self, page: &PageRequest) -> Result<Page<E>, MemoryStoreError> {
        self.query(None, page)
    }

    async fn find_by_name_like(
        &self,
        pattern: &NamePattern,
        page: &PageRequest,
    ) -> Result<Page<E>, MemoryStoreError> {
        self.query(Some(pattern), page)
    }

    async fn count(&self) -> Result<u64, MemoryStoreError> {
        self.count_where(None)
    }

    async fn count_by_name_like(&self, pattern: &NamePattern) -> Result<u64, MemoryStoreError> {
        self.count_where(Some(pattern))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, MemoryStoreError> {
        let records = self.records.read().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(records.rows.iter().find(|r| r.id() == Some(id)).cloned())
    }

    async fn save(&self, mut entity: E) -> Result<E, MemoryStoreError> {
        let mut records = self.records.write().map_err(|_| MemoryStoreError::Poisoned)?;

        match entity.id() {
            None => {
                entity.set_id(records.next_id);
                records.next_id += 1;
                records.rows.push(entity.clone());
            }
            Some(id) => {
                let slot = records
                    .rows
                    .iter_mut()
                    .find(|r| r.id() == Some(id))
                    .ok_or(MemoryStoreError::NotFound { entity: E::KIND, id })?;
                *slot = entity.clone();
            }
        }

        Ok(entity)
    }

    async fn delete(&self, id: i64) -> Result<(), MemoryStoreError> {
        let mut records = self.records.write().map_err(|_| MemoryStoreError::Poisoned)?;
        let before = records.rows.len();
        records.rows.retain(|r| r.id() != Some(id));

        if records.rows.len() == before {
            return Err(MemoryStoreError::NotFound { entity: E::KIND, id });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
