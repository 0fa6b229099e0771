//! # Filterable CRUD Services
//!
//! One contract, implemented once per entity kind by a small struct that
//! holds its record store.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Presentation layer                                                     │
//! │       │  find_any_matching(filter, page)                                │
//! │       ▼                                                                 │
//! │  PickupLocationService<S> / ProductService<S> / OrderService<S>        │
//! │       │                                                                 │
//! │       ├── filter present? ──► store.find_by_name_like("%needle%", page) │
//! │       └── filter absent?  ──► store.find_all(page)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RecordStore (MemoryStore, SQLite repositories)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Services keep no state besides the store. Everything the store returns is
//! passed through as-is: no re-filtering, no re-paging, no retries.

mod order;
mod pickup_location;
mod product;

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::filter::FilterCriterion;
use crate::page::{Page, PageRequest};
use crate::store::RecordStore;
use crate::types::{Entity, User};

pub use order::{Clock, OrderService};
pub use pickup_location::PickupLocationService;
pub use product::ProductService;

/// Uniform filtered search and CRUD over one entity kind.
///
/// Implementors provide [`store`](Self::store) and
/// [`create_new`](Self::create_new); every other operation has a default
/// built on the store.
#[async_trait]
pub trait FilterableCrudService: Send + Sync {
    type Entity: Entity;
    type Store: RecordStore<Entity = Self::Entity>;

    /// The backing record store.
    fn store(&self) -> &Self::Store;

    /// A new, unsaved entity. Never touches the store.
    ///
    /// `actor` is the user the instance is created for; implementations that
    /// have no actor-dependent defaults ignore it.
    fn create_new(&self, actor: &User) -> Self::Entity;

    /// Entities whose name contains `filter` (ignoring case), or all
    /// entities when the filter is absent.
    async fn find_any_matching(
        &self,
        filter: &FilterCriterion,
        page: &PageRequest,
    ) -> ServiceResult<Page<Self::Entity>, <Self::Store as RecordStore>::Error> {
        let result = match filter.pattern() {
            Some(pattern) => self.store().find_by_name_like(&pattern, page).await,
            None => self.store().find_all(page).await,
        };
        result.map_err(ServiceError::Store)
    }

    /// Number of entities [`find_any_matching`](Self::find_any_matching)
    /// would report in total for `filter`.
    async fn count_any_matching(
        &self,
        filter: &FilterCriterion,
    ) -> ServiceResult<u64, <Self::Store as RecordStore>::Error> {
        let result = match filter.pattern() {
            Some(pattern) => self.store().count_by_name_like(&pattern).await,
            None => self.store().count().await,
        };
        result.map_err(ServiceError::Store)
    }

    /// The first entity of an unfiltered single-element page.
    ///
    /// ## Errors
    /// `ServiceError::NotFound` when the store is empty.
    async fn get_default(
        &self,
    ) -> ServiceResult<Self::Entity, <Self::Store as RecordStore>::Error> {
        let page = self
            .find_any_matching(&FilterCriterion::any(), &PageRequest::first())
            .await?;

        page.into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found(<Self::Entity as Entity>::KIND, "default"))
    }

    /// Loads one entity by id.
    async fn load(&self, id: i64) -> ServiceResult<Self::Entity, <Self::Store as RecordStore>::Error> {
        self.store()
            .find_by_id(id)
            .await
            .map_err(ServiceError::Store)?
            .ok_or_else(|| ServiceError::not_found(<Self::Entity as Entity>::KIND, id.to_string()))
    }

    /// Validates and saves `entity` on behalf of `actor`.
    async fn save(
        &self,
        _actor: &User,
        entity: Self::Entity,
    ) -> ServiceResult<Self::Entity, <Self::Store as RecordStore>::Error> {
        entity.validate()?;
        self.store().save(entity).await.map_err(ServiceError::Store)
    }

    /// Deletes the entity with `id` on behalf of `actor`.
    async fn delete(
        &self,
        _actor: &User,
        id: i64,
    ) -> ServiceResult<(), <Self::Store as RecordStore>::Error> {
        self.store().delete(id).await.map_err(ServiceError::Store)
    }

    /// Total number of entities.
    async fn count(&self) -> ServiceResult<u64, <Self::Store as RecordStore>::Error> {
        self.store().count().await.map_err(ServiceError::Store)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NamePattern;
    use crate::page::Sort;
    use crate::store::{MemoryStore, MemoryStoreError};
    use crate::types::{PickupLocation, Role};
    use thiserror::Error;

    fn admin() -> User {
        User {
            id: 1,
            email: "admin@vaadin.com".to_string(),
            first_name: "Göran".to_string(),
            last_name: "Rich".to_string(),
            role: Role::Admin,
        }
    }

    fn service(names: &[&str]) -> PickupLocationService<MemoryStore<PickupLocation>> {
        PickupLocationService::new(MemoryStore::new(
            names.iter().map(|name| PickupLocation::named(*name)),
        ))
    }

    fn names(page: &Page<PickupLocation>) -> Vec<String> {
        page.iter().map(|l| l.name.clone()).collect()
    }

    /// Walks every page of `filter` and returns the concatenated names.
    async fn all_pages(
        service: &PickupLocationService<MemoryStore<PickupLocation>>,
        filter: &FilterCriterion,
        size: u32,
    ) -> Vec<String> {
        let mut request = PageRequest::new(0, size).unwrap().with_sort(Sort::asc("name"));
        let mut seen = Vec::new();
        loop {
            let page = service.find_any_matching(filter, &request).await.unwrap();
            if page.is_empty() {
                break;
            }
            seen.extend(names(&page));
            match request.next() {
                Some(next) => request = next,
                None => break,
            }
        }
        seen
    }

    #[tokio::test]
    async fn test_central_scenario() {
        let service = service(&["Central", "North Hub", "Central West"]);
        let filter = FilterCriterion::contains("central");

        let page = service
            .find_any_matching(&filter, &PageRequest::new(0, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(names(&page), vec!["Central", "Central West"]);
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(service.count_any_matching(&filter).await.unwrap(), 2);
        assert_eq!(
            service.count_any_matching(&FilterCriterion::any()).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_matches_are_subset_of_unfiltered() {
        let service = service(&["Central", "North Hub", "Central West", "Hub Café", "Depot"]);
        let everything = all_pages(&service, &FilterCriterion::any(), 2).await;
        let hubs = all_pages(&service, &FilterCriterion::contains("HUB"), 2).await;

        assert_eq!(hubs, vec!["Hub Café", "North Hub"]);
        assert!(hubs.iter().all(|name| everything.contains(name)));
        assert!(hubs.iter().all(|name| name.to_lowercase().contains("hub")));
    }

    #[tokio::test]
    async fn test_count_equals_sum_of_pages() {
        let service = service(&["A1", "A2", "A3", "B1", "A4", "A5", "A6", "A7"]);
        for filter in [
            FilterCriterion::any(),
            FilterCriterion::contains("a"),
            FilterCriterion::contains("b"),
            FilterCriterion::contains("zzz"),
        ] {
            let count = service.count_any_matching(&filter).await.unwrap();
            let walked = all_pages(&service, &filter, 3).await;
            assert_eq!(count, walked.len() as u64, "filter {:?}", filter);
        }
    }

    #[tokio::test]
    async fn test_pages_partition_without_gaps_or_overlap() {
        let service = service(&["E", "C", "A", "D", "B"]);
        let walked = all_pages(&service, &FilterCriterion::any(), 2).await;
        assert_eq!(walked, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_empty_filter_matches_everything() {
        let service = service(&["Central", "North Hub", "Central West"]);
        let request = PageRequest::new(0, 10).unwrap();

        let empty = service
            .find_any_matching(&FilterCriterion::contains(""), &request)
            .await
            .unwrap();
        let absent = service
            .find_any_matching(&FilterCriterion::any(), &request)
            .await
            .unwrap();

        assert_eq!(empty, absent);
        assert_eq!(
            service.count_any_matching(&FilterCriterion::contains("")).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_get_default_returns_first_unfiltered() {
        let service = service(&["Store", "Bakery"]);
        let default = service.get_default().await.unwrap();

        let first = service
            .find_any_matching(&FilterCriterion::any(), &PageRequest::first())
            .await
            .unwrap();
        assert_eq!(Some(&default), first.iter().next());
        assert_eq!(default.name, "Store");
    }

    #[tokio::test]
    async fn test_get_default_on_empty_store_is_not_found() {
        let service = service(&[]);
        let err = service.get_default().await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "PickupLocation not found: default");
    }

    #[tokio::test]
    async fn test_create_new_does_not_write() {
        let service = service(&["Store"]);
        let fresh = service.create_new(&admin());

        assert_eq!(fresh.id, None);
        assert_eq!(service.count().await.unwrap(), 1);
        let all = all_pages(&service, &FilterCriterion::any(), 10).await;
        assert_eq!(all, vec!["Store"]);
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let service = service(&[]);
        let mut location = service.create_new(&admin());
        location.name = "Harbour".to_string();

        let saved = service.save(&admin(), location).await.unwrap();
        let id = saved.id.unwrap();
        assert_eq!(service.load(id).await.unwrap().name, "Harbour");

        service.delete(&admin(), id).await.unwrap();
        assert!(service.load(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_entity() {
        let service = service(&[]);
        let blank = service.create_new(&admin());

        let err = service.save(&admin(), blank).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let service = service(&["Store"]);
        let request = PageRequest::new(0, 10).unwrap().with_sort(Sort::asc("colour"));

        let err = service
            .find_any_matching(&FilterCriterion::any(), &request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Store(MemoryStoreError::UnknownSortProperty(_))
        ));
    }

    // -------------------------------------------------------------------------
    // A store that records which operation was called
    // -------------------------------------------------------------------------

    #[derive(Debug, Error)]
    #[error("called {0}")]
    struct Called(String);

    struct RecordingStore;

    #[async_trait]
    impl RecordStore for RecordingStore {
        type Entity = PickupLocation;
        type Error = Called;

        async fn find_all(&self, _page: &PageRequest) -> Result<Page<PickupLocation>, Called> {
            Err(Called("find_all".to_string()))
        }

        async fn find_by_name_like(
            &self,
            pattern: &NamePattern,
            _page: &PageRequest,
        ) -> Result<Page<PickupLocation>, Called> {
            Err(Called(format!("find_by_name_like {}", pattern.like())))
        }

        async fn count(&self) -> Result<u64, Called> {
            Err(Called("count".to_string()))
        }

        async fn count_by_name_like(&self, pattern: &NamePattern) -> Result<u64, Called> {
            Err(Called(format!("count_by_name_like {}", pattern.like())))
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<PickupLocation>, Called> {
            Err(Called("find_by_id".to_string()))
        }

        async fn save(&self, _entity: PickupLocation) -> Result<PickupLocation, Called> {
            Err(Called("save".to_string()))
        }

        async fn delete(&self, _id: i64) -> Result<(), Called> {
            Err(Called("delete".to_string()))
        }
    }

    fn called<T: std::fmt::Debug>(result: ServiceResult<T, Called>) -> String {
        match result.unwrap_err() {
            ServiceError::Store(Called(op)) => op,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_absent_filter_never_becomes_a_pattern() {
        let service = PickupLocationService::new(RecordingStore);
        let request = PageRequest::new(0, 5).unwrap();

        assert_eq!(
            called(service.find_any_matching(&FilterCriterion::any(), &request).await),
            "find_all"
        );
        assert_eq!(
            called(service.count_any_matching(&FilterCriterion::any()).await),
            "count"
        );
        assert_eq!(
            called(
                service
                    .find_any_matching(&FilterCriterion::contains("Hub"), &request)
                    .await
            ),
            "find_by_name_like %hub%"
        );
        assert_eq!(
            called(service.count_any_matching(&FilterCriterion::contains("")).await),
            "count_by_name_like %%"
        );
    }
}
