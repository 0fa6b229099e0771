//! # Pickup Location Repository
//!
//! SQLite record store for pickup locations. Sortable on `id` and `name`.

use async_trait::async_trait;
use bakery_core::{fold_case, NamePattern, Page, PageRequest, PickupLocation, RecordStore};
use sqlx::SqlitePool;
use tracing::debug;

use super::{count_rows, delete_by_id, fetch_by_id, fetch_page, Table};
use crate::error::{DbError, DbResult};

const TABLE: Table = Table {
    kind: "PickupLocation",
    name: "pickup_locations",
    columns: "id, name",
    folded_column: "name_folded",
    sortable: &[("id", "id"), ("name", "name")],
};

/// Repository for pickup locations.
#[derive(Debug, Clone)]
pub struct PickupLocationRepository {
    pool: SqlitePool,
}

impl PickupLocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PickupLocationRepository { pool }
    }

    /// Looks up a location by exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<PickupLocation>> {
        let location = sqlx::query_as::<_, PickupLocation>(
            "SELECT id, name FROM pickup_locations WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }
}

#[async_trait]
impl RecordStore for PickupLocationRepository {
    type Entity = PickupLocation;
    type Error = DbError;

    async fn find_all(&self, page: &PageRequest) -> DbResult<Page<PickupLocation>> {
        fetch_page(&self.pool, &TABLE, None, page).await
    }

    async fn find_by_name_like(
        &self,
        pattern: &NamePattern,
        page: &PageRequest,
    ) -> DbResult<Page<PickupLocation>> {
        fetch_page(&self.pool, &TABLE, Some(pattern), page).await
    }

    async fn count(&self) -> DbResult<u64> {
        count_rows(&self.pool, &TABLE, None).await
    }

    async fn count_by_name_like(&self, pattern: &NamePattern) -> DbResult<u64> {
        count_rows(&self.pool, &TABLE, Some(pattern)).await
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<PickupLocation>> {
        fetch_by_id(&self.pool, &TABLE, id).await
    }

    async fn save(&self, mut location: PickupLocation) -> DbResult<PickupLocation> {
        match location.id {
            None => {
                let result = sqlx::query(
                    "INSERT INTO pickup_locations (name, name_folded) VALUES (?1, ?2)",
                )
                .bind(&location.name)
                .bind(fold_case(&location.name))
                .execute(&self.pool)
                .await?;
                location.id = Some(result.last_insert_rowid());
                debug!(id = ?location.id, name = %location.name, "Inserted pickup location");
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE pickup_locations SET name = ?1, name_folded = ?2 WHERE id = ?3",
                )
                .bind(&location.name)
                .bind(fold_case(&location.name))
                .bind(id)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(DbError::not_found(TABLE.kind, id));
                }
                debug!(id, name = %location.name, "Updated pickup location");
            }
        }

        Ok(location)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        delete_by_id(&self.pool, &TABLE, id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
