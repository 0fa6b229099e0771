//! # Repository Module
//!
//! SQLite implementations of [`RecordStore`](bakery_core::RecordStore) and
//! the dashboard reporting queries.
//!
//! ## How a Filtered Page Is Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FilterableCrudService::find_any_matching("Cent", page 0, size 20)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  repo.find_by_name_like(NamePattern "%cent%", request)                 │
//! │       │                                                                 │
//! │       ├── SELECT COUNT(*) ... WHERE name_folded LIKE ?1 ...            │
//! │       │                                                                 │
//! │       └── SELECT cols ... WHERE name_folded LIKE ?1 ESCAPE '\'         │
//! │                           ORDER BY <whitelisted>, id                   │
//! │                           LIMIT ?2 OFFSET ?3                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page { content, total_elements, total_pages }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sort properties are looked up in a per-table whitelist; anything else is
//! rejected with [`DbError::InvalidSort`] before SQL is built.
//!
//! Filters never run through SQLite's `LOWER`, which folds ASCII only. Every
//! save writes [`bakery_core::fold_case`] of the name to the table's folded column and the
//! pattern is matched against that.
//!
//! ## Available Repositories
//!
//! - [`PickupLocationRepository`](pickup_location::PickupLocationRepository)
//! - [`ProductRepository`](product::ProductRepository)
//! - [`OrderRepository`](order::OrderRepository) - orders and their lines
//! - [`DashboardRepository`](dashboard::DashboardRepository) - reporting job

pub mod dashboard;
pub mod order;
pub mod pickup_location;
pub mod product;

use bakery_core::{Direction, NamePattern, Page, PageRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Table Description
// =============================================================================

/// Static description of a filterable table.
///
/// Every string here is spliced into SQL, so they must be compile-time
/// constants, never user input.
#[derive(Debug)]
pub(crate) struct Table {
    /// Entity kind for error messages.
    pub kind: &'static str,
    pub name: &'static str,
    /// Column list in `FromRow` order.
    pub columns: &'static str,
    /// Folded copy of the name column, matched by name filters.
    pub folded_column: &'static str,
    /// `(property, column)` pairs a page request may sort on.
    pub sortable: &'static [(&'static str, &'static str)],
}

impl Table {
    /// Builds the ORDER BY clause. `id` breaks ties so pages never overlap.
    fn order_by(&self, request: &PageRequest) -> DbResult<String> {
        let Some(sort) = request.sort() else {
            return Ok("id ASC".to_string());
        };

        let column = self
            .sortable
            .iter()
            .find(|(property, _)| *property == sort.property)
            .map(|(_, column)| *column)
            .ok_or_else(|| DbError::invalid_sort(self.name, sort.property.as_str()))?;

        let direction = sort.direction.as_sql();
        if column == "id" {
            Ok(format!("id {direction}"))
        } else {
            Ok(format!("{column} {direction}, id {}", Direction::Asc.as_sql()))
        }
    }

    fn where_clause(&self, pattern: Option<&NamePattern>) -> String {
        match pattern {
            Some(_) => format!("WHERE {} LIKE ?1 ESCAPE '\\'", self.folded_column),
            None => String::new(),
        }
    }
}

// =============================================================================
// Shared Queries
// =============================================================================

/// Counts rows, optionally restricted to names matching `pattern`.
pub(crate) async fn count_rows(
    pool: &SqlitePool,
    table: &Table,
    pattern: Option<&NamePattern>,
) -> DbResult<u64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} {}",
        table.name,
        table.where_clause(pattern)
    );

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(pattern) = pattern {
        query = query.bind(pattern.like().to_string());
    }

    let count = query.fetch_one(pool).await?;
    Ok(count.max(0) as u64)
}

/// Reads one page of rows plus the total they were sliced from.
pub(crate) async fn fetch_page<T>(
    pool: &SqlitePool,
    table: &Table,
    pattern: Option<&NamePattern>,
    request: &PageRequest,
) -> DbResult<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let order_by = table.order_by(request)?;
    let total = count_rows(pool, table, pattern).await?;

    let (limit, offset) = match pattern {
        Some(_) => ("?2", "?3"),
        None => ("?1", "?2"),
    };
    let sql = format!(
        "SELECT {} FROM {} {} ORDER BY {} LIMIT {} OFFSET {}",
        table.columns,
        table.name,
        table.where_clause(pattern),
        order_by,
        limit,
        offset
    );

    let mut query = sqlx::query_as::<_, T>(&sql);
    if let Some(pattern) = pattern {
        query = query.bind(pattern.like().to_string());
    }
    let content = query
        .bind(i64::from(request.size()))
        .bind(request.offset() as i64)
        .fetch_all(pool)
        .await?;

    debug!(
        table = table.name,
        filtered = pattern.is_some(),
        page = request.page(),
        rows = content.len(),
        total,
        "Fetched page"
    );

    Ok(Page::new(content, request, total))
}

pub(crate) async fn fetch_by_id<T>(pool: &SqlitePool, table: &Table, id: i64) -> DbResult<Option<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", table.columns, table.name);
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Deletes by id; a missing row is [`DbError::NotFound`].
pub(crate) async fn delete_by_id(pool: &SqlitePool, table: &Table, id: i64) -> DbResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", table.name);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(table.kind, id));
    }

    debug!(table = table.name, id, "Deleted row");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakery_core::Sort;

    const TABLE: Table = Table {
        kind: "Widget",
        name: "widgets",
        columns: "id, name",
        folded_column: "label_folded",
        sortable: &[("id", "id"), ("name", "label")],
    };

    #[test]
    fn test_default_order_is_by_id() {
        let request = PageRequest::first();
        assert_eq!(TABLE.order_by(&request).unwrap(), "id ASC");
    }

    #[test]
    fn test_sort_maps_property_to_column() {
        let request = PageRequest::first().with_sort(Sort::desc("name"));
        assert_eq!(TABLE.order_by(&request).unwrap(), "label DESC, id ASC");

        let request = PageRequest::first().with_sort(Sort::desc("id"));
        assert_eq!(TABLE.order_by(&request).unwrap(), "id DESC");
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let request = PageRequest::first().with_sort(Sort::asc("label; DROP TABLE widgets"));
        assert!(matches!(
            TABLE.order_by(&request),
            Err(DbError::InvalidSort { .. })
        ));
    }

    #[test]
    fn test_where_clause_only_with_pattern() {
        assert_eq!(TABLE.where_clause(None), "");
        let pattern = NamePattern::contains("x");
        assert_eq!(
            TABLE.where_clause(Some(&pattern)),
            "WHERE label_folded LIKE ?1 ESCAPE '\\'"
        );
    }
}
