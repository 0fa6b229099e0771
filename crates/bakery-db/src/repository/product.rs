//! # Product Repository
//!
//! SQLite record store for products.
//!
//! Sortable properties: `id`, `name`, `price`.

use async_trait::async_trait;
use bakery_core::{fold_case, Money, NamePattern, Page, PageRequest, Product, RecordStore};
use sqlx::SqlitePool;
use tracing::debug;

use super::{count_rows, delete_by_id, fetch_by_id, fetch_page, Table};
use crate::error::{DbError, DbResult};

const TABLE: Table = Table {
    kind: "Product",
    name: "products",
    columns: "id, name, price",
    folded_column: "name_folded",
    sortable: &[("id", "id"), ("name", "name"), ("price", "price")],
};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let buns = repo.find_by_name_like(&NamePattern::contains("bun"), &request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price FROM products WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Sets a new unit price. Existing order totals are left untouched.
    pub async fn update_price(&self, id: i64, price: Money) -> DbResult<()> {
        debug!(id, price = %price, "Updating product price");

        let result = sqlx::query("UPDATE products SET price = ?1 WHERE id = ?2")
            .bind(price)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(TABLE.kind, id));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for ProductRepository {
    type Entity = Product;
    type Error = DbError;

    async fn find_all(&self, page: &PageRequest) -> DbResult<Page<Product>> {
        fetch_page(&self.pool, &TABLE, None, page).await
    }

    async fn find_by_name_like(
        &self,
        pattern: &NamePattern,
        page: &PageRequest,
    ) -> DbResult<Page<Product>> {
        fetch_page(&self.pool, &TABLE, Some(pattern), page).await
    }

    async fn count(&self) -> DbResult<u64> {
        count_rows(&self.pool, &TABLE, None).await
    }

    async fn count_by_name_like(&self, pattern: &NamePattern) -> DbResult<u64> {
        count_rows(&self.pool, &TABLE, Some(pattern)).await
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        fetch_by_id(&self.pool, &TABLE, id).await
    }

    /// Inserts when `id` is `None`, otherwise updates name and price.
    async fn save(&self, mut product: Product) -> DbResult<Product> {
        match product.id {
            None => {
                let result = sqlx::query(
                    "INSERT INTO products (name, name_folded, price) VALUES (?1, ?2, ?3)",
                )
                .bind(&product.name)
                .bind(fold_case(&product.name))
                .bind(product.price)
                .execute(&self.pool)
                .await?;
                product.id = Some(result.last_insert_rowid());
                debug!(id = ?product.id, name = %product.name, "Inserted product");
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE products SET name = ?1, name_folded = ?2, price = ?3 WHERE id = ?4",
                )
                .bind(&product.name)
                .bind(fold_case(&product.name))
                .bind(product.price)
                .bind(id)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(DbError::not_found(TABLE.kind, id));
                }
                debug!(id, name = %product.name, "Updated product");
            }
        }

        Ok(product)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        delete_by_id(&self.pool, &TABLE, id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
