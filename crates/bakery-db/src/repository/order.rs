//! # Order Repository
//!
//! SQLite record store for orders, plus order-line management.
//!
//! Name filters match `customer_name` (through its folded copy). Sortable
//! properties: `id`, `name`
//! (alias of `customer_name`), `customer_name`, `due_date`, `state`, `total`.
//!
//! ## Adding a Line
//! ```text
//! add_item(order 12, product 3, qty 2)
//!      │
//!      ▼
//! BEGIN
//!   SELECT price FROM products WHERE id = 3          ← 300 cents
//!   SELECT total FROM orders WHERE id = 12           ← 4500 cents
//!   add_to_total(4500, 300, 2)                       ← 5100, or ROLLBACK
//!   UPDATE orders SET total = 5100 WHERE id = 12
//!   INSERT INTO order_items (...)                    ← line row
//! COMMIT
//! ```

use async_trait::async_trait;
use bakery_core::validation::{add_to_total, validate_quantity};
use bakery_core::{
    fold_case, CoreError, Money, NamePattern, Order, OrderItem, OrderState, Page, PageRequest, RecordStore,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{count_rows, delete_by_id, fetch_by_id, fetch_page, Table};
use crate::error::{DbError, DbResult};

const TABLE: Table = Table {
    kind: "Order",
    name: "orders",
    columns: "id, customer_name, customer_phone, due_date, due_time, \
              pickup_location_id, state, total, created_by",
    folded_column: "customer_name_folded",
    sortable: &[
        ("id", "id"),
        ("name", "customer_name"),
        ("customer_name", "customer_name"),
        ("due_date", "due_date"),
        ("state", "state"),
        ("total", "total"),
    ],
};

/// Repository for orders and their lines.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Moves an order to `state`.
    pub async fn set_state(&self, id: i64, state: OrderState) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET state = ?1 WHERE id = ?2")
            .bind(state)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(TABLE.kind, id));
        }

        info!(id, state = state.as_str(), "Order state changed");
        Ok(())
    }

    /// Adds a line and raises the order total by `price * quantity`.
    ///
    /// ## Errors
    /// * `DbError::Core` - quantity is not positive, or the new total would
    ///   exceed [`bakery_core::MAX_PRICE_CENTS`]; nothing is written
    /// * `DbError::NotFound` - the order or product doesn't exist
    pub async fn add_item(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
        comment: Option<String>,
    ) -> DbResult<OrderItem> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let price: Money = sqlx::query_scalar("SELECT price FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let current: Money = sqlx::query_scalar("SELECT total FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found(TABLE.kind, order_id))?;

        let total = add_to_total(current, price, quantity).map_err(CoreError::from)?;

        sqlx::query("UPDATE orders SET total = ?1 WHERE id = ?2")
            .bind(total)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, comment) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(comment.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(order_id, product_id, quantity, total = %total, "Added order item");

        Ok(OrderItem {
            id: Some(inserted.last_insert_rowid()),
            order_id,
            product_id,
            quantity,
            comment,
        })
    }

    /// Gets all lines of an order, in insertion order.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, quantity, comment \
             FROM order_items WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

#[async_trait]
impl RecordStore for OrderRepository {
    type Entity = Order;
    type Error = DbError;

    async fn find_all(&self, page: &PageRequest) -> DbResult<Page<Order>> {
        fetch_page(&self.pool, &TABLE, None, page).await
    }

    async fn find_by_name_like(
        &self,
        pattern: &NamePattern,
        page: &PageRequest,
    ) -> DbResult<Page<Order>> {
        fetch_page(&self.pool, &TABLE, Some(pattern), page).await
    }

    async fn count(&self) -> DbResult<u64> {
        count_rows(&self.pool, &TABLE, None).await
    }

    async fn count_by_name_like(&self, pattern: &NamePattern) -> DbResult<u64> {
        count_rows(&self.pool, &TABLE, Some(pattern)).await
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        fetch_by_id(&self.pool, &TABLE, id).await
    }

    async fn save(&self, mut order: Order) -> DbResult<Order> {
        match order.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO orders (
                        customer_name, customer_phone, due_date, due_time,
                        pickup_location_id, state, total, created_by,
                        customer_name_folded
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                )
                .bind(&order.customer_name)
                .bind(&order.customer_phone)
                .bind(order.due_date)
                .bind(order.due_time)
                .bind(order.pickup_location_id)
                .bind(order.state)
                .bind(order.total)
                .bind(order.created_by)
                .bind(fold_case(&order.customer_name))
                .execute(&self.pool)
                .await?;

                order.id = Some(result.last_insert_rowid());
                info!(id = ?order.id, due = %order.due_date, "Order created");
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE orders SET
                        customer_name = ?1,
                        customer_phone = ?2,
                        due_date = ?3,
                        due_time = ?4,
                        pickup_location_id = ?5,
                        state = ?6,
                        total = ?7,
                        created_by = ?8,
                        customer_name_folded = ?9
                    WHERE id = ?10
                    "#,
                )
                .bind(&order.customer_name)
                .bind(&order.customer_phone)
                .bind(order.due_date)
                .bind(order.due_time)
                .bind(order.pickup_location_id)
                .bind(order.state)
                .bind(order.total)
                .bind(order.created_by)
                .bind(fold_case(&order.customer_name))
                .bind(id)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found(TABLE.kind, id));
                }
                debug!(id, state = order.state.as_str(), "Order updated");
            }
        }

        Ok(order)
    }

    /// Deletes the order; its lines cascade.
    async fn delete(&self, id: i64) -> DbResult<()> {
        delete_by_id(&self.pool, &TABLE, id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use bakery_core::{
        FilterCriterion, FilterableCrudService, OrderService, PickupLocation, Product, Role, Sort,
        User, ValidationError,
    };
    use chrono::{NaiveDate, NaiveTime};

    fn barista() -> User {
        User {
            id: 4,
            email: "barista@bakery.test".to_string(),
            first_name: "Bo".to_string(),
            last_name: "Barista".to_string(),
            role: Role::Barista,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn order(customer: &str, due: NaiveDate) -> Order {
        let mut order = Order::taken_by(&barista(), due);
        order.customer_name = customer.to_string();
        order.customer_phone = "+46 70 123 45 67".to_string();
        order
    }

    #[tokio::test]
    async fn test_save_and_load_all_columns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let location = db
            .pickup_locations()
            .save(PickupLocation::named("Bakery"))
            .await
            .unwrap();

        let mut new = order("Ida Lund", day(14));
        new.due_time = NaiveTime::from_hms_opt(9, 30, 0);
        new.pickup_location_id = location.id;
        new.state = OrderState::Confirmed;

        let saved = db.orders().save(new).await.unwrap();
        let loaded = db.orders().find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.created_by, Some(4));
    }

    #[tokio::test]
    async fn test_unknown_pickup_location_is_foreign_key_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut new = order("Ida Lund", day(14));
        new.pickup_location_id = Some(404);

        let err = db.orders().save(new).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_add_item_accumulates_total_and_cascades() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let bun = db
            .products()
            .save(Product::new("Strawberry Bun", Money::from_cents(300)))
            .await
            .unwrap();
        let tart = db
            .products()
            .save(Product::new("Apple Tart", Money::from_cents(450)))
            .await
            .unwrap();
        let orders = db.orders();
        let saved = orders.save(order("Ida Lund", day(14))).await.unwrap();
        let id = saved.id.unwrap();

        orders.add_item(id, bun.id.unwrap(), 2, None).await.unwrap();
        orders
            .add_item(id, tart.id.unwrap(), 1, Some("No sugar".to_string()))
            .await
            .unwrap();

        let reloaded = orders.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.total, Money::from_cents(1050));

        let items = orders.items(id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].comment.as_deref(), Some("No sugar"));

        orders.delete(id).await.unwrap();
        assert!(orders.items(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_item_rejects_bad_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        let saved = orders.save(order("Ida Lund", day(14))).await.unwrap();
        let id = saved.id.unwrap();

        assert!(matches!(
            orders.add_item(id, 1, 0, None).await,
            Err(DbError::Core(CoreError::Validation(ValidationError::MustBePositive { .. })))
        ));
        assert!(matches!(
            orders.add_item(id, 99, 1, None).await,
            Err(DbError::NotFound { .. })
        ));

        let reloaded = orders.find_by_id(id).await.unwrap().unwrap();
        assert!(reloaded.total.is_zero());
    }

    #[tokio::test]
    async fn test_add_item_keeps_total_within_price_range() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cake = db
            .products()
            .save(Product::new("Blueberry Cheese Cake", Money::from_cents(1250)))
            .await
            .unwrap()
            .id
            .unwrap();
        let orders = db.orders();
        let id = orders.save(order("Ida Lund", day(14))).await.unwrap().id.unwrap();
        orders.add_item(id, cake, 2, None).await.unwrap();

        let out_of_range = |result: DbResult<OrderItem>| {
            matches!(
                result,
                Err(DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. })))
            )
        };
        // Would overflow i64 cents
        assert!(out_of_range(orders.add_item(id, cake, i64::MAX / 100, None).await));
        // $12,500.00 on top of $25.00 is past the $10,000.00 cap
        assert!(out_of_range(orders.add_item(id, cake, 1000, None).await));

        let reloaded = orders.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.total, Money::from_cents(2500));
        assert_eq!(orders.items(id).await.unwrap().len(), 1);

        // Still accepted by the service after the rejected lines
        let service = OrderService::new(orders.clone());
        service.save(&barista(), reloaded).await.unwrap();

        // Exactly reaching the cap is allowed
        orders.add_item(id, cake, 798, None).await.unwrap();
        let full = orders.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(full.total, Money::from_cents(1_000_000));
        service.save(&barista(), full).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_ascii_customer_names_filter_in_any_case() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        orders.save(order("Åsa Öberg", day(3))).await.unwrap();
        orders.save(order("Asa Oberg", day(4))).await.unwrap();

        let page = orders
            .find_by_name_like(&NamePattern::contains("ÅSA ö"), &PageRequest::new(0, 5).unwrap())
            .await
            .unwrap();
        let customers: Vec<_> = page.iter().map(|o| o.customer_name.as_str()).collect();
        assert_eq!(customers, vec!["Åsa Öberg"]);
    }

    #[tokio::test]
    async fn test_filter_by_customer_sorted_by_due_date() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        for (customer, due) in [
            ("Ida Lund", day(20)),
            ("Nils Berg", day(2)),
            ("Ida Berg", day(3)),
            ("Linda Idasdotter", day(1)),
        ] {
            orders.save(order(customer, due)).await.unwrap();
        }

        let request = PageRequest::new(0, 10)
            .unwrap()
            .with_sort(Sort::asc("due_date"));
        let page = orders
            .find_by_name_like(&NamePattern::contains("ida"), &request)
            .await
            .unwrap();

        let customers: Vec<_> = page.iter().map(|o| o.customer_name.as_str()).collect();
        assert_eq!(customers, vec!["Linda Idasdotter", "Ida Berg", "Ida Lund"]);
    }

    #[tokio::test]
    async fn test_service_creates_order_due_today() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = OrderService::new(db.orders())
            .with_clock(|| NaiveDate::from_ymd_opt(2024, 5, 14).unwrap());
        let actor = barista();

        let mut draft = service.create_new(&actor);
        assert_eq!(draft.due_date, day(14));
        assert_eq!(service.count().await.unwrap(), 0);

        draft.customer_name = "Ida Lund".to_string();
        draft.customer_phone = "555-0100".to_string();
        let saved = service.save(&actor, draft).await.unwrap();

        let default = service.get_default().await.unwrap();
        assert_eq!(default.id, saved.id);
        assert_eq!(
            service
                .count_any_matching(&FilterCriterion::contains("LUND"))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_state_change() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        let saved = orders.save(order("Ida Lund", day(14))).await.unwrap();

        orders
            .set_state(saved.id.unwrap(), OrderState::Ready)
            .await
            .unwrap();
        let reloaded = orders.find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(reloaded.state, OrderState::Ready);

        assert!(matches!(
            orders.set_state(999, OrderState::Ready).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
