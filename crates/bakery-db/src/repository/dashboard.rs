//! # Dashboard Repository
//!
//! The reporting job: aggregate queries over orders, assembled into a
//! [`DashboardData`] through its validating builder.
//!
//! ## Query Plan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load_dashboard(as_of = 2024-02-14)                                     │
//! │                                                                         │
//! │  delivery_stats          one pass over orders, CASE per counter         │
//! │  deliveries_this_month   delivered, 2024-02-01..=2024-02-29, per day    │
//! │  deliveries_this_year    delivered, 2024-01-01..=2024-12-31, per month  │
//! │  sales_per_month         SUM(total) of delivered, per (year, month),    │
//! │                          sales_years ending 2024                        │
//! │  product_deliveries      SUM(quantity) of delivered lines this month,   │
//! │                          top N by count, then name                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  zero-fill ─► DashboardData::builder(as_of)...build()                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dates are stored as `YYYY-MM-DD` text, so range filters compare strings
//! and `strftime` extracts the day, month and year.
//!
//! `load_dashboard` runs every query inside one read transaction, so all
//! series describe the same database state. The per-series methods each
//! take their own pooled connection.

use bakery_core::dashboard::{days_in_month, MONTHS_PER_YEAR};
use bakery_core::{
    CoreError, DashboardData, DeliveryStats, Money, OrderState, Product, ProductDeliveries,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for the reporting job.
///
/// ## Example
/// ```rust
/// use bakery_db::DashboardConfig;
///
/// let config = DashboardConfig::default().sales_years(5).top_products(3);
/// assert_eq!(config.sales_years, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Columns of `sales_per_month`: this many years, ending at `as_of`'s year.
    /// Default: 3
    pub sales_years: u32,

    /// Length cap of `product_deliveries`.
    /// Default: 10
    pub top_products: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            sales_years: 3,
            top_products: 10,
        }
    }
}

impl DashboardConfig {
    /// Sets the number of sales years (at least one).
    pub fn sales_years(mut self, years: u32) -> Self {
        self.sales_years = years.max(1);
        self
    }

    pub fn top_products(mut self, limit: u32) -> Self {
        self.top_products = limit;
        self
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    delivered_today: i64,
    due_today: i64,
    due_tomorrow: i64,
    not_available_today: i64,
    new_orders: i64,
}

impl From<StatsRow> for DeliveryStats {
    fn from(row: StatsRow) -> Self {
        DeliveryStats {
            delivered_today: to_count(row.delivered_today),
            due_today: to_count(row.due_today),
            due_tomorrow: to_count(row.due_tomorrow),
            not_available_today: to_count(row.not_available_today),
            new_orders: to_count(row.new_orders),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductDeliveryRow {
    #[sqlx(flatten)]
    product: Product,
    deliveries: i64,
}

fn to_count(value: i64) -> u64 {
    value.max(0) as u64
}

fn ymd(year: i32, month: u32, day: u32) -> DbResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DbError::Internal(format!("invalid date {year}-{month}-{day}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Builds dashboard snapshots from the order tables.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
    config: DashboardConfig,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool, config: DashboardConfig) -> Self {
        DashboardRepository { pool, config }
    }

    pub fn config(&self) -> DashboardConfig {
        self.config
    }

    /// Runs every aggregate query and assembles the snapshot for `as_of`.
    ///
    /// ## Errors
    /// * `DbError::Core` - the assembled series failed the builder's shape checks
    /// * any query error
    pub async fn load_dashboard(&self, as_of: NaiveDate) -> DbResult<DashboardData> {
        info!(%as_of, "Loading dashboard");

        let mut tx = self.pool.begin().await?;
        let delivery_stats = query_delivery_stats(&mut *tx, as_of).await?;
        let per_day = query_deliveries_per_day(&mut *tx, as_of).await?;
        let per_month = query_deliveries_per_month(&mut *tx, as_of.year()).await?;
        let sales = query_sales_per_month(&mut *tx, self.config.sales_years, as_of.year()).await?;
        let ranking = query_product_deliveries(&mut *tx, self.config.top_products, as_of).await?;
        tx.commit().await?;

        let data = DashboardData::builder(as_of)
            .delivery_stats(delivery_stats)
            .deliveries_this_month(per_day)
            .deliveries_this_year(per_month)
            .sales_per_month(sales)
            .product_deliveries(ranking)
            .build()?;

        debug!(
            due_today = data.delivery_stats().due_today,
            ranked_products = data.product_deliveries().len(),
            "Dashboard assembled"
        );
        Ok(data)
    }

    /// Counter tiles for `as_of` and the day after.
    pub async fn delivery_stats(&self, as_of: NaiveDate) -> DbResult<DeliveryStats> {
        let mut conn = self.pool.acquire().await?;
        query_delivery_stats(&mut *conn, as_of).await
    }

    /// Delivered orders per day of `as_of`'s month, day 1 first.
    pub async fn deliveries_per_day(&self, as_of: NaiveDate) -> DbResult<Vec<u64>> {
        let mut conn = self.pool.acquire().await?;
        query_deliveries_per_day(&mut *conn, as_of).await
    }

    /// Delivered orders per month of `year`, January first.
    pub async fn deliveries_per_month(&self, year: i32) -> DbResult<Vec<u64>> {
        let mut conn = self.pool.acquire().await?;
        query_deliveries_per_month(&mut *conn, year).await
    }

    /// Twelve rows (January first), one column per year ending at
    /// `last_year`, oldest first. Each cell sums delivered order totals.
    pub async fn sales_per_month(&self, last_year: i32) -> DbResult<Vec<Vec<Money>>> {
        let mut conn = self.pool.acquire().await?;
        query_sales_per_month(&mut *conn, self.config.sales_years, last_year).await
    }

    /// Delivered quantity per product in `as_of`'s month, best sellers first.
    pub async fn product_deliveries(&self, as_of: NaiveDate) -> DbResult<ProductDeliveries> {
        let mut conn = self.pool.acquire().await?;
        query_product_deliveries(&mut *conn, self.config.top_products, as_of).await
    }
}

// =============================================================================
// Aggregate Queries
// =============================================================================

async fn query_delivery_stats(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> DbResult<DeliveryStats> {
    let tomorrow = as_of
        .succ_opt()
        .ok_or_else(|| DbError::Internal(format!("no day after {as_of}")))?;

    let row = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN due_date = ?1 AND state = ?3 THEN 1 ELSE 0 END), 0)
                AS delivered_today,
            COALESCE(SUM(CASE WHEN due_date = ?1 AND state <> ?5 THEN 1 ELSE 0 END), 0)
                AS due_today,
            COALESCE(SUM(CASE WHEN due_date = ?2 AND state <> ?5 THEN 1 ELSE 0 END), 0)
                AS due_tomorrow,
            COALESCE(SUM(CASE WHEN due_date = ?1 AND state = ?4 THEN 1 ELSE 0 END), 0)
                AS not_available_today,
            COALESCE(SUM(CASE WHEN state = ?6 THEN 1 ELSE 0 END), 0)
                AS new_orders
        FROM orders
        "#,
    )
    .bind(as_of)
    .bind(tomorrow)
    .bind(OrderState::Delivered)
    .bind(OrderState::Problem)
    .bind(OrderState::Cancelled)
    .bind(OrderState::New)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

async fn query_deliveries_per_day(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> DbResult<Vec<u64>> {
    let days = days_in_month(as_of);
    let first = ymd(as_of.year(), as_of.month(), 1)?;
    let last = ymd(as_of.year(), as_of.month(), days)?;

    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT CAST(strftime('%d', due_date) AS INTEGER) AS day, COUNT(*)
        FROM orders
        WHERE state = ?1 AND due_date BETWEEN ?2 AND ?3
        GROUP BY day
        "#,
    )
    .bind(OrderState::Delivered)
    .bind(first)
    .bind(last)
    .fetch_all(&mut *conn)
    .await?;

    let mut per_day = vec![0; days as usize];
    for (day, count) in rows {
        if let Some(slot) = usize::try_from(day - 1).ok().and_then(|i| per_day.get_mut(i)) {
            *slot = to_count(count);
        }
    }
    Ok(per_day)
}

async fn query_deliveries_per_month(conn: &mut SqliteConnection, year: i32) -> DbResult<Vec<u64>> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT CAST(strftime('%m', due_date) AS INTEGER) AS month, COUNT(*)
        FROM orders
        WHERE state = ?1 AND due_date BETWEEN ?2 AND ?3
        GROUP BY month
        "#,
    )
    .bind(OrderState::Delivered)
    .bind(ymd(year, 1, 1)?)
    .bind(ymd(year, 12, 31)?)
    .fetch_all(&mut *conn)
    .await?;

    let mut per_month = vec![0; MONTHS_PER_YEAR];
    for (month, count) in rows {
        if let Some(slot) = usize::try_from(month - 1).ok().and_then(|i| per_month.get_mut(i)) {
            *slot = to_count(count);
        }
    }
    Ok(per_month)
}

async fn query_sales_per_month(
    conn: &mut SqliteConnection,
    sales_years: u32,
    last_year: i32,
) -> DbResult<Vec<Vec<Money>>> {
    let years = sales_years.max(1) as usize;
    let first_year = last_year - (years as i32 - 1);

    let rows = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT
            CAST(strftime('%Y', due_date) AS INTEGER) AS year,
            CAST(strftime('%m', due_date) AS INTEGER) AS month,
            COALESCE(SUM(total), 0)
        FROM orders
        WHERE state = ?1 AND due_date BETWEEN ?2 AND ?3
        GROUP BY year, month
        "#,
    )
    .bind(OrderState::Delivered)
    .bind(ymd(first_year, 1, 1)?)
    .bind(ymd(last_year, 12, 31)?)
    .fetch_all(&mut *conn)
    .await?;

    let mut sales = vec![vec![Money::zero(); years]; MONTHS_PER_YEAR];
    for (year, month, cents) in rows {
        let column = usize::try_from(year - i64::from(first_year)).ok();
        let row = usize::try_from(month - 1).ok();
        if let Some(cell) = row
            .and_then(|r| sales.get_mut(r))
            .and_then(|r| column.and_then(|c| r.get_mut(c)))
        {
            *cell = Money::from_cents(cents);
        }
    }
    Ok(sales)
}

async fn query_product_deliveries(
    conn: &mut SqliteConnection,
    top_products: u32,
    as_of: NaiveDate,
) -> DbResult<ProductDeliveries> {
    let first = ymd(as_of.year(), as_of.month(), 1)?;
    let last = ymd(as_of.year(), as_of.month(), days_in_month(as_of))?;

    let rows = sqlx::query_as::<_, ProductDeliveryRow>(
        r#"
        SELECT
            p.id AS id,
            p.name AS name,
            p.price AS price,
            SUM(oi.quantity) AS deliveries
        FROM order_items oi
        INNER JOIN orders o ON o.id = oi.order_id
        INNER JOIN products p ON p.id = oi.product_id
        WHERE o.state = ?1 AND o.due_date BETWEEN ?2 AND ?3
        GROUP BY p.id, p.name, p.price
        ORDER BY deliveries DESC, p.name ASC, p.id ASC
        LIMIT ?4
        "#,
    )
    .bind(OrderState::Delivered)
    .bind(first)
    .bind(last)
    .bind(i64::from(top_products))
    .fetch_all(&mut *conn)
    .await?;

    let entries = rows
        .into_iter()
        .map(|row| (row.product, to_count(row.deliveries)))
        .collect();

    ProductDeliveries::ranked(entries)
        .map_err(|e| DbError::Core(CoreError::InvalidDashboard(e)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use bakery_core::{Order, RecordStore, Role, User};

    fn baker() -> User {
        User {
            id: 2,
            email: "baker@bakery.test".to_string(),
            first_name: "Bea".to_string(),
            last_name: "Baker".to_string(),
            role: Role::Baker,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn place(
        db: &Database,
        customer: &str,
        due: NaiveDate,
        state: OrderState,
        lines: &[(i64, i64)],
    ) -> Order {
        let orders = db.orders();
        let mut order = Order::taken_by(&baker(), due);
        order.customer_name = customer.to_string();
        order.customer_phone = "555-0100".to_string();
        let saved = orders.save(order).await.unwrap();
        let id = saved.id.unwrap();

        for (product_id, quantity) in lines {
            orders.add_item(id, *product_id, *quantity, None).await.unwrap();
        }
        orders.set_state(id, state).await.unwrap();
        orders.find_by_id(id).await.unwrap().unwrap()
    }

    struct Fixture {
        db: Database,
        bun: i64,
        tart: i64,
    }

    /// Products: bun $3.00, tart $4.50, cake $12.50. `as_of` is 2024-02-14.
    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for (name, cents) in [("Bun", 300), ("Tart", 450), ("Cake", 1250)] {
            let product = db
                .products()
                .save(Product::new(name, Money::from_cents(cents)))
                .await
                .unwrap();
            ids.push(product.id.unwrap());
        }
        let (bun, tart, cake) = (ids[0], ids[1], ids[2]);

        use OrderState::*;
        place(&db, "Anna", date(2024, 2, 14), Delivered, &[(bun, 2)]).await;
        place(&db, "Bert", date(2024, 2, 3), Delivered, &[(tart, 1), (bun, 1)]).await;
        place(&db, "Cleo", date(2024, 2, 14), Ready, &[]).await;
        place(&db, "Dana", date(2024, 2, 14), Problem, &[]).await;
        place(&db, "Emil", date(2024, 2, 14), Cancelled, &[]).await;
        place(&db, "Fia", date(2024, 2, 15), New, &[]).await;
        place(&db, "Gus", date(2024, 1, 20), Delivered, &[(cake, 1)]).await;
        place(&db, "Hal", date(2023, 2, 10), Delivered, &[(cake, 2)]).await;
        place(&db, "Ivy", date(2021, 6, 1), Delivered, &[(bun, 1)]).await;
        place(&db, "Jon", date(2024, 2, 3), Cancelled, &[(cake, 5)]).await;

        Fixture { db, bun, tart }
    }

    #[tokio::test]
    async fn test_delivery_stats() {
        let fx = fixture().await;
        let stats = fx
            .db
            .dashboard(DashboardConfig::default())
            .delivery_stats(date(2024, 2, 14))
            .await
            .unwrap();

        assert_eq!(
            stats,
            DeliveryStats {
                delivered_today: 1,
                due_today: 3,
                due_tomorrow: 1,
                not_available_today: 1,
                new_orders: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_full_dashboard() {
        let fx = fixture().await;
        let data = fx
            .db
            .dashboard(DashboardConfig::default())
            .load_dashboard(date(2024, 2, 14))
            .await
            .unwrap();

        // February 2024 is a leap month
        let month = data.deliveries_this_month();
        assert_eq!(month.len(), 29);
        assert_eq!(month[2], 1);
        assert_eq!(month[13], 1);
        assert_eq!(month.iter().sum::<u64>(), 2);

        let year = data.deliveries_this_year();
        assert_eq!(year.len(), 12);
        assert_eq!(&year[..3], &[1, 2, 0]);

        // Columns: 2022, 2023, 2024
        let sales = data.sales_per_month();
        assert_eq!(sales.len(), 12);
        assert!(sales.iter().all(|row| row.len() == 3));
        assert_eq!(
            data.sales_for_month(0).unwrap(),
            &[Money::zero(), Money::zero(), Money::from_cents(1250)]
        );
        assert_eq!(
            data.sales_for_month(1).unwrap(),
            &[Money::zero(), Money::from_cents(2500), Money::from_cents(1350)]
        );
        assert!(data.sales_for_month(5).unwrap().iter().all(Money::is_zero));

        let ranking = data.product_deliveries();
        let names: Vec<_> = ranking.iter().map(|(p, n)| (p.name.as_str(), n)).collect();
        assert_eq!(names, vec![("Bun", 3), ("Tart", 1)]);
        assert_eq!(ranking.get(fx.bun), Some(3));
        assert_eq!(ranking.get(fx.tart), Some(1));
    }

    #[tokio::test]
    async fn test_series_agree_and_connection_is_released() {
        // Single-connection pool: a transaction left open would block the writes below
        let fx = fixture().await;
        let dashboard = fx.db.dashboard(DashboardConfig::default());
        let as_of = date(2024, 2, 14);

        let before = dashboard.load_dashboard(as_of).await.unwrap();
        place(&fx.db, "Kai", as_of, OrderState::Delivered, &[(fx.tart, 2)]).await;
        let after = dashboard.load_dashboard(as_of).await.unwrap();

        for data in [&before, &after] {
            let today = data.delivery_stats().delivered_today;
            assert_eq!(data.deliveries_this_month()[13], today);
            assert_eq!(
                data.deliveries_this_month().iter().sum::<u64>(),
                data.deliveries_this_year()[1]
            );
        }
        assert_eq!(before.delivery_stats().delivered_today, 1);
        assert_eq!(after.delivery_stats().delivered_today, 2);
        assert_eq!(after.product_deliveries().get(fx.tart), Some(3));
        assert_eq!(
            after.sales_for_month(1).unwrap()[2],
            Money::from_cents(1350 + 900)
        );
    }

    #[tokio::test]
    async fn test_config_limits_ranking_and_sales_years() {
        let fx = fixture().await;
        let config = DashboardConfig::default().top_products(1).sales_years(4);
        let data = fx
            .db
            .dashboard(config)
            .load_dashboard(date(2024, 2, 14))
            .await
            .unwrap();

        assert_eq!(data.product_deliveries().len(), 1);
        assert_eq!(data.product_deliveries().get(fx.bun), Some(3));

        // Columns: 2021..=2024, the June 2021 bun now counts
        assert!(data.sales_per_month().iter().all(|row| row.len() == 4));
        assert_eq!(data.sales_for_month(5).unwrap()[0], Money::from_cents(300));
    }

    #[tokio::test]
    async fn test_equal_counts_rank_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let zebra = db
            .products()
            .save(Product::new("Zebra Cake", Money::from_cents(100)))
            .await
            .unwrap();
        let apple = db
            .products()
            .save(Product::new("Apple Pie", Money::from_cents(100)))
            .await
            .unwrap();
        place(
            &db,
            "Kim",
            date(2023, 7, 4),
            OrderState::Delivered,
            &[(zebra.id.unwrap(), 2), (apple.id.unwrap(), 2)],
        )
        .await;

        let ranking = db
            .dashboard(DashboardConfig::default())
            .product_deliveries(date(2023, 7, 31))
            .await
            .unwrap();
        let names: Vec<_> = ranking.iter().map(|(p, _)| p.name.as_str()).collect();
        assert_eq!(names, vec!["Apple Pie", "Zebra Cake"]);
    }

    #[tokio::test]
    async fn test_empty_database_is_all_zeros() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let data = db
            .dashboard(DashboardConfig::default())
            .load_dashboard(date(2023, 4, 30))
            .await
            .unwrap();

        assert_eq!(*data.delivery_stats(), DeliveryStats::default());
        assert_eq!(data.deliveries_this_month(), vec![0; 30].as_slice());
        assert_eq!(data.deliveries_this_year(), vec![0; 12].as_slice());
        assert!(data.product_deliveries().is_empty());
        assert_eq!(data.as_of(), date(2023, 4, 30));
    }

    #[test]
    fn test_config_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.sales_years, 3);
        assert_eq!(config.top_products, 10);
        assert_eq!(config.sales_years(0).sales_years, 1);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: DashboardConfig = serde_json::from_str(r#"{"topProducts": 5}"#).unwrap();
        assert_eq!(config, DashboardConfig::default().top_products(5));
    }
}
