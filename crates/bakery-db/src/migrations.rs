//! # Database Migrations
//!
//! Embedded SQL migrations for the bakery schema.
//!
//! ## Schema
//! ```text
//! ┌──────────────────┐        ┌──────────────────┐       ┌──────────────┐
//! │ pickup_locations │◄───────│      orders      │◄──────│ order_items  │
//! │  id, name        │  0..1  │  customer_name   │  1..* │  quantity    │
//! └──────────────────┘        │  due_date, state │       │  comment     │
//!                             │  total           │       └──────┬───────┘
//!                             └──────────────────┘              │
//!                                                   ┌───────────▼──────┐
//!                                                   │     products     │
//!                                                   │  id, name, price │
//!                                                   └──────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify applied migrations; add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations from `migrations/sqlite`, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Each migration runs in its own transaction and is recorded in
/// `_sqlx_migrations`, so calling this repeatedly is harmless.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        available = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
