//! # bakery-db: Database Layer for Bakery Admin
//!
//! SQLite record stores for the bakery-core services, plus the reporting
//! job that assembles dashboard data. Built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bakery Admin Data Flow                           │
//! │                                                                         │
//! │  Presentation layer (grid page request, dashboard refresh)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bakery-core services (FilterableCrudService)                          │
//! │       │ RecordStore                                                     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bakery-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │◄───│ PickupLocationRepo │  │            │  │   │
//! │  │   │  SqlitePool   │    │ ProductRepo        │  │ 001_init   │  │   │
//! │  │   │               │    │ OrderRepo          │  │            │  │   │
//! │  │   │               │    │ DashboardRepo      │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file ($BAKERY_DB_PATH)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Record stores and the dashboard reporting job
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bakery_core::{FilterCriterion, FilterableCrudService, PageRequest, ProductService};
//! use bakery_db::{DashboardConfig, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//!
//! let products = ProductService::new(db.products());
//! let page = products
//!     .find_any_matching(&FilterCriterion::contains("bun"), &PageRequest::new(0, 20)?)
//!     .await?;
//!
//! let dashboard = db
//!     .dashboard(DashboardConfig::default())
//!     .load_dashboard(chrono::Local::now().date_naive())
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DB_PATH_ENV, DEFAULT_DB_PATH};

// Repository re-exports for convenience
pub use repository::dashboard::{DashboardConfig, DashboardRepository};
pub use repository::order::OrderRepository;
pub use repository::pickup_location::PickupLocationRepository;
pub use repository::product::ProductRepository;
