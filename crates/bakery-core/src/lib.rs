//! # bakery-core: Pure Domain Logic for Bakery Admin
//!
//! Entities, the filter/page model, the record-store and service contracts,
//! and the dashboard aggregate. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bakery Admin Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation layer (outside this workspace)        │   │
//! │  │      location grid ─ product grid ─ order grid ─ dashboard      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Page<T>, DashboardData                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bakery-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │  service  │  │  filter   │  │   store   │  │ dashboard │   │   │
//! │  │   │ Filterable│  │   page    │  │RecordStore│  │ Dashboard │   │   │
//! │  │   │CrudService│  │           │  │MemoryStore│  │   Data    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bakery-db (Database Layer)                     │   │
//! │  │      SQLite record stores, migrations, dashboard queries        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (PickupLocation, Product, Order) and the acting User
//! - [`filter`] - Optional case-insensitive name filters
//! - [`page`] - Page requests and pages
//! - [`store`] - The `RecordStore` contract and an in-memory store
//! - [`service`] - `FilterableCrudService` and its per-entity implementations
//! - [`dashboard`] - `DashboardData` and its validating builder
//! - [`money`] - Integer cents
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bakery_core::{FilterCriterion, FilterableCrudService, MemoryStore, PageRequest};
//! use bakery_core::{PickupLocation, PickupLocationService};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::new(
//!     ["Central", "North Hub", "Central West"].map(|name| PickupLocation::named(name)),
//! );
//! let service = PickupLocationService::new(store);
//!
//! let page = service
//!     .find_any_matching(&FilterCriterion::contains("central"), &PageRequest::new(0, 10).unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(page.total_elements, 2);
//! # });
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod error;
pub mod filter;
pub mod money;
pub mod page;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dashboard::{DashboardBuilder, DashboardData, DeliveryStats, ProductDeliveries};
pub use error::{CoreError, CoreResult, ServiceError, ServiceResult, ValidationError};
pub use filter::{fold_case, FilterCriterion, NamePattern};
pub use money::Money;
pub use page::{Direction, Page, PageRequest, Sort};
pub use service::{FilterableCrudService, OrderService, PickupLocationService, ProductService};
pub use store::{MemoryStore, MemoryStoreError, RecordStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of any display name (location, product, customer).
pub const MAX_NAME_LENGTH: usize = 255;

/// Largest page a caller may request.
///
/// ## Business Reason
/// Grids page lazily; anything larger is an accidental "load everything".
pub const MAX_PAGE_SIZE: u32 = 500;

/// Upper bound for prices and order totals ($10,000.00).
pub const MAX_PRICE_CENTS: i64 = 1_000_000;
